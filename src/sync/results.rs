//! Sync result types
//!
//! Defines result structures returned by cache reconciliation.

use serde::Serialize;
use std::path::PathBuf;

use crate::session::FileError;

/// Outcome of reconciling one session from the cache to the NAS
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    /// Session folder relative to the storage roots
    pub session: PathBuf,
    pub transferred: usize,
    pub skipped: usize,
    pub bytes_transferred: u64,
    /// Same name on both sides but different size; left untouched
    pub conflicts: Vec<String>,
    pub errors: Vec<FileError>,
    /// The cache is never cleared by reconciliation
    pub cache_kept: bool,
}

impl SyncResult {
    pub fn empty(session: PathBuf) -> Self {
        Self {
            session,
            transferred: 0,
            skipped: 0,
            bytes_transferred: 0,
            conflicts: Vec::new(),
            errors: Vec::new(),
            cache_kept: true,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.conflicts.is_empty()
    }
}

/// What the local cache currently holds
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub cache_path: PathBuf,
    pub exists: bool,
    pub sessions: Vec<PathBuf>,
    pub file_count: usize,
    pub total_bytes: u64,
    pub network_available: bool,
}
