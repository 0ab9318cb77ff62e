//! Storage result types
//!
//! Defines result structures returned by root resolution and connectivity checks.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where session data is currently written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageRoot {
    Network { path: PathBuf },
    LocalCache { path: PathBuf },
}

impl StorageRoot {
    pub fn path(&self) -> &Path {
        match self {
            StorageRoot::Network { path } | StorageRoot::LocalCache { path } => path,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, StorageRoot::Network { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageRoot::Network { .. } => "NAS",
            StorageRoot::LocalCache { .. } => "local cache",
        }
    }
}

/// Result of a connectivity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkStatus {
    pub available: bool,
    pub path: Option<PathBuf>,
    /// Seconds since the probe that produced this status
    pub age_secs: u64,
}
