//! Mount result types
//!
//! Defines result structures returned by NAS detection and mounting.

use serde::Serialize;
use std::path::PathBuf;

/// One row of the OS mount table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub source: String,
    pub mount_point: PathBuf,
}

impl MountEntry {
    /// Whether the mounted source points at `host`
    pub fn refers_to(&self, host: &str) -> bool {
        let source = self.source.to_lowercase().replace('\\', "/");
        let host = host.to_lowercase();
        source.contains(&format!("//{}/", host)) || source.contains(&format!("@{}/", host))
    }
}

/// Result of probing for the NAS
#[derive(Debug, Clone, Serialize)]
pub struct DetectResult {
    pub path: Option<PathBuf>,
    /// `None` when no ping was needed
    pub host_reachable: Option<bool>,
    pub diagnostics: Vec<String>,
}

/// Result of a mount or auto-mount request
#[derive(Debug, Clone, Serialize)]
pub struct MountReport {
    pub success: bool,
    pub path: Option<PathBuf>,
    pub message: String,
    pub attempts: Vec<String>,
}

impl MountReport {
    pub fn mounted(path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            success: true,
            path: Some(path),
            message: message.into(),
            attempts: Vec::new(),
        }
    }
}
