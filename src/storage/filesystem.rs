//! File system operations
//!
//! Async helpers shared by provisioning and reconciliation.

use std::io::Result;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Create a directory and its parents; succeeds if it already exists
pub async fn create_directory(path: &Path) -> std::result::Result<(), StorageError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| StorageError::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        })
}

/// Check if file exists
pub async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Check if directory exists
pub async fn directory_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Regular files directly inside `dir`, sorted by name. A missing directory yields nothing.
pub async fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Subdirectories directly inside `dir`, sorted by name
pub async fn list_directories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Copy `src` to `dest` through a `.part` file so a half-written copy
/// never carries the final name.
pub async fn copy_atomically(src: &Path, dest: &Path) -> Result<u64> {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp = dest.with_file_name(format!("{}.part", file_name));

    let bytes = match tokio::fs::copy(src, &temp).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(&temp, dest).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    Ok(bytes)
}
