//! Session directory provisioning
//!
//! Creates the per-booking folder tree on whichever root is active and answers
//! read-only questions about existing sessions.

use chrono::Local;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::ConfigStore;
use crate::error::StorageError;
use crate::session::booking::render_booking_metadata;
use crate::session::naming::{SessionKey, Subfolder};
use crate::session::results::{
    FileError, FolderStats, SessionLocation, SessionPaths, TransferMode, TransferResult,
};
use crate::storage::filesystem::{copy_atomically, create_directory, directory_exists, file_exists};
use crate::storage::{ConnectivityMonitor, StorageRoot};

pub const README_FILE: &str = "README.txt";
pub const BOOKING_FILE: &str = "booking_details.txt";

/// Extensions counted by [`DirectoryProvisioner::get_folder_stats`]
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "tif", "tiff", "heic", "webp", "cr2", "cr3", "nef", "arw", "dng", "orf",
    "raf", "rw2", "pef", "srw",
];

pub fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            MEDIA_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

pub struct DirectoryProvisioner {
    config: Arc<ConfigStore>,
    monitor: Arc<ConnectivityMonitor>,
    scan_limit: Arc<Semaphore>,
}

impl DirectoryProvisioner {
    pub fn new(
        config: Arc<ConfigStore>,
        monitor: Arc<ConnectivityMonitor>,
        max_concurrent_scans: usize,
    ) -> Self {
        Self {
            config,
            monitor,
            scan_limit: Arc::new(Semaphore::new(max_concurrent_scans.max(1))),
        }
    }

    /// Create the session folder and its four subfolders. Safe to repeat:
    /// existing folders are kept and an existing README is not rewritten.
    pub async fn create_session_directory(
        &self,
        key: &SessionKey,
    ) -> Result<SessionPaths, StorageError> {
        let storage = self.monitor.active_root().await;
        if !storage.is_network() {
            create_directory(storage.path()).await.map_err(|e| {
                StorageError::PathResolution(format!(
                    "local cache {} unusable: {}",
                    storage.path().display(),
                    e
                ))
            })?;
        }

        let root = storage.path().join(key.relative_path());
        create_directory(&root).await?;

        let paths = SessionPaths::new(root, key.folder_name(), storage);
        tokio::try_join!(
            create_directory(&paths.raw),
            create_directory(&paths.selected),
            create_directory(&paths.edited),
            create_directory(&paths.final_),
        )?;

        let readme = paths.root.join(README_FILE);
        if !file_exists(&readme).await {
            tokio::fs::write(&readme, render_readme(key, &paths.storage)).await?;
        }

        if let Some(details) = &key.booking {
            tokio::fs::write(
                paths.root.join(BOOKING_FILE),
                render_booking_metadata(key, details),
            )
            .await?;
        }

        info!(
            "Session {} ready on {}: {}",
            key.session_id,
            paths.storage.label(),
            paths.root.display()
        );
        Ok(paths)
    }

    /// Look on the NAS first (when reachable), then in the cache
    pub async fn get_session_path(&self, key: &SessionKey) -> Option<SessionLocation> {
        let status = self.monitor.get_status().await;
        let cache = self.config.snapshot().await.cache.path;

        let mut roots = Vec::with_capacity(2);
        if let Some(path) = status.path {
            roots.push(StorageRoot::Network { path });
        }
        roots.push(StorageRoot::LocalCache { path: cache });

        for storage in roots {
            let path = storage.path().join(key.relative_path());
            if directory_exists(&path).await {
                return Some(SessionLocation { path, storage });
            }
        }
        debug!("Session {} not found", key.folder_name());
        None
    }

    pub async fn check_session_exists(&self, key: &SessionKey) -> bool {
        self.get_session_path(key).await.is_some()
    }

    /// Recursively count recognised media files in each subfolder.
    /// Missing subfolders count as zero; other files are ignored.
    pub async fn get_folder_stats(&self, session_path: &Path) -> Result<FolderStats, StorageError> {
        if !directory_exists(session_path).await {
            return Err(StorageError::SessionNotFound(
                session_path.display().to_string(),
            ));
        }

        let (raw, selected, edited, final_) = tokio::try_join!(
            self.count_media(session_path.join(Subfolder::Raw.dir_name())),
            self.count_media(session_path.join(Subfolder::Selected.dir_name())),
            self.count_media(session_path.join(Subfolder::Edited.dir_name())),
            self.count_media(session_path.join(Subfolder::Final.dir_name())),
        )?;

        Ok(FolderStats {
            raw,
            selected,
            edited,
            final_,
        })
    }

    async fn count_media(&self, dir: PathBuf) -> Result<usize, StorageError> {
        let _permit = self.scan_limit.acquire().await.map_err(|e| {
            StorageError::IoError(std::io::Error::other(format!("scan limiter closed: {}", e)))
        })?;

        let mut count = 0;
        let mut stack = vec![dir];
        while let Some(current) = stack.pop() {
            let mut entries = match tokio::fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    stack.push(entry.path());
                } else if file_type.is_file() && is_media_file(&entry.path()) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// Copy or move named files from one subfolder of a session to another.
    /// Existing destination files are never overwritten.
    pub async fn transfer_between_subfolders(
        &self,
        session_path: &Path,
        from: Subfolder,
        to: Subfolder,
        files: &[String],
        mode: TransferMode,
    ) -> Result<TransferResult, StorageError> {
        if from == to {
            return Err(StorageError::InvalidInput(
                "source and destination subfolder are the same".into(),
            ));
        }
        if !directory_exists(session_path).await {
            return Err(StorageError::SessionNotFound(
                session_path.display().to_string(),
            ));
        }

        let src_dir = session_path.join(from.dir_name());
        let dest_dir = session_path.join(to.dir_name());
        create_directory(&dest_dir).await?;

        let mut result = TransferResult::default();
        for name in files {
            match transfer_one(&src_dir, &dest_dir, name, mode).await {
                Ok(()) => result.transferred.push(name.clone()),
                Err(e) => {
                    warn!("{:?} of {} failed: {}", mode, name, e);
                    result.errors.push(FileError {
                        file: name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "{:?} {} -> {}: {} ok, {} failed",
            mode,
            from.dir_name(),
            to.dir_name(),
            result.transferred.len(),
            result.errors.len()
        );
        Ok(result)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

async fn transfer_one(
    src_dir: &Path,
    dest_dir: &Path,
    name: &str,
    mode: TransferMode,
) -> Result<(), StorageError> {
    if !is_plain_file_name(name) {
        return Err(StorageError::InvalidInput(format!("bad file name: {}", name)));
    }
    let src = src_dir.join(name);
    let dest = dest_dir.join(name);

    if !file_exists(&src).await {
        return Err(StorageError::FileNotFound(name.to_string()));
    }
    if tokio::fs::metadata(&dest).await.is_ok() {
        return Err(StorageError::FileAlreadyExists(name.to_string()));
    }

    match mode {
        TransferMode::Copy => {
            copy_atomically(&src, &dest).await?;
        }
        TransferMode::Move => {
            if let Err(e) = tokio::fs::rename(&src, &dest).await {
                debug!("rename {} failed ({}), copying instead", src.display(), e);
                copy_atomically(&src, &dest).await?;
                tokio::fs::remove_file(&src).await?;
            }
        }
    }
    Ok(())
}

fn render_readme(key: &SessionKey, storage: &StorageRoot) -> String {
    let mut out = String::new();
    out.push_str(&format!("Session: {}\n", key.display_name()));
    out.push_str(&format!("Session ID: {}\n", key.session_id));
    out.push_str(&format!("Date: {}\n", key.date.format("%Y-%m-%d")));
    out.push_str(&format!(
        "Created: {} on {}\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        storage.label()
    ));
    out.push_str("Folders:\n");
    for folder in Subfolder::ALL {
        out.push_str(&format!("  {:<12} {}\n", folder.dir_name(), folder.describe()));
    }
    out
}
