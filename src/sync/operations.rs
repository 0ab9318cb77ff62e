//! Cache reconciliation
//!
//! One-way copy of cached session files onto the NAS. Files already present
//! with the same size are skipped, a same-name file of a different size is
//! reported as a conflict, and nothing in the cache is ever modified.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::ConfigStore;
use crate::error::SyncError;
use crate::session::{FileError, SessionKey, Subfolder};
use crate::storage::ConnectivityMonitor;
use crate::storage::filesystem::{copy_atomically, directory_exists, list_directories, list_files};
use crate::sync::results::{CacheStatus, SyncResult};

pub struct CacheSyncReconciler {
    config: Arc<ConfigStore>,
    monitor: Arc<ConnectivityMonitor>,
    session_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl CacheSyncReconciler {
    pub fn new(config: Arc<ConfigStore>, monitor: Arc<ConnectivityMonitor>) -> Self {
        Self {
            config,
            monitor,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Copy one cached session to the NAS. Fails fast when the NAS is unreachable.
    pub async fn sync_cache_to_nas(&self, key: &SessionKey) -> Result<SyncResult, SyncError> {
        let nas_root = self.require_nas().await?;
        let cache_root = self.config.snapshot().await.cache.path;
        Ok(self
            .sync_session(&cache_root, &nas_root, &key.relative_path())
            .await)
    }

    /// Reconcile every session found in the cache
    pub async fn sync_all_cached_sessions(&self) -> Result<Vec<SyncResult>, SyncError> {
        let nas_root = self.require_nas().await?;
        let cache_root = self.config.snapshot().await.cache.path;

        let sessions = cached_sessions(&cache_root).await?;
        let mut results = Vec::with_capacity(sessions.len());
        for relative in sessions {
            results.push(self.sync_session(&cache_root, &nas_root, &relative).await);
        }

        let transferred: usize = results.iter().map(|r| r.transferred).sum();
        info!(
            "Synced {} cached sessions, {} files transferred",
            results.len(),
            transferred
        );
        Ok(results)
    }

    pub async fn get_cache_status(&self) -> Result<CacheStatus, SyncError> {
        let cache_root = self.config.snapshot().await.cache.path;
        let network_available = self.monitor.is_available().await;

        if !directory_exists(&cache_root).await {
            return Ok(CacheStatus {
                cache_path: cache_root,
                exists: false,
                sessions: Vec::new(),
                file_count: 0,
                total_bytes: 0,
                network_available,
            });
        }

        let sessions = cached_sessions(&cache_root).await?;
        let mut file_count = 0;
        let mut total_bytes = 0;
        for relative in &sessions {
            let (files, bytes) = tree_size(&cache_root.join(relative)).await?;
            file_count += files;
            total_bytes += bytes;
        }

        Ok(CacheStatus {
            cache_path: cache_root,
            exists: true,
            sessions,
            file_count,
            total_bytes,
            network_available,
        })
    }

    async fn require_nas(&self) -> Result<PathBuf, SyncError> {
        match self.monitor.refresh_status().await.path {
            Some(path) => Ok(path),
            None => Err(SyncError::NasNotAvailable),
        }
    }

    async fn session_lock(&self, relative: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks
            .entry(relative.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock once no other reconciliation holds or awaits it
    async fn release_session_lock(&self, relative: &Path, lock: Arc<Mutex<()>>) {
        let mut locks = self.session_locks.lock().await;
        // the map's copy plus ours
        if Arc::strong_count(&lock) == 2 {
            locks.remove(relative);
        }
    }

    /// Reconcile `relative` from `cache_root` to `nas_root`. Only one
    /// reconciliation of a given session runs at a time.
    async fn sync_session(&self, cache_root: &Path, nas_root: &Path, relative: &Path) -> SyncResult {
        let lock = self.session_lock(relative).await;
        let guard = lock.lock().await;
        let result = reconcile(cache_root, nas_root, relative).await;
        drop(guard);
        self.release_session_lock(relative, lock).await;
        result
    }
}

/// Copy the session root files, then each subfolder tree
async fn reconcile(cache_root: &Path, nas_root: &Path, relative: &Path) -> SyncResult {
    let mut result = SyncResult::empty(relative.to_path_buf());
    let cache_dir = cache_root.join(relative);
    if !directory_exists(&cache_dir).await {
        debug!("Nothing cached for {}", relative.display());
        return result;
    }
    let nas_dir = nas_root.join(relative);

    sync_folder(&cache_dir, &nas_dir, &mut result).await;
    for folder in Subfolder::ALL {
        sync_tree(
            &cache_dir.join(folder.dir_name()),
            &nas_dir.join(folder.dir_name()),
            &mut result,
        )
        .await;
    }

    info!(
        "Sync {}: {} transferred, {} skipped, {} conflicts, {} errors (cache kept)",
        relative.display(),
        result.transferred,
        result.skipped,
        result.conflicts.len(),
        result.errors.len()
    );
    result
}

/// Copy everything below `src` into `dest`, recreating nested folders
async fn sync_tree(src: &Path, dest: &Path, result: &mut SyncResult) {
    let mut pending = vec![(src.to_path_buf(), dest.to_path_buf())];
    while let Some((from, to)) = pending.pop() {
        sync_folder(&from, &to, result).await;
        match list_directories(&from).await {
            Ok(dirs) => {
                for dir in dirs {
                    if let Some(name) = dir.file_name() {
                        let nested = to.join(name);
                        pending.push((dir, nested));
                    }
                }
            }
            Err(e) => result.errors.push(FileError {
                file: from.display().to_string(),
                error: e.to_string(),
            }),
        }
    }
}

/// Copy the regular files directly inside `src` into `dest`
async fn sync_folder(src: &Path, dest: &Path, result: &mut SyncResult) {
    let files = match list_files(src).await {
        Ok(files) => files,
        Err(e) => {
            result.errors.push(FileError {
                file: src.display().to_string(),
                error: e.to_string(),
            });
            return;
        }
    };
    if files.is_empty() && !directory_exists(src).await {
        return;
    }

    if let Err(e) = tokio::fs::create_dir_all(dest).await {
        warn!("Cannot create {}: {}", dest.display(), e);
        result.errors.push(FileError {
            file: dest.display().to_string(),
            error: e.to_string(),
        });
        return;
    }

    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = dest.join(name);
        let label = file.display().to_string();

        let src_len = match tokio::fs::metadata(&file).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                result.errors.push(FileError {
                    file: label,
                    error: e.to_string(),
                });
                continue;
            }
        };

        match tokio::fs::metadata(&target).await {
            Ok(existing) if existing.len() == src_len => {
                result.skipped += 1;
            }
            Ok(existing) => {
                warn!(
                    "Conflict on {}: cache {} bytes, NAS {} bytes",
                    target.display(),
                    src_len,
                    existing.len()
                );
                result.conflicts.push(label);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match copy_atomically(&file, &target).await {
                    Ok(bytes) => {
                        result.transferred += 1;
                        result.bytes_transferred += bytes;
                    }
                    Err(e) => {
                        warn!("Copy of {} failed: {}", file.display(), e);
                        result.errors.push(FileError {
                            file: label,
                            error: e.to_string(),
                        });
                    }
                }
            }
            Err(e) => {
                result.errors.push(FileError {
                    file: label,
                    error: e.to_string(),
                });
            }
        }
    }
}

fn is_numeric_dir(path: &Path, len: usize) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.len() == len && n.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Session folders under `{cache}/{YYYY}/{MM}/`, relative to the cache root
async fn cached_sessions(cache_root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut sessions = Vec::new();
    for year in list_directories(cache_root).await? {
        if !is_numeric_dir(&year, 4) {
            continue;
        }
        for month in list_directories(&year).await? {
            if !is_numeric_dir(&month, 2) {
                continue;
            }
            for session in list_directories(&month).await? {
                if let Ok(relative) = session.strip_prefix(cache_root) {
                    sessions.push(relative.to_path_buf());
                }
            }
        }
    }
    Ok(sessions)
}

/// Number of files and their total size below `dir`
async fn tree_size(dir: &Path) -> std::io::Result<(usize, u64)> {
    let mut files = 0;
    let mut bytes = 0;
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let mut entries = tokio::fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if meta.is_dir() {
                stack.push(entry.path());
            } else if meta.is_file() {
                files += 1;
                bytes += meta.len();
            }
        }
    }
    Ok((files, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn reconciler(dir: &TempDir) -> CacheSyncReconciler {
        let store = Arc::new(ConfigStore::load(dir.path().join("config.json")).unwrap());
        let (nas, cache) = (dir.path().join("nas"), dir.path().join("cache"));
        std::fs::create_dir_all(&nas).unwrap();
        store
            .update(move |cfg| {
                cfg.nas.primary_path = Some(nas);
                cfg.nas.alternative_paths = Vec::new();
                cfg.cache.path = cache;
            })
            .await
            .unwrap();
        let monitor = Arc::new(ConnectivityMonitor::new(Arc::clone(&store)));
        CacheSyncReconciler::new(store, monitor)
    }

    #[tokio::test]
    async fn session_locks_are_dropped_after_sync() {
        let dir = TempDir::new().unwrap();
        let reconciler = reconciler(&dir).await;
        let key = SessionKey::new("Ahmed", "S1", "2026-02-03", None).unwrap();
        let raw = dir
            .path()
            .join("cache")
            .join(key.relative_path())
            .join(Subfolder::Raw.dir_name());
        std::fs::create_dir_all(&raw).unwrap();
        std::fs::write(raw.join("A.CR2"), b"raw").unwrap();

        let (first, second) = tokio::join!(
            reconciler.sync_cache_to_nas(&key),
            reconciler.sync_cache_to_nas(&key)
        );

        assert_eq!(first.unwrap().transferred + second.unwrap().transferred, 1);
        assert!(reconciler.session_locks.lock().await.is_empty());
    }
}
