//! Storage service
//!
//! Built once at process start and shared by reference. Every operation the
//! rest of the application consumes goes through here.

use log::info;
use std::path::Path;
use std::sync::Arc;

use crate::config::ConfigStore;
use crate::error::StudioError;
use crate::mount::{AutoMounter, DetectResult, MountBackend, MountReport, platform_backend};
use crate::session::{
    BookingDetails, DirectoryProvisioner, FolderStats, SessionKey, SessionLocation, SessionPaths,
    Subfolder, TransferMode, TransferResult,
};
use crate::storage::{ConnectivityMonitor, NetworkStatus, StorageRoot};
use crate::sync::{CacheStatus, CacheSyncReconciler, SyncResult};

pub struct StudioStorage {
    config: Arc<ConfigStore>,
    monitor: Arc<ConnectivityMonitor>,
    mounter: AutoMounter,
    provisioner: DirectoryProvisioner,
    reconciler: CacheSyncReconciler,
}

impl StudioStorage {
    /// Service using the mount tooling of the current platform
    pub async fn new(config: Arc<ConfigStore>) -> Self {
        Self::with_backend(config, Arc::from(platform_backend())).await
    }

    pub async fn with_backend(config: Arc<ConfigStore>, backend: Arc<dyn MountBackend>) -> Self {
        let snapshot = config.snapshot().await;
        let monitor = Arc::new(ConnectivityMonitor::new(Arc::clone(&config)));

        info!(
            "Storage core for //{}/{} (cache: {}, mount backend: {})",
            snapshot.nas.host,
            snapshot.nas.share,
            snapshot.cache.path.display(),
            backend.name()
        );

        Self {
            mounter: AutoMounter::new(Arc::clone(&config), Arc::clone(&monitor), backend),
            provisioner: DirectoryProvisioner::new(
                Arc::clone(&config),
                Arc::clone(&monitor),
                snapshot.cache.max_concurrent_scans,
            ),
            reconciler: CacheSyncReconciler::new(Arc::clone(&config), Arc::clone(&monitor)),
            config,
            monitor,
        }
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    /// Runs auto-mount when the config asks for it
    pub async fn startup(&self) -> Option<MountReport> {
        if !self.config.snapshot().await.nas.auto_mount_on_startup {
            return None;
        }
        Some(self.mounter.auto_mount_on_startup().await)
    }

    // ═══ CONNECTIVITY ═══

    /// Cached answer, at most one TTL old
    pub async fn is_network_available(&self) -> bool {
        self.monitor.is_available().await
    }

    pub async fn network_status(&self) -> NetworkStatus {
        self.monitor.get_status().await
    }

    /// Fresh probe, bypassing the cache
    pub async fn check_network_availability(&self) -> NetworkStatus {
        self.monitor.refresh_status().await
    }

    pub async fn active_root(&self) -> StorageRoot {
        self.monitor.active_root().await
    }

    // ═══ MOUNTING ═══

    pub async fn detect_nas(&self) -> DetectResult {
        self.mounter.detect_nas().await
    }

    pub async fn mount_nas(&self) -> MountReport {
        self.mounter.mount_nas().await
    }

    pub async fn auto_mount_on_startup(&self) -> MountReport {
        self.mounter.auto_mount_on_startup().await
    }

    // ═══ SESSIONS ═══

    pub async fn create_session_directory(
        &self,
        client_name: &str,
        session_id: &str,
        date_str: &str,
        booking: Option<BookingDetails>,
    ) -> Result<SessionPaths, StudioError> {
        let key = SessionKey::new(client_name, session_id, date_str, booking)?;
        Ok(self.provisioner.create_session_directory(&key).await?)
    }

    pub async fn check_session_exists(
        &self,
        client_name: &str,
        session_id: &str,
        date_str: &str,
        booking: Option<BookingDetails>,
    ) -> Result<bool, StudioError> {
        let key = SessionKey::new(client_name, session_id, date_str, booking)?;
        Ok(self.provisioner.check_session_exists(&key).await)
    }

    pub async fn get_session_path(
        &self,
        client_name: &str,
        session_id: &str,
        date_str: &str,
        booking: Option<BookingDetails>,
    ) -> Result<Option<SessionLocation>, StudioError> {
        let key = SessionKey::new(client_name, session_id, date_str, booking)?;
        Ok(self.provisioner.get_session_path(&key).await)
    }

    pub async fn get_folder_stats(&self, session_path: &Path) -> Result<FolderStats, StudioError> {
        Ok(self.provisioner.get_folder_stats(session_path).await?)
    }

    pub async fn copy_files(
        &self,
        session_path: &Path,
        from: Subfolder,
        to: Subfolder,
        files: &[String],
    ) -> Result<TransferResult, StudioError> {
        Ok(self
            .provisioner
            .transfer_between_subfolders(session_path, from, to, files, TransferMode::Copy)
            .await?)
    }

    pub async fn move_files(
        &self,
        session_path: &Path,
        from: Subfolder,
        to: Subfolder,
        files: &[String],
    ) -> Result<TransferResult, StudioError> {
        Ok(self
            .provisioner
            .transfer_between_subfolders(session_path, from, to, files, TransferMode::Move)
            .await?)
    }

    // ═══ CACHE ═══

    pub async fn get_cache_status(&self) -> Result<CacheStatus, StudioError> {
        Ok(self.reconciler.get_cache_status().await?)
    }

    pub async fn sync_cache_to_nas(
        &self,
        client_name: &str,
        session_id: &str,
        date_str: &str,
        booking: Option<BookingDetails>,
    ) -> Result<SyncResult, StudioError> {
        let key = SessionKey::new(client_name, session_id, date_str, booking)?;
        Ok(self.reconciler.sync_cache_to_nas(&key).await?)
    }

    pub async fn sync_all_cached_sessions(&self) -> Result<Vec<SyncResult>, StudioError> {
        Ok(self.reconciler.sync_all_cached_sessions().await?)
    }
}
