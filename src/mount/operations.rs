//! Auto-mount operations
//!
//! Three escalating ways of getting the NAS attached. Each one checks before it
//! acts, so repeating a call after success changes nothing.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigStore, NasConfig};
use crate::error::MountError;
use crate::mount::backend::MountBackend;
use crate::mount::candidates::{MountAttempt, mount_attempts};
use crate::mount::results::{DetectResult, MountReport};
use crate::storage::ConnectivityMonitor;
use crate::storage::permissions::is_accessible;
use crate::storage::resolver::VolumeResolver;

pub struct AutoMounter {
    config: Arc<ConfigStore>,
    monitor: Arc<ConnectivityMonitor>,
    backend: Arc<dyn MountBackend>,
}

impl AutoMounter {
    pub fn new(
        config: Arc<ConfigStore>,
        monitor: Arc<ConnectivityMonitor>,
        backend: Arc<dyn MountBackend>,
    ) -> Self {
        Self {
            config,
            monitor,
            backend,
        }
    }

    /// Probe the known paths; when none answers, ping the host to tell
    /// "host offline" apart from "share not mounted".
    pub async fn detect_nas(&self) -> DetectResult {
        let nas = self.config.snapshot().await.nas;
        let resolver = VolumeResolver::from_config(&nas);
        let mut diagnostics = Vec::new();

        for candidate in resolver.candidates() {
            if is_accessible(candidate).await {
                diagnostics.push(format!("found: {}", candidate.display()));
                self.monitor.invalidate().await;
                return DetectResult {
                    path: Some(candidate.clone()),
                    host_reachable: None,
                    diagnostics,
                };
            }
            diagnostics.push(format!("not accessible: {}", candidate.display()));
        }

        let reachable = self.backend.ping(&nas.host).await;
        if reachable {
            diagnostics.push(format!(
                "host {} is online but the share is not mounted",
                nas.host
            ));
        } else {
            diagnostics.push(format!("host {} is not reachable", nas.host));
        }

        DetectResult {
            path: None,
            host_reachable: Some(reachable),
            diagnostics,
        }
    }

    /// No-op when the NAS already resolves, otherwise hand the share address
    /// to the OS connection flow. That flow may finish later, so callers
    /// should re-check availability afterwards.
    pub async fn mount_nas(&self) -> MountReport {
        if let Some(path) = self.monitor.refresh_status().await.path {
            return MountReport::mounted(path, "NAS already mounted");
        }

        let nas = self.config.snapshot().await.nas;
        let address = nas.share_address();
        info!("Requesting connection to {} via {}", address, self.backend.name());

        match self.backend.open_native(&address, nas.mount_timeout()).await {
            Ok(()) => {
                let path = self.monitor.refresh_status().await.path;
                let message = match &path {
                    Some(_) => "NAS mounted".to_string(),
                    None => format!("Connection to {} requested; check availability again", address),
                };
                MountReport {
                    success: true,
                    path,
                    message,
                    attempts: vec![address],
                }
            }
            Err(e) => {
                warn!("Native connection to {} failed: {}", address, e);
                MountReport {
                    success: false,
                    path: None,
                    message: e.to_string(),
                    attempts: vec![address],
                }
            }
        }
    }

    /// Startup sequence: resolve, then adopt an existing mount of the host,
    /// then brute-force mount points and identities until one works.
    pub async fn auto_mount_on_startup(&self) -> MountReport {
        let nas = self.config.snapshot().await.nas;

        if let Some(path) = VolumeResolver::from_config(&nas).resolve_root().await {
            debug!("Auto-mount skipped, NAS already at {}", path.display());
            return MountReport::mounted(path, "NAS already available");
        }

        let mut attempts = Vec::new();
        let mut mounted: HashSet<PathBuf> = HashSet::new();

        match self.backend.mount_table().await {
            Ok(entries) => {
                for entry in &entries {
                    mounted.insert(entry.mount_point.clone());
                }
                for entry in entries.iter().filter(|e| e.refers_to(&nas.host)) {
                    attempts.push(format!(
                        "mount table: {} on {}",
                        entry.source,
                        entry.mount_point.display()
                    ));
                    if let Some(path) = adjust_to_subfolder(&entry.mount_point, &nas).await {
                        return self
                            .adopt(path, "Adopted existing mount", attempts)
                            .await;
                    }
                }
            }
            Err(e) => {
                warn!("Could not read mount table: {}", e);
                attempts.push(format!("mount table unavailable: {}", e));
            }
        }

        for attempt in mount_attempts(&nas) {
            match self.try_attempt(&attempt, &nas, &mounted).await {
                Ok(path) => {
                    attempts.push(format!("{} -> {}: ok", attempt.share, attempt.mount_point.display()));
                    return self.adopt(path, "NAS mounted", attempts).await;
                }
                Err(reason) => {
                    debug!("{} -> {}: {}", attempt.share, attempt.mount_point.display(), reason);
                    attempts.push(format!(
                        "{} -> {}: {}",
                        attempt.share,
                        attempt.mount_point.display(),
                        reason
                    ));
                    if matches!(reason, AttemptFailure::Mounted(_)) {
                        mounted.insert(attempt.mount_point.clone());
                    }
                }
            }
        }

        warn!("Auto-mount failed after {} attempts, staying on local cache", attempts.len());
        MountReport {
            success: false,
            path: None,
            message: "Could not mount NAS; using local cache".to_string(),
            attempts,
        }
    }

    async fn try_attempt(
        &self,
        attempt: &MountAttempt,
        nas: &NasConfig,
        mounted: &HashSet<PathBuf>,
    ) -> Result<PathBuf, AttemptFailure> {
        let point = &attempt.mount_point;
        if mounted.contains(point) {
            return Err(AttemptFailure::Skipped);
        }

        let mut created = false;
        if self.backend.creates_mount_point() && tokio::fs::metadata(point).await.is_err() {
            tokio::fs::create_dir_all(point)
                .await
                .map_err(|e| AttemptFailure::MountPoint(e.to_string()))?;
            created = true;
        }

        if let Err(e) = self
            .backend
            .mount(&attempt.share, point, nas.mount_timeout())
            .await
        {
            if created {
                remove_if_empty(point).await;
            }
            return Err(AttemptFailure::Mount(e));
        }

        match adjust_to_subfolder(point, nas).await {
            Some(path) => Ok(path),
            None => Err(AttemptFailure::Mounted(MountError::NotAccessible(point.clone()))),
        }
    }

    async fn adopt(&self, path: PathBuf, message: &str, attempts: Vec<String>) -> MountReport {
        info!("{} at {}", message, path.display());
        let discovered = path.clone();
        if let Err(e) = self
            .config
            .update(|cfg| cfg.nas.discovered_path = Some(discovered))
            .await
        {
            warn!("Could not persist discovered NAS path: {}", e);
        }
        self.monitor.invalidate().await;
        MountReport {
            success: true,
            path: Some(path),
            message: message.to_string(),
            attempts,
        }
    }
}

#[derive(Debug)]
enum AttemptFailure {
    Skipped,
    MountPoint(String),
    Mount(MountError),
    /// The tool succeeded but the result is unusable; the point stays occupied
    Mounted(MountError),
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Skipped => write!(f, "skipped, already mounted"),
            AttemptFailure::MountPoint(e) => write!(f, "cannot create mount point: {}", e),
            AttemptFailure::Mount(e) | AttemptFailure::Mounted(e) => write!(f, "{}", e),
        }
    }
}

/// The configured subfolder under `point` if it is accessible, else `point` itself
async fn adjust_to_subfolder(point: &Path, nas: &NasConfig) -> Option<PathBuf> {
    if let Some(sub) = nas.subfolder.as_deref().filter(|s| !s.is_empty()) {
        let nested = point.join(sub);
        if is_accessible(&nested).await {
            return Some(nested);
        }
    }
    if is_accessible(point).await {
        return Some(point.to_path_buf());
    }
    None
}

async fn remove_if_empty(point: &Path) {
    // remove_dir refuses non-empty directories
    if let Err(e) = tokio::fs::remove_dir(point).await {
        debug!("Left mount point {} in place: {}", point.display(), e);
    }
}
