//! Sync watcher
//!
//! Polls connectivity and reconciles the whole cache when the NAS comes back.

use log::{error, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::service::core::StudioStorage;
use crate::sync::SyncResult;

pub struct SyncWatcher {
    storage: Arc<StudioStorage>,
    was_available: Option<bool>,
}

impl SyncWatcher {
    pub fn new(storage: Arc<StudioStorage>) -> Self {
        Self {
            storage,
            was_available: None,
        }
    }

    /// One poll. Returns the sync results when this poll saw the NAS recover
    /// and auto-sync is enabled.
    pub async fn poll_once(&mut self) -> Option<Vec<SyncResult>> {
        let available = self.storage.check_network_availability().await.available;
        let recovered = available && self.was_available != Some(true);
        self.was_available = Some(available);

        if !recovered {
            return None;
        }
        if !self.storage.config().snapshot().await.sync.auto_sync {
            info!("NAS available, auto-sync disabled");
            return None;
        }

        info!("NAS available, reconciling local cache");
        match self.storage.sync_all_cached_sessions().await {
            Ok(results) => {
                let unclean = results.iter().filter(|r| !r.is_clean()).count();
                if unclean > 0 {
                    warn!("{} sessions synced with conflicts or errors", unclean);
                }
                Some(results)
            }
            Err(e) => {
                error!("Cache sync failed: {}", e);
                None
            }
        }
    }

    /// Poll every `sync.interval_secs` until `shutdown` resolves
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let secs = self.storage.config().snapshot().await.sync.interval_secs;
        let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
        tokio::pin!(shutdown);

        info!("Sync watcher started (every {}s)", secs);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Sync watcher stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }
    }
}
