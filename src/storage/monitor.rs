//! Connectivity monitor
//!
//! Caches the resolver's answer for a short window so UI polling does not
//! re-probe the filesystem on every call.

use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::config::ConfigStore;
use crate::storage::resolver::VolumeResolver;
use crate::storage::results::{NetworkStatus, StorageRoot};

#[derive(Debug, Clone)]
struct Probe {
    at: Instant,
    root: Option<PathBuf>,
    stale: bool,
}

pub struct ConnectivityMonitor {
    config: Arc<ConfigStore>,
    last: Mutex<Option<Probe>>,
}

impl ConnectivityMonitor {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self {
            config,
            last: Mutex::new(None),
        }
    }

    /// Cached status if younger than the TTL, otherwise a fresh probe
    pub async fn get_status(&self) -> NetworkStatus {
        let ttl = self.config.snapshot().await.nas.status_ttl();
        let mut last = self.last.lock().await;

        if let Some(probe) = last.as_ref() {
            let age = probe.at.elapsed();
            if !probe.stale && age < ttl {
                return NetworkStatus {
                    available: probe.root.is_some(),
                    path: probe.root.clone(),
                    age_secs: age.as_secs(),
                };
            }
        }

        let probe = self.probe().await;
        if last.as_ref().map(|p| p.root.is_some()) != Some(probe.root.is_some()) {
            match &probe.root {
                Some(path) => info!("NAS available at {}", path.display()),
                None => info!("NAS unavailable, using local cache"),
            }
        }
        let status = NetworkStatus {
            available: probe.root.is_some(),
            path: probe.root.clone(),
            age_secs: 0,
        };
        *last = Some(probe);
        status
    }

    /// Drop the cached result and probe immediately
    pub async fn refresh_status(&self) -> NetworkStatus {
        self.invalidate().await;
        self.get_status().await
    }

    pub async fn invalidate(&self) {
        if let Some(probe) = self.last.lock().await.as_mut() {
            probe.stale = true;
        }
    }

    pub async fn is_available(&self) -> bool {
        self.get_status().await.available
    }

    /// NAS root if reachable, else the configured local cache
    pub async fn active_root(&self) -> StorageRoot {
        match self.get_status().await.path {
            Some(path) => StorageRoot::Network { path },
            None => StorageRoot::LocalCache {
                path: self.config.snapshot().await.cache.path,
            },
        }
    }

    async fn probe(&self) -> Probe {
        let cfg = self.config.snapshot().await;
        let root = VolumeResolver::from_config(&cfg.nas).resolve_root().await;
        Probe {
            at: Instant::now(),
            root,
            stale: false,
        }
    }
}
