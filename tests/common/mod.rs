#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use studio_storage::config::ConfigStore;
use studio_storage::error::MountError;
use studio_storage::mount::{Credentials, MountBackend, MountEntry, ShareCandidate};
use studio_storage::service::StudioStorage;

pub struct Fixture {
    pub dir: TempDir,
    pub store: Arc<ConfigStore>,
    pub nas: PathBuf,
    pub cache: PathBuf,
}

impl Fixture {
    pub fn mount_point(&self, name: &str) -> PathBuf {
        self.dir.path().join("mnt").join(name)
    }

    pub fn bring_nas_online(&self) {
        std::fs::create_dir_all(&self.nas).unwrap();
    }
}

/// Config in a temp dir: primary NAS path `<tmp>/nas`, cache `<tmp>/cache`,
/// mount points `<tmp>/mnt/a` and `<tmp>/mnt/b`, no alternatives.
pub async fn fixture(nas_online: bool) -> Fixture {
    let dir = TempDir::new().unwrap();
    let nas = dir.path().join("nas");
    let cache = dir.path().join("cache");
    if nas_online {
        std::fs::create_dir_all(&nas).unwrap();
    }

    let store = Arc::new(ConfigStore::load(dir.path().join("config.json")).unwrap());
    let mount_points = vec![dir.path().join("mnt").join("a"), dir.path().join("mnt").join("b")];
    let (nas_path, cache_path) = (nas.clone(), cache.clone());
    store
        .update(move |cfg| {
            cfg.nas.primary_path = Some(nas_path);
            cfg.nas.alternative_paths = Vec::new();
            cfg.nas.discovered_path = None;
            cfg.nas.subfolder = None;
            cfg.nas.mount_points = mount_points;
            cfg.nas.username = Some("studio".into());
            cfg.nas.password = None;
            cfg.nas.alternative_users = vec!["admin".into()];
            cfg.nas.auto_mount_on_startup = false;
            cfg.nas.status_ttl_secs = 30;
            cfg.cache.path = cache_path;
        })
        .await
        .unwrap();

    Fixture {
        dir,
        store,
        nas,
        cache,
    }
}

pub async fn service(fx: &Fixture, backend: Arc<FakeBackend>) -> StudioStorage {
    StudioStorage::with_backend(Arc::clone(&fx.store), backend).await
}

/// Records calls; mounting succeeds only for `accept`
#[derive(Default)]
pub struct FakeBackend {
    pub table: Mutex<Vec<MountEntry>>,
    pub mount_calls: Mutex<Vec<(String, PathBuf)>>,
    pub native_calls: Mutex<Vec<String>>,
    pub accept: Option<Credentials>,
    pub reachable: bool,
    /// Directory `open_native` creates, simulating the OS finishing the connection
    pub native_target: Option<PathBuf>,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.mount_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MountBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn mount(
        &self,
        share: &ShareCandidate,
        mount_point: &Path,
        _timeout: Duration,
    ) -> Result<(), MountError> {
        self.mount_calls
            .lock()
            .unwrap()
            .push((share.to_string(), mount_point.to_path_buf()));

        if self.accept.as_ref() == Some(&share.credentials) {
            self.table.lock().unwrap().push(MountEntry {
                source: share.to_string(),
                mount_point: mount_point.to_path_buf(),
            });
            Ok(())
        } else {
            Err(MountError::CommandFailed {
                program: "fake".into(),
                code: 13,
                stderr: "permission denied".into(),
            })
        }
    }

    async fn mount_table(&self) -> Result<Vec<MountEntry>, MountError> {
        Ok(self.table.lock().unwrap().clone())
    }

    async fn open_native(&self, address: &str, _timeout: Duration) -> Result<(), MountError> {
        self.native_calls.lock().unwrap().push(address.to_string());
        if let Some(target) = &self.native_target {
            std::fs::create_dir_all(target).unwrap();
        }
        Ok(())
    }

    async fn ping(&self, _host: &str) -> bool {
        self.reachable
    }
}

/// Every file below `root` with its contents
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut out = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            if path.is_dir() {
                out.insert(path.strip_prefix(root).unwrap().to_path_buf(), Vec::new());
                stack.push(path);
            } else {
                let bytes = std::fs::read(&path).unwrap();
                out.insert(path.strip_prefix(root).unwrap().to_path_buf(), bytes);
            }
        }
    }
    out
}
