//! Environment overrides mutate process-global state, so this binary holds a
//! single test that walks through every case in order.

use std::path::Path;

use studio_storage::config::{ConfigStore, StoreConfig};
use tempfile::TempDir;

const BAD_TIMEOUT: &str = "STUDIO_STORAGE__NAS__MOUNT_TIMEOUT_SECS";
const INTERVAL: &str = "STUDIO_STORAGE__SYNC__INTERVAL_SECS";

fn stored(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

fn saved_config(path: &Path) {
    let mut cfg = StoreConfig::default();
    cfg.nas.host = "nas.studio.local".into();
    cfg.nas.password = Some("keepme".into());
    std::fs::write(path, serde_json::to_vec_pretty(&cfg).unwrap()).unwrap();
}

#[tokio::test]
async fn environment_overrides_never_reach_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    saved_config(&path);

    // A malformed override is an error, not a corrupt file
    unsafe { std::env::set_var(BAD_TIMEOUT, "abc") };
    let result = ConfigStore::load(&path);
    unsafe { std::env::remove_var(BAD_TIMEOUT) };

    assert!(result.is_err());
    let file = stored(&path);
    assert_eq!(file["nas"]["host"], "nas.studio.local");
    assert_eq!(file["nas"]["password"], "keepme");

    // A valid override is visible in memory but is not saved by later updates
    unsafe { std::env::set_var(INTERVAL, "7") };
    let store = ConfigStore::load(&path).unwrap();
    assert_eq!(store.snapshot().await.sync.interval_secs, 7);
    assert_eq!(stored(&path)["sync"]["interval_secs"], 60);

    let updated = store.update(|cfg| cfg.sync.auto_sync = false).await.unwrap();
    assert_eq!(updated.sync.interval_secs, 7);
    unsafe { std::env::remove_var(INTERVAL) };

    let file = stored(&path);
    assert_eq!(file["sync"]["interval_secs"], 60);
    assert_eq!(file["sync"]["auto_sync"], false);
    assert_eq!(file["nas"]["host"], "nas.studio.local");

    let reloaded = ConfigStore::load(&path).unwrap().snapshot().await;
    assert_eq!(reloaded.sync.interval_secs, 60);
    assert!(!reloaded.sync.auto_sync);
    assert_eq!(reloaded.nas.password.as_deref(), Some("keepme"));
}
