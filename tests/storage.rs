mod common;

use std::sync::Arc;

use common::fixture;
use studio_storage::storage::{ConnectivityMonitor, StorageRoot, VolumeResolver};
use tempfile::TempDir;

#[tokio::test]
async fn primary_path_wins_over_alternatives() {
    let dir = TempDir::new().unwrap();
    let primary = dir.path().join("primary");
    let alt = dir.path().join("alt");
    std::fs::create_dir_all(&primary).unwrap();
    std::fs::create_dir_all(&alt).unwrap();

    let resolver = VolumeResolver::new(vec![primary.clone(), alt]);
    assert_eq!(resolver.resolve_root().await, Some(primary));
}

#[tokio::test]
async fn falls_back_to_first_accessible_alternative() {
    let dir = TempDir::new().unwrap();
    let alt = dir.path().join("alt");
    std::fs::create_dir_all(&alt).unwrap();
    // a plain file is never a storage root
    let file = dir.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();

    let resolver = VolumeResolver::new(vec![dir.path().join("missing"), file, alt.clone()]);
    assert_eq!(resolver.resolve_root().await, Some(alt));
}

#[tokio::test]
async fn nothing_accessible_resolves_to_none() {
    let dir = TempDir::new().unwrap();
    let resolver = VolumeResolver::new(vec![dir.path().join("a"), dir.path().join("b")]);
    assert_eq!(resolver.resolve_root().await, None);
}

#[cfg(unix)]
#[tokio::test]
async fn read_only_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let locked = dir.path().join("locked");
    std::fs::create_dir_all(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

    let resolver = VolumeResolver::new(vec![locked.clone()]);
    let resolved = resolver.resolve_root().await;

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    assert_eq!(resolved, None);
}

#[tokio::test]
async fn write_probe_accepts_writable_directory_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nas");
    std::fs::create_dir_all(&root).unwrap();

    let resolver = VolumeResolver::new(vec![root.clone()]).with_write_probe(true);
    assert_eq!(resolver.resolve_root().await, Some(root.clone()));
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
}

#[tokio::test]
async fn candidates_follow_config_order_with_subfolder() {
    let fx = fixture(false).await;
    let discovered = fx.dir.path().join("found");
    let alt = fx.dir.path().join("alt");
    let (d, a) = (discovered.clone(), alt.clone());
    fx.store
        .update(move |cfg| {
            cfg.nas.discovered_path = Some(d);
            cfg.nas.alternative_paths = vec![a];
            cfg.nas.subfolder = Some("Studio".into());
        })
        .await
        .unwrap();

    let cfg = fx.store.snapshot().await;
    let resolver = VolumeResolver::from_config(&cfg.nas);
    assert_eq!(
        resolver.candidates(),
        &[
            fx.nas.join("Studio"),
            discovered.join("Studio"),
            alt.join("Studio"),
        ]
    );
}

#[tokio::test]
async fn monitor_caches_until_refreshed() {
    let fx = fixture(false).await;
    let monitor = ConnectivityMonitor::new(Arc::clone(&fx.store));

    assert!(!monitor.get_status().await.available);
    fx.bring_nas_online();

    // still inside the TTL window
    assert!(!monitor.get_status().await.available);

    let fresh = monitor.refresh_status().await;
    assert!(fresh.available);
    assert_eq!(fresh.path, Some(fx.nas.clone()));
    assert_eq!(fresh.age_secs, 0);
}

#[tokio::test]
async fn monitor_with_zero_ttl_always_probes() {
    let fx = fixture(false).await;
    fx.store
        .update(|cfg| cfg.nas.status_ttl_secs = 0)
        .await
        .unwrap();
    let monitor = ConnectivityMonitor::new(Arc::clone(&fx.store));

    assert!(!monitor.is_available().await);
    fx.bring_nas_online();
    assert!(monitor.is_available().await);
}

#[tokio::test]
async fn active_root_switches_between_cache_and_nas() {
    let fx = fixture(false).await;
    let monitor = ConnectivityMonitor::new(Arc::clone(&fx.store));

    assert_eq!(
        monitor.active_root().await,
        StorageRoot::LocalCache {
            path: fx.cache.clone()
        }
    );

    fx.bring_nas_online();
    monitor.invalidate().await;
    let root = monitor.active_root().await;
    assert!(root.is_network());
    assert_eq!(root.path(), fx.nas.as_path());
}
