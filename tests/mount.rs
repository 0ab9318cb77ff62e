mod common;

use std::sync::Arc;

use common::{FakeBackend, fixture, service};
use studio_storage::mount::{Credentials, MountEntry};

fn accepting(creds: Credentials) -> Arc<FakeBackend> {
    Arc::new(FakeBackend {
        accept: Some(creds),
        ..FakeBackend::default()
    })
}

#[tokio::test]
async fn reachable_nas_short_circuits_auto_mount() {
    let fx = fixture(true).await;
    let backend = accepting(Credentials::Guest);
    let storage = service(&fx, Arc::clone(&backend)).await;

    let report = storage.auto_mount_on_startup().await;

    assert!(report.success);
    assert_eq!(report.path, Some(fx.nas.clone()));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn existing_mount_of_the_host_is_adopted() {
    let fx = fixture(false).await;
    let mounted_at = fx.dir.path().join("already").join("mounted");
    std::fs::create_dir_all(mounted_at.join("Clients")).unwrap();
    fx.store
        .update(|cfg| cfg.nas.subfolder = Some("Clients".into()))
        .await
        .unwrap();

    let backend = Arc::new(FakeBackend::default());
    backend.table.lock().unwrap().extend([
        MountEntry {
            source: "//someone@10.9.9.9/Other".into(),
            mount_point: fx.dir.path().join("elsewhere"),
        },
        MountEntry {
            source: "//studio@192.168.1.100/StudioPhotos".into(),
            mount_point: mounted_at.clone(),
        },
    ]);
    let storage = service(&fx, Arc::clone(&backend)).await;

    let report = storage.auto_mount_on_startup().await;

    assert!(report.success);
    assert_eq!(report.path, Some(mounted_at.join("Clients")));
    assert!(backend.calls().is_empty());
    assert_eq!(
        fx.store.snapshot().await.nas.discovered_path,
        Some(mounted_at.join("Clients"))
    );
    assert!(storage.is_network_available().await);
}

#[tokio::test]
async fn brute_force_walks_identities_until_one_is_accepted() {
    let fx = fixture(false).await;
    let backend = accepting(Credentials::Guest);
    let storage = service(&fx, Arc::clone(&backend)).await;

    let report = storage.auto_mount_on_startup().await;

    assert!(report.success);
    assert_eq!(report.path, Some(fx.mount_point("a")));
    let calls = backend.calls();
    assert_eq!(
        calls.iter().map(|(share, _)| share.as_str()).collect::<Vec<_>>(),
        vec![
            "//studio@192.168.1.100/StudioPhotos",
            "//admin@192.168.1.100/StudioPhotos",
            "//guest@192.168.1.100/StudioPhotos",
        ]
    );
    assert!(calls.iter().all(|(_, point)| *point == fx.mount_point("a")));
    assert_eq!(
        fx.store.snapshot().await.nas.discovered_path,
        Some(fx.mount_point("a"))
    );

    let root = storage.active_root().await;
    assert!(root.is_network());
    assert_eq!(root.path(), fx.mount_point("a").as_path());
}

#[tokio::test]
async fn total_failure_reports_every_attempt_and_cleans_mount_points() {
    let fx = fixture(false).await;
    let backend = Arc::new(FakeBackend::default());
    let storage = service(&fx, Arc::clone(&backend)).await;

    let report = storage.auto_mount_on_startup().await;

    assert!(!report.success);
    assert_eq!(report.path, None);
    assert_eq!(report.attempts.len(), 8);
    assert_eq!(backend.calls().len(), 8);
    assert!(!fx.mount_point("a").exists());
    assert!(!fx.mount_point("b").exists());
    assert_eq!(fx.store.snapshot().await.nas.discovered_path, None);
    assert!(!storage.active_root().await.is_network());
}

#[tokio::test]
async fn occupied_mount_point_is_skipped() {
    let fx = fixture(false).await;
    let backend = accepting(Credentials::Anonymous);
    backend.table.lock().unwrap().push(MountEntry {
        source: "//backup-host/Archive".into(),
        mount_point: fx.mount_point("a"),
    });
    let storage = service(&fx, Arc::clone(&backend)).await;

    let report = storage.auto_mount_on_startup().await;

    assert!(report.success);
    assert_eq!(report.path, Some(fx.mount_point("b")));
    let calls = backend.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|(_, point)| *point == fx.mount_point("b")));
}

#[tokio::test]
async fn second_auto_mount_changes_nothing() {
    let fx = fixture(false).await;
    let backend = accepting(Credentials::Guest);
    let storage = service(&fx, Arc::clone(&backend)).await;

    let first = storage.auto_mount_on_startup().await;
    let calls_after_first = backend.calls().len();
    let second = storage.auto_mount_on_startup().await;

    assert!(first.success && second.success);
    assert_eq!(first.path, second.path);
    assert_eq!(backend.calls().len(), calls_after_first);
}

#[tokio::test]
async fn detect_explains_an_unreachable_share() {
    let fx = fixture(false).await;
    let backend = Arc::new(FakeBackend {
        reachable: true,
        ..FakeBackend::default()
    });
    let storage = service(&fx, backend).await;

    let result = storage.detect_nas().await;

    assert_eq!(result.path, None);
    assert_eq!(result.host_reachable, Some(true));
    assert!(
        result
            .diagnostics
            .last()
            .unwrap()
            .contains("online but the share is not mounted")
    );
}

#[tokio::test]
async fn detect_finds_the_primary_path_without_pinging() {
    let fx = fixture(true).await;
    let storage = service(&fx, Arc::new(FakeBackend::default())).await;

    let result = storage.detect_nas().await;

    assert_eq!(result.path, Some(fx.nas.clone()));
    assert_eq!(result.host_reachable, None);
}

#[tokio::test]
async fn mount_nas_is_a_no_op_when_available() {
    let fx = fixture(true).await;
    let backend = Arc::new(FakeBackend::default());
    let storage = service(&fx, Arc::clone(&backend)).await;

    let report = storage.mount_nas().await;

    assert!(report.success);
    assert_eq!(report.path, Some(fx.nas.clone()));
    assert!(backend.native_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn mount_nas_hands_the_share_to_the_os() {
    let fx = fixture(false).await;
    let backend = Arc::new(FakeBackend {
        native_target: Some(fx.nas.clone()),
        ..FakeBackend::default()
    });
    let storage = service(&fx, Arc::clone(&backend)).await;

    let report = storage.mount_nas().await;

    assert!(report.success);
    assert_eq!(report.path, Some(fx.nas.clone()));
    let native = backend.native_calls.lock().unwrap().clone();
    assert_eq!(native.len(), 1);
    assert!(native[0].contains("StudioPhotos"));
}
