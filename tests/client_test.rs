use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use hostscan::client::RemoteClient;
use hostscan::config::RemoteConfig;
use hostscan::scan::{MetricSource, ScanResult, ScanScope};
use hostscan::server::{router, AppState};
use hostscan::store::ResultStore;
use hostscan::Error;

struct CannedSource;

impl MetricSource for CannedSource {
    fn scan(&self, scope: ScanScope) -> ScanResult {
        let mut result = ScanResult::empty();
        for kind in scope.kinds() {
            result.payload.insert(kind.as_str().to_string(), json!({}));
        }
        result
    }
}

/// Serve a fresh store on an ephemeral port and point a client at it.
async fn spawn_service() -> (TempDir, ResultStore, RemoteClient) {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::open(dir.path()).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let app = router(AppState::new(store.clone(), CannedSource, port));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = RemoteClient::new(&RemoteConfig {
        host: "127.0.0.1".to_string(),
        port,
        timeout: Duration::from_secs(5),
    })
    .unwrap();

    (dir, store, client)
}

#[tokio::test]
async fn remote_scan_lifecycle() {
    let (dir, store, client) = spawn_service().await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");

    let created = client.scan("rack_7", "cpu").await.unwrap();
    assert_eq!(created.message, "scan completed");
    assert_eq!(store.resolve(&created.test_id).unwrap().name, "rack_7");

    let list = client.list(Some(10)).await.unwrap();
    assert_eq!(list.count, 1);
    assert_eq!(list.results[0].id, created.test_id);

    let record = client.get_result(&created.test_id[..8]).await.unwrap();
    assert_eq!(record.payload, json!({"cpu": {}}));

    let digest = client.summary(&created.test_id).await.unwrap();
    assert_eq!(digest.id, created.test_id);
    assert_eq!(digest.summary.cpu.cpu_percent, None);

    let output = dir.path().join("downloaded.out");
    client.save_result_locally(&created.test_id, &output).await.unwrap();
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(saved["test_id"], created.test_id.as_str());

    let stats = client.statistics().await.unwrap();
    assert_eq!(stats.total_results, 1);

    client.delete(&created.test_id).await.unwrap();
    assert_eq!(client.statistics().await.unwrap().total_results, 0);
}

#[tokio::test]
async fn remote_not_found_stays_not_found() {
    let (_dir, _store, client) = spawn_service().await;

    let err = client.get_result("nonexistent").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { ref identifier } if identifier == "nonexistent"));

    let err = client.delete("nonexistent").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn remote_validation_failure_is_reported() {
    let (_dir, _store, client) = spawn_service().await;

    let err = client.scan("device_scan", "toaster").await.unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m == "unknown info type: toaster"));
}

#[tokio::test]
async fn remote_catalog_matches_local() {
    let (_dir, _store, client) = spawn_service().await;

    let catalog = client.apis().await.unwrap();
    assert_eq!(catalog.apis, hostscan::scan::catalog());
}

#[tokio::test]
async fn ids_with_url_characters_reach_the_record_route() {
    let (_dir, store, client) = spawn_service().await;
    let saved = store.save(json!({}), "device_scan").unwrap();

    // still a not-found envelope from the record route, not an unmatched path
    for id in ["abc/def", "abc?def", "abc#def"] {
        let err = client.get_result(id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { ref identifier } if identifier == id), "{id}");
    }

    let by_prefix = client.get_result(&saved.id[..8]).await.unwrap();
    assert_eq!(by_prefix.id, saved.id);
}
