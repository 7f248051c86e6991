//! Tests for the scan service routes.
//!
//! Drives the router in-process against a temp results directory and a
//! canned metric source.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use hostscan::scan::{MetricSource, ScanResult, ScanScope};
use hostscan::server::{router, AppState};
use hostscan::store::ResultStore;

/// Returns one small section per requested kind.
struct CannedSource;

impl MetricSource for CannedSource {
    fn scan(&self, scope: ScanScope) -> ScanResult {
        let mut result = ScanResult::empty();
        for kind in scope.kinds() {
            result
                .payload
                .insert(kind.as_str().to_string(), json!({"canned": true}));
        }
        result
    }
}

fn app() -> (TempDir, ResultStore, Router) {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::open(dir.path()).unwrap();
    let state = AppState::new(store.clone(), CannedSource, 3388);
    (dir, store, router(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Body::empty()).await
}

#[tokio::test]
async fn scan_with_empty_body_runs_full_scan() {
    let (_dir, store, app) = app();

    let (status, body) = send(&app, Method::POST, "/api/scan", Body::empty()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "scan completed");

    let id = body["test_id"].as_str().unwrap();
    let record = store.resolve(id).unwrap();
    assert_eq!(record.name, "device_scan");
    assert_eq!(record.storage_key, body["filename"].as_str().unwrap());
    assert_eq!(record.payload.as_object().unwrap().len(), 8);
}

#[tokio::test]
async fn scan_honors_name_and_type() {
    let (_dir, store, app) = app();

    let request = json!({"test_name": "rack_7", "scan_type": "memory"}).to_string();
    let (status, body) = send(&app, Method::POST, "/api/scan", Body::from(request)).await;

    assert_eq!(status, StatusCode::OK);
    let record = store.resolve(body["test_id"].as_str().unwrap()).unwrap();
    assert_eq!(record.name, "rack_7");
    assert_eq!(record.payload, json!({"memory": {"canned": true}}));
}

#[tokio::test]
async fn unknown_scan_type_is_rejected() {
    let (_dir, store, app) = app();

    let request = json!({"scan_type": "toaster"}).to_string();
    let (status, body) = send(&app, Method::POST, "/api/scan", Body::from(request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "validation_failure");
    assert_eq!(body["message"], "unknown info type: toaster");
    assert_eq!(store.stats().unwrap().count, 0);
}

#[tokio::test]
async fn name_with_path_separator_is_rejected() {
    let (_dir, _store, app) = app();

    let request = json!({"test_name": "../escape"}).to_string();
    let (status, body) = send(&app, Method::POST, "/api/scan", Body::from(request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn record_is_served_by_prefix() {
    let (_dir, store, app) = app();
    let saved = store.save(json!({"cpu": {"cpu_percent": 7.5}}), "device_scan").unwrap();

    let (status, body) = get(&app, &format!("/api/scan/{}", &saved.id[..8])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["test_id"], saved.id.as_str());
    assert_eq!(body["scan_data"]["cpu"]["cpu_percent"], 7.5);
}

#[tokio::test]
async fn missing_record_is_404_with_envelope() {
    let (_dir, _store, app) = app();

    let (status, body) = get(&app, "/api/scan/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "not_found");
    assert_eq!(body["message"], "result not found: nonexistent");
}

#[tokio::test]
async fn results_listing_respects_limit() {
    let (_dir, store, app) = app();
    for name in ["a", "b", "c"] {
        store.save(json!({}), name).unwrap();
    }

    let (status, body) = get(&app, "/api/results?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["test_name"], "c");

    let (_, body) = get(&app, "/api/results").await;
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn summary_reports_missing_fields_as_null() {
    let (_dir, store, app) = app();
    let saved = store.save(json!({"cpu": {"percent": 12.5}}), "device_scan").unwrap();

    let (status, body) = get(&app, &format!("/api/results/summary/{}", saved.id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["test_id"], saved.id.as_str());
    assert!(body["summary"]["cpu"]["cpu_percent"].is_null());

    let (status, _) = get(&app, "/api/results/summary/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_not_found() {
    let (_dir, store, app) = app();
    let saved = store.save(json!({}), "device_scan").unwrap();
    let uri = format!("/api/results/{}", saved.id);

    let (status, body) = send(&app, Method::DELETE, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(store.stats().unwrap().count, 0);

    let (status, body) = send(&app, Method::DELETE, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn statistics_count_stored_results() {
    let (dir, store, app) = app();
    store.save(json!({}), "device_scan").unwrap();
    store.save(json!({}), "device_scan").unwrap();

    let (status, body) = get(&app, "/api/statistics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 2);
    assert!(body["total_size_mb"].as_f64().unwrap() >= 0.0);
    let canonical = std::fs::canonicalize(dir.path()).unwrap();
    assert_eq!(body["results_directory"], canonical.display().to_string());
}

#[tokio::test]
async fn health_reports_port() {
    let (_dir, _store, app) = app();

    let (status, body) = get(&app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["port"], 3388);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn download_is_an_attachment_named_after_the_file() {
    let (_dir, store, app) = app();
    let saved = store.save(json!({"gpu": {"gpus": []}}), "device_scan").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/download/{}", &saved.id[..8]))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert_eq!(
        disposition,
        format!("attachment; filename=\"{}\"", saved.storage_key)
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["test_id"], saved.id.as_str());
}

#[tokio::test]
async fn api_catalog_is_served() {
    let (_dir, _store, app) = app();

    let (status, body) = get(&app, "/api/apis").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["apis"]["get_memory_info"]["category"], "Memory");
    assert_eq!(body["apis"].as_object().unwrap().len(), 9);
}

#[tokio::test]
async fn index_page_is_html() {
    let (_dir, _store, app) = app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("hostscan"));
}

#[tokio::test]
async fn unparsable_limit_still_answers_json() {
    let (_dir, store, app) = app();
    for name in ["a", "b", "c"] {
        store.save(json!({}), name).unwrap();
    }

    for uri in ["/api/results?limit=abc", "/api/results?limit=", "/api/results?limit=-1"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["status"], "success", "{uri}");
        assert_eq!(body["count"], 3, "{uri}");
    }
}

#[tokio::test]
async fn overlong_name_is_a_validation_failure() {
    let (_dir, store, app) = app();

    let request = json!({"test_name": "n".repeat(300)}).to_string();
    let (status, body) = send(&app, Method::POST, "/api/scan", Body::from(request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_failure");
    assert_eq!(store.stats().unwrap().count, 0);
}

async fn get_html(app: &Router, uri: &str) -> (StatusCode, String, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn result_page_renders_record() {
    let (_dir, store, app) = app();
    let saved = store.save(json!({"memory": {"total_gb": 16.0}}), "rack_7").unwrap();

    let (status, content_type, html) = get_html(&app, &format!("/results/{}", &saved.id[..8])).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(html.contains("<h1>rack_7</h1>"));
    assert!(html.contains(&saved.id));
    assert!(html.contains("<h2>memory</h2>"));
}

#[tokio::test]
async fn result_page_for_unknown_id_is_404_html() {
    let (_dir, _store, app) = app();

    let (status, content_type, html) = get_html(&app, "/results/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(content_type.starts_with("text/html"));
    assert!(html.contains("result not found: nonexistent"));
}
