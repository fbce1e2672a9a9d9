use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use envmon_core::dashboard::{Dashboard, DashboardSettings};
use envmon_core::poller::DashboardView;
use envmon_core::store::{MemoryReadingStore, MemoryStateStore};
use envmon_server::{router, AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::watch;
use tower::ServiceExt;

fn app() -> Router {
    let dashboard = Dashboard::new(
        Arc::new(MemoryReadingStore::default()),
        Arc::new(MemoryStateStore::default()),
        DashboardSettings::default(),
    );
    let (_tx, rx) = watch::channel(DashboardView::Loading);
    router(AppState::new(dashboard, rx))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_post_then_list_readings() {
    let app = app();

    let payload = json!({
        "timestamp": "2025-03-01T10:00:00Z",
        "ppm_propano": 12.5,
        "temp_dht": 21.0,
        "hum": 55.0,
        "lluvia": true
    });
    let (status, body) = post(&app, "/api/readings", payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));

    let (status, body) = get(&app, "/api/readings").await;
    assert_eq!(status, StatusCode::OK);
    let readings = body.as_array().unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0]["ppm_propano"], json!(12.5));
    assert_eq!(readings[0]["lluvia"], json!(true));
}

#[tokio::test]
async fn test_list_is_newest_first_and_limited() {
    let app = app();
    for (hour, lux) in [(8, 100.0), (10, 300.0), (9, 200.0)] {
        let payload = json!({
            "timestamp": format!("2025-03-01T{:02}:00:00Z", hour),
            "lux": lux
        });
        let (status, _) = post(&app, "/api/readings", payload.to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = get(&app, "/api/readings?limit=2").await;
    let lux: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["lux"].as_f64().unwrap())
        .collect();
    assert_eq!(lux, vec![300.0, 200.0]);
}

#[tokio::test]
async fn test_post_rejects_out_of_range() {
    let app = app();
    let (status, body) = post(&app, "/api/readings", r#"{"hum": 140}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("hum"));

    let (_, body) = get(&app, "/api/readings").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_post_rejects_malformed_json() {
    let app = app();
    let (status, body) = post(&app, "/api/readings", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_post_accepts_all_malformed_fields() {
    let app = app();
    let payload = json!({
        "ppm_co": "err",
        "ppm_propano": "err",
        "hum": "nan",
        "temp_dht": "x",
        "lluvia": true
    });
    let (status, body) = post(&app, "/api/readings", payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));

    let (_, body) = get(&app, "/api/dashboard").await;
    assert_eq!(body["snapshot"]["rain_detected"], json!(true));
    assert_eq!(body["snapshot"]["temperature"], json!(0.0));
    assert_eq!(body["snapshot"]["air_quality"], json!(-1.0));
}

#[tokio::test]
async fn test_bad_query_string_is_json_error() {
    let app = app();
    let (status, body) = get(&app, "/api/readings?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("query string"));
}

#[tokio::test]
async fn test_dashboard_empty_then_populated() {
    let app = app();

    let (status, body) = get(&app, "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let payload = json!({
        "temp_bmp": 22.5,
        "pres": 101325.0,
        "ppm_co": 120.0,
        "lluvia": true
    });
    post(&app, "/api/readings", payload.to_string()).await;

    let (status, body) = get(&app, "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["temperature"], json!(22.5));
    assert_eq!(body["snapshot"]["pressure"], json!(1013.25));
    assert_eq!(body["snapshot"]["air_quality"], json!(60.0));
    assert_eq!(body["snapshot"]["rain_detected"], json!(true));
    assert_eq!(body["reading_count"], json!(1));
}

#[tokio::test]
async fn test_state_merge_update() {
    let app = app();

    let (status, body) = get(&app, "/api/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["open"], json!(false));
    let default_text = body["text"].clone();

    let (status, body) = post(&app, "/api/state", r#"{"open": true}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["open"], json!(true));
    assert_eq!(body["text"], default_text);

    let (_, body) = post(&app, "/api/state", r#"{"text": "Vent closed"}"#).await;
    assert_eq!(body["text"], json!("Vent closed"));
    assert_eq!(body["open"], json!(true));

    let (_, body) = get(&app, "/api/state").await;
    assert_eq!(body["text"], json!("Vent closed"));
}

#[tokio::test]
async fn test_view_reports_poller_status() {
    let app = app();
    let (status, body) = get(&app, "/api/dashboard/view").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "loading" }));
}

#[tokio::test]
async fn test_health() {
    let app = app();
    post(&app, "/api/readings", r#"{"lux": 10}"#).await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["readings"], json!(1));
    assert_eq!(body["version"], json!(envmon_core::VERSION));
}
