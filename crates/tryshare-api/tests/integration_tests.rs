//! # Integration Tests for tryshare-api
//!
//! Drives the assembled router with `oneshot` requests: health probes,
//! listing, lookup, booking lifecycle, danger signals, status mapping and
//! the OpenAPI document.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tryshare_api::state::{AppConfig, AppState};
use tryshare_core::{Rating, TricycleId};
use tryshare_registry::{InMemoryStore, RegistryConfig, TricycleRegistry, TricycleStore};
use tryshare_state::{Availability, Tricycle};

/// Fleet: 1 available (4.0), 2 booked (3.0), 3 available (2.5).
fn fleet() -> Vec<Tricycle> {
    let id = |n| TricycleId::new(n).unwrap();
    let r = |v| Rating::new(v).unwrap();
    vec![
        Tricycle::new(id(1), r(4.0)),
        Tricycle::from_parts(id(2), Availability::Booked, false, r(3.0)),
        Tricycle::new(id(3), r(2.5)),
    ]
}

fn test_app() -> axum::Router {
    let store: Arc<dyn TricycleStore> = Arc::new(InMemoryStore::with_fleet(fleet()).unwrap());
    let registry = TricycleRegistry::new(store, RegistryConfig::default());
    tryshare_api::app(AppState::with_registry(registry, AppConfig::default()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method("POST").uri(uri);
    match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn test_metrics_without_recorder_is_unavailable() {
    let response = test_app().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Listing & Lookup ---------------------------------------------------------

#[tokio::test]
async fn test_list_returns_only_available_sorted() {
    let response = test_app().oneshot(get("/api/tricycles")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(body[0]["availability"], "AVAILABLE");
}

#[tokio::test]
async fn test_get_by_id() {
    let response = test_app().oneshot(get("/api/tricycles/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["availability"], "BOOKED");
    assert_eq!(body["rating"], 3.0);
    assert_eq!(body["danger_zone"], false);
}

#[tokio::test]
async fn test_get_unknown_id_is_404() {
    let response = test_app().oneshot(get("/api/tricycles/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_non_positive_id_is_404() {
    let response = test_app().oneshot(get("/api/tricycles/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Booking Lifecycle --------------------------------------------------------

#[tokio::test]
async fn test_booking_lifecycle() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post(
            "/api/tricycles/1/requestBooking",
            Some(json!({"id": 1, "rating": 5.0})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(app.clone().oneshot(get("/api/tricycles/1")).await.unwrap()).await;
    assert_eq!(body["availability"], "BOOKED");
    assert_eq!(body["rating"], 4.5);
    assert_eq!(body["transitions"], 1);

    // No longer listed.
    let list = body_json(app.clone().oneshot(get("/api/tricycles")).await.unwrap()).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(post(
            "/api/tricycles/1/requestEndOfBooking",
            Some(json!({"id": 1, "rating": 3.5})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(app.oneshot(get("/api/tricycles/1")).await.unwrap()).await;
    assert_eq!(body["availability"], "AVAILABLE");
    assert_eq!(body["rating"], 4.0);
}

#[tokio::test]
async fn test_booking_a_booked_tricycle_is_409() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post(
            "/api/tricycles/2/requestBooking",
            Some(json!({"id": 2, "rating": 3.0})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "CONFLICT");

    let body = body_json(app.oneshot(get("/api/tricycles/2")).await.unwrap()).await;
    assert_eq!(body["rating"], 3.0);
}

#[tokio::test]
async fn test_ending_an_available_booking_is_409() {
    let response = test_app()
        .oneshot(post(
            "/api/tricycles/3/requestEndOfBooking",
            Some(json!({"id": 3, "rating": 3.0})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_unknown_id_is_404() {
    let response = test_app()
        .oneshot(post(
            "/api/tricycles/999/requestBooking",
            Some(json!({"id": 999, "rating": 3.0})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_id_mismatch_is_400() {
    let response = test_app()
        .oneshot(post(
            "/api/tricycles/1/requestBooking",
            Some(json!({"id": 3, "rating": 3.0})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("do not match"));
}

#[tokio::test]
async fn test_booking_out_of_range_rating_is_422() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post(
            "/api/tricycles/1/requestBooking",
            Some(json!({"id": 1, "rating": 9.0})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(app.oneshot(get("/api/tricycles/1")).await.unwrap()).await;
    assert_eq!(body["availability"], "AVAILABLE");
}

#[tokio::test]
async fn test_booking_malformed_body_is_400() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tricycles/1/requestBooking")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Danger Signals -----------------------------------------------------------

#[tokio::test]
async fn test_danger_signals_are_idempotent() {
    let app = test_app();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post("/api/tricycles/1/signalDanger", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let body = body_json(app.clone().oneshot(get("/api/tricycles/1")).await.unwrap()).await;
    assert_eq!(body["danger_zone"], true);
    assert_eq!(body["availability"], "AVAILABLE");
    assert_eq!(body["transitions"], 1);

    let response = app
        .clone()
        .oneshot(post("/api/tricycles/1/signalDangerEnd", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(app.oneshot(get("/api/tricycles/1")).await.unwrap()).await;
    assert_eq!(body["danger_zone"], false);
}

#[tokio::test]
async fn test_danger_signal_unknown_id_is_404() {
    let response = test_app()
        .oneshot(post("/api/tricycles/42/signalDangerEnd", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Concurrency --------------------------------------------------------------

#[tokio::test]
async fn test_concurrent_bookings_admit_one() {
    let app = test_app();
    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.oneshot(post(
                "/api/tricycles/3/requestBooking",
                Some(json!({"id": 3, "rating": 4.5})),
            ))
            .await
            .unwrap()
            .status()
        }));
    }
    let mut ok = 0;
    let mut conflict = 0;
    for h in handles {
        match h.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::CONFLICT => conflict += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(conflict, 7);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_document() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["info"]["title"], "TryShare Fleet API");
    assert!(body["paths"]["/api/tricycles/{id}/requestBooking"].is_object());
}
