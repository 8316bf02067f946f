//! # Prometheus Metrics
//!
//! HTTP request counters and latency recorded through the `metrics` facade.
//! Domain counters (`tryshare_transitions_total`) are emitted by the
//! registry itself. Whatever recorder `main` installs receives both; the
//! Prometheus one is rendered at `/metrics`.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

/// Middleware that records request count, error count and latency.
///
/// Labels use the matched route template so `/api/tricycles/1` and
/// `/api/tricycles/2` share a series. Mount with `route_layer` so the
/// template is known when this runs.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    let status = response.status();
    let labels = [
        ("method", method),
        ("path", path),
        ("status", status.as_u16().to_string()),
    ];
    metrics::counter!("tryshare_http_requests_total", &labels[..]).increment(1);
    metrics::histogram!("tryshare_http_request_duration_seconds", &labels[..2])
        .record(start.elapsed().as_secs_f64());
    if status.is_client_error() || status.is_server_error() {
        metrics::counter!("tryshare_http_errors_total", &labels[..]).increment(1);
    }

    response
}

/// GET /metrics: Prometheus text exposition.
pub async fn render(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
