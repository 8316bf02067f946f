//! # tryshare-api: HTTP Adapter for the Tricycle Fleet
//!
//! Exposes the registry over JSON/HTTP. Handlers carry no booking rules;
//! they parse requests, call [`tryshare_registry::TricycleRegistry`] and
//! translate its errors.
//!
//! ## API Surface
//!
//! | Prefix              | Module                  |
//! |---------------------|-------------------------|
//! | `/api/tricycles*`   | [`routes::tricycles`]   |
//! | `/openapi.json`     | [`openapi`]             |
//! | `/metrics`          | [`middleware::metrics`] |
//! | `/health/*`         | probes in this module   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::tricycles::router())
        .merge(openapi::router())
        .route_layer(from_fn(middleware::metrics::metrics_middleware));

    let ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(middleware::metrics::render));

    Router::new()
        .merge(ops)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
