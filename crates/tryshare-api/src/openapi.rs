//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TryShare Fleet API",
        version = "0.1.0",
        description = "Tricycle availability, booking and danger-zone signals.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::tricycles::list_available,
        crate::routes::tricycles::get_tricycle,
        crate::routes::tricycles::request_booking,
        crate::routes::tricycles::request_end_of_booking,
        crate::routes::tricycles::signal_danger,
        crate::routes::tricycles::signal_danger_end,
    ),
    components(schemas(
        crate::routes::tricycles::BookingRequest,
        crate::routes::tricycles::TricycleResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "tricycles", description = "Fleet availability and booking lifecycle")
    )
)]
pub struct ApiDoc;

/// Router serving the generated document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
