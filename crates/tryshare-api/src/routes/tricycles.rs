//! # Tricycle Routes
//!
//! Listing, lookup, booking and danger-zone signals for the fleet.
//!
//! | Method | Path                                     | Registry operation        |
//! |--------|------------------------------------------|---------------------------|
//! | GET    | `/api/tricycles`                         | `get_available`           |
//! | GET    | `/api/tricycles/{id}`                    | `get_by_id`               |
//! | POST   | `/api/tricycles/{id}/requestBooking`     | `request_booking`         |
//! | POST   | `/api/tricycles/{id}/requestEndOfBooking`| `request_end_of_booking`  |
//! | POST   | `/api/tricycles/{id}/signalDanger`       | `signal_danger_enter`     |
//! | POST   | `/api/tricycles/{id}/signalDangerEnd`    | `signal_danger_exit`      |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tryshare_core::{Rating, TricycleId};
use tryshare_state::{Availability, Tricycle};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Body of a booking or end-of-booking request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingRequest {
    /// Must repeat the tricycle id from the path.
    pub id: i64,
    /// Feedback score in `[0, 5]`.
    pub rating: f64,
}

impl Validate for BookingRequest {
    fn validate(&self) -> Result<(), String> {
        Rating::new(self.rating)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Tricycle as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TricycleResponse {
    pub id: i64,
    #[schema(value_type = String, example = "AVAILABLE")]
    pub availability: Availability,
    pub danger_zone: bool,
    pub rating: f64,
    /// Number of transitions applied since the tricycle was provisioned.
    pub transitions: u64,
}

impl From<&Tricycle> for TricycleResponse {
    fn from(t: &Tricycle) -> Self {
        Self {
            id: t.id().get(),
            availability: t.availability(),
            danger_zone: t.danger_zone(),
            rating: t.rating().value(),
            transitions: t.transition_count(),
        }
    }
}

/// Build the tricycles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tricycles", get(list_available))
        .route("/api/tricycles/{id}", get(get_tricycle))
        .route("/api/tricycles/{id}/requestBooking", post(request_booking))
        .route(
            "/api/tricycles/{id}/requestEndOfBooking",
            post(request_end_of_booking),
        )
        .route("/api/tricycles/{id}/signalDanger", post(signal_danger))
        .route("/api/tricycles/{id}/signalDangerEnd", post(signal_danger_end))
}

/// Ids that can never exist are reported the same way as unknown ones.
fn parse_id(raw: i64) -> Result<TricycleId, AppError> {
    TricycleId::new(raw).map_err(|_| AppError::NotFound(format!("tricycle:{raw} not found")))
}

/// Parse the body and check it names the same tricycle as the path.
fn booking_body(
    id: TricycleId,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<BookingRequest, AppError> {
    let req = extract_validated_json(body)?;
    if req.id != id.get() {
        return Err(AppError::BadRequest(
            "The tricycle ID in the URL and in the body do not match".to_string(),
        ));
    }
    Ok(req)
}

/// GET /api/tricycles: List tricycles that can be booked right now.
#[utoipa::path(
    get,
    path = "/api/tricycles",
    responses(
        (status = 200, description = "Available tricycles", body = Vec<TricycleResponse>),
    ),
    tag = "tricycles"
)]
async fn list_available(
    State(state): State<AppState>,
) -> Result<Json<Vec<TricycleResponse>>, AppError> {
    let fleet = state.registry.get_available().await?;
    Ok(Json(fleet.iter().map(TricycleResponse::from).collect()))
}

/// GET /api/tricycles/{id}: Fetch one tricycle.
#[utoipa::path(
    get,
    path = "/api/tricycles/{id}",
    params(("id" = i64, Path, description = "Tricycle ID")),
    responses(
        (status = 200, description = "Tricycle found", body = TricycleResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "tricycles"
)]
async fn get_tricycle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TricycleResponse>, AppError> {
    let tricycle = state.registry.get_by_id(parse_id(id)?).await?;
    Ok(Json(TricycleResponse::from(&tricycle)))
}

/// POST /api/tricycles/{id}/requestBooking: Book an available tricycle.
#[utoipa::path(
    post,
    path = "/api/tricycles/{id}/requestBooking",
    params(("id" = i64, Path, description = "Tricycle ID")),
    request_body = BookingRequest,
    responses(
        (status = 200, description = "Tricycle booked"),
        (status = 400, description = "Path and body ids differ", body = crate::error::ErrorBody),
        (status = 404, description = "Tricycle not found", body = crate::error::ErrorBody),
        (status = 409, description = "Tricycle already booked", body = crate::error::ErrorBody),
        (status = 422, description = "Rating out of range", body = crate::error::ErrorBody),
    ),
    tag = "tricycles"
)]
async fn request_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(), AppError> {
    let id = parse_id(id)?;
    let req = booking_body(id, body)?;
    state.registry.request_booking(id, req.rating).await?;
    Ok(())
}

/// POST /api/tricycles/{id}/requestEndOfBooking: Return a booked tricycle.
#[utoipa::path(
    post,
    path = "/api/tricycles/{id}/requestEndOfBooking",
    params(("id" = i64, Path, description = "Tricycle ID")),
    request_body = BookingRequest,
    responses(
        (status = 200, description = "Booking ended"),
        (status = 400, description = "Path and body ids differ", body = crate::error::ErrorBody),
        (status = 404, description = "Tricycle not found", body = crate::error::ErrorBody),
        (status = 409, description = "Tricycle not booked", body = crate::error::ErrorBody),
        (status = 422, description = "Rating out of range", body = crate::error::ErrorBody),
    ),
    tag = "tricycles"
)]
async fn request_end_of_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(), AppError> {
    let id = parse_id(id)?;
    let req = booking_body(id, body)?;
    state.registry.request_end_of_booking(id, req.rating).await?;
    Ok(())
}

/// POST /api/tricycles/{id}/signalDanger: Tricycle entered a danger zone.
#[utoipa::path(
    post,
    path = "/api/tricycles/{id}/signalDanger",
    params(("id" = i64, Path, description = "Tricycle ID")),
    responses(
        (status = 200, description = "Danger flag set"),
        (status = 404, description = "Tricycle not found", body = crate::error::ErrorBody),
    ),
    tag = "tricycles"
)]
async fn signal_danger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    state.registry.signal_danger_enter(parse_id(id)?).await?;
    Ok(())
}

/// POST /api/tricycles/{id}/signalDangerEnd: Tricycle left the danger zone.
#[utoipa::path(
    post,
    path = "/api/tricycles/{id}/signalDangerEnd",
    params(("id" = i64, Path, description = "Tricycle ID")),
    responses(
        (status = 200, description = "Danger flag cleared"),
        (status = 404, description = "Tricycle not found", body = crate::error::ErrorBody),
    ),
    tag = "tricycles"
)]
async fn signal_danger_end(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    state.registry.signal_danger_exit(parse_id(id)?).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_request_rejects_out_of_range_rating() {
        let req = BookingRequest { id: 1, rating: 7.5 };
        assert!(req.validate().is_err());
        let req = BookingRequest { id: 1, rating: 5.0 };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn mismatched_ids_are_bad_requests() {
        let id = TricycleId::new(1).unwrap();
        let body = Ok(Json(BookingRequest { id: 2, rating: 3.0 }));
        let err = booking_body(id, body).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn non_positive_path_ids_are_not_found() {
        assert!(matches!(parse_id(0), Err(AppError::NotFound(_))));
        assert!(matches!(parse_id(-3), Err(AppError::NotFound(_))));
        assert_eq!(parse_id(4).unwrap().get(), 4);
    }

    #[test]
    fn response_reflects_tricycle() {
        let t = Tricycle::new(TricycleId::new(9).unwrap(), Rating::new(3.25).unwrap());
        let resp = TricycleResponse::from(&t);
        assert_eq!(resp.id, 9);
        assert_eq!(resp.availability, Availability::Available);
        assert!(!resp.danger_zone);
        assert_eq!(resp.rating, 3.25);
        assert_eq!(resp.transitions, 0);
    }
}
