//! # Request Extraction & Validation
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_validated_json`], so malformed bodies become 400s and rule
//! violations become 422s with the same JSON error shape as every other
//! failure.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Request bodies that carry rules beyond what serde checks.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body, mapping deserialization failures to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Unwrap a JSON body and run its [`Validate`] rules.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
