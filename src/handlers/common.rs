use crate::{
    common::parse_i32,
    errors::{validation_message, ApiError},
    ApiResponse,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(body: ApiResponse<T>) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(body: ApiResponse<T>) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(validation_message(&e)))
}

/// Parses a numeric path or query identifier.
pub fn parse_id(raw: &str, name: &str) -> Result<i32, ApiError> {
    parse_i32(raw).map_err(|_| ApiError::BadRequest(format!("{} must be a number", name)))
}
