use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::storage::StorageError;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error envelope returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable error description
    pub message: String,
    /// Stable machine-readable error code
    pub code: String,
    /// Underlying error text, present for server-side failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(validation_message(&err))
    }
}

/// The message of the first failing field, in field-name order.
pub fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| format!("Validation failed: {}", errors))
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseError(_) | Self::StorageError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable error code clients can match on instead of free text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "database_error",
            Self::StorageError(_) => "storage_error",
            Self::NotFound(_) => "not_found",
            Self::ValidationError(_) => "validation_error",
            Self::InternalError(_) => "internal_error",
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Client errors carry their own message; server errors get a generic one.
    pub fn response_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::ValidationError(msg) => msg.clone(),
            Self::DatabaseError(_) | Self::StorageError(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        ApiError::ServiceError(self).into_response()
    }
}

/// API Error type for HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    /// A service failure annotated with the operation that failed.
    #[error("{message}: {source}")]
    Operation {
        message: &'static str,
        source: ServiceError,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn operation(message: &'static str, source: ServiceError) -> Self {
        Self::Operation { message, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ServiceError(e) | ApiError::Operation { source: e, .. } => e.status_code(),
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn into_error_response(self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        let (message, code, detail) = match self {
            ApiError::ServiceError(e) => {
                let detail = e.is_server_error().then(|| e.to_string());
                (e.response_message(), e.code(), detail)
            }
            ApiError::Operation { message, source } => {
                if source.is_server_error() {
                    (message.to_string(), source.code(), Some(source.to_string()))
                } else {
                    (source.response_message(), source.code(), None)
                }
            }
            ApiError::ValidationError(msg) | ApiError::BadRequest(msg) => {
                (msg, "validation_error", None)
            }
            ApiError::NotFound(msg) => (msg, "not_found", None),
        };

        if let Some(detail) = &detail {
            error!(code, error = %detail, "{}", message);
        }

        (
            status,
            ErrorResponse {
                success: false,
                message,
                code: code.to_string(),
                error: detail,
                request_id: current_request_id(),
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_error_response();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    async fn body_of(response: Response) -> ErrorResponse {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::NotFound("Invoice not found".into()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let payload = body_of(response).await;
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert_eq!(payload.message, "Invoice not found");
        assert_eq!(payload.code, "not_found");
        assert!(payload.error.is_none());
        assert!(!payload.success);
    }

    #[tokio::test]
    async fn operation_error_passes_underlying_text_through_on_500() {
        let err = ApiError::operation(
            "Failed to create invoice",
            ServiceError::DatabaseError(DbErr::Custom("disk full".into())),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let payload = body_of(response).await;
        assert_eq!(payload.message, "Failed to create invoice");
        assert_eq!(payload.code, "database_error");
        assert!(payload.error.unwrap().contains("disk full"));
    }

    #[tokio::test]
    async fn operation_error_keeps_client_message_on_400() {
        let err = ApiError::operation(
            "Failed to create invoice",
            ServiceError::ValidationError("Missing required fields".into()),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let payload = body_of(response).await;
        assert_eq!(payload.message, "Missing required fields");
        assert_eq!(payload.code, "validation_error");
        assert!(payload.error.is_none());
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::StorageError(StorageError::Rejected("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::InternalError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn service_error_response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("secret".into())).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::NotFound("Vendor not found".into()).response_message(),
            "Vendor not found"
        );
    }
}
