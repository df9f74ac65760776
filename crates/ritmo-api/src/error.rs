//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use ritmo_core::error::{AppError, ErrorKind};

/// Handler result type for the API layer.
pub type ApiResult<T> = Result<T, ApiError>;

/// Newtype over [`AppError`] carrying the HTTP rendering.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;

        let status = if err.kind.is_authentication() {
            StatusCode::UNAUTHORIZED
        } else {
            match err.kind {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                _ => {
                    tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        };

        // Internal details never leak through the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
