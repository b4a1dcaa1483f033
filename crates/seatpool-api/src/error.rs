//! Maps domain errors and refusals to HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use seatpool_core::error::{AppError, ErrorKind};
use seatpool_core::types::SessionId;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error type returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// A domain or infrastructure error.
    App(AppError),
    /// Acquire was refused because every seat is taken.
    LicenseLimitReached {
        /// Configured capacity.
        capacity: u32,
        /// Live sessions at the time of refusal.
        active: u64,
    },
    /// The referenced session does not exist.
    SessionNotFound(SessionId),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::App(AppError::validation(rejection.body_text()))
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            Self::LicenseLimitReached { capacity, active } => (
                StatusCode::FORBIDDEN,
                "LICENSE_LIMIT_REACHED",
                "License limit reached".to_string(),
                Some(serde_json::json!({ "capacity": capacity, "active": active })),
            ),
            Self::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session {id} not found"),
                None,
            ),
            Self::App(err) => {
                let (status, code) = match err.kind {
                    ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    ErrorKind::StorageUnavailable => {
                        (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
                    }
                    ErrorKind::Configuration | ErrorKind::Serialization | ErrorKind::Internal => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                (status, code, err.message.clone(), None)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %message, code = error_code, "Request failed");
        }

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}
