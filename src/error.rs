//! Error types for the METS resolver server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use mets_resolver::mets::MetsError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resolution timed out after {0}s")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Mets(#[from] MetsError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    retryable: bool,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, bool) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), false),
            AppError::Timeout(secs) => {
                tracing::warn!("Resolution timed out after {}s", secs);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "timeout",
                    self.to_string(),
                    true,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    false,
                )
            }
            AppError::Mets(e) => {
                let retryable = e.is_retryable();
                match e {
                    MetsError::NotFound { .. } => {
                        tracing::debug!("Not found: {}", e);
                        (StatusCode::NOT_FOUND, "not_found", e.to_string(), false)
                    }
                    MetsError::Network { .. } => {
                        tracing::error!("Upstream error: {}", e);
                        (StatusCode::BAD_GATEWAY, "network_error", e.to_string(), retryable)
                    }
                    MetsError::AmbiguousId { .. } => {
                        tracing::warn!("Document defect: {}", e);
                        (StatusCode::UNPROCESSABLE_ENTITY, "ambiguous_id", e.to_string(), false)
                    }
                    MetsError::MalformedDocument(_) => {
                        tracing::warn!("Document defect: {}", e);
                        (StatusCode::UNPROCESSABLE_ENTITY, "malformed_document", e.to_string(), false)
                    }
                    MetsError::UnsupportedLocationType { .. } => {
                        tracing::warn!("Document defect: {}", e);
                        (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            "unsupported_location_type",
                            e.to_string(),
                            false,
                        )
                    }
                    MetsError::Cycle { .. } => {
                        tracing::warn!("Document defect: {}", e);
                        (StatusCode::UNPROCESSABLE_ENTITY, "pointer_cycle", e.to_string(), false)
                    }
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message, retryable) = self.parts();

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            retryable,
        });

        (status, body).into_response()
    }
}
