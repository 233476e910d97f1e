// ============================================================================
// Error Handling Middleware - HTTP error responses for the sync API
// ============================================================================
//
// Internal errors (database, configuration) are logged server-side with full
// detail and answered with a generic message. Payload problems are reported
// back to the caller since they are the caller's to fix.
//
// ============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::SyncError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Sync(SyncError::Configuration(ref msg)) => {
                tracing::error!("Configuration error during sync: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Sync service is misconfigured".to_string())
            }
            AppError::Sync(SyncError::Persistence(ref msg)) => {
                tracing::error!("Persistence error during sync: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Sync(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::JsonParsing(ref e) => {
                tracing::warn!("Rejected sync payload: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid sync payload".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
