//! Error types for the HTTP API.

use std::collections::BTreeMap;

use ask_ai::AskAiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;

/// Field name to list of user-facing messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Errors surfaced by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request input failed shape/length constraints.
    #[error("Validation error")]
    Validation(FieldErrors),

    /// Missing or unknown bearer token.
    #[error("Unauthenticated")]
    Unauthorized,

    /// Login or password check failed.
    #[error("{0}")]
    InvalidCredentials(String),

    /// Request understood but not actionable.
    #[error("{0}")]
    BadRequest(String),

    /// Database error.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// External AI dependency failed.
    #[error(transparent)]
    AskAi(#[from] AskAiError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Single-field validation error.
    pub fn validation(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.to_string()]);
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let body = serde_json::json!({
                    "success": false,
                    "message": "Validation error",
                    "errors": errors,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            ApiError::Unauthorized => {
                let body = serde_json::json!({ "message": "Unauthenticated." });
                (StatusCode::UNAUTHORIZED, Json(body)).into_response()
            }
            ApiError::InvalidCredentials(message) => {
                let body = serde_json::json!({ "success": false, "message": message });
                (StatusCode::UNAUTHORIZED, Json(body)).into_response()
            }
            ApiError::BadRequest(message) => {
                let body = serde_json::json!({ "success": false, "message": message });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Database(DatabaseError::NotFound { .. }) => {
                let body = serde_json::json!({
                    "success": false,
                    "message": "Data tidak ditemukan",
                });
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                let body = serde_json::json!({
                    "success": false,
                    "message": "Internal server error",
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ApiError::AskAi(err) => {
                tracing::error!("AI webhook error: {}", err);
                let (message, detail) = match &err {
                    AskAiError::WebhookUnavailable(status) => {
                        ("Gagal menghubungi AI service", format!("HTTP {status}"))
                    }
                    AskAiError::WebhookUnreachable(msg) => {
                        ("Terjadi kesalahan saat menghubungi AI", msg.clone())
                    }
                };
                let body = serde_json::json!({
                    "success": false,
                    "message": message,
                    "error": detail,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                let body = serde_json::json!({
                    "success": false,
                    "message": "Internal server error",
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
