use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::availability::conflict::ConflictResult;
use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A booking rejected by the conflict check. Normal negative outcome,
    /// surfaced with the full decision payload.
    #[error("Booking conflict")]
    Conflict(ConflictResult),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(ref err) => match err {
                DatabaseError::NotFound => {
                    (StatusCode::NOT_FOUND, json!({ "error": "Resource not found" }))
                }
                DatabaseError::Duplicate => {
                    (StatusCode::CONFLICT, json!({ "error": "Resource already exists" }))
                }
                DatabaseError::InvalidInput(reason) => {
                    (StatusCode::BAD_REQUEST, json!({ "error": reason }))
                }
                // Store unreachable is not "no data"; tell the caller to retry.
                DatabaseError::Sqlx(_) | DatabaseError::Transaction(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "Store unavailable" }),
                ),
            },
            AppError::Validation(reason) => (StatusCode::BAD_REQUEST, json!({ "error": reason })),
            AppError::Conflict(result) => (
                StatusCode::CONFLICT,
                json!({ "error": "Booking conflict", "conflict": result }),
            ),
            AppError::BadRequest(reason) => (StatusCode::BAD_REQUEST, json!({ "error": reason })),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, "request failed");
        }

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
