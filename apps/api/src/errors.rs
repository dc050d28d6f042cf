use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resumes::extract::ExtractError;
use crate::resumes::parser::ParseError;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Upstream failures keep the upstream text in the response message so callers
/// can tell an extraction problem from a storage outage.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Extraction(#[from] ExtractError),

    #[error("Parsing failed: {0}")]
    Parsing(#[from] ParseError),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(ExtractError::UnsupportedEncoding(_)) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_)
            | AppError::Parsing(_)
            | AppError::UploadFailed(_)
            | AppError::Database(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::BadInput(_) => "BAD_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Extraction(ExtractError::UnsupportedEncoding(_)) => "UNSUPPORTED_ENCODING",
            AppError::Extraction(_) => "EXTRACTION_FAILED",
            AppError::Parsing(_) => "PARSING_FAILED",
            AppError::UploadFailed(_) => "UPLOAD_FAILED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => format!("Internal server error: {e:#}"),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(code = self.code(), "{message}");
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
