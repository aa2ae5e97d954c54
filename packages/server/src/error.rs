use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kiosk_common::storage::StorageError;
use serde::Serialize;

use crate::store::StoreError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `CONFLICT`, `KEY_LOCKED`, `PAYLOAD_TOO_LARGE`, `INTERNAL_ERROR`.
    #[schema(example = "CONFLICT")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "RFID entry 'A123' already exists")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    /// The business key is outside the configured mutable set.
    KeyLocked(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::KeyLocked(msg) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "KEY_LOCKED",
                    message: msg,
                },
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "PAYLOAD_TOO_LARGE",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::Conflict { .. } => AppError::Conflict(err.to_string()),
            StoreError::Forbidden { .. } => {
                tracing::warn!("Rejected change to locked key: {err}");
                AppError::KeyLocked(err.to_string())
            }
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::Storage(detail) => AppError::Internal(detail),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SizeLimitExceeded { .. } => AppError::PayloadTooLarge(err.to_string()),
            StorageError::InvalidReference(_) => AppError::Validation(err.to_string()),
            StorageError::NotFound(_) => AppError::NotFound(err.to_string()),
            StorageError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}
