use sea_orm::DbErr;
use thiserror::Error;

/// Typed failures surfaced by [`super::KeyedStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found")]
    NotFound { kind: &'static str },

    #[error("{kind} '{key}' already exists")]
    Conflict { kind: &'static str, key: String },

    #[error("{kind} '{key}' cannot be modified")]
    Forbidden { kind: &'static str, key: String },

    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str) -> Self {
        Self::NotFound { kind }
    }

    pub fn conflict(kind: &'static str, key: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            key: key.into(),
        }
    }

    pub fn forbidden(kind: &'static str, key: impl Into<String>) -> Self {
        Self::Forbidden {
            kind,
            key: key.into(),
        }
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
