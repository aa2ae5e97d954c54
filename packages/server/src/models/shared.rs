use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// Envelope for list endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn from_records<R>(records: Vec<R>) -> Self
    where
        T: From<R>,
    {
        Self {
            data: records.into_iter().map(T::from).collect(),
        }
    }
}

/// Treat a blank optional text field as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a record id from a path segment. A malformed id cannot name any
/// record, so it is reported as not found.
pub fn parse_id(raw: &str, kind: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{kind} not found")))
}
