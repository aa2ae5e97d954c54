use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::records::RfidEntry;

#[derive(Serialize, utoipa::ToSchema)]
pub struct RfidResponse {
    pub id: Uuid,
    #[schema(example = "04A1B2C3")]
    pub rfid_code: String,
    /// Public URL of the stored video.
    #[schema(example = "/uploads/0199d3a4-6f1e-7c2a-9b1e-5f0c2d8e4a11.mp4")]
    pub video_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RfidEntry> for RfidResponse {
    fn from(m: RfidEntry) -> Self {
        Self {
            id: m.id,
            rfid_code: m.rfid_code,
            video_url: m.video_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Multipart form accepted by create and update (documentation only).
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct RfidUploadForm {
    /// Required on create, optional on update.
    pub rfid_code: Option<String>,
    /// Video file. Required on create, optional on update.
    #[schema(value_type = Option<String>, format = Binary)]
    pub video: Option<Vec<u8>>,
}
