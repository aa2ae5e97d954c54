use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::records::{Layout, LayoutFields, LayoutPatch};
use crate::store::Patch;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateLayoutRequest {
    #[schema(example = "WaveScreen")]
    pub screen_name: String,
    #[schema(example = "Default")]
    pub active_layout: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateLayoutRequest {
    pub screen_name: Option<String>,
    #[schema(example = "Carousel")]
    pub active_layout: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LayoutResponse {
    pub id: Uuid,
    pub screen_name: String,
    pub active_layout: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Layout> for LayoutResponse {
    fn from(m: Layout) -> Self {
        Self {
            id: m.id,
            screen_name: m.screen_name,
            active_layout: m.active_layout,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl CreateLayoutRequest {
    pub fn into_parts(self) -> (String, LayoutFields) {
        (
            self.screen_name,
            LayoutFields {
                active_layout: self.active_layout,
            },
        )
    }
}

impl From<UpdateLayoutRequest> for Patch<Layout> {
    fn from(req: UpdateLayoutRequest) -> Self {
        Patch {
            business_key: req.screen_name,
            fields: LayoutPatch {
                active_layout: req.active_layout,
            },
            attachment: None,
        }
    }
}
