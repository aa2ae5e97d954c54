use chrono::{DateTime, Utc};
use sea_orm::Set;
use uuid::Uuid;

use crate::entity::kezad_layout;
use crate::store::{Entry, MayOwnAttachment, TableEntry, UniqueKeyed};

/// Which layout a kiosk screen currently shows.
pub type Layout = kezad_layout::Model;

pub struct LayoutFields {
    pub active_layout: String,
}

#[derive(Default)]
pub struct LayoutPatch {
    pub active_layout: Option<String>,
}

impl UniqueKeyed for Layout {
    fn id(&self) -> Uuid {
        self.id
    }

    fn business_key(&self) -> &str {
        &self.screen_name
    }

    fn set_business_key(&mut self, key: String) {
        self.screen_name = key;
    }
}

impl MayOwnAttachment for Layout {}

impl Entry for Layout {
    type Fields = LayoutFields;
    type FieldsPatch = LayoutPatch;

    const KIND: &'static str = "Layout";
    const COLLECTION: &'static str = "kezadLayouts";

    fn build(
        id: Uuid,
        key: String,
        fields: LayoutFields,
        _attachment: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            screen_name: key,
            active_layout: fields.active_layout,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: LayoutPatch) {
        if let Some(active_layout) = patch.active_layout {
            self.active_layout = active_layout;
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), String> {
        super::require_text(&self.active_layout, "Active layout")
    }
}

impl TableEntry for Layout {
    type Table = kezad_layout::Entity;
    type Active = kezad_layout::ActiveModel;

    fn id_column() -> kezad_layout::Column {
        kezad_layout::Column::Id
    }

    fn key_column() -> kezad_layout::Column {
        kezad_layout::Column::ScreenName
    }

    fn created_column() -> kezad_layout::Column {
        kezad_layout::Column::CreatedAt
    }

    fn to_active(&self) -> kezad_layout::ActiveModel {
        kezad_layout::ActiveModel {
            id: Set(self.id),
            screen_name: Set(self.screen_name.clone()),
            active_layout: Set(self.active_layout.clone()),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
        }
    }
}
