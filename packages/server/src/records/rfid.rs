use chrono::{DateTime, Utc};
use sea_orm::Set;
use uuid::Uuid;

use crate::entity::rfid_entry;
use crate::store::{AttachmentRule, Entry, MayOwnAttachment, TableEntry, UniqueKeyed};

/// An RFID code bound to the video played when it is scanned.
pub type RfidEntry = rfid_entry::Model;

impl UniqueKeyed for RfidEntry {
    fn id(&self) -> Uuid {
        self.id
    }

    fn business_key(&self) -> &str {
        &self.rfid_code
    }

    fn set_business_key(&mut self, key: String) {
        self.rfid_code = key;
    }
}

impl MayOwnAttachment for RfidEntry {
    const ATTACHMENT: AttachmentRule = AttachmentRule::Required;

    fn attachment(&self) -> Option<&str> {
        Some(&self.video_url)
    }

    fn set_attachment(&mut self, reference: String) {
        self.video_url = reference;
    }
}

impl Entry for RfidEntry {
    type Fields = ();
    type FieldsPatch = ();

    const KIND: &'static str = "RFID entry";
    const COLLECTION: &'static str = "rfidEntries";

    fn build(
        id: Uuid,
        key: String,
        _fields: (),
        attachment: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            rfid_code: key,
            video_url: attachment.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, _patch: ()) {}

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), String> {
        super::require_text(&self.video_url, "Video")
    }
}

impl TableEntry for RfidEntry {
    type Table = rfid_entry::Entity;
    type Active = rfid_entry::ActiveModel;

    fn id_column() -> rfid_entry::Column {
        rfid_entry::Column::Id
    }

    fn key_column() -> rfid_entry::Column {
        rfid_entry::Column::RfidCode
    }

    fn created_column() -> rfid_entry::Column {
        rfid_entry::Column::CreatedAt
    }

    fn to_active(&self) -> rfid_entry::ActiveModel {
        rfid_entry::ActiveModel {
            id: Set(self.id),
            rfid_code: Set(self.rfid_code.clone()),
            video_url: Set(self.video_url.clone()),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
        }
    }
}
