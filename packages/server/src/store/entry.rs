use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Whether an entity kind carries an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentRule {
    /// The kind never owns a file; supplying one is a validation error.
    Forbidden,
    /// Every live record references exactly one file.
    Required,
}

/// A record identified by a generated id and a unique, human-meaningful key.
pub trait UniqueKeyed {
    fn id(&self) -> Uuid;
    fn business_key(&self) -> &str;
    fn set_business_key(&mut self, key: String);
}

/// A record that may point at a file stored outside of it.
pub trait MayOwnAttachment {
    const ATTACHMENT: AttachmentRule = AttachmentRule::Forbidden;

    fn attachment(&self) -> Option<&str> {
        None
    }

    /// Only called for kinds whose rule is not [`AttachmentRule::Forbidden`].
    fn set_attachment(&mut self, _reference: String) {}
}

/// An entity kind managed by [`super::KeyedStore`].
pub trait Entry:
    UniqueKeyed + MayOwnAttachment + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Domain attributes supplied on creation.
    type Fields: Send;
    /// Partial update of the domain attributes.
    type FieldsPatch: Default + Send;

    /// Human-readable kind, used in error messages and logs.
    const KIND: &'static str;
    /// Name of the record array in the JSON document backend.
    const COLLECTION: &'static str;

    fn build(
        id: Uuid,
        key: String,
        fields: Self::Fields,
        attachment: Option<String>,
        now: DateTime<Utc>,
    ) -> Self;

    fn apply(&mut self, patch: Self::FieldsPatch);

    /// Refresh the modification timestamp.
    fn touch(&mut self, now: DateTime<Utc>);

    /// Presence checks on the domain attributes.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
