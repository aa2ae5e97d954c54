use std::sync::Arc;

use chrono::Utc;
use kiosk_common::storage::AttachmentStore;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{AttachmentRule, Entry, EntryBackend, MutationPolicy, StoreError};

/// Changes requested by an update. Absent parts are left untouched.
pub struct Patch<E: Entry> {
    pub business_key: Option<String>,
    pub fields: E::FieldsPatch,
    /// Reference to a file the upload collaborator has already stored.
    pub attachment: Option<String>,
}

impl<E: Entry> Default for Patch<E> {
    fn default() -> Self {
        Self {
            business_key: None,
            fields: E::FieldsPatch::default(),
            attachment: None,
        }
    }
}

/// Entity store enforcing unique business keys and attachment lifecycle.
///
/// Every mutating sequence (check-then-insert, lookup-check-replace,
/// lookup-remove) runs under one writer lock, so concurrent creates on the
/// same key resolve to exactly one success and one [`StoreError::Conflict`].
/// Reads go straight to the backend.
pub struct KeyedStore<E: Entry> {
    backend: Arc<dyn EntryBackend<E>>,
    attachments: Arc<dyn AttachmentStore>,
    policy: Option<Arc<dyn MutationPolicy>>,
    writer: Mutex<()>,
}

impl<E: Entry> KeyedStore<E> {
    pub fn new(backend: Arc<dyn EntryBackend<E>>, attachments: Arc<dyn AttachmentStore>) -> Self {
        Self {
            backend,
            attachments,
            policy: None,
            writer: Mutex::new(()),
        }
    }

    /// Restrict update and delete to keys accepted by `policy`.
    pub fn with_policy(mut self, policy: Arc<dyn MutationPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    #[instrument(skip(self, fields, attachment), fields(kind = E::KIND))]
    pub async fn create(
        &self,
        business_key: &str,
        fields: E::Fields,
        attachment: Option<String>,
    ) -> Result<E, StoreError> {
        let key = normalize_key(business_key)?;
        check_attachment_rule::<E>(attachment.is_some(), true)?;

        let entry = E::build(Uuid::now_v7(), key, fields, attachment, Utc::now());
        entry.validate().map_err(StoreError::Validation)?;

        let _guard = self.writer.lock().await;

        if self
            .backend
            .find_by_key(entry.business_key())
            .await?
            .is_some()
        {
            return Err(StoreError::conflict(E::KIND, entry.business_key()));
        }

        let saved = self.backend.insert(entry).await?;
        info!(id = %saved.id(), key = saved.business_key(), "Created {}", E::KIND);
        Ok(saved)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<E, StoreError> {
        self.backend
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found(E::KIND))
    }

    pub async fn get_by_key(&self, business_key: &str) -> Result<E, StoreError> {
        self.backend
            .find_by_key(business_key)
            .await?
            .ok_or_else(|| StoreError::not_found(E::KIND))
    }

    /// All live records in insertion order.
    pub async fn list_all(&self) -> Result<Vec<E>, StoreError> {
        self.backend.list().await
    }

    #[instrument(skip(self, patch), fields(kind = E::KIND))]
    pub async fn update(&self, id: Uuid, patch: Patch<E>) -> Result<E, StoreError> {
        let _guard = self.writer.lock().await;
        let current = self.get_by_id(id).await?;
        self.apply_update(current, patch).await
    }

    /// Update addressed by business key.
    ///
    /// The mutation policy is consulted before the lookup, so a locked key is
    /// reported as forbidden whether or not a record holds it.
    #[instrument(skip(self, patch), fields(kind = E::KIND))]
    pub async fn update_by_key(&self, business_key: &str, patch: Patch<E>) -> Result<E, StoreError> {
        self.ensure_mutable(business_key)?;
        let _guard = self.writer.lock().await;
        let current = self.get_by_key(business_key).await?;
        self.apply_update(current, patch).await
    }

    #[instrument(skip(self), fields(kind = E::KIND))]
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        let current = self.get_by_id(id).await?;
        self.ensure_mutable(current.business_key())?;
        self.remove_entry(current).await
    }

    /// Delete addressed by business key; policy first, like [`Self::update_by_key`].
    #[instrument(skip(self), fields(kind = E::KIND))]
    pub async fn delete_by_key(&self, business_key: &str) -> Result<(), StoreError> {
        self.ensure_mutable(business_key)?;
        let _guard = self.writer.lock().await;
        let current = self.get_by_key(business_key).await?;
        self.remove_entry(current).await
    }

    /// Caller holds the writer lock.
    async fn apply_update(&self, current: E, patch: Patch<E>) -> Result<E, StoreError> {
        self.ensure_mutable(current.business_key())?;
        check_attachment_rule::<E>(patch.attachment.is_some(), false)?;

        let mut next = current.clone();

        if let Some(key) = patch.business_key {
            let key = normalize_key(&key)?;
            if key != current.business_key() {
                self.ensure_mutable(&key)?;
                if let Some(holder) = self.backend.find_by_key(&key).await?
                    && holder.id() != current.id()
                {
                    return Err(StoreError::conflict(E::KIND, key));
                }
                next.set_business_key(key);
            }
        }

        next.apply(patch.fields);

        let superseded = match patch.attachment {
            Some(reference) => {
                let old = current
                    .attachment()
                    .filter(|old| *old != reference)
                    .map(str::to_owned);
                next.set_attachment(reference);
                old
            }
            None => None,
        };

        next.touch(Utc::now());
        next.validate().map_err(StoreError::Validation)?;

        let saved = self.backend.replace(next).await?;
        info!(id = %saved.id(), key = saved.business_key(), "Updated {}", E::KIND);

        // Only after the record points at the new file.
        if let Some(old) = superseded {
            self.discard_attachment(&old).await;
        }

        Ok(saved)
    }

    /// Caller holds the writer lock.
    async fn remove_entry(&self, current: E) -> Result<(), StoreError> {
        let removed = self
            .backend
            .remove(current.id())
            .await?
            .ok_or_else(|| StoreError::not_found(E::KIND))?;
        info!(id = %removed.id(), key = removed.business_key(), "Deleted {}", E::KIND);

        if let Some(reference) = removed.attachment() {
            self.discard_attachment(reference).await;
        }
        Ok(())
    }

    fn ensure_mutable(&self, key: &str) -> Result<(), StoreError> {
        match &self.policy {
            Some(policy) if !policy.is_key_mutable(key) => Err(StoreError::forbidden(E::KIND, key)),
            _ => Ok(()),
        }
    }

    /// File removal never fails the record operation that triggered it.
    async fn discard_attachment(&self, reference: &str) {
        match self.attachments.remove(reference).await {
            Ok(true) => {}
            Ok(false) => warn!(reference, "Attachment was already gone"),
            Err(e) => warn!(reference, error = %e, "Failed to remove attachment"),
        }
    }
}

fn normalize_key(raw: &str) -> Result<String, StoreError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(StoreError::Validation("Business key must not be empty".into()));
    }
    Ok(key.to_string())
}

fn check_attachment_rule<E: Entry>(supplied: bool, creating: bool) -> Result<(), StoreError> {
    match E::ATTACHMENT {
        AttachmentRule::Forbidden if supplied => Err(StoreError::Validation(format!(
            "{} does not take an attachment",
            E::KIND
        ))),
        AttachmentRule::Required if creating && !supplied => Err(StoreError::Validation(format!(
            "{} requires an attachment",
            E::KIND
        ))),
        _ => Ok(()),
    }
}
