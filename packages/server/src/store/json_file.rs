use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Entry, EntryBackend, StoreError};

/// Flat-file backend: one JSON document per entity kind.
///
/// The document at `{data_dir}/{COLLECTION}.json` has the shape
/// `{"<COLLECTION>": [record, ...]}` with records in insertion order. The
/// whole document is rewritten after every mutation through a temp file and a
/// rename, and the in-memory copy only changes once that write succeeded.
pub struct JsonFileBackend<E> {
    path: PathBuf,
    entries: RwLock<Vec<E>>,
}

impl<E: Entry> JsonFileBackend<E> {
    /// Open (or start) the document for `E` inside `data_dir`.
    ///
    /// A missing or blank file is an empty collection; anything unparsable is
    /// reported instead of being silently replaced.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).await?;
        let path = data_dir.join(format!("{}.json", E::COLLECTION));

        let entries = match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => parse_document::<E>(&bytes).map_err(|e| {
                StoreError::Storage(format!("corrupt document {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            kind = E::KIND,
            path = %path.display(),
            count = entries.len(),
            "Opened JSON document"
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &[E]) -> Result<(), StoreError> {
        let mut doc = Map::new();
        doc.insert(E::COLLECTION.to_string(), serde_json::to_value(entries)?);
        let bytes = serde_json::to_vec_pretty(&Value::Object(doc))?;

        let temp_path = self
            .path
            .with_file_name(format!(".{}.{}.tmp", E::COLLECTION, Uuid::new_v4()));

        if let Err(e) = fs::write(&temp_path, &bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

fn parse_document<E: Entry>(bytes: &[u8]) -> Result<Vec<E>, serde_json::Error> {
    let mut doc: Map<String, Value> = serde_json::from_slice(bytes)?;
    match doc.remove(E::COLLECTION) {
        Some(records) => serde_json::from_value(records),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl<E: Entry> EntryBackend<E> for JsonFileBackend<E> {
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id() == id).cloned())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<E>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.business_key() == key).cloned())
    }

    async fn insert(&self, entry: E) -> Result<E, StoreError> {
        let mut entries = self.entries.write().await;

        if entries.iter().any(|e| e.business_key() == entry.business_key()) {
            return Err(StoreError::conflict(E::KIND, entry.business_key()));
        }
        if entries.iter().any(|e| e.id() == entry.id()) {
            return Err(StoreError::Storage(format!(
                "{} id {} is already taken",
                E::KIND,
                entry.id()
            )));
        }

        let mut next = entries.clone();
        next.push(entry.clone());
        self.persist(&next).await?;
        *entries = next;

        Ok(entry)
    }

    async fn replace(&self, entry: E) -> Result<E, StoreError> {
        let mut entries = self.entries.write().await;

        let index = entries
            .iter()
            .position(|e| e.id() == entry.id())
            .ok_or_else(|| StoreError::not_found(E::KIND))?;
        if entries
            .iter()
            .any(|e| e.id() != entry.id() && e.business_key() == entry.business_key())
        {
            return Err(StoreError::conflict(E::KIND, entry.business_key()));
        }

        let mut next = entries.clone();
        next[index] = entry.clone();
        self.persist(&next).await?;
        *entries = next;

        Ok(entry)
    }

    async fn remove(&self, id: Uuid) -> Result<Option<E>, StoreError> {
        let mut entries = self.entries.write().await;

        let Some(index) = entries.iter().position(|e| e.id() == id) else {
            return Ok(None);
        };

        let mut next = entries.clone();
        let removed = next.remove(index);
        self.persist(&next).await?;
        *entries = next;

        Ok(Some(removed))
    }
}
