//! Uniqueness-checked, file-associated entity store.
//!
//! [`KeyedStore`] owns the business rules (unique business keys, attachment
//! lifecycle, mutation policy) and delegates persistence to an
//! [`EntryBackend`]: either a JSON document on disk or a SQL table.

mod entry;
mod error;
mod json_file;
mod keyed;
mod policy;
mod table;

pub use entry::{AttachmentRule, Entry, MayOwnAttachment, UniqueKeyed};
pub use error::StoreError;
pub use json_file::JsonFileBackend;
pub use keyed::{KeyedStore, Patch};
pub use policy::{KeyAllowList, MutationPolicy};
pub use table::{SeaOrmBackend, TableEntry};

use async_trait::async_trait;
use uuid::Uuid;

/// Persistence for one entity kind.
///
/// Backends reject duplicate business keys on their own as well, so the
/// uniqueness invariant survives callers that bypass [`KeyedStore`].
#[async_trait]
pub trait EntryBackend<E: Entry>: Send + Sync {
    /// All live entries in insertion order.
    async fn list(&self) -> Result<Vec<E>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>, StoreError>;

    /// Exact, case-sensitive key lookup.
    async fn find_by_key(&self, key: &str) -> Result<Option<E>, StoreError>;

    async fn insert(&self, entry: E) -> Result<E, StoreError>;

    /// Overwrite the entry with the same id.
    async fn replace(&self, entry: E) -> Result<E, StoreError>;

    /// Remove by id, returning the removed entry if it existed.
    async fn remove(&self, id: Uuid) -> Result<Option<E>, StoreError>;
}
