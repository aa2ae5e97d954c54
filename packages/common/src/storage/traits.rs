use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// A file that has been durably written to the content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    /// Public reference recorded by the owning entity (e.g. `/uploads/<file>`).
    pub reference: String,
    /// Generated on-disk name, `<uuid><original extension>`.
    pub file_name: String,
    pub size: u64,
}

/// Storage for uploaded binaries that entities point at by reference.
///
/// Implementations generate the stored name themselves; callers only ever
/// see the returned reference string.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store bytes under a freshly generated name.
    async fn put(&self, original_name: &str, data: &[u8]) -> Result<StoredAttachment, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(original_name, reader).await
    }

    /// Store data from an async reader under a freshly generated name.
    ///
    /// The extension of `original_name` is kept when it looks like a real
    /// extension.
    async fn put_stream(
        &self,
        original_name: &str,
        reader: BoxReader,
    ) -> Result<StoredAttachment, StorageError>;

    /// Retrieve all bytes of an attachment.
    async fn get(&self, reference: &str) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(reference).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve an attachment as a streaming async reader.
    async fn get_stream(&self, reference: &str) -> Result<BoxReader, StorageError>;

    /// Check whether the referenced attachment exists.
    async fn exists(&self, reference: &str) -> Result<bool, StorageError>;

    /// Remove an attachment.
    ///
    /// Returns `true` if it was removed, `false` if it was already gone.
    async fn remove(&self, reference: &str) -> Result<bool, StorageError>;
}
