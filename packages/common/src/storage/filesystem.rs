use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

use super::error::StorageError;
use super::traits::{AttachmentStore, BoxReader, StoredAttachment};

/// Longest extension carried over from an uploaded filename.
const MAX_EXTENSION_LEN: usize = 16;

/// Filesystem-backed attachment store.
///
/// Files live flat in `{base_path}/{uuid}{ext}` and are exposed to clients as
/// `{public_prefix}/{uuid}{ext}`. Writes go through the sibling staging
/// directory `{base_path}.tmp` and are renamed into place. Partial files never
/// appear under `base_path`.
pub struct FilesystemAttachmentStore {
    base_path: PathBuf,
    staging_path: PathBuf,
    public_prefix: String,
    max_size: u64,
}

impl FilesystemAttachmentStore {
    /// Create a new filesystem attachment store.
    pub async fn new(
        base_path: PathBuf,
        public_prefix: &str,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        let staging_path = staging_dir_for(&base_path);
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(&staging_path).await?;
        Ok(Self {
            base_path,
            staging_path,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            max_size,
        })
    }

    /// Map a public reference back to its on-disk path.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf, StorageError> {
        let file_name = reference
            .strip_prefix(&self.public_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| {
                StorageError::InvalidReference(format!(
                    "'{reference}' is outside {}",
                    self.public_prefix
                ))
            })?;

        validate_stored_name(file_name)?;
        Ok(self.base_path.join(file_name))
    }

    fn reference_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_prefix, file_name)
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.staging_path.join(Uuid::new_v4().to_string())
    }
}

/// Staging directory next to `base_path`, e.g. `data/uploads.tmp`.
pub fn staging_dir_for(base_path: &Path) -> PathBuf {
    let mut name = base_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("uploads"));
    name.push(".tmp");
    base_path.with_file_name(name)
}

/// Generate a storage-unique name that keeps the upload's extension.
fn generate_file_name(original_name: &str) -> String {
    format!("{}{}", Uuid::new_v4(), extension_of(original_name))
}

/// Extension of an uploaded filename including the dot, or empty.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Stored names are flat, visible, and free of separators or control bytes.
fn validate_stored_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name.chars().any(|c| c.is_ascii_control());
    if invalid {
        return Err(StorageError::InvalidReference(format!(
            "'{name}' is not a stored file name"
        )));
    }
    Ok(())
}

#[async_trait]
impl AttachmentStore for FilesystemAttachmentStore {
    async fn put_stream(
        &self,
        original_name: &str,
        mut reader: BoxReader,
    ) -> Result<StoredAttachment, StorageError> {
        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(temp_file);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            if let Err(e) = temp_file.write_all(&buf[..n]).await {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        }

        temp_file.flush().await?;
        temp_file.sync_all().await?;
        drop(temp_file);

        let file_name = generate_file_name(original_name);
        let final_path = self.base_path.join(&file_name);

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(file = %file_name, size = total_bytes, "Stored attachment");

        Ok(StoredAttachment {
            reference: self.reference_for(&file_name),
            file_name,
            size: total_bytes,
        })
    }

    async fn get_stream(&self, reference: &str) -> Result<BoxReader, StorageError> {
        let path = self.resolve(reference)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, reference: &str) -> Result<bool, StorageError> {
        let path = self.resolve(reference)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn remove(&self, reference: &str) -> Result<bool, StorageError> {
        let path = self.resolve(reference)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
