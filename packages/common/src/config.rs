use std::path::PathBuf;

use serde::Deserialize;

/// Where uploaded attachments are written and how they are exposed.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Content directory for uploaded files. Default: "./uploads".
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// URL prefix recorded in entity references and used for static serving. Default: "/uploads".
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Largest accepted upload in bytes. Default: 256 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}
fn default_public_prefix() -> String {
    "/uploads".into()
}
fn default_max_upload_size() -> u64 {
    256 * 1024 * 1024
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            public_prefix: default_public_prefix(),
            max_upload_size: default_max_upload_size(),
        }
    }
}
