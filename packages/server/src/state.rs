use std::sync::Arc;

use anyhow::Context;
use kiosk_common::storage::AttachmentStore;
use kiosk_common::storage::filesystem::FilesystemAttachmentStore;
use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::database::init_db;
use crate::records::{Layout, RfidEntry, User};
use crate::store::{Entry, EntryBackend, JsonFileBackend, KeyAllowList, KeyedStore, SeaOrmBackend};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub rfid: Arc<KeyedStore<RfidEntry>>,
    pub layouts: Arc<KeyedStore<Layout>>,
    pub users: Arc<KeyedStore<User>>,
}

/// One backend per record kind, all on the same persistence.
struct Backends {
    rfid: Arc<dyn EntryBackend<RfidEntry>>,
    layouts: Arc<dyn EntryBackend<Layout>>,
    users: Arc<dyn EntryBackend<User>>,
}

impl AppState {
    /// Open persistence and the content directory, then wire the stores.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let attachments: Arc<dyn AttachmentStore> = Arc::new(
            FilesystemAttachmentStore::new(
                config.storage.upload_dir.clone(),
                &config.storage.public_prefix,
                config.storage.max_upload_size,
            )
            .await
            .with_context(|| {
                format!(
                    "Failed to open upload directory {}",
                    config.storage.upload_dir.display()
                )
            })?,
        );

        let backends = match config.database.backend {
            StoreBackend::Sql => {
                let db = init_db(&config.database.url)
                    .await
                    .context("Failed to connect to database")?;
                info!("Using SQL backend");
                Backends {
                    rfid: Arc::new(SeaOrmBackend::new(db.clone())),
                    layouts: Arc::new(SeaOrmBackend::new(db.clone())),
                    users: Arc::new(SeaOrmBackend::new(db)),
                }
            }
            StoreBackend::Json => {
                let dir = &config.database.data_dir;
                info!(data_dir = %dir.display(), "Using JSON document backend");
                Backends {
                    rfid: open_json(dir).await?,
                    layouts: open_json(dir).await?,
                    users: open_json(dir).await?,
                }
            }
        };

        let layout_policy = Arc::new(KeyAllowList::new(
            config.layout.mutable_screens.iter().cloned(),
        ));

        Ok(Self {
            rfid: Arc::new(KeyedStore::new(backends.rfid, attachments.clone())),
            layouts: Arc::new(
                KeyedStore::new(backends.layouts, attachments.clone()).with_policy(layout_policy),
            ),
            users: Arc::new(KeyedStore::new(backends.users, attachments.clone())),
            attachments,
            config: Arc::new(config),
        })
    }
}

async fn open_json<E: Entry>(dir: &std::path::Path) -> anyhow::Result<Arc<dyn EntryBackend<E>>> {
    let backend = JsonFileBackend::<E>::open(dir)
        .await
        .with_context(|| format!("Failed to open {} document", E::KIND))?;
    Ok(Arc::new(backend))
}
