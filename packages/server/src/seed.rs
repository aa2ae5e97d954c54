use tracing::info;

use crate::config::LayoutConfig;
use crate::records::{Layout, LayoutFields};
use crate::store::{KeyedStore, StoreError};

/// Create the default screen layouts when no layout exists yet.
///
/// Returns the number of layouts created. A non-empty layout set is left
/// untouched, so running this on every startup is safe.
pub async fn seed_layouts(
    layouts: &KeyedStore<Layout>,
    config: &LayoutConfig,
) -> Result<usize, StoreError> {
    if !layouts.list_all().await?.is_empty() {
        return Ok(0);
    }

    let mut inserted = 0usize;
    for screen in &config.default_screens {
        let fields = LayoutFields {
            active_layout: config.default_layout.clone(),
        };
        match layouts.create(screen, fields, None).await {
            Ok(_) => inserted += 1,
            // Another instance got there first.
            Err(StoreError::Conflict { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} default layouts", inserted);
    }

    Ok(inserted)
}
