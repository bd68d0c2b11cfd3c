//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use designmart_core::validation::AssetValidator;
use designmart_core::Config;
use designmart_db::DesignStore;
use designmart_storage::{DeliveryResolver, DesignVault};

use crate::services::IngestService;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DesignStore>,
    pub vault: DesignVault,
    pub resolver: DeliveryResolver,
    pub ingest: IngestService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DesignStore>, vault: DesignVault) -> Self {
        let resolver = DeliveryResolver::new(&config.asset_root);
        let validator =
            AssetValidator::new(config.preview_max_file_size, config.raw_max_file_size);
        let ingest = IngestService::new(
            store.clone(),
            vault.clone(),
            validator,
            Duration::from_secs(config.file_write_timeout_secs),
        );

        AppState {
            config,
            store,
            vault,
            resolver,
            ingest,
        }
    }

    /// Public URL for a relative storage path.
    pub fn asset_url(&self, relative_path: &str) -> String {
        format!(
            "{}/uploads/{}",
            self.config.public_base_url.trim_end_matches('/'),
            relative_path
        )
    }
}
