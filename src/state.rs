use std::sync::Arc;

use crate::config::{AppConfig, StorageConfig};
use crate::error::BotResult;
use crate::services::directory::UserDirectory;
use crate::storage::{MemoryStore, RecordStore, TursoStore};

/// Shared application state, passed to handlers through the dispatcher's
/// dependency map.
pub struct AppState {
    pub config: AppConfig,
    pub directory: UserDirectory,
}

impl AppState {
    pub async fn new(config: AppConfig) -> BotResult<Self> {
        let store: Arc<dyn RecordStore> = match &config.storage {
            StorageConfig::Turso { url, token } => {
                info!("Connecting to Turso at {}", url);
                Arc::new(TursoStore::connect(url, token).await?)
            }
            StorageConfig::Memory => {
                info!("Using in-memory record store");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self {
            directory: UserDirectory::new(store),
            config,
        })
    }
}
