use std::sync::Arc;

use indexer_core::{Config, IndexerRegistry, IndexerStore, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    registry: IndexerRegistry,
    store: Arc<dyn IndexerStore>,
}

impl AppState {
    pub fn new(config: Config, registry: IndexerRegistry, store: Arc<dyn IndexerStore>) -> Self {
        Self {
            config,
            registry,
            store,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Indexers that loaded successfully.
    pub fn registry(&self) -> &IndexerRegistry {
        &self.registry
    }

    /// Every stored indexer, loaded or not.
    pub fn store(&self) -> &dyn IndexerStore {
        self.store.as_ref()
    }
}
