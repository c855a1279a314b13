pub mod categories;
pub mod config;
pub mod indexer;
pub mod metrics;
pub mod store;
pub mod testing;

pub use categories::{CategoryMap, CategoryMapping, StandardCategory};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use indexer::{
    create_indexer, Indexer, IndexerCapabilities, IndexerClient, IndexerDefinition, IndexerError,
    IndexerRegistry, ReleaseRecord, ReqwestTransport, SearchQuery, SearchType,
};
pub use store::{IndexerStore, SqliteIndexerStore, StoreError};
