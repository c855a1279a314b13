//! Persistent storage for configured indexers.
//!
//! The schema is versioned with `PRAGMA user_version`; see [`migrations`].

pub mod migrations;
mod sqlite;

pub use sqlite::SqliteIndexerStore;

use thiserror::Error;

use crate::indexer::IndexerDefinition;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Storage for indexer definitions. Names are unique, ignoring case.
pub trait IndexerStore: Send + Sync {
    /// Insert a definition, or replace the one with the same name.
    fn upsert(&self, definition: &IndexerDefinition) -> Result<i64, StoreError>;

    /// All definitions, ordered by name.
    fn list(&self) -> Result<Vec<IndexerDefinition>, StoreError>;

    fn get(&self, name: &str) -> Result<Option<IndexerDefinition>, StoreError>;

    fn remove(&self, name: &str) -> Result<(), StoreError>;
}
