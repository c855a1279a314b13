use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::client::IndexerClient;
use super::definition::IndexerDefinition;
use super::norbits::{NorBits, NorBitsSettings};
use super::traits::Indexer;
use super::transport::HttpTransport;
use super::types::IndexerError;

/// Implementations this build can instantiate.
pub const SUPPORTED_IMPLEMENTATIONS: &[&str] = &[NorBits::IMPLEMENTATION];

/// Factory function to create an indexer from its definition.
pub fn create_indexer(
    definition: &IndexerDefinition,
    transport: Arc<dyn HttpTransport>,
) -> Result<Arc<dyn Indexer>, IndexerError> {
    match definition.implementation.as_str() {
        NorBits::IMPLEMENTATION => {
            let settings = NorBitsSettings::from_json(&definition.settings)?;
            let adapter = NorBits::new(definition.name.clone(), settings)?;
            Ok(Arc::new(IndexerClient::new(adapter, transport)))
        }
        other => Err(IndexerError::Configuration(format!(
            "Unsupported implementation: {}",
            other
        ))),
    }
}

/// Live indexers, looked up by case-insensitive name.
#[derive(Default)]
pub struct IndexerRegistry {
    indexers: BTreeMap<String, Arc<dyn Indexer>>,
}

impl IndexerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every enabled definition, skipping the ones that fail.
    pub fn from_definitions(
        definitions: &[IndexerDefinition],
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let mut registry = Self::new();

        for definition in definitions {
            if !definition.enabled {
                debug!(indexer = %definition.name, "Indexer disabled, skipping");
                continue;
            }

            match create_indexer(definition, Arc::clone(&transport)) {
                Ok(indexer) => registry.register(indexer),
                Err(e) => warn!(
                    indexer = %definition.name,
                    implementation = %definition.implementation,
                    error = %e,
                    "Skipping indexer"
                ),
            }
        }

        info!(count = registry.len(), "Indexers loaded");
        registry
    }

    /// Add an indexer, replacing any with the same name.
    pub fn register(&mut self, indexer: Arc<dyn Indexer>) {
        self.indexers
            .insert(indexer.name().to_lowercase(), indexer);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Indexer>> {
        self.indexers.get(&name.to_lowercase()).cloned()
    }

    /// All indexers, ordered by name.
    pub fn list(&self) -> Vec<Arc<dyn Indexer>> {
        self.indexers.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.indexers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    fn norbits(name: &str) -> IndexerDefinition {
        IndexerDefinition::new(
            name,
            "NorBits",
            serde_json::json!({"username": "alice", "password": "pw"}),
        )
    }

    fn transport() -> Arc<dyn HttpTransport> {
        Arc::new(MockTransport::new())
    }

    #[test]
    fn test_create_norbits() {
        let indexer = create_indexer(&norbits("NB"), transport()).unwrap();
        assert_eq!(indexer.name(), "NB");
        assert_eq!(indexer.implementation(), "NorBits");
    }

    #[test]
    fn test_create_unsupported_implementation() {
        let definition = IndexerDefinition::new("mam", "MyAnonamouse", serde_json::json!({}));
        let result = create_indexer(&definition, transport());
        assert!(matches!(result, Err(IndexerError::Configuration(_))));
    }

    #[test]
    fn test_create_with_invalid_settings() {
        let definition = IndexerDefinition::new("nb", "NorBits", serde_json::json!({"username": 5}));
        let result = create_indexer(&definition, transport());
        assert!(matches!(result, Err(IndexerError::Configuration(_))));
    }

    #[test]
    fn test_from_definitions_skips_disabled_and_unsupported() {
        let mut disabled = norbits("off");
        disabled.enabled = false;
        let definitions = vec![
            norbits("NorBits"),
            disabled,
            IndexerDefinition::new("mam", "MyAnonamouse", serde_json::json!({})),
            norbits("backup"),
        ];

        let registry = IndexerRegistry::from_definitions(&definitions, transport());

        assert_eq!(registry.len(), 2);
        let names: Vec<String> = registry.list().iter().map(|i| i.name().to_string()).collect();
        assert_eq!(names, vec!["backup", "NorBits"]);
        assert!(registry.get("off").is_none());
        assert!(registry.get("mam").is_none());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = IndexerRegistry::new();
        assert!(registry.is_empty());

        registry.register(create_indexer(&norbits("NorBits"), transport()).unwrap());
        assert!(registry.get("norbits").is_some());
        assert!(registry.get("NORBITS").is_some());
        assert!(registry.get("other").is_none());
    }
}
