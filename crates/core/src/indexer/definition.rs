use serde::{Deserialize, Serialize};

/// A configured indexer instance as stored and configured.
///
/// `settings` is the implementation-specific JSON object, decoded by the
/// adapter when the instance is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerDefinition {
    pub name: String,
    pub implementation: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "empty_settings")]
    pub settings: serde_json::Value,
}

fn default_enabled() -> bool {
    true
}

fn empty_settings() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl IndexerDefinition {
    pub fn new(
        name: impl Into<String>,
        implementation: impl Into<String>,
        settings: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            implementation: implementation.into(),
            enabled: true,
            settings,
        }
    }
}
