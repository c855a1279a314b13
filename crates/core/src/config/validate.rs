use std::collections::HashSet;

use crate::indexer::{NorBits, NorBitsSettings};

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - HTTP timeout is not 0
/// - Indexer names are non-empty and unique (ignoring case)
/// - Settings of known implementations decode and carry credentials
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.http.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "http.timeout_secs cannot be 0".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for indexer in &config.indexers {
        let name = indexer.name.trim();
        if name.is_empty() {
            return Err(ConfigError::ValidationError(
                "indexer name cannot be empty".to_string(),
            ));
        }
        if !names.insert(name.to_lowercase()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate indexer name: {}",
                name
            )));
        }

        // Unknown implementations are skipped when the registry is built.
        if indexer.implementation == NorBits::IMPLEMENTATION {
            NorBitsSettings::from_json(&indexer.settings)
                .and_then(|settings| settings.validate())
                .map_err(|e| {
                    ConfigError::ValidationError(format!("indexer {}: {}", name, e))
                })?;
        }
    }

    Ok(())
}
