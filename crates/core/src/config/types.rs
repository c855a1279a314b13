use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::indexer::IndexerDefinition;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    /// Indexers seeded into the store at startup.
    #[serde(default)]
    pub indexers: Vec<IndexerDefinition>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    9696
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("indexerd.db")
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("indexerd/{}", env!("CARGO_PKG_VERSION"))
}

/// Setting keys whose values never leave the process.
const SECRET_SETTINGS: &[&str] = &[
    "password",
    "twoFactorAuthCode",
    "apiKey",
    "passkey",
    "cookie",
    "mamId",
];

const REDACTED: &str = "<redacted>";

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub indexers: Vec<SanitizedIndexerConfig>,
}

/// Indexer definition with secret settings replaced
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedIndexerConfig {
    pub name: String,
    pub implementation: String,
    pub enabled: bool,
    pub settings: serde_json::Value,
}

impl From<&IndexerDefinition> for SanitizedIndexerConfig {
    fn from(definition: &IndexerDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            implementation: definition.implementation.clone(),
            enabled: definition.enabled,
            settings: redact_settings(&definition.settings),
        }
    }
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            http: config.http.clone(),
            indexers: config.indexers.iter().map(Into::into).collect(),
        }
    }
}

/// Replace secret values in an indexer's settings object.
///
/// Empty secrets stay empty so it is visible that nothing is configured.
pub fn redact_settings(settings: &serde_json::Value) -> serde_json::Value {
    let mut redacted = settings.clone();
    if let Some(object) = redacted.as_object_mut() {
        for (key, value) in object.iter_mut() {
            let secret = SECRET_SETTINGS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(key));
            let empty = value.is_null() || value.as_str().is_some_and(str::is_empty);
            if secret && !empty {
                *value = serde_json::Value::String(REDACTED.to_string());
            }
        }
    }
    redacted
}
