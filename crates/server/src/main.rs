use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use indexer_core::indexer::HttpTransport;
use indexer_core::{
    load_config, validate_config, IndexerRegistry, IndexerStore, ReqwestTransport,
    SqliteIndexerStore,
};
use indexer_server::api::create_router;
use indexer_server::metrics::INDEXERS_LOADED;
use indexer_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("indexerd {}", VERSION);

    // Determine config path
    let config_path = std::env::var("INDEXERD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Open the indexer store, applying pending migrations
    let store: Arc<dyn IndexerStore> = Arc::new(
        SqliteIndexerStore::new(&config.database.path)
            .context("Failed to open indexer store")?,
    );
    info!("Indexer store initialized");

    // Seed configured indexers
    for definition in &config.indexers {
        store
            .upsert(definition)
            .with_context(|| format!("Failed to store indexer {}", definition.name))?;
    }
    if !config.indexers.is_empty() {
        info!("Stored {} configured indexer(s)", config.indexers.len());
    }

    // Shared HTTP transport for all indexers
    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::new(
            Duration::from_secs(config.http.timeout_secs as u64),
            &config.http.user_agent,
        )
        .context("Failed to create HTTP client")?,
    );

    let definitions = store.list().context("Failed to list indexers")?;
    let registry = IndexerRegistry::from_definitions(&definitions, transport);
    INDEXERS_LOADED.set(registry.len() as i64);

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), registry, store));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
