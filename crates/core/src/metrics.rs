//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Site requests and logins per indexer
//! - Search duration and parsed release counts
//! - Database migrations

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Indexer Metrics
// =============================================================================

/// Site requests by indexer and outcome.
pub static INDEXER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("indexer_requests_total", "Total requests sent to indexer sites"),
        &["indexer", "result"], // "ok", "session_invalid", "error"
    )
    .unwrap()
});

/// Login attempts by indexer and outcome.
pub static INDEXER_AUTH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("indexer_auth_attempts_total", "Total login attempts"),
        &["indexer", "result"], // "success", "failure"
    )
    .unwrap()
});

/// Releases parsed per search.
pub static INDEXER_RELEASES_PARSED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "indexer_releases_parsed",
            "Number of releases parsed per search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &["indexer"],
    )
    .unwrap()
});

/// Search duration in seconds, including any login.
pub static INDEXER_SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "indexer_search_duration_seconds",
            "Duration of a search against one indexer",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["indexer", "result"],
    )
    .unwrap()
});

// =============================================================================
// Storage Metrics
// =============================================================================

/// Schema migrations applied since startup.
pub static MIGRATIONS_APPLIED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "indexer_migrations_applied_total",
        "Total schema migrations applied",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(INDEXER_REQUESTS.clone()),
        Box::new(INDEXER_AUTH_ATTEMPTS.clone()),
        Box::new(INDEXER_RELEASES_PARSED.clone()),
        Box::new(INDEXER_SEARCH_DURATION.clone()),
        Box::new(MIGRATIONS_APPLIED.clone()),
    ]
}
