//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by an in-memory store and a scripted transport, so indexer
//! endpoints can be exercised without reaching a real site.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use indexer_core::indexer::HttpTransport;
use indexer_core::testing::MockTransport;
use indexer_core::{Config, IndexerDefinition, IndexerRegistry, IndexerStore, SqliteIndexerStore};
use indexer_server::api::create_router;
use indexer_server::state::AppState;

/// Re-export fixtures for test convenience
pub use indexer_core::testing::fixtures;

/// Test fixture for API testing with a mock site.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.transport.push_login_flow().await;
///     fixture.transport.push_ok(fixtures::NORBITS_RESULTS_PAGE).await;
///
///     let response = fixture.get("/api/v1/indexers/NorBits/search?q=matrix").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Scripted site responses shared by every indexer
    pub transport: MockTransport,
    pub store: Arc<dyn IndexerStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// A NorBits definition with dummy credentials.
pub fn norbits_definition(name: &str) -> IndexerDefinition {
    IndexerDefinition::new(
        name,
        "NorBits",
        serde_json::json!({
            "username": "alice",
            "password": "hunter2",
            "twoFactorAuthCode": "123456"
        }),
    )
}

impl TestFixture {
    /// One NorBits indexer named `NorBits`.
    pub async fn new() -> Self {
        Self::with_indexers(vec![norbits_definition("NorBits")]).await
    }

    /// Store and load the given indexers, as the binary does at startup.
    pub async fn with_indexers(definitions: Vec<IndexerDefinition>) -> Self {
        let store: Arc<dyn IndexerStore> =
            Arc::new(SqliteIndexerStore::in_memory().expect("Failed to create store"));

        let config = Config {
            indexers: definitions.clone(),
            ..Config::default()
        };
        for definition in &definitions {
            store.upsert(definition).expect("Failed to store indexer");
        }

        let transport = MockTransport::new();
        let shared: Arc<dyn HttpTransport> = Arc::new(transport.clone());
        let registry =
            IndexerRegistry::from_definitions(&store.list().expect("list"), shared);

        let state = Arc::new(AppState::new(config, registry, Arc::clone(&store)));

        Self {
            router: create_router(state),
            transport,
            store,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.request(Request::post(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Raw body text, for non-JSON endpoints.
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }
}
