//! Session-managed indexer client.
//!
//! Wraps a [`SiteAdapter`] with its transport and the current login. The
//! session lock is held for the whole of each request, so an instance
//! sends one request at a time and at most one login is ever in flight.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::metrics;

use super::traits::{Indexer, SiteAdapter};
use super::transport::{CookieSet, HttpResponse, HttpTransport};
use super::types::{
    IndexerCapabilities, IndexerError, ReleaseRecord, SearchQuery, Session, SiteRequest,
};

/// A site adapter bound to a transport and a cached session.
pub struct IndexerClient<A, T> {
    adapter: A,
    transport: T,
    session: Mutex<Option<Session>>,
}

impl<A: SiteAdapter, T: HttpTransport> IndexerClient<A, T> {
    pub fn new(adapter: A, transport: T) -> Self {
        Self {
            adapter,
            transport,
            session: Mutex::new(None),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Current session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    /// Reuse a session obtained earlier instead of logging in again.
    pub async fn restore_session(&self, session: Session) {
        *self.session.lock().await = Some(session);
    }

    pub async fn clear_session(&self) {
        *self.session.lock().await = None;
    }

    async fn login(&self) -> Result<Session, IndexerError> {
        let name = self.adapter.name();
        debug!(indexer = %name, "Logging in");

        let result = self
            .adapter
            .authenticate(&self.transport, self.adapter.credentials())
            .await;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::INDEXER_AUTH_ATTEMPTS
            .with_label_values(&[name, outcome])
            .inc();

        if let Err(e) = &result {
            warn!(indexer = %name, error = %e, "Login failed");
        }
        result
    }

    /// Send a request with the session cookies, logging in when there is
    /// no session or it has expired.
    ///
    /// If the site answers with a logged-out page the session is dropped,
    /// a fresh login is made and the request is retried once. A second
    /// logged-out page fails with [`IndexerError::SessionRejected`].
    pub async fn fetch(&self, request: &SiteRequest) -> Result<HttpResponse, IndexerError> {
        let name = self.adapter.name();
        let mut guard = self.session.lock().await;

        let reusable = guard
            .as_ref()
            .filter(|session| !session.is_expired(Utc::now()))
            .map(|session| session.cookies.clone());
        let cookies = match reusable {
            Some(cookies) => cookies,
            None => {
                if guard.is_some() {
                    debug!(indexer = %name, "Session expired");
                }
                Self::store(&mut guard, self.login().await?)
            }
        };

        let response = self.send(request, &cookies).await?;
        if self.adapter.is_session_valid(&response) {
            return Ok(response);
        }

        warn!(indexer = %name, url = %request.url, "Site rejected session, re-authenticating");
        *guard = None;
        let cookies = Self::store(&mut guard, self.login().await?);

        let response = self.send(request, &cookies).await?;
        if self.adapter.is_session_valid(&response) {
            return Ok(response);
        }

        *guard = None;
        Err(IndexerError::SessionRejected)
    }

    fn store(slot: &mut Option<Session>, session: Session) -> CookieSet {
        let cookies = session.cookies.clone();
        *slot = Some(session);
        cookies
    }

    async fn send(
        &self,
        request: &SiteRequest,
        cookies: &CookieSet,
    ) -> Result<HttpResponse, IndexerError> {
        let name = self.adapter.name();
        match self.transport.execute(request, cookies).await {
            Ok(response) => {
                let result = if self.adapter.is_session_valid(&response) {
                    "ok"
                } else {
                    "session_invalid"
                };
                metrics::INDEXER_REQUESTS
                    .with_label_values(&[name, result])
                    .inc();
                Ok(response)
            }
            Err(e) => {
                metrics::INDEXER_REQUESTS
                    .with_label_values(&[name, "error"])
                    .inc();
                Err(e.into())
            }
        }
    }

    /// Run a search and concatenate the releases from every page.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<ReleaseRecord>, IndexerError> {
        let name = self.adapter.name();
        let start = Instant::now();

        let result = self.run_search(query).await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::INDEXER_SEARCH_DURATION
            .with_label_values(&[name, outcome])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(releases) => {
                metrics::INDEXER_RELEASES_PARSED
                    .with_label_values(&[name])
                    .observe(releases.len() as f64);
                info!(indexer = %name, releases = releases.len(), "Search completed");
            }
            Err(e) => warn!(indexer = %name, error = %e, "Search failed"),
        }

        result
    }

    async fn run_search(&self, query: &SearchQuery) -> Result<Vec<ReleaseRecord>, IndexerError> {
        let mut releases = Vec::new();
        for request in self.adapter.build_search_requests(query) {
            let response = self.fetch(&request).await?;
            releases.extend(self.adapter.parse(&response.body)?);
        }
        Ok(releases)
    }

    /// Log in again regardless of any cached session.
    pub async fn test(&self) -> Result<(), IndexerError> {
        let mut guard = self.session.lock().await;
        *guard = None;
        *guard = Some(self.login().await?);
        info!(indexer = %self.adapter.name(), "Login test succeeded");
        Ok(())
    }
}

#[async_trait]
impl<A: SiteAdapter, T: HttpTransport> Indexer for IndexerClient<A, T> {
    fn name(&self) -> &str {
        self.adapter.name()
    }

    fn implementation(&self) -> &str {
        self.adapter.implementation()
    }

    fn capabilities(&self) -> &IndexerCapabilities {
        self.adapter.capabilities()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<ReleaseRecord>, IndexerError> {
        IndexerClient::search(self, query).await
    }

    async fn test(&self) -> Result<(), IndexerError> {
        IndexerClient::test(self).await
    }
}
