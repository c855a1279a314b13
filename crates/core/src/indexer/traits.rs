use async_trait::async_trait;

use super::transport::{HttpResponse, HttpTransport};
use super::types::{
    Credentials, IndexerCapabilities, IndexerError, ReleaseRecord, SearchQuery, Session,
    SiteRequest,
};

/// Contract every site adapter implements.
///
/// Adapters are stateless with respect to the session: `authenticate`
/// returns a [`Session`] and the caller threads it into later requests.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Configured instance name, used in logs and metrics.
    fn name(&self) -> &str;

    /// Implementation identifier, e.g. `NorBits`.
    fn implementation(&self) -> &'static str;

    fn capabilities(&self) -> &IndexerCapabilities;

    fn credentials(&self) -> &Credentials;

    /// Log in and capture the session cookies.
    async fn authenticate(
        &self,
        transport: &dyn HttpTransport,
        credentials: &Credentials,
    ) -> Result<Session, IndexerError>;

    /// Build the requests needed to answer `query`.
    fn build_search_requests(&self, query: &SearchQuery) -> Vec<SiteRequest>;

    /// Parse a results page. Pure: no network access.
    fn parse(&self, body: &str) -> Result<Vec<ReleaseRecord>, IndexerError>;

    /// Whether a fetched page shows a logged-in session.
    fn is_session_valid(&self, response: &HttpResponse) -> bool;
}

/// A ready-to-use indexer, independent of the site behind it.
#[async_trait]
pub trait Indexer: Send + Sync {
    fn name(&self) -> &str;

    fn implementation(&self) -> &str;

    fn capabilities(&self) -> &IndexerCapabilities;

    /// Search the site, logging in first if needed.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ReleaseRecord>, IndexerError>;

    /// Force a fresh login to check the configured credentials.
    async fn test(&self) -> Result<(), IndexerError>;
}
