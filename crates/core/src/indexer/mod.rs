//! Private-tracker site adapters.
//!
//! Each site is a [`SiteAdapter`]: it knows how to log in, build search
//! URLs and scrape result pages. An [`IndexerClient`] binds an adapter to
//! an [`HttpTransport`] and keeps the session alive, re-authenticating once
//! when the site answers with a logged-out page. The [`IndexerRegistry`]
//! builds clients from stored [`IndexerDefinition`]s.

mod client;
mod definition;
pub mod norbits;
pub mod parse_util;
mod registry;
mod traits;
mod transport;
mod types;

pub use client::IndexerClient;
pub use definition::IndexerDefinition;
pub use norbits::{NorBits, NorBitsSettings, DEFAULT_BASE_URL as DEFAULT_NORBITS_URL};
pub use registry::{create_indexer, IndexerRegistry, SUPPORTED_IMPLEMENTATIONS};
pub use traits::{Indexer, SiteAdapter};
pub use transport::{CookieSet, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use types::{
    Credentials, HttpMethod, IndexerCapabilities, IndexerError, ReleaseRecord, SearchQuery,
    SearchType, Session, SiteRequest,
};
