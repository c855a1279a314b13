//! NorBits, a Norwegian private tracker for movies, TV and general content.
//!
//! Login is a three step form flow guarded by anti-automation checks; the
//! results page is a plain HTML table scraped by fixed cell position.

mod parser;
mod requests;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::categories::{CategoryMapping, StandardCategory};

use super::traits::SiteAdapter;
use super::transport::{CookieSet, HttpResponse, HttpTransport};
use super::types::{
    Credentials, IndexerCapabilities, IndexerError, ReleaseRecord, SearchQuery, SearchType,
    Session, SiteRequest,
};

/// Cookie that is only present after a successful login.
const SESSION_COOKIE: &str = "uid";

/// Text that only appears on pages served to a logged-in user.
const LOGGED_IN_MARKER: &str = "logout.php";

/// How long a login is trusted, regardless of cookie expiry.
const SESSION_VALIDITY_DAYS: i64 = 30;

pub const DEFAULT_BASE_URL: &str = "https://norbits.net/";

/// The site serves Latin-1 pages without declaring a charset.
const ENCODING: &str = "iso-8859-1";

/// User settings for a NorBits indexer, stored as JSON.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NorBitsSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Only needed when 2FA is enabled on the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor_auth_code: Option<String>,
    #[serde(default)]
    pub use_full_search: bool,
    #[serde(default)]
    pub free_leech_only: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl std::fmt::Debug for NorBitsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NorBitsSettings")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("use_full_search", &self.use_full_search)
            .field("free_leech_only", &self.free_leech_only)
            .finish_non_exhaustive()
    }
}

impl NorBitsSettings {
    /// Decode settings from their stored JSON form.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, IndexerError> {
        serde_json::from_value(value.clone())
            .map_err(|e| IndexerError::Configuration(format!("Invalid NorBits settings: {}", e)))
    }

    /// Check that everything needed to log in is present.
    pub fn validate(&self) -> Result<(), IndexerError> {
        if self.username.trim().is_empty() {
            return Err(IndexerError::Configuration(
                "username is required".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(IndexerError::Configuration(
                "password is required".to_string(),
            ));
        }
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| IndexerError::Configuration(format!("Invalid base URL: {}", e)))?;
        Ok(())
    }
}

/// NorBits site adapter.
pub struct NorBits {
    name: String,
    settings: NorBitsSettings,
    credentials: Credentials,
    capabilities: IndexerCapabilities,
}

impl NorBits {
    pub const IMPLEMENTATION: &'static str = "NorBits";

    pub fn new(name: impl Into<String>, settings: NorBitsSettings) -> Result<Self, IndexerError> {
        settings.validate()?;

        let credentials = Credentials {
            username: settings.username.clone(),
            password: settings.password.clone(),
            two_factor_code: settings
                .two_factor_auth_code
                .clone()
                .filter(|code| !code.trim().is_empty()),
        };

        Ok(Self {
            name: name.into(),
            settings,
            credentials,
            capabilities: capabilities(),
        })
    }

    pub fn settings(&self) -> &NorBitsSettings {
        &self.settings
    }

    /// Base URL, always with a trailing slash.
    fn base_url(&self) -> String {
        format!("{}/", self.settings.base_url.trim_end_matches('/'))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

#[async_trait]
impl SiteAdapter for NorBits {
    fn name(&self) -> &str {
        &self.name
    }

    fn implementation(&self) -> &'static str {
        Self::IMPLEMENTATION
    }

    fn capabilities(&self) -> &IndexerCapabilities {
        &self.capabilities
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    async fn authenticate(
        &self,
        transport: &dyn HttpTransport,
        credentials: &Credentials,
    ) -> Result<Session, IndexerError> {
        let index = transport
            .execute(
                &SiteRequest::get(self.base_url()).encoding(ENCODING),
                &CookieSet::new(),
            )
            .await?;
        let initial = index.cookies;

        // The login page itself is unused, but the site expects it to be
        // fetched before the form is posted.
        let login_url = self.url("login.php");
        transport
            .execute(&SiteRequest::get(&login_url).encoding(ENCODING), &initial)
            .await?;

        let request = SiteRequest::post(self.url("takelogin.php"))
            .form_field("username", &credentials.username)
            .form_field("password", &credentials.password)
            .form_field(
                "code",
                credentials.two_factor_code.as_deref().unwrap_or_default(),
            )
            .form_field("logout", "no")
            .form_field("returnto", "/")
            .header("Referer", &login_url)
            .encoding(ENCODING)
            .suppress_http_errors();

        let response = transport.execute(&request, &initial).await?;

        if !response.cookies.contains(SESSION_COOKIE) {
            warn!(indexer = %self.name, status = response.status, "Login rejected, no session cookie");
            return Err(IndexerError::Auth("login failed".to_string()));
        }

        debug!(indexer = %self.name, "Authentication succeeded");
        Ok(Session::new(
            initial.merged(&response.cookies),
            Utc::now(),
            Duration::days(SESSION_VALIDITY_DAYS),
        ))
    }

    fn build_search_requests(&self, query: &SearchQuery) -> Vec<SiteRequest> {
        vec![SiteRequest::get(requests::build_search_url(
            &self.base_url(),
            &self.settings,
            &self.capabilities.categories,
            query,
        ))
        .encoding(ENCODING)]
    }

    fn parse(&self, body: &str) -> Result<Vec<ReleaseRecord>, IndexerError> {
        parser::parse_results(body, &self.base_url(), &self.capabilities.categories)
    }

    fn is_session_valid(&self, response: &HttpResponse) -> bool {
        response.body.contains(LOGGED_IN_MARKER)
    }
}

fn capabilities() -> IndexerCapabilities {
    let mut categories = CategoryMapping::new();
    categories
        .add("main_cat[]=1", StandardCategory::MOVIES, "Filmer")
        .add("main_cat[]=2", StandardCategory::TV, "TV")
        .add("main_cat[]=3", StandardCategory::PC, "Programmer")
        .add("main_cat[]=4", StandardCategory::CONSOLE, "Spill")
        .add("main_cat[]=5", StandardCategory::AUDIO, "Musikk")
        .add("main_cat[]=6", StandardCategory::BOOKS, "Tidsskrift")
        .add("main_cat[]=7", StandardCategory::AUDIO_AUDIOBOOK, "Lydbøker")
        .add("main_cat[]=8", StandardCategory::AUDIO_VIDEO, "Musikkvideoer")
        .add("main_cat[]=40", StandardCategory::AUDIO_OTHER, "Podcasts");

    IndexerCapabilities {
        search_types: vec![
            SearchType::Search,
            SearchType::Movie,
            SearchType::Tv,
            SearchType::Music,
            SearchType::Book,
        ],
        supports_imdb_search: true,
        categories,
    }
}
