//! Types shared by every site adapter.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::categories::StandardCategory;

use super::parse_util::parse_imdb_id;
use super::transport::{CookieSet, TransportError};

/// Login credentials for a private site.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Second-factor code, only for accounts with 2FA enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor_code: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field(
                "two_factor_code",
                &self.two_factor_code.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// An authenticated site session.
///
/// Created only by a successful login and replaced wholesale on re-login.
#[derive(Debug, Clone)]
pub struct Session {
    pub cookies: CookieSet,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session valid for `validity` from `now`, ignoring whatever
    /// expiry the server attached to the cookies.
    pub fn new(cookies: CookieSet, now: DateTime<Utc>, validity: Duration) -> Self {
        Self {
            cookies,
            created_at: now,
            expires_at: now + validity,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Kind of search being performed.
///
/// Sites that can't tell these apart treat them all as a basic search.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    Search,
    Movie,
    Tv,
    Music,
    Book,
}

/// Search criteria supplied by the caller for a single search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search_type: SearchType,
    /// Free-text search term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    /// IMDb id, bare or prefixed with `tt` or `TT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// Requested standard category ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<u32>,
    /// TV season; only used by TV searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    /// TV episode: a number, or `MM/dd` for daily shows whose season is the year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
}

impl SearchQuery {
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            ..Self::default()
        }
    }

    /// The IMDb id in canonical `tt0000000` form, if one was supplied and
    /// the search type supports it.
    pub fn full_imdb_id(&self) -> Option<String> {
        if !matches!(
            self.search_type,
            SearchType::Search | SearchType::Movie | SearchType::Tv
        ) {
            return None;
        }
        let number = parse_imdb_id(self.imdb_id.as_deref()?)?;
        Some(format!("tt{:07}", number))
    }

    /// Episode marker appended to TV searches: `S01E02`, `S01`, or
    /// `2024.05.01` for daily shows. `None` without a season.
    pub fn episode_search_string(&self) -> Option<String> {
        let season = self.season.filter(|s| *s > 0)?;
        let Some(episode) = self
            .episode
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
        else {
            return Some(format!("S{:02}", season));
        };

        if (1000..=9999).contains(&season) {
            let daily = format!("{} {}", season, episode);
            if let Ok(date) = NaiveDate::parse_from_str(&daily, "%Y %m/%d") {
                return Some(date.format("%Y.%m.%d").to_string());
            }
        }

        Some(match episode.parse::<u32>() {
            Ok(number) => format!("S{:02}E{:02}", season, number),
            Err(_) => format!("S{:02}E{}", season, episode),
        })
    }

    /// Free-text term to send: the sanitized term, followed by the episode
    /// marker for TV searches.
    pub fn search_term(&self) -> Option<String> {
        let episode = match self.search_type {
            SearchType::Tv => self.episode_search_string(),
            _ => None,
        };
        match (self.sanitized_term(), episode) {
            (Some(term), Some(episode)) => Some(format!("{} {}", term, episode)),
            (Some(term), None) => Some(term.to_string()),
            (None, episode) => episode,
        }
    }

    /// The trimmed free-text term, if not blank.
    pub fn sanitized_term(&self) -> Option<&str> {
        self.term.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// HTTP method of a site request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

/// A fully formed request against the site.
#[derive(Debug, Clone)]
pub struct SiteRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Form body, only used for login.
    pub form: Vec<(String, String)>,
    pub follow_redirects: bool,
    /// Return non-2xx responses instead of failing.
    pub suppress_http_errors: bool,
    /// Charset for bodies whose `Content-Type` declares none; UTF-8 if unset.
    pub encoding: Option<&'static str>,
}

impl SiteRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            form: Vec::new(),
            follow_redirects: true,
            suppress_http_errors: false,
            encoding: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }

    pub fn suppress_http_errors(mut self) -> Self {
        self.suppress_http_errors = true;
        self
    }

    pub fn encoding(mut self, charset: &'static str) -> Self {
        self.encoding = Some(charset);
        self
    }
}

/// A normalized release parsed from a site's results page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// Stable identifier (the details page URL).
    pub guid: String,
    pub info_url: String,
    pub download_url: String,
    pub title: String,
    pub categories: Vec<StandardCategory>,
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grabs: Option<u32>,
    pub seeders: u32,
    pub leechers: u32,
    /// Always `seeders + leechers`.
    pub peers: u32,
    pub publish_date: DateTime<Utc>,
    /// Fraction of downloaded bytes counted against ratio (0 = freeleech).
    pub download_volume_factor: f64,
    pub upload_volume_factor: f64,
    pub minimum_ratio: f64,
    /// Minimum seed time in seconds.
    pub minimum_seed_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// What kinds of search a site supports.
#[derive(Debug, Clone, Serialize)]
pub struct IndexerCapabilities {
    pub search_types: Vec<SearchType>,
    pub supports_imdb_search: bool,
    pub categories: crate::categories::CategoryMapping,
}

/// Errors raised by site adapters and the session-managed client.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Session rejected by site after re-authentication")]
    SessionRejected,

    #[error("Unexpected page format: {0}")]
    Format(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry_is_fixed_window() {
        let now = Utc::now();
        let session = Session::new(CookieSet::new(), now, Duration::days(30));
        assert_eq!(session.expires_at - session.created_at, Duration::days(30));
        assert!(!session.is_expired(now + Duration::days(29)));
        assert!(session.is_expired(now + Duration::days(30)));
    }

    #[test]
    fn test_full_imdb_id() {
        let mut query = SearchQuery {
            imdb_id: Some("tt0133093".to_string()),
            ..SearchQuery::default()
        };
        assert_eq!(query.full_imdb_id().as_deref(), Some("tt0133093"));

        query.imdb_id = Some("133093".to_string());
        assert_eq!(query.full_imdb_id().as_deref(), Some("tt0133093"));

        query.imdb_id = Some("TT0133093".to_string());
        assert_eq!(query.full_imdb_id().as_deref(), Some("tt0133093"));

        query.imdb_id = Some(" tt133093 ".to_string());
        assert_eq!(query.full_imdb_id().as_deref(), Some("tt0133093"));

        query.imdb_id = Some("tt-bad".to_string());
        assert!(query.full_imdb_id().is_none());

        query.imdb_id = Some("0".to_string());
        assert!(query.full_imdb_id().is_none());
    }

    #[test]
    fn test_imdb_id_ignored_for_music() {
        let query = SearchQuery {
            search_type: SearchType::Music,
            imdb_id: Some("tt0133093".to_string()),
            ..SearchQuery::default()
        };
        assert!(query.full_imdb_id().is_none());
    }

    fn tv(term: Option<&str>, season: Option<u32>, episode: Option<&str>) -> SearchQuery {
        SearchQuery {
            search_type: SearchType::Tv,
            term: term.map(str::to_string),
            season,
            episode: episode.map(str::to_string),
            ..SearchQuery::default()
        }
    }

    #[test]
    fn test_episode_search_string() {
        assert_eq!(
            tv(None, Some(3), Some("1")).episode_search_string().as_deref(),
            Some("S03E01")
        );
        assert_eq!(
            tv(None, Some(12), Some("105")).episode_search_string().as_deref(),
            Some("S12E105")
        );
        assert_eq!(
            tv(None, Some(3), None).episode_search_string().as_deref(),
            Some("S03")
        );
        assert_eq!(
            tv(None, Some(3), Some("  ")).episode_search_string().as_deref(),
            Some("S03")
        );
        assert_eq!(
            tv(None, Some(1), Some("special")).episode_search_string().as_deref(),
            Some("S01Especial")
        );
        assert_eq!(
            tv(None, Some(2024), Some("05/01")).episode_search_string().as_deref(),
            Some("2024.05.01")
        );
        assert!(tv(None, None, Some("1")).episode_search_string().is_none());
        assert!(tv(None, Some(0), Some("1")).episode_search_string().is_none());
    }

    #[test]
    fn test_search_term_appends_episode_for_tv_only() {
        assert_eq!(
            tv(Some(" Lykkeland "), Some(3), Some("1")).search_term().as_deref(),
            Some("Lykkeland S03E01")
        );
        assert_eq!(
            tv(None, Some(3), None).search_term().as_deref(),
            Some("S03")
        );
        assert_eq!(
            tv(Some("Lykkeland"), None, None).search_term().as_deref(),
            Some("Lykkeland")
        );

        let mut movie = tv(Some("Lykkeland"), Some(3), Some("1"));
        movie.search_type = SearchType::Movie;
        assert_eq!(movie.search_term().as_deref(), Some("Lykkeland"));
        assert!(SearchQuery::default().search_term().is_none());
    }

    #[test]
    fn test_sanitized_term() {
        assert_eq!(SearchQuery::term("  matrix ").sanitized_term(), Some("matrix"));
        assert!(SearchQuery::term("   ").sanitized_term().is_none());
        assert!(SearchQuery::default().sanitized_term().is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let credentials = Credentials {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
            two_factor_code: Some("123456".to_string()),
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("123456"));
    }

    #[test]
    fn test_search_query_deserialize_minimal() {
        let query: SearchQuery = serde_json::from_str(r#"{"term": "matrix"}"#).unwrap();
        assert_eq!(query.search_type, SearchType::Search);
        assert_eq!(query.term.as_deref(), Some("matrix"));
        assert!(query.categories.is_empty());
    }
}
