//! HTTP transport used by site adapters.
//!
//! Adapters never talk to sockets directly: they describe a [`SiteRequest`]
//! and hand it to an [`HttpTransport`] together with the cookies to send.
//! Cookies are scoped by a [`Jar`] and only ever sent to the origin of the
//! request that carried them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderValue, COOKIE, LOCATION, SET_COOKIE};
use reqwest::{redirect, Client, Url};
use thiserror::Error;
use tracing::debug;

use super::types::{HttpMethod, SiteRequest};

/// Maximum number of redirects followed for a single request.
const MAX_REDIRECTS: usize = 10;

/// Charset used when a response does not declare one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Ordered name/value cookie collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    cookies: Vec<(String, String)>,
}

impl CookieSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace a cookie.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.cookies.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.cookies.retain(|(n, _)| n != name);
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cookies.iter().map(|(n, _)| n.as_str())
    }

    /// Copy of `self` with every cookie from `other` applied on top.
    pub fn merged(&self, other: &CookieSet) -> CookieSet {
        let mut merged = self.clone();
        for (name, value) in &other.cookies {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Read a `Cookie` header value (`a=1; b=2`).
    pub fn from_header(header: &str) -> CookieSet {
        header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim(), value.trim()))
            .filter(|(name, _)| !name.is_empty())
            .collect()
    }

    /// Render as a `Cookie` request header value.
    pub fn to_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(n, v)| format!("{}={}", n, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = CookieSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Response returned by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Cookies set during this exchange that apply to the request origin.
    pub cookies: CookieSet,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Too many redirects starting at {0}")]
    TooManyRedirects(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Performs HTTP exchanges on behalf of site adapters.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a request, sending `cookies` with every hop.
    async fn execute(
        &self,
        request: &SiteRequest,
        cookies: &CookieSet,
    ) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn execute(
        &self,
        request: &SiteRequest,
        cookies: &CookieSet,
    ) -> Result<HttpResponse, TransportError> {
        (**self).execute(request, cookies).await
    }
}

/// reqwest-backed transport.
///
/// Redirects are followed here rather than by reqwest so that cookies set
/// on intermediate responses (login redirects) are not lost. Each exchange
/// gets its own [`Jar`], seeded with the caller's cookies for the request
/// origin; a hop to another origin is sent without cookies.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: &SiteRequest,
        cookies: &CookieSet,
    ) -> Result<HttpResponse, TransportError> {
        let origin =
            Url::parse(&request.url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let mut url = origin.clone();
        let mut method = request.method;

        let jar = Jar::default();
        for (name, value) in &cookies.cookies {
            jar.add_cookie_str(&format!("{}={}; Path=/", name, value), &origin);
        }
        let received = Jar::default();

        for hop in 0..=MAX_REDIRECTS {
            let mut builder = match method {
                HttpMethod::Get => self.client.get(url.clone()),
                HttpMethod::Post => self.client.post(url.clone()),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if url.origin() == origin.origin() {
                if let Some(cookie) = jar.cookies(&url) {
                    builder = builder.header(COOKIE, cookie);
                }
            }
            if method == HttpMethod::Post && !request.form.is_empty() {
                builder = builder.form(&request.form);
            }

            let response = builder.send().await?;
            let status = response.status();

            let set_cookies: Vec<HeaderValue> =
                response.headers().get_all(SET_COOKIE).iter().cloned().collect();
            jar.set_cookies(&mut set_cookies.iter(), &url);
            received.set_cookies(&mut set_cookies.iter(), &url);

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if request.follow_redirects && status.is_redirection() {
                if let Some(location) = location {
                    if hop == MAX_REDIRECTS {
                        return Err(TransportError::TooManyRedirects(request.url.clone()));
                    }
                    let next = url
                        .join(&location)
                        .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
                    debug!(from = %url, to = %next, status = status.as_u16(), "Following redirect");
                    if matches!(status.as_u16(), 301..=303) {
                        method = HttpMethod::Get;
                    }
                    url = next;
                    continue;
                }
            }

            if !status.is_success() && !status.is_redirection() && !request.suppress_http_errors {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
                .collect();
            let body = response
                .text_with_charset(request.encoding.unwrap_or(DEFAULT_ENCODING))
                .await?;

            let cookies = received
                .cookies(&origin)
                .and_then(|header| header.to_str().ok().map(CookieSet::from_header))
                .unwrap_or_default();

            return Ok(HttpResponse {
                status: status.as_u16(),
                url: url.to_string(),
                headers,
                cookies,
                body,
            });
        }

        Err(TransportError::TooManyRedirects(request.url.clone()))
    }
}
