//! Mock HTTP transport for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::indexer::{CookieSet, HttpResponse, HttpTransport, SiteRequest, TransportError};

/// A request seen by the mock, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: SiteRequest,
    /// Cookies the caller sent with the request.
    pub cookies: CookieSet,
}

enum Scripted {
    Response {
        status: u16,
        cookies: CookieSet,
        body: String,
    },
    Error(TransportError),
}

/// Mock implementation of the HttpTransport trait.
///
/// Responses are scripted up front and handed out in order, one per
/// request. Running out of scripted responses fails the request.
///
/// # Example
///
/// ```rust,ignore
/// use indexer_core::testing::{MockTransport, fixtures};
///
/// let transport = MockTransport::new();
/// transport.push_login_flow().await;
/// transport.push_ok(fixtures::NORBITS_RESULTS_PAGE).await;
///
/// let client = IndexerClient::new(adapter, transport.clone());
/// let releases = client.search(&SearchQuery::term("matrix")).await?;
///
/// assert_eq!(transport.request_count().await, 4);
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<RwLock<VecDeque<Scripted>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("responses", &"<responses>")
            .field("requests", &"<requests>")
            .finish()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub async fn push_response(&self, status: u16, body: &str, cookies: CookieSet) {
        self.responses.write().await.push_back(Scripted::Response {
            status,
            cookies,
            body: body.to_string(),
        });
    }

    /// Queue a 200 response with no cookies.
    pub async fn push_ok(&self, body: &str) {
        self.push_response(200, body, CookieSet::new()).await;
    }

    /// Queue a transport failure.
    pub async fn push_error(&self, error: TransportError) {
        self.responses
            .write()
            .await
            .push_back(Scripted::Error(error));
    }

    /// Queue a login form response that sets the session cookies.
    pub async fn push_login_success(&self) {
        let cookies: CookieSet = [("uid", "42"), ("pass", "secret")].into_iter().collect();
        self.push_response(200, super::fixtures::NORBITS_HOME_PAGE, cookies)
            .await;
    }

    /// Queue the three responses of a successful NorBits login.
    pub async fn push_login_flow(&self) {
        let front: CookieSet = [("PHPSESSID", "abc")].into_iter().collect();
        self.push_response(200, super::fixtures::NORBITS_LOGIN_PAGE, front)
            .await;
        self.push_ok(super::fixtures::NORBITS_LOGIN_PAGE).await;
        self.push_login_success().await;
    }

    /// Queue the three responses of a rejected NorBits login.
    pub async fn push_login_failure(&self) {
        self.push_ok(super::fixtures::NORBITS_LOGIN_PAGE).await;
        self.push_ok(super::fixtures::NORBITS_LOGIN_PAGE).await;
        self.push_response(403, super::fixtures::NORBITS_LOGIN_PAGE, CookieSet::new())
            .await;
    }

    /// All requests made so far, in order.
    pub async fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Scripted responses not yet consumed.
    pub async fn pending_responses(&self) -> usize {
        self.responses.read().await.len()
    }

    /// Clear scripted responses and recorded requests.
    pub async fn clear(&self) {
        self.responses.write().await.clear();
        self.requests.write().await.clear();
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(
        &self,
        request: &SiteRequest,
        cookies: &CookieSet,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.write().await.push(RecordedRequest {
            request: request.clone(),
            cookies: cookies.clone(),
        });

        let next = self.responses.write().await.pop_front();
        match next {
            Some(Scripted::Response {
                status,
                cookies,
                body,
            }) => Ok(HttpResponse {
                status,
                url: request.url.clone(),
                headers: Vec::new(),
                cookies,
                body,
            }),
            Some(Scripted::Error(error)) => Err(error),
            None => Err(TransportError::ConnectionFailed(format!(
                "no scripted response for {}",
                request.url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_responses_in_order_and_recorded() {
        let transport = MockTransport::new();
        transport.push_ok("first").await;
        transport.push_error(TransportError::Timeout).await;

        let cookies: CookieSet = [("uid", "1")].into_iter().collect();
        let first = transport
            .execute(&SiteRequest::get("https://a.example/1"), &cookies)
            .await
            .unwrap();
        assert_eq!(first.body, "first");
        assert_eq!(first.url, "https://a.example/1");

        let second = transport
            .execute(&SiteRequest::get("https://a.example/2"), &CookieSet::new())
            .await;
        assert!(matches!(second, Err(TransportError::Timeout)));

        let exhausted = transport
            .execute(&SiteRequest::get("https://a.example/3"), &CookieSet::new())
            .await;
        assert!(matches!(exhausted, Err(TransportError::ConnectionFailed(_))));

        let recorded = transport.recorded_requests().await;
        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[0].cookies.get("uid"), Some("1"));
        assert!(recorded[1].cookies.is_empty());
    }

    #[tokio::test]
    async fn test_login_flow_scripts_three_responses() {
        let transport = MockTransport::new();
        transport.push_login_flow().await;
        assert_eq!(transport.pending_responses().await, 3);

        transport.clear().await;
        assert_eq!(transport.pending_responses().await, 0);
        assert_eq!(transport.request_count().await, 0);
    }
}
