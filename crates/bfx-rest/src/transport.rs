//! HTTP transport abstraction
//!
//! The dispatcher talks to the network only through [`HttpTransport`], so the
//! default reqwest client can be swapped for a proxy-aware one or for
//! [`MockTransport`] in tests.
//!
//! # Example
//!
//! ```no_run
//! use bfx_rest::transport::{HttpRequest, HttpTransport, ReqwestTransport};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::new("bfx-rest/0.1.0")?;
//! let response = transport
//!     .send(
//!         HttpRequest::get("https://api.bitfinex.com/v2/platform/status"),
//!         Duration::from_secs(15),
//!     )
//!     .await?;
//! println!("{} {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Transport layer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Request did not complete within the deadline
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Could not build the underlying client
    #[error("client setup failed: {0}")]
    Setup(String),

    /// Connection or protocol failure before a status was received
    #[error("request failed: {0}")]
    Request(String),

    /// Response arrived but its body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// One outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// GET with no headers or body
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// POST with a body
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header with this name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response; the body is always read as text first
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    /// Build a response with the canonical reason phrase for `status`
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

/// Trait for HTTP transport abstraction
///
/// Implementations should honour `timeout` themselves where they can; the
/// dispatcher also enforces it by dropping the future when it elapses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one request
    async fn send(
        &self,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

/// Default transport using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given user agent
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client (e.g., one configured with a proxy)
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(
        &self,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Request(e.to_string())
            }
        };

        let response = builder.timeout(timeout).send().await.map_err(map_err)?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Body(e.to_string())
            }
        })?;

        debug!(status = status.as_u16(), len = body.len(), "response received");

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

/// Canned outcome for [`MockTransport`]
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Respond with this status and body
    Respond(HttpResponse),
    /// Fail at the transport level
    Fail(TransportError),
    /// Never complete; exercises the dispatcher deadline
    Hang,
}

/// Mock transport for testing
///
/// Allows injecting predefined responses and capturing sent requests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: parking_lot::Mutex<std::collections::VecDeque<MockReply>>,
    requests: parking_lot::Mutex<Vec<HttpRequest>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Create a new mock transport with no queued replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a status and raw body
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.replies
            .lock()
            .push_back(MockReply::Respond(HttpResponse::new(status, body)));
    }

    /// Queue a 200 response carrying `value` as JSON
    pub fn push_json(&self, value: serde_json::Value) {
        self.push_response(200, value.to_string());
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: TransportError) {
        self.replies.lock().push_back(MockReply::Fail(error));
    }

    /// Queue a request that never completes
    pub fn push_hang(&self) {
        self.replies.lock().push_back(MockReply::Hang);
    }

    /// Number of requests sent so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Copies of every request sent so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(
        &self,
        request: HttpRequest,
        _timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request);
        let reply = self.replies.lock().pop_front();
        match reply {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(error)) => Err(error),
            Some(MockReply::Hang) => std::future::pending().await,
            None => Err(TransportError::Request("no mock reply queued".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let req = HttpRequest::post("https://x/v2/calc", "{}").header("Content-Type", "application/json");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some("{}"));
        assert_eq!(HttpRequest::get("https://x").body, None);
    }

    #[test]
    fn test_response_status() {
        let ok = HttpResponse::new(200, "[]");
        assert!(ok.is_success());
        assert_eq!(ok.status_text, "OK");

        let bad = HttpResponse::new(502, "Bad Gateway");
        assert!(!bad.is_success());
        assert_eq!(bad.status_text, "Bad Gateway");
    }

    #[tokio::test]
    async fn test_mock_transport_replies_in_order() {
        let transport = MockTransport::new();
        transport.push_response(200, "[1]");
        transport.push_error(TransportError::Request("boom".into()));

        let first = transport
            .send(HttpRequest::get("https://mock/a"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(first.body, "[1]");

        let second = transport
            .send(HttpRequest::get("https://mock/b"), Duration::from_secs(1))
            .await;
        assert_eq!(second, Err(TransportError::Request("boom".into())));

        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.last_request().unwrap().url, "https://mock/b");
    }

    #[tokio::test]
    async fn test_mock_transport_empty_queue() {
        let transport = MockTransport::new();
        let result = transport
            .send(HttpRequest::get("https://mock"), Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(TransportError::Request(_))));
    }
}
