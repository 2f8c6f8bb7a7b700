//! Request dispatch
//!
//! Every endpoint funnels through one of three call shapes:
//! [`RequestDispatcher::public_get`], [`RequestDispatcher::public_post`] and
//! [`RequestDispatcher::auth_post`]. Each one bounds the transport call with
//! the configured timeout, reads the body as text, classifies non-2xx
//! responses into [`ApiError`]s and hands parsed payloads to the transform
//! step.
//!
//! # Nonce ordering
//!
//! Authenticated calls draw a fresh nonce each time, but concurrent calls are
//! not serialized by default: if two race, the server may see the higher
//! nonce first and reject the other with "nonce too small". Callers that
//! issue private calls concurrently either order them themselves or turn on
//! [`ClientConfig::with_serialized_auth`](crate::ClientConfig::with_serialized_auth).

use bfx_auth::{AuthMode, Credentials, NonceSource, RequestSigner, TimestampNonce};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, RestError, RestResult};
use crate::transform::{self, Transformed, Transformer};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Version segment between the base URL and the endpoint path
pub const API_VERSION_PATH: &str = "/v2";

/// Nonce used in the signed payload, as decimal text
pub const HEADER_NONCE: &str = "bfx-nonce";
/// API key of a key/secret request
pub const HEADER_API_KEY: &str = "bfx-apikey";
/// Lowercase hex HMAC-SHA384 of the signed payload
pub const HEADER_SIGNATURE: &str = "bfx-signature";
/// Auth token, sent instead of the key and signature
pub const HEADER_TOKEN: &str = "bfx-token";
/// Content type of every request body
pub const HEADER_CONTENT_TYPE: &str = "content-type";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Orchestrates single HTTP calls against the v2 API
///
/// Immutable after construction and safe to share between tasks.
pub struct RequestDispatcher {
    base_url: String,
    credentials: Credentials,
    timeout: Duration,
    transform: bool,
    transport: Arc<dyn HttpTransport>,
    nonce: Arc<dyn NonceSource>,
    auth_lock: Option<Mutex<()>>,
}

impl RequestDispatcher {
    /// Build from a configuration and the transport to use
    ///
    /// Fails with `InvalidArgument` when the configuration doesn't validate.
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> RestResult<Self> {
        config.validate()?;
        let timeout = config.timeout();
        let nonce: Arc<dyn NonceSource> = match config.nonce_source {
            Some(source) => source,
            None => Arc::new(TimestampNonce::new()),
        };

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials,
            timeout,
            transform: config.transform,
            transport,
            nonce,
            auth_lock: config.serialize_auth.then(|| Mutex::new(())),
        })
    }

    /// Full URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_VERSION_PATH, path)
    }

    /// Base URL without the version segment
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether payloads go through their transformer
    pub fn transform_enabled(&self) -> bool {
        self.transform
    }

    /// Whether private calls can be authenticated
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_complete()
    }

    /// Unauthenticated GET
    #[instrument(skip(self, transformer))]
    pub async fn public_get<T>(
        &self,
        path: &str,
        transformer: &Transformer<T>,
    ) -> RestResult<Transformed<T>> {
        check_path(path)?;

        let data = self.execute(HttpRequest::get(self.url(path))).await?;
        self.transform(data, transformer)
    }

    /// Unauthenticated POST with a JSON body
    #[instrument(skip(self, body, transformer))]
    pub async fn public_post<B, T>(
        &self,
        path: &str,
        body: &B,
        transformer: &Transformer<T>,
    ) -> RestResult<Transformed<T>>
    where
        B: Serialize + ?Sized,
    {
        check_path(path)?;

        let payload = encode_body(body, false)?;
        let request = HttpRequest::post(self.url(path), payload)
            .header(HEADER_CONTENT_TYPE, JSON_CONTENT_TYPE);

        let data = self.execute(request).await?;
        self.transform(data, transformer)
    }

    /// Signed (or token-authenticated) POST
    ///
    /// Fails with [`RestError::MissingCredentials`] before touching the
    /// network when neither a key/secret pair nor a token is configured.
    /// Top-level `null` fields are dropped from `body` before signing.
    #[instrument(skip(self, body, transformer))]
    pub async fn auth_post<B, T>(
        &self,
        path: &str,
        body: &B,
        transformer: &Transformer<T>,
    ) -> RestResult<Transformed<T>>
    where
        B: Serialize + ?Sized,
    {
        check_path(path)?;

        let mode = self.credentials.auth_mode()?;
        let payload = encode_body(body, true)?;

        let guard = match &self.auth_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let nonce = self.nonce.next_nonce();
        let request = match mode {
            AuthMode::Token(token) => HttpRequest::post(self.url(path), payload)
                .header(HEADER_NONCE, nonce.to_string())
                .header(HEADER_TOKEN, token.expose_secret()),
            AuthMode::KeySecret { .. } => {
                let signer = RequestSigner::new(&self.credentials)?;
                let envelope = signer.envelope(path, nonce, payload)?;
                HttpRequest::post(self.url(path), envelope.body)
                    .header(HEADER_NONCE, envelope.nonce.to_string())
                    .header(HEADER_API_KEY, signer.api_key())
                    .header(HEADER_SIGNATURE, envelope.signature)
            }
        }
        .header(HEADER_CONTENT_TYPE, JSON_CONTENT_TYPE);

        debug!(%nonce, "authenticated request prepared");

        let result = self.execute(request).await;
        drop(guard);

        self.transform(result?, transformer)
    }

    /// Run `data` through `transformer`, honouring the client's transform flag
    pub fn transform<T>(&self, data: Value, transformer: &Transformer<T>) -> RestResult<Transformed<T>> {
        transform::apply(data, transformer, self.transform).map_err(|e| {
            warn!(error = %e, "transform failed");
            RestError::Transform(e)
        })
    }

    async fn execute(&self, request: HttpRequest) -> RestResult<Value> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let sent = tokio::time::timeout(self.timeout, self.transport.send(request, self.timeout)).await;
        let response = match sent {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, "transport failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "request timed out");
                return Err(RestError::Timeout(self.timeout));
            }
        };

        debug!(status = response.status, len = response.body.len(), "response received");
        parse_response(response)
    }
}

/// Classify a raw response into a payload or an error
fn parse_response(response: HttpResponse) -> RestResult<Value> {
    if !response.is_success() {
        let error = ApiError::from_http(response.status, &response.status_text, &response.body);
        warn!(status = response.status, code = ?error.code, "request rejected");
        return Err(error.into());
    }

    match serde_json::from_str(&response.body) {
        Ok(value) => Ok(value),
        Err(e) => Err(RestError::InvalidResponse {
            message: e.to_string(),
            body: response.body,
        }),
    }
}

fn check_path(path: &str) -> RestResult<()> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(RestError::InvalidArgument(format!(
            "endpoint path must start with '/', got {:?}",
            path
        )))
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B, strip_nulls: bool) -> RestResult<String> {
    let mut value = serde_json::to_value(body)
        .map_err(|e| RestError::InvalidArgument(format!("request body is not serializable: {}", e)))?;
    if strip_nulls {
        strip_nil_fields(&mut value);
    }
    serde_json::to_string(&value)
        .map_err(|e| RestError::InvalidArgument(format!("request body is not serializable: {}", e)))
}

/// Drop top-level `null` fields from an object; empty strings stay
pub fn strip_nil_fields(value: &mut Value) {
    if let Value::Object(fields) = value {
        fields.retain(|_, v| !v.is_null());
    }
}

impl fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .field("transform", &self.transform)
            .field("serialize_auth", &self.auth_lock.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn dispatcher(config: ClientConfig) -> (RequestDispatcher, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        (RequestDispatcher::new(config, mock.clone()).unwrap(), mock)
    }

    #[test]
    fn test_url_building() {
        let (d, _) = dispatcher(ClientConfig::new().with_base_url("https://api.example/"));
        assert_eq!(d.url("/platform/status"), "https://api.example/v2/platform/status");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mock = Arc::new(MockTransport::new());
        let err = RequestDispatcher::new(ClientConfig::new().with_timeout_ms(0), mock.clone())
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));

        let err = RequestDispatcher::new(ClientConfig::new().with_base_url(""), mock).unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }

    #[test]
    fn test_strip_nil_fields() {
        let mut body = json!({"a": null, "b": "", "c": 0, "d": {"e": null}});
        strip_nil_fields(&mut body);
        assert_eq!(body, json!({"b": "", "c": 0, "d": {"e": null}}));

        let mut not_object = json!([null]);
        strip_nil_fields(&mut not_object);
        assert_eq!(not_object, json!([null]));
    }

    #[tokio::test]
    async fn test_relative_path_rejected() {
        let (d, mock) = dispatcher(ClientConfig::new());
        let err = d.public_get("platform/status", &Transformer::none()).await.unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_short_circuits() {
        let (d, mock) = dispatcher(ClientConfig::new());
        let err = d
            .auth_post("/auth/r/wallets", &json!({}), &Transformer::none())
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::MissingCredentials));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_public_get_has_no_auth_headers() {
        let (d, mock) = dispatcher(ClientConfig::new().with_api_key_secret("key", "secret"));
        mock.push_json(json!([1]));

        let out = d.public_get("/platform/status", &Transformer::none()).await.unwrap();
        assert_eq!(out, Transformed::Raw(json!([1])));

        let request = mock.last_request().unwrap();
        assert_eq!(request.url, "https://api.bitfinex.com/v2/platform/status");
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_public_post_keeps_nulls() {
        let (d, mock) = dispatcher(ClientConfig::new());
        mock.push_json(json!([1.5, 2]));

        d.public_post("/calc/trade/avg", &json!({"symbol": "tBTCUSD", "rate": null}), &Transformer::none())
            .await
            .unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.body.as_deref(), Some(r#"{"rate":null,"symbol":"tBTCUSD"}"#));
        assert_eq!(request.header_value(HEADER_CONTENT_TYPE), Some("application/json"));
        assert!(request.header_value(HEADER_NONCE).is_none());
    }
}
