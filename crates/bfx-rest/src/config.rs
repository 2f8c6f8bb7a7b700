//! Client configuration

use bfx_auth::{Credentials, NonceSource};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{RestError, RestResult};
use crate::transport::HttpTransport;

/// Production REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.bitfinex.com";

/// Default request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Default user agent for the reqwest transport
pub const DEFAULT_USER_AGENT: &str = concat!("bfx-rest/", env!("CARGO_PKG_VERSION"));

/// Client configuration
///
/// Read-only once handed to [`BitfinexRestClient::new`](crate::BitfinexRestClient::new).
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL, without the `/v2` suffix
    pub base_url: String,
    /// Key/secret pair and/or auth token
    pub credentials: Credentials,
    /// Per-request deadline in milliseconds; must be positive
    pub timeout_ms: u64,
    /// Run payloads through the per-call transformer
    pub transform: bool,
    /// Custom user agent for the default transport
    pub user_agent: Option<String>,
    /// Replacement transport (proxying, testing)
    pub transport: Option<Arc<dyn HttpTransport>>,
    /// Replacement nonce source
    pub nonce_source: Option<Arc<dyn NonceSource>>,
    /// Allow one authenticated request in flight at a time
    pub serialize_auth: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            transform: false,
            user_agent: None,
            transport: None,
            nonce_source: None,
            serialize_auth: false,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables
    ///
    /// Credentials come from [`Credentials::from_env`]; missing credentials
    /// are not an error. `BFX_REST_URL` overrides the base URL and
    /// `BFX_TIMEOUT_MS` the timeout.
    pub fn from_env() -> RestResult<Self> {
        let mut config = Self::default().with_credentials(Credentials::from_env().unwrap_or_default());

        if let Ok(url) = std::env::var("BFX_REST_URL") {
            config.base_url = url;
        }
        if let Ok(raw) = std::env::var("BFX_TIMEOUT_MS") {
            config.timeout_ms = parse_timeout_ms(&raw)?;
        }

        Ok(config)
    }

    /// Set base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set API key and secret
    pub fn with_api_key_secret(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.credentials = self.credentials.with_key_secret(api_key, api_secret);
        self
    }

    /// Set auth token (used in place of key + signature)
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.credentials = self.credentials.with_auth_token(token);
        self
    }

    /// Set timeout in milliseconds
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Enable or disable response transformation
    pub fn with_transform(mut self, transform: bool) -> Self {
        self.transform = transform;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a custom transport
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom nonce source
    pub fn with_nonce_source(mut self, source: Arc<dyn NonceSource>) -> Self {
        self.nonce_source = Some(source);
        self
    }

    /// Serialize authenticated requests (nonce issue through response)
    pub fn with_serialized_auth(mut self, serialize: bool) -> Self {
        self.serialize_auth = serialize;
        self
    }

    /// Timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check the configuration; called on client construction
    pub fn validate(&self) -> RestResult<()> {
        if self.timeout_ms == 0 {
            return Err(RestError::InvalidArgument(
                "timeout must be a positive integer number of milliseconds".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(RestError::InvalidArgument("base URL must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Parse a timeout given as text; only positive integers are accepted
pub fn parse_timeout_ms(raw: &str) -> RestResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(RestError::InvalidArgument(format!(
            "timeout must be a positive integer number of milliseconds, got {:?}",
            raw
        ))),
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("timeout_ms", &self.timeout_ms)
            .field("transform", &self.transform)
            .field("user_agent", &self.user_agent)
            .field("custom_transport", &self.transport.is_some())
            .field("custom_nonce_source", &self.nonce_source.is_some())
            .field("serialize_auth", &self.serialize_auth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.bitfinex.com");
        assert_eq!(config.timeout_ms, 15_000);
        assert!(!config.transform);
        assert!(!config.serialize_auth);
        assert!(!config.credentials.is_complete());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_base_url("https://test.example")
            .with_api_key_secret("key", "secret")
            .with_timeout_ms(500)
            .with_transform(true)
            .with_user_agent("test-agent");

        assert_eq!(config.base_url, "https://test.example");
        assert_eq!(config.timeout(), Duration::from_millis(500));
        assert!(config.transform);
        assert_eq!(config.user_agent, Some("test-agent".to_string()));
        assert_eq!(config.credentials.api_key(), Some("key"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ClientConfig::new().with_timeout_ms(0).validate().unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout_ms("2500").unwrap(), 2500);
        assert!(parse_timeout_ms("0").is_err());
        assert!(parse_timeout_ms("1.5").is_err());
        assert!(parse_timeout_ms("abc").is_err());
        assert!(parse_timeout_ms("-10").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ClientConfig::new().with_api_key_secret("key", "very-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("very-secret"));
    }
}
