//! Error types for REST API operations

use bfx_auth::AuthError;
use bfx_types::error_codes::{BitfinexErrorCode, NONCE_TOO_SMALL_CODE, RATE_LIMIT_DETAIL};
use bfx_types::TransformError;
use serde_json::Value;
use std::time::Duration;

use crate::transport::TransportError;

/// Appended to nonce rejections so users find the fix
pub const NONCE_HELP: &str =
    "see https://github.com/bitfinexcom/bitfinex-api-node/blob/master/README.md#nonce-too-small for help";

/// A failed HTTP exchange, classified from status and raw body
///
/// `code` is only set when the body is the exchange's `[type, code, detail]`
/// triple, in which case `response` holds the detail. Otherwise `response`
/// holds the parsed JSON body, or the raw text when it is not JSON.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub code: Option<i64>,
    pub response: Option<Value>,
}

impl ApiError {
    /// Classify a non-success HTTP response
    pub fn from_http(status: u16, status_text: &str, body: &str) -> Self {
        let mut error = Self {
            message: format!("HTTP code {} {}", status, status_text),
            status: Some(status),
            status_text: Some(status_text.to_string()),
            code: None,
            response: None,
        };

        match serde_json::from_str::<Value>(body) {
            Err(_) => error.response = Some(Value::String(body.to_string())),
            Ok(Value::Array(mut triple)) if triple.len() >= 3 => {
                error.code = code_from_value(&triple[1]);
                error.response = Some(triple.swap_remove(2));
            }
            Ok(parsed) => error.response = Some(parsed),
        }

        error
    }

    /// Known exchange code, if `code` maps onto one
    pub fn error_code(&self) -> Option<BitfinexErrorCode> {
        self.code.and_then(BitfinexErrorCode::from_code)
    }

    /// Whether this is a "nonce too small" rejection
    pub fn is_nonce_too_small(&self) -> bool {
        if self.code == Some(NONCE_TOO_SMALL_CODE) {
            return true;
        }
        if self.message.contains("nonce: small") {
            return true;
        }
        matches!(&self.response, Some(Value::String(detail)) if detail.contains("nonce: small"))
    }

    /// Whether the exchange throttled this request
    pub fn is_rate_limited(&self) -> bool {
        self.error_code().is_some_and(|c| c.is_rate_limit())
            || matches!(&self.response, Some(Value::String(d)) if d == RATE_LIMIT_DETAIL)
            || self.status == Some(429)
    }

    /// Append the nonce help pointer when this is a nonce rejection
    pub fn with_nonce_help(mut self) -> Self {
        if self.is_nonce_too_small() && !self.message.contains(NONCE_HELP) {
            self.message = format!("{} {}", self.message, NONCE_HELP);
        }
        self
    }
}

fn code_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Private endpoint called without a key/secret pair or auth token
    #[error("missing api key or secret")]
    MissingCredentials,

    /// Invalid call-site usage or configuration
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Request exceeded the configured deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Server answered with a non-success status
    #[error(transparent)]
    Api(ApiError),

    /// Success status with a body that is not JSON
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String, body: String },

    /// A registered transformer failed
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),

    /// No HTTP status was received
    #[error("Network error: {0}")]
    Network(TransportError),

    /// Credential or signing failure
    #[error("Auth error: {0}")]
    Auth(AuthError),
}

impl From<TransportError> for RestError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(after) => Self::Timeout(after),
            other => Self::Network(other),
        }
    }
}

impl From<AuthError> for RestError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => Self::MissingCredentials,
            other => Self::Auth(other),
        }
    }
}

impl From<ApiError> for RestError {
    fn from(err: ApiError) -> Self {
        Self::Api(err.with_nonce_help())
    }
}

impl RestError {
    /// The classified HTTP failure, if this is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status, for HTTP failures
    pub fn status(&self) -> Option<u16> {
        self.api_error().and_then(|e| e.status)
    }

    /// Exchange error code, for HTTP failures with an error triple
    pub fn code(&self) -> Option<i64> {
        self.api_error().and_then(|e| e.code)
    }

    /// Check if this is a "nonce too small" rejection
    pub fn is_nonce_too_small(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_nonce_too_small)
    }

    /// Check if this error indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_rate_limited)
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;
