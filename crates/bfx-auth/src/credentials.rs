//! API credentials for Bitfinex private endpoints
//!
//! A client authenticates either with an API key/secret pair (each request
//! is HMAC-signed) or with a pre-issued auth token sent as a bearer header.
//! When both are present the token takes priority.
//!
//! # Security
//!
//! Secrets are stored using the `secrecy` crate which:
//! - Zeroizes memory on drop (prevents memory scanning)
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{AuthError, AuthResult};

/// How a private request will be authenticated
#[derive(Debug, Clone, Copy)]
pub enum AuthMode<'a> {
    /// Bearer token; no signature is computed
    Token(&'a SecretString),
    /// Key header plus HMAC signature
    KeySecret {
        api_key: &'a str,
        api_secret: &'a SecretString,
    },
}

/// API credentials for authenticated requests
///
/// Secrets are automatically zeroized when the Credentials are dropped.
#[derive(Default)]
pub struct Credentials {
    api_key: Option<String>,
    api_secret: Option<SecretString>,
    auth_token: Option<SecretString>,
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Credentials {
    /// Create credentials from an API key and secret
    pub fn from_key_secret(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: non_empty(api_key.into()),
            api_secret: non_empty(api_secret.into()).map(SecretString::from),
            auth_token: None,
        }
    }

    /// Create credentials from an auth token
    pub fn from_token(auth_token: impl Into<String>) -> Self {
        Self {
            api_key: None,
            api_secret: None,
            auth_token: non_empty(auth_token.into()).map(SecretString::from),
        }
    }

    /// Set the key/secret pair, keeping any auth token
    pub fn with_key_secret(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.api_key = non_empty(api_key.into());
        self.api_secret = non_empty(api_secret.into()).map(SecretString::from);
        self
    }

    /// Add an auth token to existing credentials
    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = non_empty(auth_token.into()).map(SecretString::from);
        self
    }

    /// Create credentials from environment variables
    ///
    /// Reads `BFX_AUTH_TOKEN` if set, otherwise `BFX_API_KEY` and `BFX_API_SECRET`.
    pub fn from_env() -> AuthResult<Self> {
        if let Ok(token) = std::env::var("BFX_AUTH_TOKEN") {
            if !token.is_empty() {
                debug!("Loaded auth token from environment");
                return Ok(Self::from_token(token));
            }
        }

        let api_key = std::env::var("BFX_API_KEY")
            .map_err(|_| AuthError::EnvVarNotSet("BFX_API_KEY".to_string()))?;
        let api_secret = std::env::var("BFX_API_SECRET")
            .map_err(|_| AuthError::EnvVarNotSet("BFX_API_SECRET".to_string()))?;

        debug!("Loaded API key and secret from environment");
        Ok(Self::from_key_secret(api_key, api_secret))
    }

    /// Get the API key, if one is set
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Check whether a token is configured
    pub fn has_token(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Resolve which auth mode to use; token first, then key + secret
    pub fn auth_mode(&self) -> AuthResult<AuthMode<'_>> {
        if let Some(token) = &self.auth_token {
            return Ok(AuthMode::Token(token));
        }

        match (&self.api_key, &self.api_secret) {
            (Some(api_key), Some(api_secret)) => Ok(AuthMode::KeySecret {
                api_key,
                api_secret,
            }),
            _ => Err(AuthError::MissingCredentials),
        }
    }

    /// Check if any usable credential is present
    pub fn is_complete(&self) -> bool {
        self.auth_mode().is_ok()
    }
}

impl Clone for Credentials {
    /// Clone credentials (creates new secret boxes with the same content)
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            api_secret: self
                .api_secret
                .as_ref()
                .map(|s| SecretString::from(s.expose_secret().to_string())),
            auth_token: self
                .auth_token
                .as_ref()
                .map(|s| SecretString::from(s.expose_secret().to_string())),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let api_key = self
            .api_key
            .as_ref()
            .map(|k| format!("{}...", &k[..k.char_indices().nth(8).map_or(k.len(), |(i, _)| i)]));

        f.debug_struct("Credentials")
            .field("api_key", &api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
