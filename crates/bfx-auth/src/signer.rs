//! Request signing
//!
//! Bitfinex v2 signature algorithm:
//! 1. payload = "/api/v2" + path + nonce + body (no separators)
//! 2. HMAC-SHA384(api_secret, payload)
//! 3. Lowercase hex encode

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha384;
use tracing::trace;

use crate::credentials::{AuthMode, Credentials};
use crate::error::{AuthError, AuthResult};
use crate::nonce::Nonce;

type HmacSha384 = Hmac<Sha384>;

/// Version prefix that leads every signature payload
pub const SIGNATURE_PATH_PREFIX: &str = "/api/v2";

/// Build the string that gets signed for a private call
///
/// `body` must be the exact JSON text sent on the wire.
pub fn canonical_payload(path: &str, nonce: Nonce, body: &str) -> String {
    format!("{}{}{}{}", SIGNATURE_PATH_PREFIX, path, nonce, body)
}

/// HMAC-SHA384 of `payload` keyed by `secret`, lowercase hex
pub fn sign(secret: &[u8], payload: &str) -> AuthResult<String> {
    let mut mac = HmacSha384::new_from_slice(secret)
        .map_err(|e| AuthError::InvalidCredentials(format!("Unusable API secret: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Everything needed to send one signed request; built once per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    /// Endpoint path without the version prefix (e.g., "/auth/r/orders")
    pub path: String,
    /// Nonce used in the signature
    pub nonce: Nonce,
    /// JSON body, exactly as signed
    pub body: String,
    /// Hex signature
    pub signature: String,
}

/// Signs requests with a key/secret pair
#[derive(Debug)]
pub struct RequestSigner<'a> {
    api_key: &'a str,
    api_secret: &'a SecretString,
}

impl<'a> RequestSigner<'a> {
    /// Create a signer; fails unless the credentials carry a key and secret
    ///
    /// Token-only credentials have nothing to sign with.
    pub fn new(credentials: &'a Credentials) -> AuthResult<Self> {
        match credentials.auth_mode()? {
            AuthMode::KeySecret {
                api_key,
                api_secret,
            } => Ok(Self {
                api_key,
                api_secret,
            }),
            AuthMode::Token(_) => Err(AuthError::InvalidCredentials(
                "token credentials cannot sign requests".to_string(),
            )),
        }
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        self.api_key
    }

    /// Sign a canonical payload
    pub fn sign(&self, payload: &str) -> AuthResult<String> {
        sign(self.api_secret.expose_secret().as_bytes(), payload)
    }

    /// Sign one request and bundle the pieces that go on the wire
    pub fn envelope(&self, path: &str, nonce: Nonce, body: String) -> AuthResult<SignedEnvelope> {
        let signature = self.sign(&canonical_payload(path, nonce, &body))?;
        trace!(path, %nonce, "signed request payload");
        Ok(SignedEnvelope {
            path: path.to_string(),
            nonce,
            body,
            signature,
        })
    }
}
