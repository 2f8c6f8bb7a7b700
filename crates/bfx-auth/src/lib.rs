//! Authentication primitives for the Bitfinex REST API v2
//!
//! This crate holds the pieces every private request needs: the credential
//! pair (or auth token), a strictly increasing nonce source, and the
//! HMAC-SHA384 request signer.
//!
//! # Example
//!
//! ```
//! use bfx_auth::{Credentials, NonceSource, RequestSigner, TimestampNonce};
//!
//! let creds = Credentials::from_key_secret("my-key", "my-secret");
//! let nonces = TimestampNonce::new();
//!
//! let signer = RequestSigner::new(&creds).unwrap();
//! let envelope = signer
//!     .envelope("/auth/r/wallets", nonces.next_nonce(), "{}".to_string())
//!     .unwrap();
//! assert_eq!(envelope.signature.len(), 96);
//! ```

mod credentials;
mod error;
mod nonce;
mod signer;

pub use credentials::{AuthMode, Credentials};
pub use error::{AuthError, AuthResult};
pub use nonce::{CounterNonce, Nonce, NonceSource, TimestampNonce};
pub use signer::{canonical_payload, sign, RequestSigner, SignedEnvelope, SIGNATURE_PATH_PREFIX};
