//! REST API client for the Bitfinex exchange (API v2)
//!
//! Every request goes through one of three call shapes on the
//! [`RequestDispatcher`]: public GET, public POST and authenticated POST.
//! Responses are read as text, non-2xx statuses are classified into
//! [`ApiError`]s, and successful payloads are optionally mapped into typed
//! records by a per-call [`Transformer`].
//!
//! # Features
//!
//! - **Market Data**: Platform status, tickers, candles, average price
//! - **Config**: Merged currency table
//! - **Account**: Wallets, user info
//! - **Primitives**: `public_get`, `public_post`, `auth_post` for any other endpoint
//!
//! # Authentication
//!
//! Private endpoints require either an API key/secret pair or an auth token.
//! Key/secret requests are signed with HMAC-SHA384 over
//! `/api/v2{path}{nonce}{body}`; a token, when present, is sent instead of
//! the key and signature.
//!
//! # Example
//!
//! ```no_run
//! use bfx_rest::{BitfinexRestClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BitfinexRestClient::new(
//!         ClientConfig::new()
//!             .with_api_key_secret("api-key", "api-secret")
//!             .with_transform(true),
//!     )?;
//!
//!     // Public endpoints (no auth required)
//!     let ticker = client.ticker("tBTCUSD").await?;
//!     println!("BTC/USD: {:?}", ticker);
//!
//!     // Private endpoints (auth required)
//!     let wallets = client.wallets().await?;
//!     println!("Wallets: {:?}", wallets);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Nonces
//!
//! The exchange rejects a nonce that is not larger than the last one it saw
//! for the key. Concurrent private calls on one key can therefore arrive out
//! of order; see [`ClientConfig::with_serialized_auth`].

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod transform;
pub mod transport;

// Re-export main types
pub use client::BitfinexRestClient;
pub use config::ClientConfig;
pub use error::{ApiError, RestError, RestResult};
pub use request::RequestDispatcher;
pub use transform::{Transformed, Transformer};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;

// Re-export auth and shared types
pub use bfx_auth::{Credentials, Nonce, NonceSource, TimestampNonce};
pub use bfx_types::{Candle, CurrencyListing, CurrencyRecord, Decimal, FundingTicker, Ticker, Wallet};
