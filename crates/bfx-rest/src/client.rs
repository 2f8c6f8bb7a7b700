//! Main REST client implementation

use bfx_types::{Candle, CurrencyListing, Decimal, FundingTicker, Ticker, Wallet};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::config::{ClientConfig, DEFAULT_USER_AGENT};
use crate::endpoints::market::{AvgPrice, CandleQuery, CandleSection, PlatformStatus};
use crate::endpoints::{AccountEndpoints, ConfEndpoints, MarketEndpoints};
use crate::error::{RestError, RestResult};
use crate::request::RequestDispatcher;
use crate::transform::{Transformed, Transformer};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Bitfinex REST API client
///
/// Cheap to clone; clones share one dispatcher and nonce source.
///
/// # Example
///
/// ```no_run
/// use bfx_rest::{BitfinexRestClient, ClientConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Public endpoints only
///     let client = BitfinexRestClient::public()?;
///     let status = client.platform_status().await?;
///
///     // With authentication for private endpoints
///     let auth_client = BitfinexRestClient::new(ClientConfig::from_env()?.with_transform(true))?;
///     let wallets = auth_client.wallets().await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BitfinexRestClient {
    dispatcher: Arc<RequestDispatcher>,
}

impl BitfinexRestClient {
    /// Create a client from a configuration
    ///
    /// The configuration is checked here, before any request is made.
    pub fn new(mut config: ClientConfig) -> RestResult<Self> {
        config.validate()?;

        let transport: Arc<dyn HttpTransport> = match config.transport.take() {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(
                config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
            )?),
        };

        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            transform = config.transform,
            authenticated = config.credentials.is_complete(),
            "Created Bitfinex REST client"
        );

        Ok(Self {
            dispatcher: Arc::new(RequestDispatcher::new(config, transport)?),
        })
    }

    /// Create a client without credentials
    ///
    /// Only public endpoints will be available.
    pub fn public() -> RestResult<Self> {
        Self::new(ClientConfig::default())
    }

    /// Create a client configured from `BFX_*` environment variables
    pub fn from_env() -> RestResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Check if the client has credentials for private endpoints
    pub fn has_credentials(&self) -> bool {
        self.dispatcher.has_credentials()
    }

    /// The underlying dispatcher
    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    // ========================================================================
    // Call primitives
    // ========================================================================

    /// Unauthenticated GET against any v2 path
    pub async fn public_get<T>(&self, path: &str, transformer: &Transformer<T>) -> RestResult<Transformed<T>> {
        self.dispatcher.public_get(path, transformer).await
    }

    /// Unauthenticated POST against any v2 path
    pub async fn public_post<B, T>(
        &self,
        path: &str,
        body: &B,
        transformer: &Transformer<T>,
    ) -> RestResult<Transformed<T>>
    where
        B: Serialize + ?Sized,
    {
        self.dispatcher.public_post(path, body, transformer).await
    }

    /// Authenticated POST against any v2 path
    pub async fn auth_post<B, T>(
        &self,
        path: &str,
        body: &B,
        transformer: &Transformer<T>,
    ) -> RestResult<Transformed<T>>
    where
        B: Serialize + ?Sized,
    {
        self.dispatcher.auth_post(path, body, transformer).await
    }

    /// Apply a transformer to a payload fetched elsewhere
    pub fn transform<T>(&self, data: Value, transformer: &Transformer<T>) -> RestResult<Transformed<T>> {
        self.dispatcher.transform(data, transformer)
    }

    // ========================================================================
    // Public Endpoints
    // ========================================================================

    /// Get market endpoints
    pub fn market(&self) -> MarketEndpoints<'_> {
        MarketEndpoints::new(&self.dispatcher)
    }

    /// Get config endpoints
    pub fn conf(&self) -> ConfEndpoints<'_> {
        ConfEndpoints::new(&self.dispatcher)
    }

    /// Get platform status
    pub async fn platform_status(&self) -> RestResult<Transformed<PlatformStatus>> {
        self.market().platform_status().await
    }

    /// Get ticker for a symbol
    ///
    /// # Arguments
    /// * `symbol` - Trading symbol (e.g., "tBTCUSD")
    pub async fn ticker(&self, symbol: &str) -> RestResult<Transformed<Ticker>> {
        self.market().ticker(symbol).await
    }

    /// Get tickers for several symbols
    pub async fn tickers(&self, symbols: &[&str]) -> RestResult<Transformed<Ticker>> {
        self.market().tickers(symbols).await
    }

    /// Get ticker for a funding currency (e.g., "fUSD")
    pub async fn funding_ticker(&self, symbol: &str) -> RestResult<Transformed<FundingTicker>> {
        self.market().funding_ticker(symbol).await
    }

    /// Get tickers for several funding currencies
    pub async fn funding_tickers(&self, symbols: &[&str]) -> RestResult<Transformed<FundingTicker>> {
        self.market().funding_tickers(symbols).await
    }

    /// Get candles for a symbol
    pub async fn candles(
        &self,
        symbol: &str,
        timeframe: &str,
        section: CandleSection,
        query: &CandleQuery,
    ) -> RestResult<Transformed<Candle>> {
        self.market().candles(symbol, timeframe, section, query).await
    }

    /// Average execution price for a market order
    pub async fn calc_avg_price(
        &self,
        symbol: &str,
        amount: Decimal,
    ) -> RestResult<Transformed<AvgPrice>> {
        self.market().calc_avg_price(symbol, amount, None, None).await
    }

    /// Get the merged currency table
    pub async fn currencies(&self) -> RestResult<Transformed<CurrencyListing>> {
        self.conf().currencies().await
    }

    // ========================================================================
    // Private Account Endpoints
    // ========================================================================

    /// Get account endpoints (requires credentials)
    pub fn account(&self) -> RestResult<AccountEndpoints<'_>> {
        if !self.has_credentials() {
            return Err(RestError::MissingCredentials);
        }
        Ok(AccountEndpoints::new(&self.dispatcher))
    }

    /// Get wallet balances
    pub async fn wallets(&self) -> RestResult<Transformed<Wallet>> {
        self.account()?.wallets().await
    }

    /// Get user info
    pub async fn user_info(&self) -> RestResult<Transformed<Value>> {
        self.account()?.user_info().await
    }
}

impl std::fmt::Debug for BitfinexRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitfinexRestClient")
            .field("base_url", &self.dispatcher.base_url())
            .field("has_credentials", &self.has_credentials())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn mocked(config: ClientConfig) -> BitfinexRestClient {
        BitfinexRestClient::new(config.with_transport(Arc::new(MockTransport::new()))).unwrap()
    }

    #[test]
    fn test_client_without_credentials() {
        let client = mocked(ClientConfig::new());
        assert!(!client.has_credentials());
    }

    #[test]
    fn test_zero_timeout_fails_construction() {
        let result = BitfinexRestClient::new(ClientConfig::new().with_timeout_ms(0));
        assert!(matches!(result, Err(RestError::InvalidArgument(_))));
    }

    #[test]
    fn test_auth_required_error() {
        let client = mocked(ClientConfig::new());
        let result = client.account();
        assert!(matches!(result, Err(RestError::MissingCredentials)));
    }

    #[test]
    fn test_token_counts_as_credentials() {
        let client = mocked(ClientConfig::new().with_auth_token("tok"));
        assert!(client.has_credentials());
        assert!(client.account().is_ok());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let client = mocked(ClientConfig::new().with_api_key_secret("key", "hidden-secret"));
        let debug = format!("{:?}", client);
        assert!(debug.contains("has_credentials: true"));
        assert!(!debug.contains("hidden-secret"));
    }
}
