//! Public market data endpoints
//!
//! These endpoints don't require authentication.

use bfx_types::{value_to_decimal, Candle, FundingTicker, Symbol, SymbolKind, Ticker, TransformError};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::with_query;
use crate::error::{RestError, RestResult};
use crate::request::RequestDispatcher;
use crate::transform::{Transformed, Transformer};

/// Whether the platform is accepting traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformStatus {
    Operative,
    Maintenance,
}

impl PlatformStatus {
    pub fn is_operative(&self) -> bool {
        matches!(self, Self::Operative)
    }
}

/// Which part of a candle series to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleSection {
    /// Most recent candle only (a single flat row)
    Last,
    /// Historical candles (one row per candle)
    Hist,
}

impl CandleSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last => "last",
            Self::Hist => "hist",
        }
    }
}

/// Optional filters for candle history
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandleQuery {
    /// Millisecond timestamp to start from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    /// Millisecond timestamp to end at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    /// Max number of candles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// 1 for oldest first, -1 for newest first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<i8>,
}

/// Result of the average execution price calculation
#[derive(Debug, Clone, PartialEq)]
pub struct AvgPrice {
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Serialize)]
struct AvgPriceBody<'a> {
    symbol: &'a str,
    amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_limit: Option<Decimal>,
}

fn parse_platform_status(data: Value) -> Result<PlatformStatus, TransformError> {
    match data.get(0).and_then(Value::as_i64) {
        Some(1) => Ok(PlatformStatus::Operative),
        Some(0) => Ok(PlatformStatus::Maintenance),
        _ => Err(TransformError::InvalidField {
            field: "STATUS",
            reason: format!("unexpected platform status payload {}", data),
        }),
    }
}

fn parse_avg_price(data: Value) -> Result<AvgPrice, TransformError> {
    let missing = |field| TransformError::InvalidField {
        field,
        reason: "missing".to_string(),
    };

    let price = value_to_decimal("RATE_AVG", data.get(0).unwrap_or(&Value::Null))?
        .ok_or_else(|| missing("RATE_AVG"))?;
    let amount = value_to_decimal("AMOUNT", data.get(1).unwrap_or(&Value::Null))?
        .ok_or_else(|| missing("AMOUNT"))?;

    Ok(AvgPrice { price, amount })
}

/// Reject symbols that don't parse or belong to the other market kind
///
/// Trading and funding tickers share a path but not a row layout.
fn check_symbol_kind(symbol: &str, expected: SymbolKind) -> RestResult<()> {
    let parsed: Symbol = symbol
        .parse::<Symbol>()
        .map_err(|e| RestError::InvalidArgument(e.to_string()))?;
    match parsed.kind() {
        Some(kind) if kind == expected => Ok(()),
        _ => Err(RestError::InvalidArgument(format!(
            "expected a {:?} symbol, got {}",
            expected, symbol
        ))),
    }
}

/// Public market data endpoints
pub struct MarketEndpoints<'a> {
    dispatcher: &'a RequestDispatcher,
}

impl<'a> MarketEndpoints<'a> {
    pub fn new(dispatcher: &'a RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Get platform status
    #[instrument(skip(self))]
    pub async fn platform_status(&self) -> RestResult<Transformed<PlatformStatus>> {
        debug!("Fetching platform status");
        self.dispatcher
            .public_get("/platform/status", &Transformer::function(parse_platform_status))
            .await
    }

    /// Get ticker for one trading pair
    ///
    /// # Arguments
    /// * `symbol` - Trading symbol (e.g., "tBTCUSD"); funding symbols go to
    ///   [`funding_ticker`](Self::funding_ticker)
    #[instrument(skip(self))]
    pub async fn ticker(&self, symbol: &str) -> RestResult<Transformed<Ticker>> {
        check_symbol_kind(symbol, SymbolKind::Trading)?;
        debug!("Fetching ticker for {}", symbol);
        self.dispatcher
            .public_get(&format!("/ticker/{}", symbol), &Transformer::record())
            .await
    }

    /// Get tickers for several trading pairs
    #[instrument(skip(self))]
    pub async fn tickers(&self, symbols: &[&str]) -> RestResult<Transformed<Ticker>> {
        for symbol in symbols {
            check_symbol_kind(symbol, SymbolKind::Trading)?;
        }
        debug!("Fetching tickers for {} symbols", symbols.len());
        let path = with_query("/tickers", &[("symbols", symbols.join(","))])?;
        self.dispatcher.public_get(&path, &Transformer::record()).await
    }

    /// Get ticker for one funding currency
    ///
    /// # Arguments
    /// * `symbol` - Funding symbol (e.g., "fUSD")
    #[instrument(skip(self))]
    pub async fn funding_ticker(&self, symbol: &str) -> RestResult<Transformed<FundingTicker>> {
        check_symbol_kind(symbol, SymbolKind::Funding)?;
        debug!("Fetching funding ticker for {}", symbol);
        self.dispatcher
            .public_get(&format!("/ticker/{}", symbol), &Transformer::record())
            .await
    }

    /// Get tickers for several funding currencies
    #[instrument(skip(self))]
    pub async fn funding_tickers(&self, symbols: &[&str]) -> RestResult<Transformed<FundingTicker>> {
        for symbol in symbols {
            check_symbol_kind(symbol, SymbolKind::Funding)?;
        }
        debug!("Fetching funding tickers for {} symbols", symbols.len());
        let path = with_query("/tickers", &[("symbols", symbols.join(","))])?;
        self.dispatcher.public_get(&path, &Transformer::record()).await
    }

    /// Get candles
    ///
    /// # Arguments
    /// * `symbol` - Trading symbol (e.g., "tBTCUSD")
    /// * `timeframe` - Candle width (e.g., "1m", "1h", "1D")
    /// * `section` - Latest candle or history
    /// * `query` - History filters
    #[instrument(skip(self, query))]
    pub async fn candles(
        &self,
        symbol: &str,
        timeframe: &str,
        section: CandleSection,
        query: &CandleQuery,
    ) -> RestResult<Transformed<Candle>> {
        let path = with_query(
            &format!("/candles/trade:{}:{}/{}", timeframe, symbol, section.as_str()),
            query,
        )?;
        self.dispatcher.public_get(&path, &Transformer::record()).await
    }

    /// Average execution price for a market order of `amount`
    ///
    /// Negative amounts are sells.
    #[instrument(skip(self))]
    pub async fn calc_avg_price(
        &self,
        symbol: &str,
        amount: Decimal,
        period: Option<u32>,
        rate_limit: Option<Decimal>,
    ) -> RestResult<Transformed<AvgPrice>> {
        let body = AvgPriceBody {
            symbol,
            amount,
            period,
            rate_limit,
        };
        self.dispatcher
            .public_post("/calc/trade/avg", &body, &Transformer::function(parse_avg_price))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_platform_status() {
        assert_eq!(parse_platform_status(json!([1])).unwrap(), PlatformStatus::Operative);
        assert_eq!(parse_platform_status(json!([0])).unwrap(), PlatformStatus::Maintenance);
        assert!(parse_platform_status(json!({})).is_err());
    }

    #[test]
    fn test_parse_avg_price() {
        let avg = parse_avg_price(json!([10650.5, 1.25])).unwrap();
        assert_eq!(avg.price, dec!(10650.5));
        assert_eq!(avg.amount, dec!(1.25));
        assert!(parse_avg_price(json!([1])).is_err());
    }

    #[test]
    fn test_check_symbol_kind() {
        assert!(check_symbol_kind("tBTCUSD", SymbolKind::Trading).is_ok());
        assert!(check_symbol_kind("fUSD", SymbolKind::Funding).is_ok());
        assert!(matches!(
            check_symbol_kind("fUSD", SymbolKind::Trading),
            Err(RestError::InvalidArgument(_))
        ));
        assert!(matches!(
            check_symbol_kind("BTCUSD", SymbolKind::Trading),
            Err(RestError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_candle_query_encoding() {
        let query = CandleQuery {
            limit: Some(2),
            sort: Some(-1),
            ..Default::default()
        };
        assert_eq!(
            with_query("/candles/trade:1m:tBTCUSD/hist", &query).unwrap(),
            "/candles/trade:1m:tBTCUSD/hist?limit=2&sort=-1"
        );
    }
}
