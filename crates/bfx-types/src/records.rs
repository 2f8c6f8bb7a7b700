//! Typed records for common positional payloads

use crate::error::TransformError;
use crate::row::{FromRow, Row, RowSchema};
use crate::symbol::{Symbol, SymbolKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Schemas
// ============================================================================

/// `GET /ticker/t{PAIR}`
pub static TRADING_TICKER_SCHEMA: RowSchema = RowSchema::new(
    "TradingTicker",
    &[
        "BID",
        "BID_SIZE",
        "ASK",
        "ASK_SIZE",
        "DAILY_CHANGE",
        "DAILY_CHANGE_RELATIVE",
        "LAST_PRICE",
        "VOLUME",
        "HIGH",
        "LOW",
    ],
);

/// `GET /tickers?symbols=...` rows, which lead with the symbol
pub static TICKER_SCHEMA: RowSchema = RowSchema::new(
    "Ticker",
    &[
        "SYMBOL",
        "BID",
        "BID_SIZE",
        "ASK",
        "ASK_SIZE",
        "DAILY_CHANGE",
        "DAILY_CHANGE_RELATIVE",
        "LAST_PRICE",
        "VOLUME",
        "HIGH",
        "LOW",
    ],
);

/// `GET /ticker/f{CURRENCY}`
pub static FUNDING_TICKER_SCHEMA: RowSchema = RowSchema::new(
    "FundingTicker",
    &[
        "FRR",
        "BID",
        "BID_PERIOD",
        "BID_SIZE",
        "ASK",
        "ASK_PERIOD",
        "ASK_SIZE",
        "DAILY_CHANGE",
        "DAILY_CHANGE_RELATIVE",
        "LAST_PRICE",
        "VOLUME",
        "HIGH",
        "LOW",
        "_PLACEHOLDER",
        "_PLACEHOLDER",
        "FRR_AMOUNT_AVAILABLE",
    ],
);

/// `GET /tickers?symbols=f...` rows, which lead with the symbol
pub static FUNDING_TICKERS_SCHEMA: RowSchema = RowSchema::new(
    "FundingTickers",
    &[
        "SYMBOL",
        "FRR",
        "BID",
        "BID_PERIOD",
        "BID_SIZE",
        "ASK",
        "ASK_PERIOD",
        "ASK_SIZE",
        "DAILY_CHANGE",
        "DAILY_CHANGE_RELATIVE",
        "LAST_PRICE",
        "VOLUME",
        "HIGH",
        "LOW",
        "_PLACEHOLDER",
        "_PLACEHOLDER",
        "FRR_AMOUNT_AVAILABLE",
    ],
);

/// `GET /candles/trade:{TF}:{SYMBOL}/hist`
pub static CANDLE_SCHEMA: RowSchema = RowSchema::new(
    "Candle",
    &["MTS", "OPEN", "CLOSE", "HIGH", "LOW", "VOLUME"],
);

/// `POST /auth/r/wallets`
pub static WALLET_SCHEMA: RowSchema = RowSchema::new(
    "Wallet",
    &[
        "WALLET_TYPE",
        "CURRENCY",
        "BALANCE",
        "UNSETTLED_INTEREST",
        "BALANCE_AVAILABLE",
        "DESCRIPTION",
        "META",
    ],
);

fn required(row: &Row, field: &'static str) -> Result<Decimal, TransformError> {
    row.decimal(field)?.ok_or(TransformError::InvalidField {
        field,
        reason: "missing".to_string(),
    })
}

fn required_u64(row: &Row, field: &'static str) -> Result<u64, TransformError> {
    row.u64(field)?.ok_or(TransformError::InvalidField {
        field,
        reason: "missing".to_string(),
    })
}

/// Symbol leading a `/tickers` row, checked against the expected market kind
fn leading_symbol(row: &[Value], expected: SymbolKind) -> Result<Option<Symbol>, TransformError> {
    let Some(Value::String(s)) = row.first() else {
        return Ok(None);
    };
    let symbol = s.parse::<Symbol>().map_err(|e| TransformError::InvalidField {
        field: "SYMBOL",
        reason: e.to_string(),
    })?;
    if symbol.kind() != Some(expected) {
        return Err(TransformError::InvalidField {
            field: "SYMBOL",
            reason: format!("expected a {:?} symbol, got {}", expected, symbol),
        });
    }
    Ok(Some(symbol))
}

// ============================================================================
// Ticker
// ============================================================================

/// Trading pair ticker
///
/// Built from either the single-ticker row (no symbol) or a `/tickers` row
/// that leads with the symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: Option<Symbol>,
    pub bid: Decimal,
    pub bid_size: Decimal,
    pub ask: Decimal,
    pub ask_size: Decimal,
    pub daily_change: Decimal,
    pub daily_change_relative: Decimal,
    pub last_price: Decimal,
    pub volume: Decimal,
    pub high: Decimal,
    pub low: Decimal,
}

impl Ticker {
    /// Mid price (average of bid and ask)
    pub fn mid_price(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    /// Spread (ask - bid)
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

impl FromRow for Ticker {
    fn from_row(row: Vec<Value>) -> Result<Self, TransformError> {
        let symbol = leading_symbol(&row, SymbolKind::Trading)?;
        let row = match symbol {
            Some(_) => Row::new(&TICKER_SCHEMA, row),
            None => Row::new(&TRADING_TICKER_SCHEMA, row),
        };
        row.require_len(row.schema().len())?;

        Ok(Self {
            symbol,
            bid: required(&row, "BID")?,
            bid_size: required(&row, "BID_SIZE")?,
            ask: required(&row, "ASK")?,
            ask_size: required(&row, "ASK_SIZE")?,
            daily_change: required(&row, "DAILY_CHANGE")?,
            daily_change_relative: required(&row, "DAILY_CHANGE_RELATIVE")?,
            last_price: required(&row, "LAST_PRICE")?,
            volume: required(&row, "VOLUME")?,
            high: required(&row, "HIGH")?,
            low: required(&row, "LOW")?,
        })
    }
}

// ============================================================================
// Funding Ticker
// ============================================================================

/// Funding currency ticker
///
/// Rates are daily. Periods are in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingTicker {
    pub symbol: Option<Symbol>,
    /// Flash return rate
    pub frr: Decimal,
    pub bid: Decimal,
    pub bid_period: u64,
    pub bid_size: Decimal,
    pub ask: Decimal,
    pub ask_period: u64,
    pub ask_size: Decimal,
    pub daily_change: Decimal,
    pub daily_change_relative: Decimal,
    pub last_price: Decimal,
    pub volume: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub frr_amount_available: Decimal,
}

impl FromRow for FundingTicker {
    fn from_row(row: Vec<Value>) -> Result<Self, TransformError> {
        let symbol = leading_symbol(&row, SymbolKind::Funding)?;
        let row = match symbol {
            Some(_) => Row::new(&FUNDING_TICKERS_SCHEMA, row),
            None => Row::new(&FUNDING_TICKER_SCHEMA, row),
        };
        row.require_len(row.schema().len())?;

        Ok(Self {
            symbol,
            frr: required(&row, "FRR")?,
            bid: required(&row, "BID")?,
            bid_period: required_u64(&row, "BID_PERIOD")?,
            bid_size: required(&row, "BID_SIZE")?,
            ask: required(&row, "ASK")?,
            ask_period: required_u64(&row, "ASK_PERIOD")?,
            ask_size: required(&row, "ASK_SIZE")?,
            daily_change: required(&row, "DAILY_CHANGE")?,
            daily_change_relative: required(&row, "DAILY_CHANGE_RELATIVE")?,
            last_price: required(&row, "LAST_PRICE")?,
            volume: required(&row, "VOLUME")?,
            high: required(&row, "HIGH")?,
            low: required(&row, "LOW")?,
            frr_amount_available: row.decimal("FRR_AMOUNT_AVAILABLE")?.unwrap_or_default(),
        })
    }
}

// ============================================================================
// Candle
// ============================================================================

/// OHLCV candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Millisecond timestamp of the candle open
    pub mts: u64,
    pub open: Decimal,
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: Decimal,
}

impl FromRow for Candle {
    fn from_row(row: Vec<Value>) -> Result<Self, TransformError> {
        let row = Row::new(&CANDLE_SCHEMA, row);
        row.require_len(CANDLE_SCHEMA.len())?;

        Ok(Self {
            mts: row.u64("MTS")?.ok_or(TransformError::InvalidField {
                field: "MTS",
                reason: "missing".to_string(),
            })?,
            open: required(&row, "OPEN")?,
            close: required(&row, "CLOSE")?,
            high: required(&row, "HIGH")?,
            low: required(&row, "LOW")?,
            volume: required(&row, "VOLUME")?,
        })
    }
}

// ============================================================================
// Wallet
// ============================================================================

/// Account wallet balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// exchange, margin or funding
    pub wallet_type: String,
    pub currency: String,
    pub balance: Decimal,
    pub unsettled_interest: Decimal,
    /// Not computed for every wallet; null until requested
    pub balance_available: Option<Decimal>,
    pub description: Option<String>,
    pub meta: Option<Value>,
}

impl FromRow for Wallet {
    fn from_row(row: Vec<Value>) -> Result<Self, TransformError> {
        let row = Row::new(&WALLET_SCHEMA, row);
        row.require_len(3)?;

        let wallet_type = row.str("WALLET_TYPE").ok_or(TransformError::InvalidField {
            field: "WALLET_TYPE",
            reason: "expected string".to_string(),
        })?;
        let currency = row.str("CURRENCY").ok_or(TransformError::InvalidField {
            field: "CURRENCY",
            reason: "expected string".to_string(),
        })?;

        Ok(Self {
            wallet_type: wallet_type.to_string(),
            currency: currency.to_string(),
            balance: required(&row, "BALANCE")?,
            unsettled_interest: row.decimal("UNSETTLED_INTEREST")?.unwrap_or_default(),
            balance_available: row.decimal("BALANCE_AVAILABLE")?,
            description: row.str("DESCRIPTION").map(str::to_string),
            meta: row.get("META").filter(|v| !v.is_null()).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn as_row(value: Value) -> Vec<Value> {
        value.as_array().unwrap().clone()
    }

    #[test]
    fn test_trading_ticker_without_symbol() {
        let row = as_row(json!([
            10645, 73.93854271, 10647, 75.22266119, 731.60645389, 0.0738, 10644.00645389,
            14480.89849423, 10766, 9889.1449809
        ]));
        let ticker = Ticker::from_row(row).unwrap();
        assert_eq!(ticker.symbol, None);
        assert_eq!(ticker.bid, dec!(10645));
        assert_eq!(ticker.ask, dec!(10647));
        assert_eq!(ticker.spread(), dec!(2));
        assert_eq!(ticker.mid_price(), dec!(10646));
    }

    #[test]
    fn test_ticker_with_symbol() {
        let row = as_row(json!([
            "tBTCUSD", 10645, 73.9, 10647, 75.2, 731.6, 0.0738, 10644.0, 14480.8, 10766, 9889.1
        ]));
        let ticker = Ticker::from_row(row).unwrap();
        assert_eq!(ticker.symbol, Some(Symbol::new("tBTCUSD")));
        assert_eq!(ticker.low, dec!(9889.1));
    }

    #[test]
    fn test_funding_row_is_not_a_trading_ticker() {
        let row = as_row(json!([
            "fUSD", 0.0002, 0.00018, 30, 1000000, 0.0001, 2, 500000, -0.00001, -0.05, 0.00019,
            25000000, 0.00025, 0.00015, null, null, 3500000
        ]));
        let err = Ticker::from_row(row).unwrap_err();
        assert!(matches!(err, TransformError::InvalidField { field: "SYMBOL", .. }));
    }

    #[test]
    fn test_funding_ticker_without_symbol() {
        let row = as_row(json!([
            0.0002, 0.00018, 30, 1000000, 0.0001, 2, 500000, -0.00001, -0.05, 0.00019,
            25000000, 0.00025, 0.00015, null, null, 3500000
        ]));
        let ticker = FundingTicker::from_row(row).unwrap();
        assert_eq!(ticker.symbol, None);
        assert_eq!(ticker.frr, dec!(0.0002));
        assert_eq!(ticker.bid, dec!(0.00018));
        assert_eq!(ticker.bid_period, 30);
        assert_eq!(ticker.ask, dec!(0.0001));
        assert_eq!(ticker.ask_period, 2);
        assert_eq!(ticker.last_price, dec!(0.00019));
        assert_eq!(ticker.frr_amount_available, dec!(3500000));
    }

    #[test]
    fn test_funding_ticker_with_symbol() {
        let row = as_row(json!([
            "fUSD", 0.0002, 0.00018, 30, 1000000, 0.0001, 2, 500000, -0.00001, -0.05, 0.00019,
            25000000, 0.00025, 0.00015, null, null, 3500000
        ]));
        let ticker = FundingTicker::from_row(row).unwrap();
        assert_eq!(ticker.symbol, Some(Symbol::new("fUSD")));
        assert_eq!(ticker.low, dec!(0.00015));
    }

    #[test]
    fn test_funding_ticker_rejects_trading_row() {
        let row = as_row(json!([
            "tBTCUSD", 10645, 73.9, 10647, 75.2, 731.6, 0.0738, 10644.0, 14480.8, 10766, 9889.1
        ]));
        assert!(FundingTicker::from_row(row).is_err());
    }

    #[test]
    fn test_ticker_short_row() {
        let err = Ticker::from_row(as_row(json!([1, 2, 3]))).unwrap_err();
        assert!(matches!(err, TransformError::RowTooShort { schema: "TradingTicker", .. }));
    }

    #[test]
    fn test_candle() {
        let row = as_row(json!([1364824380000_u64, 99.01, 99.01, 99.01, 99.01, 6]));
        let candle = Candle::from_row(row).unwrap();
        assert_eq!(candle.mts, 1364824380000);
        assert_eq!(candle.close, dec!(99.01));
        assert_eq!(candle.volume, dec!(6));
    }

    #[test]
    fn test_wallet_with_nulls() {
        let row = as_row(json!(["exchange", "UST", 19788.6529257, 0, null, null, null]));
        let wallet = Wallet::from_row(row).unwrap();
        assert_eq!(wallet.wallet_type, "exchange");
        assert_eq!(wallet.currency, "UST");
        assert_eq!(wallet.balance, dec!(19788.6529257));
        assert_eq!(wallet.balance_available, None);
        assert_eq!(wallet.meta, None);
    }
}
