//! Shared types for the Bitfinex REST API v2
//!
//! This crate provides the core type definitions used across the bfx crates.
//! It has minimal dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`Symbol`] - Trading and funding symbols (e.g., "tBTCUSD", "fUSD")
//! - [`RowSchema`], [`Row`], [`FromRow`] - Positional array rows mapped to named fields
//! - [`Ticker`], [`FundingTicker`], [`Candle`], [`Wallet`] - Typed records built from rows
//! - [`CurrencyRecord`], [`merge_currency_lists`] - Unified currency table from config arrays
//! - [`BitfinexErrorCode`], [`ErrorCategory`] - Exchange error code mapping

pub mod currency;
pub mod error;
pub mod error_codes;
pub mod records;
pub mod row;
pub mod symbol;

// Re-export commonly used types
pub use currency::*;
pub use error::*;
pub use error_codes::*;
pub use records::*;
pub use row::*;
pub use symbol::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
