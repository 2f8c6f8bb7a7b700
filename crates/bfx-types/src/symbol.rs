//! Bitfinex symbols (tBTCUSD / fUSD format)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of market a symbol refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// `t` prefix, e.g. tBTCUSD
    Trading,
    /// `f` prefix, e.g. fUSD
    Funding,
}

/// Exchange symbol (tBTCUSD, tTESTBTC:TESTUSD, fUSD)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// BTC/USD trading pair
    pub const BTC_USD: &'static str = "tBTCUSD";
    /// ETH/USD trading pair
    pub const ETH_USD: &'static str = "tETHUSD";
    /// USD funding
    pub const F_USD: &'static str = "fUSD";

    /// Create a new symbol from a string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trading or funding, based on the prefix
    pub fn kind(&self) -> Option<SymbolKind> {
        match self.0.chars().next() {
            Some('t') => Some(SymbolKind::Trading),
            Some('f') => Some(SymbolKind::Funding),
            _ => None,
        }
    }
}

impl FromStr for Symbol {
    type Err = SymbolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some('t') | Some('f') => {}
            _ => return Err(SymbolParseError::MissingPrefix(s.to_string())),
        }

        let rest = chars.as_str();
        if rest.is_empty() {
            return Err(SymbolParseError::Empty(s.to_string()));
        }

        if rest.split(':').any(|part| part.is_empty()) {
            return Err(SymbolParseError::InvalidFormat(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Error parsing a symbol
#[derive(Debug, Clone, thiserror::Error)]
pub enum SymbolParseError {
    #[error("Symbol must start with 't' or 'f': {0}")]
    MissingPrefix(String),

    #[error("Symbol has no currency part: {0}")]
    Empty(String),

    #[error("Invalid symbol format: {0}")]
    InvalidFormat(String),
}
