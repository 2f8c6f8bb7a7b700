//! Bitfinex API error code mapping
//!
//! Failed REST calls carry an `["error", code, "DETAIL"]` triple in the body.
//! This module maps the numeric codes the exchange documents onto named
//! variants and groups them by category. It only classifies; deciding whether
//! to retry is left to the caller.

/// Numeric code the exchange uses to reject a request whose nonce is not
/// larger than the last one seen for the same key.
pub const NONCE_TOO_SMALL_CODE: i64 = 10114;

/// Detail string returned alongside rate limit rejections
pub const RATE_LIMIT_DETAIL: &str = "ERR_RATE_LIMIT";

/// Bitfinex API error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 100xx request-level errors
    Request,
    /// 101xx authentication errors
    Auth,
    /// 110xx availability and throttling
    Service,
    /// 200xx platform lifecycle (restart, maintenance)
    Platform,
    /// Code not in the table
    Unknown,
}

/// Known Bitfinex API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitfinexErrorCode {
    /// 10000 - unknown event
    UnknownEvent,
    /// 10001 - generic error (also unknown pair)
    Generic,
    /// 10020 - invalid request parameter
    InvalidParameter,
    /// 10100 - authentication failure
    AuthFailed,
    /// 10114 - nonce smaller than the last accepted one
    NonceTooSmall,
    /// 11000 - not ready, try again later
    NotReady,
    /// 11010 - rate limit exceeded
    RateLimit,
    /// 20051 - platform restarting
    Restart,
    /// 20060 - platform in maintenance
    Maintenance,
}

impl BitfinexErrorCode {
    /// Map a numeric code to a known variant
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            10000 => Self::UnknownEvent,
            10001 => Self::Generic,
            10020 => Self::InvalidParameter,
            10100 => Self::AuthFailed,
            NONCE_TOO_SMALL_CODE => Self::NonceTooSmall,
            11000 => Self::NotReady,
            11010 => Self::RateLimit,
            20051 => Self::Restart,
            20060 => Self::Maintenance,
            _ => return None,
        })
    }

    /// Numeric code as sent by the exchange
    pub fn code(&self) -> i64 {
        match self {
            Self::UnknownEvent => 10000,
            Self::Generic => 10001,
            Self::InvalidParameter => 10020,
            Self::AuthFailed => 10100,
            Self::NonceTooSmall => NONCE_TOO_SMALL_CODE,
            Self::NotReady => 11000,
            Self::RateLimit => 11010,
            Self::Restart => 20051,
            Self::Maintenance => 20060,
        }
    }

    /// Category this code belongs to
    pub fn category(&self) -> ErrorCategory {
        category_of(self.code())
    }

    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimit)
    }

    /// Check if this error is tied to the credential (auth or nonce)
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthFailed | Self::NonceTooSmall)
    }

    /// Get a human-readable description of this error
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnknownEvent => "Unknown event",
            Self::Generic => "Generic error",
            Self::InvalidParameter => "Invalid request parameter",
            Self::AuthFailed => "Authentication failed",
            Self::NonceTooSmall => "Nonce is smaller than the last accepted nonce",
            Self::NotReady => "Service not ready, try again later",
            Self::RateLimit => "Rate limit exceeded",
            Self::Restart => "Platform is restarting",
            Self::Maintenance => "Platform is in maintenance mode",
        }
    }
}

impl std::fmt::Display for BitfinexErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

/// Category for any numeric code, known or not
pub fn category_of(code: i64) -> ErrorCategory {
    match code {
        10000..=10099 => ErrorCategory::Request,
        10100..=10199 => ErrorCategory::Auth,
        11000..=11099 => ErrorCategory::Service,
        20000..=20999 => ErrorCategory::Platform,
        _ => ErrorCategory::Unknown,
    }
}
