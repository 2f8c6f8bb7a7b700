//! API endpoint implementations
//!
//! Thin parameter shapers over the dispatcher's call primitives.

pub mod account;
pub mod conf;
pub mod market;

pub use account::AccountEndpoints;
pub use conf::ConfEndpoints;
pub use market::MarketEndpoints;

use serde::Serialize;

use crate::error::{RestError, RestResult};

/// Append `query` to `path`, omitting the `?` when nothing is set
pub(crate) fn with_query<Q: Serialize + ?Sized>(path: &str, query: &Q) -> RestResult<String> {
    let encoded = serde_urlencoded::to_string(query)
        .map_err(|e| RestError::InvalidArgument(format!("invalid query parameters: {}", e)))?;

    if encoded.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{}?{}", path, encoded))
    }
}
