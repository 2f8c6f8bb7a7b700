//! Public configuration endpoints

use bfx_types::{merge_currency_lists, CurrencyListing, CURRENCY_CONFIG_KEYS};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{RestError, RestResult};
use crate::request::RequestDispatcher;
use crate::transform::{Transformed, Transformer};

/// Config lookups (`/conf/...`)
pub struct ConfEndpoints<'a> {
    dispatcher: &'a RequestDispatcher,
}

impl<'a> ConfEndpoints<'a> {
    pub fn new(dispatcher: &'a RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Fetch raw config arrays, one per key, in request order
    #[instrument(skip(self))]
    pub async fn conf(&self, keys: &[&str]) -> RestResult<Transformed<Value>> {
        if keys.is_empty() {
            return Err(RestError::InvalidArgument("at least one config key is required".to_string()));
        }
        self.dispatcher
            .public_get(&format!("/conf/{}", keys.join(",")), &Transformer::none())
            .await
    }

    /// Currency table merged from the six currency config arrays
    ///
    /// Untouched when transformation is disabled.
    #[instrument(skip(self))]
    pub async fn currencies(&self) -> RestResult<Transformed<CurrencyListing>> {
        debug!("Fetching currency config");
        let merge = Transformer::function(|data| Ok(merge_currency_lists(data)));
        self.dispatcher
            .public_get(&format!("/conf/{}", CURRENCY_CONFIG_KEYS.join(",")), &merge)
            .await
    }
}
