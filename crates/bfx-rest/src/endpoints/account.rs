//! Private account endpoints
//!
//! These endpoints require authentication.

use bfx_types::Wallet;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::RestResult;
use crate::request::RequestDispatcher;
use crate::transform::{Transformed, Transformer};

/// Private account endpoints
pub struct AccountEndpoints<'a> {
    dispatcher: &'a RequestDispatcher,
}

impl<'a> AccountEndpoints<'a> {
    pub fn new(dispatcher: &'a RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Get wallet balances
    #[instrument(skip(self))]
    pub async fn wallets(&self) -> RestResult<Transformed<Wallet>> {
        debug!("Fetching wallets");
        self.dispatcher
            .auth_post("/auth/r/wallets", &json!({}), &Transformer::record())
            .await
    }

    /// Get account info for the authenticated user
    #[instrument(skip(self))]
    pub async fn user_info(&self) -> RestResult<Transformed<Value>> {
        self.dispatcher
            .auth_post("/auth/r/info/user", &json!({}), &Transformer::none())
            .await
    }
}
