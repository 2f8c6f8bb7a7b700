//! Common test utilities and fixtures for integration tests
//!
//! Payload shapes follow live Bitfinex v2 responses.

use bfx_auth::CounterNonce;
use bfx_rest::{BitfinexRestClient, ClientConfig, MockTransport};
use serde_json::{json, Value};
use std::sync::Arc;

/// HMAC-SHA384("secret", "/api/v2/auth/r/orders1{}")
pub const ORDERS_SIGNATURE: &str =
    "f3006131efddb1e2a978de1ba6842b4d46e02cf75c4a7d13e9238428a62630f6313258d9f173f5544feb8d1e47233e5f";

/// Route the crate's tracing output through the test harness
///
/// Filter with `RUST_LOG`, e.g. `RUST_LOG=bfx_rest=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Client backed by a fresh mock transport
pub fn mock_client(config: ClientConfig) -> (BitfinexRestClient, Arc<MockTransport>) {
    init_tracing();
    let mock = Arc::new(MockTransport::new());
    let client = BitfinexRestClient::new(config.with_transport(mock.clone())).unwrap();
    (client, mock)
}

/// Key/secret client with nonces counting up from 1
pub fn signed_config() -> ClientConfig {
    ClientConfig::new()
        .with_api_key_secret("key", "secret")
        .with_nonce_source(Arc::new(CounterNonce::starting_at(1)))
}

/// `GET /ticker/tBTCUSD`
pub fn trading_ticker() -> Value {
    json!([
        10645, 73.93854271, 10647, 75.22266119, 731.60645389, 0.0738, 10644.00645389,
        14480.89849423, 10766, 9889.1449809
    ])
}

/// `GET /tickers?symbols=tBTCUSD,tETHUSD`
pub fn tickers() -> Value {
    json!([
        ["tBTCUSD", 10645, 73.93854271, 10647, 75.22266119, 731.60645389, 0.0738, 10644.00645389,
            14480.89849423, 10766, 9889.1449809],
        ["tETHUSD", 180.1, 120.5, 180.2, 98.1, -2.3, -0.0126, 180.15, 53211.2, 184.0, 176.2]
    ])
}

/// `GET /ticker/fUSD`
pub fn funding_ticker() -> Value {
    json!([
        0.0002, 0.00018, 30, 1000000, 0.0001, 2, 500000, -0.00001, -0.05, 0.00019, 25000000,
        0.00025, 0.00015, null, null, 3500000
    ])
}

/// `GET /candles/trade:1m:tBTCUSD/hist`
pub fn candles() -> Value {
    json!([
        [1678465320000_u64, 20097, 20094, 20097, 20094, 0.07870586],
        [1678465260000_u64, 20106, 20101, 20106, 20099, 0.08436279]
    ])
}

/// `POST /auth/r/wallets`
pub fn wallets() -> Value {
    json!([
        ["exchange", "USD", 1500.5, 0, 1200.25, "Exchange wallet", null],
        ["margin", "BTC", 0.5, 0.0001, null, null, null]
    ])
}

/// `GET /conf/pub:list:currency,...` with one pooled currency (USDT on ETH)
pub fn currency_conf() -> Value {
    json!([
        ["BTC", "ETH", "USDT"],
        [["USDT", "UST"]],
        [["BTC", "Bitcoin"], ["ETH", "Ethereum"], ["USDT", "Tether"]],
        [["USDT", "ETH"]],
        [["BTC", ["https://blockchain.info"]], ["ETH", ["https://etherscan.io"]]],
        [["BTC", [0, 0.0004]]]
    ])
}
