//! Exchange Gateway Trait
//!
//! Common interface the trading core uses to reach the exchange. The
//! production implementation signs and sends brokerage REST calls and falls
//! back to a static catalog when the exchange cannot be reached; tests
//! substitute scripted doubles.

use crate::domain::entities::candle::Candle;
use crate::domain::entities::credentials::Credentials;
use crate::domain::entities::market::{Account, ProductPage};
use crate::domain::entities::order::{Order, OrderRequest};
use crate::domain::errors::TradingResult;
use async_trait::async_trait;

/// Where a gateway call gets its data from, resolved once per call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceStrategy {
    Live,
    Mock,
}

#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Quote-currency filtered, volume sorted products; page `page_offset` of size `page_size`
    async fn list_products(&self, page_size: usize, page_offset: usize)
        -> TradingResult<ProductPage>;

    /// Current price of `product_id` (e.g. "BTC-USD")
    async fn get_spot_price(&self, product_id: &str) -> TradingResult<f64>;

    /// Available and held balances per currency
    async fn get_accounts(&self) -> TradingResult<Vec<Account>>;

    /// Recent hourly candles, oldest first
    async fn get_historical_data(&self, product_id: &str) -> TradingResult<Vec<Candle>>;

    /// Submit a market order. Replays with a known client order id return the
    /// original order without submitting again.
    async fn place_order(&self, request: &OrderRequest) -> TradingResult<Order>;

    /// Look up an order by exchange order id
    async fn get_order(&self, order_id: &str) -> TradingResult<Order>;

    /// Whether the gateway is serving fabricated data
    fn is_using_mock_data(&self) -> bool;

    /// Leave mock mode; the next call goes live again
    fn clear_mock_mode(&self);

    /// Replace credentials at runtime and leave mock mode. `None` forces mock
    /// data. Fails with `Auth` when the secret is not a usable signing key.
    fn set_credentials(&self, credentials: Option<Credentials>) -> TradingResult<()>;
}
