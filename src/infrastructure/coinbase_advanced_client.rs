//! # Coinbase Advanced Trade Gateway
//!
//! `ExchangeGateway` implementation over the Coinbase Advanced Trade
//! brokerage REST API (`/api/v3/brokerage`).
//!
//! ## Authentication
//!
//! Every request is signed with a fresh ES256 JWT (see `request_signer`).
//!
//! ## Degradation
//!
//! The data source is decided once per call. Without credentials, or after a
//! 401/403 or transport failure flipped the sticky mock flag, calls are
//! served from the fixed mock catalog. A failing read falls back to mock data
//! within the same call; a failing order is reported to the caller and only
//! later orders are simulated.
//!
//! ## References
//!
//! - API Documentation: https://docs.cdp.coinbase.com/advanced-trade/docs/welcome

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use futures_util::StreamExt;
use lru::LruCache;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::mock_catalog::{mock_candles, mock_price, mock_products, MockExchange, CANDLE_COUNT};
use super::request_signer::RequestSigner;
use crate::domain::entities::candle::Candle;
use crate::domain::entities::credentials::Credentials;
use crate::domain::entities::market::{filter_and_rank, Account, Product, ProductPage};
use crate::domain::entities::order::{Order, OrderRequest, OrderSide, OrderStatus, SizeSpec};
use crate::domain::errors::{TradingError, TradingResult, ValidationError};
use crate::domain::repositories::exchange_gateway::{DataSourceStrategy, ExchangeGateway};
use crate::rate_limit::RequestLimiter;

/// Coinbase Advanced Trade API base URL
pub const COINBASE_API_BASE: &str = "https://api.coinbase.com";
const BROKERAGE_PREFIX: &str = "/api/v3/brokerage";
const MAX_ACCOUNT_PAGES: usize = 10;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct CoinbaseGatewayConfig {
    pub api_base: String,
    pub quote_currency: String,
    pub request_timeout: Duration,
    pub max_response_bytes: usize,
    /// Outbound requests per second, 0 disables throttling
    pub requests_per_second: u32,
    /// How many recent client order ids are remembered for replay detection
    pub idempotency_capacity: usize,
}

impl Default for CoinbaseGatewayConfig {
    fn default() -> Self {
        Self {
            api_base: COINBASE_API_BASE.to_string(),
            quote_currency: "USD".to_string(),
            request_timeout: Duration::from_secs(10),
            max_response_bytes: 2 * 1024 * 1024,
            requests_per_second: 10,
            idempotency_capacity: 1024,
        }
    }
}

// Wire types. Coinbase encodes decimals as strings.

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<WireProduct>,
}

#[derive(Debug, Deserialize)]
struct WireProduct {
    product_id: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    price_percentage_change_24h: String,
    #[serde(default)]
    volume_24h: String,
    #[serde(default)]
    quote_currency_id: String,
    #[serde(default)]
    base_currency_id: String,
    #[serde(default)]
    base_name: Option<String>,
}

impl From<WireProduct> for Product {
    fn from(wire: WireProduct) -> Self {
        let base_name = wire
            .base_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| wire.base_currency_id.clone());
        Product {
            product_id: wire.product_id,
            base_currency: wire.base_currency_id,
            quote_currency: wire.quote_currency_id,
            base_name,
            price: parse_decimal(&wire.price),
            volume_24h: parse_decimal(&wire.volume_24h),
            price_percent_change_24h: parse_decimal(&wire.price_percentage_change_24h),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(default)]
    trades: Vec<TickerTrade>,
    #[serde(default)]
    best_bid: String,
    #[serde(default)]
    best_ask: String,
}

#[derive(Debug, Deserialize)]
struct TickerTrade {
    price: String,
}

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    #[serde(default)]
    candles: Vec<WireCandle>,
}

#[derive(Debug, Deserialize)]
struct WireCandle {
    start: String,
    low: String,
    high: String,
    open: String,
    close: String,
    volume: String,
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    accounts: Vec<WireAccount>,
    #[serde(default)]
    has_next: bool,
    #[serde(default)]
    cursor: String,
}

#[derive(Debug, Deserialize)]
struct WireAccount {
    currency: String,
    available_balance: WireBalance,
    #[serde(default)]
    hold: Option<WireBalance>,
}

#[derive(Debug, Deserialize)]
struct WireBalance {
    value: String,
}

/// Order request for Coinbase Advanced Trade API
#[derive(Debug, Serialize)]
struct CreateOrderBody {
    client_order_id: String,
    product_id: String,
    side: String,
    order_configuration: OrderConfiguration,
}

#[derive(Debug, Serialize)]
struct OrderConfiguration {
    market_market_ioc: MarketMarketIoc,
}

#[derive(Debug, Serialize)]
struct MarketMarketIoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    quote_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    success: bool,
    #[serde(default)]
    failure_reason: Option<String>,
    #[serde(default)]
    success_response: Option<SuccessResponse>,
    #[serde(default)]
    error_response: Option<ErrorResponse>,
}

#[derive(Debug, Deserialize)]
struct SuccessResponse {
    order_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OrderStatusResponse {
    order: WireOrder,
}

#[derive(Debug, Deserialize)]
struct WireOrder {
    order_id: String,
    #[serde(default)]
    client_order_id: String,
    product_id: String,
    side: String,
    status: String,
    #[serde(default)]
    filled_size: Option<String>,
    #[serde(default)]
    average_filled_price: Option<String>,
    #[serde(default)]
    order_configuration: Option<serde_json::Value>,
}

fn parse_decimal(value: &str) -> f64 {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn parse_optional_decimal(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

impl WireOrder {
    fn into_order(self, fallback: Option<&OrderRequest>) -> TradingResult<Order> {
        let side: OrderSide = self
            .side
            .parse()
            .map_err(|e: String| TradingError::InvalidResponse(e))?;

        let size = self
            .order_configuration
            .as_ref()
            .and_then(|c| c.get("market_market_ioc"))
            .and_then(|m| {
                let field = |name: &str| {
                    m.get(name)
                        .and_then(|v| v.as_str())
                        .and_then(|v| parse_optional_decimal(Some(v)))
                };
                field("quote_size")
                    .map(SizeSpec::Quote)
                    .or_else(|| field("base_size").map(SizeSpec::Base))
            })
            .or_else(|| fallback.map(|r| r.size))
            .unwrap_or(SizeSpec::Base(0.0));

        let client_order_id = if self.client_order_id.is_empty() {
            fallback
                .map(|r| r.client_order_id.clone())
                .unwrap_or_default()
        } else {
            self.client_order_id
        };

        Ok(Order {
            client_order_id,
            order_id: self.order_id,
            product_id: self.product_id,
            side,
            size,
            status: OrderStatus::from_exchange(&self.status),
            filled_size: parse_optional_decimal(self.filled_size.as_deref()),
            average_filled_price: parse_optional_decimal(self.average_filled_price.as_deref()),
        })
    }
}

/// Coinbase Advanced Trade gateway with mock-data fallback
pub struct CoinbaseAdvancedGateway {
    client: Client,
    config: CoinbaseGatewayConfig,
    host: String,
    signer: RwLock<Option<Arc<RequestSigner>>>,
    mock_mode: AtomicBool,
    limiter: RequestLimiter,
    placed_orders: Mutex<LruCache<String, Order>>,
    mock: MockExchange,
}

impl std::fmt::Debug for CoinbaseAdvancedGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinbaseAdvancedGateway")
            .field("config", &self.config)
            .field("strategy", &self.strategy())
            .finish()
    }
}

impl CoinbaseAdvancedGateway {
    /// Build the gateway. Missing or unusable credentials start it in mock mode.
    pub fn new(
        config: CoinbaseGatewayConfig,
        credentials: Option<Credentials>,
    ) -> TradingResult<Self> {
        let parsed = url::Url::parse(&config.api_base).map_err(|e| {
            TradingError::Configuration(format!("Invalid API base {}: {}", config.api_base, e))
        })?;
        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(TradingError::Configuration(format!(
                    "API base {} has no host",
                    config.api_base
                )))
            }
        };

        let client = Client::builder()
            .user_agent(concat!("signalpilot/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TradingError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let capacity = NonZeroUsize::new(config.idempotency_capacity).unwrap_or(NonZeroUsize::MIN);

        let gateway = Self {
            client,
            host,
            signer: RwLock::new(None),
            mock_mode: AtomicBool::new(false),
            limiter: RequestLimiter::per_second(config.requests_per_second),
            placed_orders: Mutex::new(LruCache::new(capacity)),
            mock: MockExchange::new(&config.quote_currency, capacity),
            config,
        };

        if let Err(e) = gateway.set_credentials(credentials) {
            warn!("Ignoring unusable exchange credentials, serving mock data: {}", e);
        }
        Ok(gateway)
    }

    /// Where the next call would get its data
    pub fn strategy(&self) -> DataSourceStrategy {
        match self.live_signer() {
            Some(_) => DataSourceStrategy::Live,
            None => DataSourceStrategy::Mock,
        }
    }

    /// Resolve the data source for one call: a signer means live
    fn live_signer(&self) -> Option<Arc<RequestSigner>> {
        if self.mock_mode.load(Ordering::SeqCst) {
            return None;
        }
        self.signer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn enter_mock_mode(&self, operation: &str, error: &TradingError) {
        if !self.mock_mode.swap(true, Ordering::SeqCst) {
            warn!(
                "{} failed [{}], switching to mock data: {}",
                operation,
                error.error_code(),
                error
            );
        }
    }

    /// Run a live read and fall back to `mock` on auth/transport failure
    async fn read_with_fallback<T, F>(
        &self,
        operation: &str,
        live: TradingResult<T>,
        mock: F,
    ) -> TradingResult<T>
    where
        F: std::future::Future<Output = TradingResult<T>>,
    {
        match live {
            Ok(value) => Ok(value),
            Err(e) if e.is_fallback_eligible() => {
                self.enter_mock_mode(operation, &e);
                mock.await
            }
            Err(e) => Err(e),
        }
    }

    /// Signed brokerage call. `path` is relative to `/api/v3/brokerage`.
    async fn request<T: DeserializeOwned>(
        &self,
        signer: &RequestSigner,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&CreateOrderBody>,
    ) -> TradingResult<T> {
        self.limiter.acquire().await;

        let full_path = format!("{}{}", BROKERAGE_PREFIX, path);
        let token = signer.sign(method.as_str(), &self.host, &full_path)?;
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), full_path);

        debug!("{} {}", method, full_path);

        let mut builder = self
            .client
            .request(method, &url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let bytes = self.read_capped(response).await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| {
                TradingError::InvalidResponse(format!("{}: {}", full_path, e))
            });
        }

        let detail = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]).to_string();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                TradingError::Auth(format!("HTTP {} on {}", status.as_u16(), full_path))
            }
            StatusCode::NOT_FOUND => TradingError::NotFound(full_path),
            StatusCode::TOO_MANY_REQUESTS => {
                TradingError::Network(format!("HTTP 429 on {}", full_path))
            }
            s if s.is_server_error() => {
                TradingError::Network(format!("HTTP {} on {}: {}", s.as_u16(), full_path, detail))
            }
            s => TradingError::ExchangeRejection(format!("HTTP {}: {}", s.as_u16(), detail)),
        })
    }

    /// Read the body, aborting once it grows past the configured cap
    async fn read_capped(&self, response: reqwest::Response) -> TradingResult<Vec<u8>> {
        let cap = self.config.max_response_bytes;
        if response.content_length().is_some_and(|len| len as usize > cap) {
            return Err(TradingError::Network(format!(
                "response larger than {} bytes",
                cap
            )));
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(transport_error)?;
            if body.len() + chunk.len() > cap {
                return Err(TradingError::Network(format!(
                    "response larger than {} bytes",
                    cap
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn fetch_products(&self, signer: &RequestSigner) -> TradingResult<Vec<Product>> {
        let response: ProductsResponse = self
            .request(
                signer,
                Method::GET,
                "/products",
                &[("product_type", "SPOT".to_string())],
                None,
            )
            .await?;
        Ok(response.products.into_iter().map(Product::from).collect())
    }

    async fn fetch_spot_price(&self, signer: &RequestSigner, product_id: &str) -> TradingResult<f64> {
        let response: TickerResponse = self
            .request(
                signer,
                Method::GET,
                &format!("/products/{}/ticker", product_id),
                &[("limit", "1".to_string())],
                None,
            )
            .await?;

        if let Some(price) = response
            .trades
            .first()
            .and_then(|t| parse_optional_decimal(Some(&t.price)))
        {
            return Ok(price);
        }

        match (
            parse_optional_decimal(Some(&response.best_bid)),
            parse_optional_decimal(Some(&response.best_ask)),
        ) {
            (Some(bid), Some(ask)) => Ok((bid + ask) / 2.0),
            _ => Err(TradingError::InvalidResponse(format!(
                "ticker for {} has no price",
                product_id
            ))),
        }
    }

    async fn fetch_accounts(&self, signer: &RequestSigner) -> TradingResult<Vec<Account>> {
        let mut accounts = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_ACCOUNT_PAGES {
            let mut query = vec![("limit", "250".to_string())];
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }
            let page: AccountsResponse = self
                .request(signer, Method::GET, "/accounts", &query, None)
                .await?;

            accounts.extend(page.accounts.into_iter().map(|a| Account {
                currency: a.currency,
                available: parse_decimal(&a.available_balance.value),
                hold: a.hold.map(|h| parse_decimal(&h.value)).unwrap_or(0.0),
            }));

            if !page.has_next || page.cursor.is_empty() {
                break;
            }
            cursor = Some(page.cursor);
        }
        Ok(accounts)
    }

    async fn fetch_candles(&self, signer: &RequestSigner, product_id: &str) -> TradingResult<Vec<Candle>> {
        let end = Utc::now();
        let start = end - ChronoDuration::hours(CANDLE_COUNT as i64);
        let response: CandlesResponse = self
            .request(
                signer,
                Method::GET,
                &format!("/products/{}/candles", product_id),
                &[
                    ("start", start.timestamp().to_string()),
                    ("end", end.timestamp().to_string()),
                    ("granularity", "ONE_HOUR".to_string()),
                ],
                None,
            )
            .await?;

        let mut candles: Vec<Candle> = response
            .candles
            .into_iter()
            .filter_map(|c| {
                let secs = c.start.trim().parse::<i64>().ok()?;
                Some(Candle {
                    timestamp: Utc.timestamp_opt(secs, 0).single()?,
                    open: parse_decimal(&c.open),
                    high: parse_decimal(&c.high),
                    low: parse_decimal(&c.low),
                    close: parse_decimal(&c.close),
                    volume: parse_decimal(&c.volume),
                })
            })
            .collect();
        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }

    async fn fetch_order(
        &self,
        signer: &RequestSigner,
        order_id: &str,
        request: Option<&OrderRequest>,
    ) -> TradingResult<Order> {
        let response: OrderStatusResponse = self
            .request(
                signer,
                Method::GET,
                &format!("/orders/historical/{}", order_id),
                &[],
                None,
            )
            .await?;
        response.order.into_order(request)
    }

    async fn submit_order(&self, signer: &RequestSigner, request: &OrderRequest) -> TradingResult<Order> {
        let (quote_size, base_size) = match request.size {
            SizeSpec::Quote(v) => (Some(format_size(v)), None),
            SizeSpec::Base(v) => (None, Some(format_size(v))),
        };
        let body = CreateOrderBody {
            client_order_id: request.client_order_id.clone(),
            product_id: request.product_id.clone(),
            side: request.side.as_str().to_string(),
            order_configuration: OrderConfiguration {
                market_market_ioc: MarketMarketIoc {
                    quote_size,
                    base_size,
                },
            },
        };

        info!(
            "Placing Coinbase order: {} {} {}",
            body.side, body.product_id, body.client_order_id
        );

        let response: CreateOrderResponse = self
            .request(signer, Method::POST, "/orders", &[], Some(&body))
            .await?;

        let order_id = match (response.success, response.success_response) {
            (true, Some(success)) => success.order_id,
            _ => {
                let reason = response
                    .error_response
                    .map(|e| format!("{} {}", e.error, e.message).trim().to_string())
                    .filter(|r| !r.is_empty())
                    .or(response.failure_reason)
                    .unwrap_or_else(|| "unknown error".to_string());
                return Err(TradingError::ExchangeRejection(reason));
            }
        };

        info!("Order placed successfully: {}", order_id);

        match self.fetch_order(signer, &order_id, Some(request)).await {
            Ok(order) => Ok(order),
            Err(e) => {
                warn!("Order {} placed but status lookup failed: {}", order_id, e);
                Ok(Order {
                    client_order_id: request.client_order_id.clone(),
                    order_id,
                    product_id: request.product_id.clone(),
                    side: request.side,
                    size: request.size,
                    status: OrderStatus::Open,
                    filled_size: None,
                    average_filled_price: None,
                })
            }
        }
    }

    fn mock_page(&self, page_size: usize, page_offset: usize) -> ProductPage {
        let ranked = filter_and_rank(mock_products(), &self.config.quote_currency);
        ProductPage::from_sorted(&ranked, page_size, page_offset)
    }
}

fn transport_error(e: reqwest::Error) -> TradingError {
    if e.is_timeout() {
        TradingError::Network("request timed out".to_string())
    } else {
        TradingError::Network(e.without_url().to_string())
    }
}

fn format_size(value: f64) -> String {
    let formatted = format!("{:.8}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn mock_spot(product_id: &str) -> TradingResult<f64> {
    mock_price(product_id).ok_or_else(|| TradingError::NotFound(product_id.to_string()))
}

fn mock_history(product_id: &str) -> TradingResult<Vec<Candle>> {
    mock_candles(product_id, Utc::now()).ok_or_else(|| TradingError::NotFound(product_id.to_string()))
}

#[async_trait]
impl ExchangeGateway for CoinbaseAdvancedGateway {
    async fn list_products(&self, page_size: usize, page_offset: usize) -> TradingResult<ProductPage> {
        if page_size == 0 {
            return Err(ValidationError::InvalidPageSize(page_size).into());
        }

        let Some(signer) = self.live_signer() else {
            return Ok(self.mock_page(page_size, page_offset));
        };

        let live = self.fetch_products(&signer).await.map(|products| {
            let ranked = filter_and_rank(products, &self.config.quote_currency);
            ProductPage::from_sorted(&ranked, page_size, page_offset)
        });
        self.read_with_fallback("list_products", live, async {
            Ok(self.mock_page(page_size, page_offset))
        })
        .await
    }

    async fn get_spot_price(&self, product_id: &str) -> TradingResult<f64> {
        let Some(signer) = self.live_signer() else {
            return mock_spot(product_id);
        };
        let live = self.fetch_spot_price(&signer, product_id).await;
        self.read_with_fallback("get_spot_price", live, async { mock_spot(product_id) })
            .await
    }

    async fn get_accounts(&self) -> TradingResult<Vec<Account>> {
        let Some(signer) = self.live_signer() else {
            return Ok(self.mock.accounts().await);
        };
        let live = self.fetch_accounts(&signer).await;
        self.read_with_fallback("get_accounts", live, async { Ok(self.mock.accounts().await) })
            .await
    }

    async fn get_historical_data(&self, product_id: &str) -> TradingResult<Vec<Candle>> {
        let Some(signer) = self.live_signer() else {
            return mock_history(product_id);
        };
        let live = self.fetch_candles(&signer, product_id).await;
        self.read_with_fallback("get_historical_data", live, async { mock_history(product_id) })
            .await
    }

    async fn place_order(&self, request: &OrderRequest) -> TradingResult<Order> {
        // held across the submit so concurrent calls with one id cannot both reach the exchange
        let mut placed = self.placed_orders.lock().await;
        if let Some(existing) = placed.get(&request.client_order_id).cloned() {
            info!(
                "Client order id {} already submitted, returning order {}",
                request.client_order_id, existing.order_id
            );
            return Ok(existing);
        }

        let order = match self.live_signer() {
            Some(signer) => match self.submit_order(&signer, request).await {
                Ok(order) => order,
                Err(e) => {
                    if e.is_fallback_eligible() {
                        self.enter_mock_mode("place_order", &e);
                    }
                    return Err(e);
                }
            },
            None => self.mock.simulate_fill(request).await?,
        };

        placed.put(request.client_order_id.clone(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: &str) -> TradingResult<Order> {
        if order_id.starts_with("mock-") {
            return self.mock.order(order_id).await;
        }
        let Some(signer) = self.live_signer() else {
            return self.mock.order(order_id).await;
        };
        match self.fetch_order(&signer, order_id, None).await {
            Err(e) if e.is_fallback_eligible() => {
                self.enter_mock_mode("get_order", &e);
                Err(e)
            }
            other => other,
        }
    }

    fn is_using_mock_data(&self) -> bool {
        self.strategy() == DataSourceStrategy::Mock
    }

    fn clear_mock_mode(&self) {
        if self.mock_mode.swap(false, Ordering::SeqCst) {
            info!("Mock mode cleared, next call goes live");
        }
    }

    fn set_credentials(&self, credentials: Option<Credentials>) -> TradingResult<()> {
        let signer = match credentials {
            Some(credentials) => {
                let signer = RequestSigner::from_credentials(&credentials)?;
                info!("Exchange credentials set for key {}", credentials.masked_key_id());
                Some(Arc::new(signer))
            }
            None => {
                info!("Exchange credentials cleared, serving mock data");
                None
            }
        };

        let has_signer = signer.is_some();
        *self.signer.write().unwrap_or_else(PoisonError::into_inner) = signer;
        if has_signer {
            self.mock_mode.store(false, Ordering::SeqCst);
        }
        Ok(())
    }
}
