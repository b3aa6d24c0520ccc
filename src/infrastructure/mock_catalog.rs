//! Fixed market data and simulated fills served while the gateway is in mock mode

use chrono::{DateTime, Duration, DurationRound, Utc};
use lru::LruCache;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::candle::Candle;
use crate::domain::entities::market::{Account, Product};
use crate::domain::entities::order::{Order, OrderRequest, OrderSide, OrderStatus, SizeSpec};
use crate::domain::errors::{TradingError, TradingResult};

/// Quote balance every mock session starts with
pub const MOCK_STARTING_QUOTE_BALANCE: f64 = 10_000.0;
/// Hourly candles served per product
pub const CANDLE_COUNT: usize = 30;

// (base, name, quote, price, volume_24h, change_24h)
const CATALOG: &[(&str, &str, &str, f64, f64, f64)] = &[
    ("BTC", "Bitcoin", "USD", 50_000.0, 30_000_000_000.0, 2.5),
    ("ETH", "Ethereum", "USD", 3_000.0, 15_000_000_000.0, -1.2),
    ("SOL", "Solana", "USD", 100.0, 2_500_000_000.0, 5.8),
    ("ADA", "Cardano", "USD", 1.2, 1_200_000_000.0, 0.5),
    ("DOT", "Polkadot", "USD", 25.0, 1_000_000_000.0, -2.1),
    ("XRP", "XRP", "USD", 0.6, 900_000_000.0, 1.1),
    ("DOGE", "Dogecoin", "USD", 0.08, 800_000_000.0, -0.4),
    ("AVAX", "Avalanche", "USD", 35.0, 700_000_000.0, 3.2),
    ("LINK", "Chainlink", "USD", 15.0, 600_000_000.0, -0.8),
    ("LTC", "Litecoin", "USD", 80.0, 500_000_000.0, 0.3),
    ("ATOM", "Cosmos", "USD", 10.0, 400_000_000.0, -1.5),
    ("XLM", "Stellar", "USD", 0.12, 300_000_000.0, 0.9),
    ("BTC", "Bitcoin", "EUR", 46_000.0, 5_000_000_000.0, 2.4),
    ("ETH", "Ethereum", "EUR", 2_760.0, 2_000_000_000.0, -1.3),
];

static MOCK_PRODUCTS: Lazy<Vec<Product>> = Lazy::new(|| {
    CATALOG
        .iter()
        .map(|(base, name, quote, price, volume, change)| Product {
            product_id: format!("{}-{}", base, quote),
            base_currency: base.to_string(),
            quote_currency: quote.to_string(),
            base_name: name.to_string(),
            price: *price,
            volume_24h: *volume,
            price_percent_change_24h: *change,
        })
        .collect()
});

/// Every product in the catalog, all quote currencies, unsorted
pub fn mock_products() -> Vec<Product> {
    MOCK_PRODUCTS.clone()
}

pub fn mock_price(product_id: &str) -> Option<f64> {
    MOCK_PRODUCTS
        .iter()
        .find(|p| p.product_id.eq_ignore_ascii_case(product_id))
        .map(|p| p.price)
}

/// Hourly candles ending at the hour containing `now`, oldest first.
///
/// Closes wobble within about 1% of the catalog price; the pattern depends
/// only on the product and the hour, so repeated calls agree.
pub fn mock_candles(product_id: &str, now: DateTime<Utc>) -> Option<Vec<Candle>> {
    let product = MOCK_PRODUCTS
        .iter()
        .find(|p| p.product_id.eq_ignore_ascii_case(product_id))?;

    let seed = product.product_id.bytes().map(f64::from).sum::<f64>();
    let last_hour = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
    let hourly_volume = product.volume_24h / 24.0 / product.price;

    let mut candles = Vec::with_capacity(CANDLE_COUNT);
    let mut open = product.price;
    for i in 0..CANDLE_COUNT {
        let timestamp = last_hour - Duration::hours((CANDLE_COUNT - 1 - i) as i64);
        let phase = seed + timestamp.timestamp() as f64 / 3600.0;
        let close = product.price * (1.0 + 0.01 * (phase * 0.7).sin());
        candles.push(Candle {
            timestamp,
            open,
            high: open.max(close) * 1.002,
            low: open.min(close) * 0.998,
            close,
            volume: hourly_volume,
        });
        open = close;
    }
    Some(candles)
}

struct MockBook {
    balances: HashMap<String, f64>,
    /// Most recent simulated orders; older ones age out
    orders: LruCache<String, Order>,
}

/// Simulated account: balances move with each simulated fill
pub struct MockExchange {
    quote_currency: String,
    book: Mutex<MockBook>,
}

impl MockExchange {
    /// Mock account in `quote_currency`, remembering at most `order_capacity` orders
    pub fn new(quote_currency: &str, order_capacity: NonZeroUsize) -> Self {
        let mut book = MockBook {
            balances: HashMap::new(),
            orders: LruCache::new(order_capacity),
        };
        book.balances
            .insert(quote_currency.to_uppercase(), MOCK_STARTING_QUOTE_BALANCE);
        Self {
            quote_currency: quote_currency.to_uppercase(),
            book: Mutex::new(book),
        }
    }

    pub async fn accounts(&self) -> Vec<Account> {
        let book = self.book.lock().await;
        let mut accounts: Vec<Account> = book
            .balances
            .iter()
            .map(|(currency, available)| Account {
                currency: currency.clone(),
                available: *available,
                hold: 0.0,
            })
            .collect();
        accounts.sort_by(|a, b| a.currency.cmp(&b.currency));
        accounts
    }

    /// Fill a market order at the catalog price. A BUY over the mock quote
    /// balance comes back FAILED, like the exchange would report it.
    pub async fn simulate_fill(&self, request: &OrderRequest) -> TradingResult<Order> {
        let price = mock_price(&request.product_id)
            .ok_or_else(|| TradingError::NotFound(request.product_id.clone()))?;
        let base = request
            .product_id
            .split('-')
            .next()
            .unwrap_or_default()
            .to_uppercase();

        let mut book = self.book.lock().await;
        let quote_held = book
            .balances
            .get(&self.quote_currency)
            .copied()
            .unwrap_or(0.0);

        let (status, filled_size) = match (request.side, request.size) {
            (OrderSide::Buy, SizeSpec::Quote(notional)) if notional <= quote_held => {
                let units = notional / price;
                *book.balances.entry(self.quote_currency.clone()).or_insert(0.0) -= notional;
                *book.balances.entry(base.clone()).or_insert(0.0) += units;
                (OrderStatus::Filled, Some(units))
            }
            (OrderSide::Buy, _) => (OrderStatus::Failed, None),
            (OrderSide::Sell, size) => {
                let units = size.value();
                *book.balances.entry(self.quote_currency.clone()).or_insert(0.0) += units * price;
                let held = book.balances.entry(base.clone()).or_insert(0.0);
                *held = (*held - units).max(0.0);
                (OrderStatus::Filled, Some(units))
            }
        };

        let order = Order {
            client_order_id: request.client_order_id.clone(),
            order_id: format!("mock-{}", Uuid::new_v4()),
            product_id: request.product_id.clone(),
            side: request.side,
            size: request.size,
            status,
            filled_size,
            average_filled_price: filled_size.map(|_| price),
        };
        book.orders.put(order.order_id.clone(), order.clone());

        info!(
            "Simulated {} {} -> {} (order {})",
            request.side, request.product_id, status, order.order_id
        );
        Ok(order)
    }

    pub async fn order(&self, order_id: &str) -> TradingResult<Order> {
        self.book
            .lock()
            .await
            .orders
            .peek(order_id)
            .cloned()
            .ok_or_else(|| TradingError::NotFound(format!("order {}", order_id)))
    }
}
