use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            _ => Err(format!("Unknown order side: {}", s)),
        }
    }
}

/// Lifecycle status of an order as reported by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
    Failed,
}

impl OrderStatus {
    /// Map a brokerage status string. Unknown in-flight states count as open.
    pub fn from_exchange(status: &str) -> Self {
        match status.to_uppercase().as_str() {
            "FILLED" => OrderStatus::Filled,
            "CANCELLED" | "EXPIRED" => OrderStatus::Cancelled,
            "FAILED" | "REJECTED" => OrderStatus::Failed,
            _ => OrderStatus::Open,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Failed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "OPEN"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
            OrderStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Market order size: quote notional for buys, base asset size for sells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SizeSpec {
    Quote(f64),
    Base(f64),
}

impl SizeSpec {
    pub fn value(&self) -> f64 {
        match self {
            SizeSpec::Quote(v) | SizeSpec::Base(v) => *v,
        }
    }
}

/// A market order about to be sent to the exchange
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub client_order_id: String,
    pub product_id: String,
    pub side: OrderSide,
    pub size: SizeSpec,
}

impl OrderRequest {
    pub fn new(
        client_order_id: String,
        product_id: String,
        side: OrderSide,
        size: SizeSpec,
    ) -> Result<Self, String> {
        let value = size.value();
        if !value.is_finite() || value <= 0.0 {
            return Err(format!("Order size must be positive, got {}", value));
        }
        match (side, size) {
            (OrderSide::Buy, SizeSpec::Base(_)) => {
                return Err("Market buys are sized in quote currency".to_string())
            }
            (OrderSide::Sell, SizeSpec::Quote(_)) => {
                return Err("Market sells are sized in base currency".to_string())
            }
            _ => {}
        }

        Ok(Self {
            client_order_id,
            product_id,
            side,
            size,
        })
    }
}

/// Order as known to the gateway after submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub client_order_id: String,
    pub order_id: String,
    pub product_id: String,
    pub side: OrderSide,
    pub size: SizeSpec,
    pub status: OrderStatus,
    /// Base units filled so far, when reported
    pub filled_size: Option<f64>,
    pub average_filled_price: Option<f64>,
}
