use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::order::OrderSide;

/// A filled (or simulated) trade. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Client order id of the attempt that produced this fill
    pub id: String,
    pub order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    /// Asset units
    pub amount: f64,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl TradeRecord {
    /// Signed change this trade applies to the held amount
    pub fn position_delta(&self) -> f64 {
        match self.side {
            OrderSide::Buy => self.amount,
            OrderSide::Sell => -self.amount,
        }
    }

    pub fn notional(&self) -> f64 {
        self.amount * self.price
    }
}

/// Order the exchange refused. Kept for audit, never counted as a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedOrderAttempt {
    pub client_order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}
