//! Database Models
//!
//! Row types for the ledger tables and their conversion into domain entities.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entities::order::OrderSide;
use crate::domain::entities::portfolio::PortfolioPosition;
use crate::domain::entities::trade::{FailedOrderAttempt, TradeRecord};
use crate::domain::errors::TradingError;

/// Row of the `trades` table
#[derive(Debug, Clone, FromRow)]
pub struct TradeRow {
    pub id: String,
    pub order_id: String,
    pub symbol: String,
    pub side: String, // "BUY" or "SELL"
    pub amount: f64,
    pub price: f64,
    pub executed_at: DateTime<Utc>,
}

impl TryFrom<TradeRow> for TradeRecord {
    type Error = TradingError;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        let side = row.side.parse::<OrderSide>().map_err(TradingError::Storage)?;
        Ok(TradeRecord {
            id: row.id,
            order_id: row.order_id,
            symbol: row.symbol,
            side,
            amount: row.amount,
            price: row.price,
            timestamp: row.executed_at,
        })
    }
}

/// Row of the `failed_orders` table
#[derive(Debug, Clone, FromRow)]
pub struct FailedOrderRow {
    pub client_order_id: String,
    pub symbol: String,
    pub side: String,
    pub reason: String,
    pub attempted_at: DateTime<Utc>,
}

impl TryFrom<FailedOrderRow> for FailedOrderAttempt {
    type Error = TradingError;

    fn try_from(row: FailedOrderRow) -> Result<Self, Self::Error> {
        let side = row.side.parse::<OrderSide>().map_err(TradingError::Storage)?;
        Ok(FailedOrderAttempt {
            client_order_id: row.client_order_id,
            symbol: row.symbol,
            side,
            reason: row.reason,
            timestamp: row.attempted_at,
        })
    }
}

/// Row of the `portfolio` table
#[derive(Debug, Clone, FromRow)]
pub struct PositionRow {
    pub symbol: String,
    pub amount: f64,
}

impl From<PositionRow> for PortfolioPosition {
    fn from(row: PositionRow) -> Self {
        PortfolioPosition {
            symbol: row.symbol,
            amount: row.amount,
        }
    }
}
