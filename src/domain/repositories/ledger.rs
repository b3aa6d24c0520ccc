//! Trade ledger and portfolio store

use crate::domain::entities::portfolio::PortfolioPosition;
use crate::domain::entities::trade::{FailedOrderAttempt, TradeRecord};
use crate::domain::errors::TradingResult;
use async_trait::async_trait;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append `trade` and apply its position delta as one atomic step.
    ///
    /// Returns `false` without changing anything when a trade with the same
    /// id was already recorded. Fails if the delta would make the holding negative.
    async fn record_fill(&self, trade: &TradeRecord) -> TradingResult<bool>;

    async fn record_failed_attempt(&self, attempt: &FailedOrderAttempt) -> TradingResult<()>;

    /// Trade recorded under `id` (the client order id), if any
    async fn trade(&self, id: &str) -> TradingResult<Option<TradeRecord>>;

    /// All trades, oldest first
    async fn trades(&self) -> TradingResult<Vec<TradeRecord>>;

    async fn failed_attempts(&self) -> TradingResult<Vec<FailedOrderAttempt>>;

    async fn portfolio(&self) -> TradingResult<Vec<PortfolioPosition>>;

    async fn holding(&self, symbol: &str) -> TradingResult<f64>;
}
