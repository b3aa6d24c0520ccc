//! In-memory stores for tests and runs without a database file

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

use crate::domain::entities::portfolio::{Portfolio, PortfolioPosition};
use crate::domain::entities::settings::UserSettings;
use crate::domain::entities::trade::{FailedOrderAttempt, TradeRecord};
use crate::domain::errors::TradingResult;
use crate::domain::repositories::ledger::LedgerStore;
use crate::domain::repositories::settings_store::SettingsStore;

#[derive(Default)]
struct LedgerState {
    trades: Vec<TradeRecord>,
    trade_ids: HashSet<String>,
    failed: Vec<FailedOrderAttempt>,
    portfolio: Portfolio,
}

#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn record_fill(&self, trade: &TradeRecord) -> TradingResult<bool> {
        let mut state = self.state.lock().await;
        if state.trade_ids.contains(&trade.id) {
            return Ok(false);
        }
        // apply first: a failed delta leaves nothing behind
        state.portfolio.apply(&trade.symbol, trade.position_delta())?;
        state.trade_ids.insert(trade.id.clone());
        state.trades.push(trade.clone());
        Ok(true)
    }

    async fn record_failed_attempt(&self, attempt: &FailedOrderAttempt) -> TradingResult<()> {
        self.state.lock().await.failed.push(attempt.clone());
        Ok(())
    }

    async fn trade(&self, id: &str) -> TradingResult<Option<TradeRecord>> {
        let state = self.state.lock().await;
        Ok(state.trades.iter().find(|t| t.id == id).cloned())
    }

    async fn trades(&self) -> TradingResult<Vec<TradeRecord>> {
        Ok(self.state.lock().await.trades.clone())
    }

    async fn failed_attempts(&self) -> TradingResult<Vec<FailedOrderAttempt>> {
        Ok(self.state.lock().await.failed.clone())
    }

    async fn portfolio(&self) -> TradingResult<Vec<PortfolioPosition>> {
        Ok(self.state.lock().await.portfolio.positions())
    }

    async fn holding(&self, symbol: &str) -> TradingResult<f64> {
        Ok(self.state.lock().await.portfolio.holding(symbol))
    }
}

#[derive(Default)]
pub struct InMemorySettingsStore {
    settings: Mutex<Option<UserSettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: UserSettings) -> Self {
        Self {
            settings: Mutex::new(Some(settings)),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> TradingResult<UserSettings> {
        Ok(self.settings.lock().await.clone().unwrap_or_default())
    }

    async fn save(&self, settings: &UserSettings) -> TradingResult<()> {
        settings.validate()?;
        *self.settings.lock().await = Some(settings.clone());
        Ok(())
    }
}
