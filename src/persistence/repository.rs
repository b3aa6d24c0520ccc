//! Database Repository
//!
//! SQLite implementations of the ledger and settings stores.

use async_trait::async_trait;
use tracing::{debug, error};

use super::models::{FailedOrderRow, PositionRow, TradeRow};
use super::{DatabaseError, DbPool};
use crate::domain::entities::portfolio::{Portfolio, PortfolioPosition};
use crate::domain::entities::settings::UserSettings;
use crate::domain::entities::trade::{FailedOrderAttempt, TradeRecord};
use crate::domain::errors::{TradingError, TradingResult};
use crate::domain::repositories::ledger::LedgerStore;
use crate::domain::repositories::settings_store::SettingsStore;

const SETTINGS_KEY: &str = "user_settings";

fn query_error(context: &str) -> impl Fn(sqlx::Error) -> TradingError + '_ {
    move |e: sqlx::Error| -> TradingError {
        error!("{}: {}", context, e);
        DatabaseError::QueryError(format!("{}: {}", context, e)).into()
    }
}

/// Trade ledger and portfolio backed by SQLite
pub struct SqliteLedger {
    pool: DbPool,
}

impl SqliteLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn record_fill(&self, trade: &TradeRecord) -> TradingResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("Failed to begin ledger transaction"))?;

        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM trades WHERE id = ?1")
            .bind(&trade.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error("Failed to look up trade"))?;

        if existing.is_some() {
            debug!("Trade {} already recorded", trade.id);
            return Ok(false);
        }

        let held: Option<PositionRow> =
            sqlx::query_as("SELECT symbol, amount FROM portfolio WHERE symbol = ?1")
                .bind(&trade.symbol)
                .fetch_optional(&mut *tx)
                .await
                .map_err(query_error("Failed to read position"))?;

        let portfolio = Portfolio::from_positions(held.map(PortfolioPosition::from));
        let next = portfolio.preview(&trade.symbol, trade.position_delta())?;

        sqlx::query(
            r#"
            INSERT INTO trades (id, order_id, symbol, side, amount, price, executed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&trade.id)
        .bind(&trade.order_id)
        .bind(&trade.symbol)
        .bind(trade.side.as_str())
        .bind(trade.amount)
        .bind(trade.price)
        .bind(trade.timestamp)
        .execute(&mut *tx)
        .await
        .map_err(query_error("Failed to insert trade"))?;

        if next == 0.0 {
            sqlx::query("DELETE FROM portfolio WHERE symbol = ?1")
                .bind(&trade.symbol)
                .execute(&mut *tx)
                .await
                .map_err(query_error("Failed to clear position"))?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO portfolio (symbol, amount) VALUES (?1, ?2)
                ON CONFLICT(symbol) DO UPDATE SET amount = excluded.amount
                "#,
            )
            .bind(&trade.symbol)
            .bind(next)
            .execute(&mut *tx)
            .await
            .map_err(query_error("Failed to update position"))?;
        }

        tx.commit()
            .await
            .map_err(query_error("Failed to commit ledger transaction"))?;

        debug!(
            "Recorded trade {} ({} {} {}), position now {}",
            trade.id, trade.side, trade.amount, trade.symbol, next
        );
        Ok(true)
    }

    async fn record_failed_attempt(&self, attempt: &FailedOrderAttempt) -> TradingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO failed_orders (client_order_id, symbol, side, reason, attempted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&attempt.client_order_id)
        .bind(&attempt.symbol)
        .bind(attempt.side.as_str())
        .bind(&attempt.reason)
        .bind(attempt.timestamp)
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to record failed order"))?;
        Ok(())
    }

    async fn trade(&self, id: &str) -> TradingResult<Option<TradeRecord>> {
        let row = sqlx::query_as::<_, TradeRow>(
            "SELECT id, order_id, symbol, side, amount, price, executed_at FROM trades WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to look up trade"))?;

        row.map(TradeRecord::try_from).transpose()
    }

    async fn trades(&self) -> TradingResult<Vec<TradeRecord>> {
        let rows = sqlx::query_as::<_, TradeRow>(
            "SELECT id, order_id, symbol, side, amount, price, executed_at FROM trades ORDER BY executed_at ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list trades"))?;

        rows.into_iter().map(TradeRecord::try_from).collect()
    }

    async fn failed_attempts(&self) -> TradingResult<Vec<FailedOrderAttempt>> {
        let rows = sqlx::query_as::<_, FailedOrderRow>(
            "SELECT client_order_id, symbol, side, reason, attempted_at FROM failed_orders ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list failed orders"))?;

        rows.into_iter().map(FailedOrderAttempt::try_from).collect()
    }

    async fn portfolio(&self) -> TradingResult<Vec<PortfolioPosition>> {
        let rows = sqlx::query_as::<_, PositionRow>(
            "SELECT symbol, amount FROM portfolio ORDER BY symbol ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to read portfolio"))?;

        Ok(rows.into_iter().map(PortfolioPosition::from).collect())
    }

    async fn holding(&self, symbol: &str) -> TradingResult<f64> {
        let row: Option<(f64,)> = sqlx::query_as("SELECT amount FROM portfolio WHERE symbol = ?1")
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to read position"))?;
        Ok(row.map(|(amount,)| amount).unwrap_or(0.0))
    }
}

/// User settings stored as one JSON document
pub struct SqliteSettingsStore {
    pool: DbPool,
}

impl SqliteSettingsStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn load(&self) -> TradingResult<UserSettings> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?1")
            .bind(SETTINGS_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to load settings"))?;

        match row {
            Some((json,)) => serde_json::from_str(&json)
                .map_err(|e| TradingError::Storage(format!("Corrupt settings document: {}", e))),
            None => Ok(UserSettings::default()),
        }
    }

    async fn save(&self, settings: &UserSettings) -> TradingResult<()> {
        settings.validate()?;
        let json = serde_json::to_string(settings)
            .map_err(|e| TradingError::Storage(format!("Failed to encode settings: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(SETTINGS_KEY)
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to save settings"))?;

        debug!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::order::OrderSide;
    use crate::domain::errors::ValidationError;
    use crate::domain::value_objects::RiskLevel;
    use crate::persistence::init_database;
    use chrono::Utc;

    fn trade(id: &str, side: OrderSide, amount: f64) -> TradeRecord {
        TradeRecord {
            id: id.to_string(),
            order_id: format!("order-{}", id),
            symbol: "BTC".to_string(),
            side,
            amount,
            price: 50000.0,
            timestamp: Utc::now(),
        }
    }

    async fn ledger() -> SqliteLedger {
        SqliteLedger::new(init_database("sqlite::memory:").await.unwrap())
    }

    #[tokio::test]
    async fn test_record_fill_updates_portfolio() {
        let ledger = ledger().await;

        assert!(ledger.record_fill(&trade("a", OrderSide::Buy, 0.5)).await.unwrap());
        assert!(ledger.record_fill(&trade("b", OrderSide::Sell, 0.2)).await.unwrap());

        let trades = ledger.trades().await.unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].id, "a");
        assert_eq!(trades[1].side, OrderSide::Sell);
        assert!((ledger.holding("BTC").await.unwrap() - 0.3).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_duplicate_fill_ignored() {
        let ledger = ledger().await;

        assert!(ledger.record_fill(&trade("a", OrderSide::Buy, 0.5)).await.unwrap());
        assert!(!ledger.record_fill(&trade("a", OrderSide::Buy, 0.5)).await.unwrap());

        assert_eq!(ledger.trades().await.unwrap().len(), 1);
        assert_eq!(ledger.holding("BTC").await.unwrap(), 0.5);
    }

    #[tokio::test]
    async fn test_trade_lookup_by_id() {
        let ledger = ledger().await;
        ledger.record_fill(&trade("a", OrderSide::Buy, 0.5)).await.unwrap();

        let found = ledger.trade("a").await.unwrap().unwrap();
        assert_eq!(found.order_id, "order-a");
        assert_eq!(found.amount, 0.5);
        assert!(ledger.trade("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversell_rolls_back() {
        let ledger = ledger().await;
        ledger.record_fill(&trade("a", OrderSide::Buy, 0.1)).await.unwrap();

        let result = ledger.record_fill(&trade("b", OrderSide::Sell, 0.2)).await;
        assert!(matches!(
            result,
            Err(TradingError::Validation(ValidationError::InsufficientHoldings { .. }))
        ));
        assert_eq!(ledger.trades().await.unwrap().len(), 1);
        assert_eq!(ledger.holding("BTC").await.unwrap(), 0.1);
    }

    #[tokio::test]
    async fn test_full_sell_removes_row() {
        let ledger = ledger().await;
        ledger.record_fill(&trade("a", OrderSide::Buy, 0.1)).await.unwrap();
        ledger.record_fill(&trade("b", OrderSide::Sell, 0.1)).await.unwrap();

        assert!(ledger.portfolio().await.unwrap().is_empty());
        assert_eq!(ledger.holding("BTC").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_failed_attempts_kept_apart() {
        let ledger = ledger().await;
        ledger
            .record_failed_attempt(&FailedOrderAttempt {
                client_order_id: "x".into(),
                symbol: "ETH".into(),
                side: OrderSide::Buy,
                reason: "INSUFFICIENT_FUND".into(),
                timestamp: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(ledger.failed_attempts().await.unwrap().len(), 1);
        assert!(ledger.trades().await.unwrap().is_empty());
        assert!(ledger.portfolio().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settings_default_then_saved() {
        let store = SqliteSettingsStore::new(init_database("sqlite::memory:").await.unwrap());
        assert_eq!(store.load().await.unwrap(), UserSettings::default());

        let settings = UserSettings {
            monitored_symbols: vec!["ADA".into()],
            risk_level: RiskLevel::High,
            max_trade_amount: 25.0,
            trading_enabled: true,
        };
        store.save(&settings).await.unwrap();
        assert_eq!(store.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_settings_save_validates() {
        let store = SqliteSettingsStore::new(init_database("sqlite::memory:").await.unwrap());
        let mut settings = UserSettings::default();
        settings.max_trade_amount = -1.0;
        assert!(store.save(&settings).await.is_err());
        assert_eq!(store.load().await.unwrap(), UserSettings::default());
    }
}
