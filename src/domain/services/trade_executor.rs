//! TradeExecutor - turns BUY/SELL decisions and manual trades into recorded fills
//!
//! Every execution (bot or user initiated) goes through one async mutex that
//! covers validation, order placement and ledger write, so two trades can
//! never both pass a balance check against the same funds.

use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::market::available_balance;
use crate::domain::entities::order::{Order, OrderRequest, OrderSide, SizeSpec};
use crate::domain::entities::trade::{FailedOrderAttempt, TradeRecord};
use crate::domain::errors::{TradingError, TradingResult, ValidationError};
use crate::domain::repositories::exchange_gateway::ExchangeGateway;
use crate::domain::repositories::ledger::LedgerStore;
use crate::domain::repositories::notification::{BotEvent, NotificationSink};
use crate::domain::services::decision_engine::{TradeAction, TradeDecision};

#[derive(Debug, Clone)]
pub struct TradeExecutorConfig {
    pub quote_currency: String,
}

impl Default for TradeExecutorConfig {
    fn default() -> Self {
        Self {
            quote_currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// HOLD decision, nothing to do
    Skipped { symbol: String },
    Executed(TradeRecord),
    /// The client order id was already filled and recorded earlier
    AlreadyRecorded(TradeRecord),
}

impl ExecutionOutcome {
    pub fn trade(&self) -> Option<&TradeRecord> {
        match self {
            ExecutionOutcome::Skipped { .. } => None,
            ExecutionOutcome::Executed(trade) | ExecutionOutcome::AlreadyRecorded(trade) => {
                Some(trade)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionStats {
    pub attempted: u64,
    pub executed: u64,
    pub rejected: u64,
    pub failed: u64,
}

/// How a trade is sized before price conversion
#[derive(Debug, Clone, Copy)]
enum TradeSize {
    /// Quote currency
    Notional(f64),
    /// Base asset units
    Units(f64),
}

impl TradeSize {
    fn raw(&self) -> f64 {
        match self {
            TradeSize::Notional(v) | TradeSize::Units(v) => *v,
        }
    }
}

pub struct TradeExecutor {
    config: TradeExecutorConfig,
    gateway: Arc<dyn ExchangeGateway>,
    ledger: Arc<dyn LedgerStore>,
    notifier: Arc<dyn NotificationSink>,
    execution_lock: Mutex<()>,
    attempted: AtomicU64,
    executed: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

impl TradeExecutor {
    pub fn new(
        config: TradeExecutorConfig,
        gateway: Arc<dyn ExchangeGateway>,
        ledger: Arc<dyn LedgerStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            gateway,
            ledger,
            notifier,
            execution_lock: Mutex::new(()),
            attempted: AtomicU64::new(0),
            executed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Execute a bot decision. SELL notional is converted to asset units at the spot price.
    pub async fn execute(&self, decision: &TradeDecision) -> TradingResult<ExecutionOutcome> {
        let side = match decision.action {
            TradeAction::Hold => {
                debug!("HOLD for {}, no order", decision.symbol);
                return Ok(ExecutionOutcome::Skipped {
                    symbol: decision.symbol.clone(),
                });
            }
            TradeAction::Buy => OrderSide::Buy,
            TradeAction::Sell => OrderSide::Sell,
        };

        self.run(
            &decision.symbol,
            side,
            TradeSize::Notional(decision.notional_amount),
            None,
        )
        .await
    }

    /// Execute a user-initiated trade.
    ///
    /// BUY `amount` is quote currency, SELL `amount` is asset units. A caller
    /// supplied `client_order_id` makes retries of the same request safe.
    pub async fn execute_manual(
        &self,
        symbol: &str,
        side: OrderSide,
        amount: f64,
        client_order_id: Option<String>,
    ) -> TradingResult<ExecutionOutcome> {
        let size = match side {
            OrderSide::Buy => TradeSize::Notional(amount),
            OrderSide::Sell => TradeSize::Units(amount),
        };
        self.run(symbol, side, size, client_order_id).await
    }

    pub fn quote_currency(&self) -> &str {
        &self.config.quote_currency
    }

    /// Exchange product for `symbol` in the configured quote currency
    pub fn product_id(&self, symbol: &str) -> TradingResult<String> {
        Ok(format!("{}-{}", base_symbol(symbol)?, self.config.quote_currency))
    }

    pub fn stats(&self) -> ExecutionStats {
        ExecutionStats {
            attempted: self.attempted.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    async fn run(
        &self,
        symbol: &str,
        side: OrderSide,
        size: TradeSize,
        client_order_id: Option<String>,
    ) -> TradingResult<ExecutionOutcome> {
        self.attempted.fetch_add(1, Ordering::Relaxed);

        let result = {
            let _guard = self.execution_lock.lock().await;
            self.run_locked(symbol, side, size, client_order_id).await
        };

        match &result {
            Ok(ExecutionOutcome::Executed(trade)) => {
                self.executed.fetch_add(1, Ordering::Relaxed);
                self.notify(BotEvent::TradeExecuted(trade.clone())).await;
            }
            Ok(_) => {}
            Err(TradingError::Validation(e)) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                info!("{} {} rejected before placement: {}", side, symbol, e);
            }
            Err(TradingError::ExchangeRejection(reason)) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!("{} {} rejected by exchange: {}", side, symbol, reason);
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!("{} {} failed [{}]: {}", side, symbol, e.error_code(), e);
            }
        }

        result
    }

    async fn run_locked(
        &self,
        symbol: &str,
        side: OrderSide,
        size: TradeSize,
        client_order_id: Option<String>,
    ) -> TradingResult<ExecutionOutcome> {
        // a retry must not be re-validated against the state its first attempt changed
        if let Some(id) = client_order_id.as_deref() {
            if let Some(trade) = self.ledger.trade(id).await? {
                info!("Client order id {} already recorded, returning stored trade", id);
                return Ok(ExecutionOutcome::AlreadyRecorded(trade));
            }
        }

        let raw = size.raw();
        if !raw.is_finite() || raw <= 0.0 {
            return Err(ValidationError::NonPositiveAmount(raw).into());
        }

        let symbol = base_symbol(symbol)?;
        let product_id = format!("{}-{}", symbol, self.config.quote_currency);

        let spot_price = self.gateway.get_spot_price(&product_id).await?;
        if !spot_price.is_finite() || spot_price <= 0.0 {
            return Err(TradingError::InvalidResponse(format!(
                "spot price for {} is {}",
                product_id, spot_price
            )));
        }

        let order_size = match side {
            OrderSide::Buy => {
                let notional = match size {
                    TradeSize::Notional(n) => n,
                    TradeSize::Units(u) => u * spot_price,
                };
                let accounts = self.gateway.get_accounts().await?;
                let available = available_balance(&accounts, &self.config.quote_currency);
                if notional > available {
                    return Err(ValidationError::InsufficientFunds {
                        required: notional,
                        available,
                        currency: self.config.quote_currency.clone(),
                    }
                    .into());
                }
                SizeSpec::Quote(notional)
            }
            OrderSide::Sell => {
                let units = match size {
                    TradeSize::Notional(n) => n / spot_price,
                    TradeSize::Units(u) => u,
                };
                let held = self.ledger.holding(&symbol).await?;
                if units > held {
                    return Err(ValidationError::InsufficientHoldings {
                        symbol: symbol.clone(),
                        requested: units,
                        held,
                    }
                    .into());
                }
                SizeSpec::Base(units)
            }
        };

        let client_order_id = client_order_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let request = OrderRequest::new(client_order_id.clone(), product_id, side, order_size)
            .map_err(|_| TradingError::Validation(ValidationError::NonPositiveAmount(order_size.value())))?;

        info!(
            "Placing {} {} size={:?} client_order_id={}",
            side, symbol, order_size, client_order_id
        );

        let order = match self.gateway.place_order(&request).await {
            Ok(order) => order,
            Err(TradingError::ExchangeRejection(reason)) => {
                self.record_rejection(&client_order_id, &symbol, side, &reason)
                    .await;
                return Err(TradingError::ExchangeRejection(reason));
            }
            Err(e) => return Err(e),
        };

        if order.status.is_rejected() {
            let reason = format!("order {} ended {}", order.order_id, order.status);
            self.record_rejection(&client_order_id, &symbol, side, &reason)
                .await;
            return Err(TradingError::ExchangeRejection(reason));
        }

        let trade = build_trade(&order, &symbol, side, order_size, spot_price);
        let recorded = self.ledger.record_fill(&trade).await.map_err(|e| {
            error!(
                "Order {} filled but ledger write failed: {}",
                order.order_id, e
            );
            e
        })?;

        if !recorded {
            info!(
                "Client order id {} already recorded, not duplicating trade",
                client_order_id
            );
            return Ok(ExecutionOutcome::AlreadyRecorded(trade));
        }

        info!(
            "Executed {} {:.8} {} at {:.2} (order {})",
            side, trade.amount, trade.symbol, trade.price, trade.order_id
        );
        Ok(ExecutionOutcome::Executed(trade))
    }

    async fn record_rejection(&self, client_order_id: &str, symbol: &str, side: OrderSide, reason: &str) {
        let attempt = FailedOrderAttempt {
            client_order_id: client_order_id.to_string(),
            symbol: symbol.to_string(),
            side,
            reason: reason.to_string(),
            timestamp: Utc::now(),
        };
        if let Err(e) = self.ledger.record_failed_attempt(&attempt).await {
            error!("Failed to record rejected order {}: {}", client_order_id, e);
        }
    }

    async fn notify(&self, event: BotEvent) {
        if let Err(e) = self.notifier.notify(event).await {
            warn!("Notification failed (ignored): {}", e);
        }
    }
}

/// "btc", "BTC" and "BTC-USD" all map to "BTC"
pub fn base_symbol(symbol: &str) -> TradingResult<String> {
    let base = symbol.trim().split('-').next().unwrap_or_default().to_uppercase();
    if base.is_empty() || !base.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidSymbol(symbol.to_string()).into());
    }
    Ok(base)
}

fn build_trade(
    order: &Order,
    symbol: &str,
    side: OrderSide,
    size: SizeSpec,
    spot_price: f64,
) -> TradeRecord {
    let price = order
        .average_filled_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(spot_price);

    let amount = match size {
        SizeSpec::Quote(notional) => order
            .filled_size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(notional / price),
        SizeSpec::Base(units) => order
            .filled_size
            .filter(|s| s.is_finite() && *s > 0.0 && *s <= units)
            .unwrap_or(units),
    };

    TradeRecord {
        id: order.client_order_id.clone(),
        order_id: order.order_id.clone(),
        symbol: symbol.to_string(),
        side,
        amount,
        price,
        timestamp: Utc::now(),
    }
}
