use crate::domain::entities::order::OrderSide;
use crate::domain::entities::trade::TradeRecord;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    BotStarted,
    BotStopped,
    TradeExecuted(TradeRecord),
}

impl BotEvent {
    /// Title and body shown to the user
    pub fn message(&self) -> (String, String) {
        match self {
            BotEvent::BotStarted => (
                "Trading Bot Started".to_string(),
                "Automated trading is now running".to_string(),
            ),
            BotEvent::BotStopped => (
                "Trading Bot Stopped".to_string(),
                "Automated trading has been stopped".to_string(),
            ),
            BotEvent::TradeExecuted(trade) => {
                let verb = match trade.side {
                    OrderSide::Buy => "bought",
                    OrderSide::Sell => "sold",
                };
                (
                    format!("{} Order Executed", trade.side),
                    format!(
                        "Successfully {} {:.6} {} at ${:.2}",
                        verb, trade.amount, trade.symbol, trade.price
                    ),
                )
            }
        }
    }
}

/// Fire-and-forget user notifications. Errors are logged by callers and never
/// affect trading.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: BotEvent) -> Result<(), String>;
}
