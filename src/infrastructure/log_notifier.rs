use async_trait::async_trait;
use tracing::info;

use crate::domain::repositories::notification::{BotEvent, NotificationSink};

/// Notification sink that writes each event to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, event: BotEvent) -> Result<(), String> {
        let (title, body) = event.message();
        match &event {
            BotEvent::TradeExecuted(trade) => info!(
                trade_id = %trade.id,
                symbol = %trade.symbol,
                side = %trade.side,
                "{}: {}",
                title,
                body
            ),
            _ => info!("{}: {}", title, body),
        }
        Ok(())
    }
}
