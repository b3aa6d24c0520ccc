use crate::domain::entities::settings::UserSettings;
use crate::domain::errors::TradingResult;
use async_trait::async_trait;

/// Persistent user settings, written by the UI and read by the bot each cycle
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored settings, or the defaults when nothing was saved yet
    async fn load(&self) -> TradingResult<UserSettings>;

    async fn save(&self, settings: &UserSettings) -> TradingResult<()>;
}
