use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;
use crate::domain::value_objects::RiskLevel;

/// User-editable bot settings, re-read on every loop iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(alias = "selectedCryptos")]
    pub monitored_symbols: Vec<String>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    pub max_trade_amount: f64,
    #[serde(default)]
    pub trading_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            monitored_symbols: vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()],
            risk_level: RiskLevel::Medium,
            max_trade_amount: 100.0,
            trading_enabled: false,
        }
    }
}

impl UserSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.max_trade_amount.is_finite() || self.max_trade_amount <= 0.0 {
            return Err(ValidationError::InvalidSettings(format!(
                "maxTradeAmount must be positive, got {}",
                self.max_trade_amount
            )));
        }
        if let Some(bad) = self
            .monitored_symbols
            .iter()
            .find(|s| s.trim().is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        {
            return Err(ValidationError::InvalidSymbol(bad.clone()));
        }
        Ok(())
    }
}
