use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar produced by the exchange gateway
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
