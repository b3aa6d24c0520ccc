//! Prediction / sentiment collaborators
//!
//! The scoring models live outside the trading core; the core only consumes
//! their numeric output.

use crate::domain::entities::candle::Candle;
use crate::domain::errors::TradingResult;
use crate::domain::value_objects::Signal;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// Expected short-term price direction for `symbol`
    async fn predict(&self, symbol: &str, candles: &[Candle]) -> TradingResult<Signal>;

    /// Sentiment of free text, typically concatenated headlines
    async fn sentiment(&self, text: &str) -> TradingResult<Signal>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub source: String,
    pub related_to: Vec<String>,
}

#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// Recent headlines mentioning `symbol`
    async fn recent_news(&self, symbol: &str) -> TradingResult<Vec<NewsItem>>;
}
