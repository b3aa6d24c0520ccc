//! DecisionEngine - fuses prediction and sentiment into a BUY / SELL / HOLD call
//!
//! Stateless and deterministic. Sentiment is weighted lower than the price
//! prediction because headline scoring is noisier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_objects::{RiskLevel, Signal};

pub const PREDICTION_WEIGHT: f64 = 0.7;
pub const SENTIMENT_WEIGHT: f64 = 0.3;
/// Threshold at MEDIUM risk; scales linearly with the risk multiplier
pub const BASE_THRESHOLD: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Outcome of one evaluation. `notional_amount` is in quote currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub symbol: String,
    pub action: TradeAction,
    pub notional_amount: f64,
    pub combined_signal: f64,
}

pub fn combined_signal(prediction: &Signal, sentiment: &Signal) -> f64 {
    prediction.value() * PREDICTION_WEIGHT + sentiment.value() * SENTIMENT_WEIGHT
}

pub fn threshold(risk_level: RiskLevel) -> f64 {
    BASE_THRESHOLD * risk_level.multiplier()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine;

impl DecisionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(
        &self,
        symbol: &str,
        prediction: &Signal,
        sentiment: &Signal,
        risk_level: RiskLevel,
        max_trade_amount: f64,
    ) -> TradeDecision {
        let combined = combined_signal(prediction, sentiment);
        let multiplier = risk_level.multiplier();
        let threshold = threshold(risk_level);

        let action = if combined > threshold {
            TradeAction::Buy
        } else if combined < -threshold {
            TradeAction::Sell
        } else {
            TradeAction::Hold
        };

        let notional_amount = match action {
            TradeAction::Hold => 0.0,
            _ => max_trade_amount * multiplier,
        };

        tracing::debug!(
            symbol,
            prediction = prediction.value(),
            prediction_confidence = prediction.confidence(),
            sentiment = sentiment.value(),
            combined,
            threshold,
            %action,
            "decision computed"
        );

        TradeDecision {
            symbol: symbol.to_string(),
            action,
            notional_amount,
            combined_signal: combined,
        }
    }
}
