use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::errors::ValidationError;

/// Amounts at or below this magnitude count as an empty position
pub const DUST_THRESHOLD: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub symbol: String,
    pub amount: f64,
}

/// Per-asset holdings. Amounts never go negative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    holdings: BTreeMap<String, f64>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positions(positions: impl IntoIterator<Item = PortfolioPosition>) -> Self {
        let holdings = positions
            .into_iter()
            .filter(|p| p.amount > DUST_THRESHOLD)
            .map(|p| (p.symbol, p.amount))
            .collect();
        Self { holdings }
    }

    pub fn holding(&self, symbol: &str) -> f64 {
        self.holdings.get(symbol).copied().unwrap_or(0.0)
    }

    /// Compute the amount after applying `delta`, without mutating
    pub fn preview(&self, symbol: &str, delta: f64) -> Result<f64, ValidationError> {
        let next = self.holding(symbol) + delta;
        if next < -DUST_THRESHOLD {
            return Err(ValidationError::InsufficientHoldings {
                symbol: symbol.to_string(),
                requested: -delta,
                held: self.holding(symbol),
            });
        }
        Ok(if next.abs() <= DUST_THRESHOLD { 0.0 } else { next })
    }

    /// Apply a signed change; empty positions are removed
    pub fn apply(&mut self, symbol: &str, delta: f64) -> Result<f64, ValidationError> {
        let next = self.preview(symbol, delta)?;
        if next == 0.0 {
            self.holdings.remove(symbol);
        } else {
            self.holdings.insert(symbol.to_string(), next);
        }
        Ok(next)
    }

    pub fn positions(&self) -> Vec<PortfolioPosition> {
        self.holdings
            .iter()
            .map(|(symbol, amount)| PortfolioPosition {
                symbol: symbol.clone(),
                amount: *amount,
            })
            .collect()
    }
}
