use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Directional score in [-1, 1] with a confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    value: f64,
    confidence: f64,
}

impl Signal {
    /// Build a signal, clamping both components into range.
    pub fn new(value: f64, confidence: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !confidence.is_finite() {
            return Err(ValidationError::InvalidSignal(format!(
                "non-finite component (value={}, confidence={})",
                value, confidence
            )));
        }

        Ok(Signal {
            value: value.clamp(-1.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
        })
    }

    /// No opinion: used when there is nothing to score
    pub fn neutral() -> Self {
        Signal {
            value: 0.0,
            confidence: 0.0,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}
