use std::fmt;
use thiserror::Error;

/// Common result type for the trading core
pub type TradingResult<T> = Result<T, TradingError>;

/// Errors raised anywhere between the exchange gateway and the ledger
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TradingError {
    /// Bad or expired credentials (401/403). Triggers mock-mode fallback.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Timeout, connection failure, oversized response or a 5xx/429 reply
    #[error("Network error: {0}")]
    Network(String),

    /// Rejected locally, never reaches the exchange
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The exchange refused the order
    #[error("Order rejected by exchange: {0}")]
    ExchangeRejection(String),

    /// Unknown product or order id
    #[error("Not found: {0}")]
    NotFound(String),

    /// The exchange answered with a body we could not decode
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Ledger or settings store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Signal provider or news feed failure
    #[error("Signal provider error: {0}")]
    Signal(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl TradingError {
    /// Failures that flip the gateway into mock mode
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, TradingError::Auth(_) | TradingError::Network(_))
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TradingError::Validation(_) | TradingError::NotFound(_) => ErrorSeverity::Minor,
            TradingError::Network(_)
            | TradingError::ExchangeRejection(_)
            | TradingError::InvalidResponse(_)
            | TradingError::Signal(_) => ErrorSeverity::Moderate,
            TradingError::Auth(_) | TradingError::Storage(_) | TradingError::Configuration(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Short error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            TradingError::Auth(_) => "ERR_AUTH",
            TradingError::Network(_) => "ERR_NETWORK",
            TradingError::Validation(_) => "ERR_VALIDATION",
            TradingError::ExchangeRejection(_) => "ERR_EXCHANGE_REJECTION",
            TradingError::NotFound(_) => "ERR_NOT_FOUND",
            TradingError::InvalidResponse(_) => "ERR_INVALID_RESPONSE",
            TradingError::Storage(_) => "ERR_STORAGE",
            TradingError::Signal(_) => "ERR_SIGNAL",
            TradingError::Configuration(_) => "ERR_CONFIGURATION",
        }
    }
}

/// Pre-trade and input validation failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Amount must be positive and finite, got {0}")]
    NonPositiveAmount(f64),

    #[error("Insufficient {currency} balance: required {required:.2}, available {available:.2}")]
    InsufficientFunds {
        required: f64,
        available: f64,
        currency: String,
    },

    #[error("Insufficient {symbol} holdings: requested {requested:.8}, held {held:.8}")]
    InsufficientHoldings {
        symbol: String,
        requested: f64,
        held: f64,
    },

    #[error("Invalid signal: {0}")]
    InvalidSignal(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Minor,
    Moderate,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Minor => write!(f, "Minor"),
            ErrorSeverity::Moderate => write!(f, "Moderate"),
            ErrorSeverity::Critical => write!(f, "Critical"),
        }
    }
}

impl From<TradingError> for String {
    fn from(error: TradingError) -> Self {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_eligibility() {
        assert!(TradingError::Auth("expired".into()).is_fallback_eligible());
        assert!(TradingError::Network("timeout".into()).is_fallback_eligible());
        assert!(!TradingError::NotFound("DOGE-USD".into()).is_fallback_eligible());
        assert!(!TradingError::ExchangeRejection("INSUFFICIENT_FUND".into()).is_fallback_eligible());
        assert!(!TradingError::from(ValidationError::NonPositiveAmount(0.0)).is_fallback_eligible());
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::InsufficientFunds {
            required: 200.0,
            available: 50.5,
            currency: "USD".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Insufficient USD balance: required 200.00, available 50.50"
        );

        let wrapped: TradingError = error.into();
        assert_eq!(wrapped.error_code(), "ERR_VALIDATION");
        assert!(wrapped.to_string().starts_with("Insufficient USD balance"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Moderate);
        assert_eq!(
            TradingError::Auth("bad key".into()).severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            TradingError::Network("reset".into()).severity(),
            ErrorSeverity::Moderate
        );
    }
}
