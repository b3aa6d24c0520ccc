pub mod risk_level;
pub mod signal;

pub use risk_level::RiskLevel;
pub use signal::Signal;
