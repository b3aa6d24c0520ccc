pub mod decision_engine;
pub mod trade_executor;
