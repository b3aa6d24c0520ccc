pub mod candle;
pub mod credentials;
pub mod market;
pub mod order;
pub mod portfolio;
pub mod settings;
pub mod trade;
