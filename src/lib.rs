//! signalpilot - automated crypto trading assistant
//!
//! Polls market data through a Coinbase Advanced Trade gateway, fuses a
//! price prediction with news sentiment into BUY / SELL / HOLD decisions,
//! and records the resulting fills in a trade ledger.

pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod persistence;
pub mod rate_limit;
pub mod secrets;
