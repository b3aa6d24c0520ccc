pub mod coinbase_advanced_client;
pub mod heuristic_signals;
pub mod log_notifier;
pub mod mock_catalog;
pub mod news_feed;
pub mod request_signer;
