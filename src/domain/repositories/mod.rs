pub mod credential_store;
pub mod exchange_gateway;
pub mod ledger;
pub mod notification;
pub mod settings_store;
pub mod signal_provider;
