use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::application::services::bot_controller::BotSchedule;
use crate::infrastructure::coinbase_advanced_client::{CoinbaseGatewayConfig, COINBASE_API_BASE};
use crate::rate_limit::RateLimiterConfig;

/// Minimum length of a control API key
pub const MIN_API_KEY_LENGTH: usize = 32;

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub exchange_api_base: String,
    pub quote_currency: String,
    pub request_timeout_ms: u64,
    pub max_response_bytes: usize,
    pub requests_per_second: u32,

    pub bot_pass_interval_seconds: u64,  // sleep after a completed pass
    pub bot_idle_interval_seconds: u64,  // sleep while trading is disabled
    pub bot_backoff_interval_seconds: u64, // first retry delay after a failed pass

    pub database_url: String,
    pub control_api_addr: SocketAddr,
    pub control_api_keys: Vec<String>,
    pub control_api_requests_per_minute: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            exchange_api_base: COINBASE_API_BASE.to_string(),
            quote_currency: "USD".to_string(),
            request_timeout_ms: 10_000,
            max_response_bytes: 2 * 1024 * 1024,
            requests_per_second: 10,

            bot_pass_interval_seconds: 300,
            bot_idle_interval_seconds: 60,
            bot_backoff_interval_seconds: 60,

            database_url: "sqlite://data/signalpilot.db".to_string(),
            control_api_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            control_api_keys: Vec::new(),
            control_api_requests_per_minute: 100,
        }
    }
}

/// Parse `name` if set and accepted by `valid`; otherwise warn and keep `current`
fn env_override<T>(name: &str, current: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = std::env::var(name) else {
        return current;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        Ok(value) => {
            tracing::warn!(
                "Invalid {} value: {:?} (out of range), using default: {:?}",
                name,
                value,
                current
            );
            current
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse {} '{}': {}, using default: {:?}",
                name,
                raw,
                e,
                current
            );
            current
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppConfig {
        let mut config = AppConfig::default();

        if let Ok(base) = std::env::var("EXCHANGE_API_BASE") {
            match url::Url::parse(base.trim()) {
                Ok(url) if url.host_str().is_some() => {
                    config.exchange_api_base = base.trim().trim_end_matches('/').to_string();
                }
                _ => tracing::warn!(
                    "Invalid EXCHANGE_API_BASE '{}', using default: {}",
                    base,
                    config.exchange_api_base
                ),
            }
        }

        if let Ok(quote) = std::env::var("QUOTE_CURRENCY") {
            let quote = quote.trim().to_uppercase();
            if !quote.is_empty() && quote.chars().all(|c| c.is_ascii_alphanumeric()) {
                config.quote_currency = quote;
            } else {
                tracing::warn!(
                    "Invalid QUOTE_CURRENCY '{}', using default: {}",
                    quote,
                    config.quote_currency
                );
            }
        }

        config.request_timeout_ms = env_override("REQUEST_TIMEOUT_MS", config.request_timeout_ms, |v| {
            (100..=120_000).contains(v)
        });
        config.max_response_bytes = env_override("MAX_RESPONSE_BYTES", config.max_response_bytes, |v| {
            *v >= 1024
        });
        config.requests_per_second =
            env_override("REQUESTS_PER_SECOND", config.requests_per_second, |v| *v <= 1000);

        config.bot_pass_interval_seconds = env_override(
            "BOT_PASS_INTERVAL_SECONDS",
            config.bot_pass_interval_seconds,
            |v| (1..=86_400).contains(v),
        );
        config.bot_idle_interval_seconds = env_override(
            "BOT_IDLE_INTERVAL_SECONDS",
            config.bot_idle_interval_seconds,
            |v| (1..=86_400).contains(v),
        );
        config.bot_backoff_interval_seconds = env_override(
            "BOT_BACKOFF_INTERVAL_SECONDS",
            config.bot_backoff_interval_seconds,
            |v| (1..=86_400).contains(v),
        );

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if url.trim().starts_with("sqlite:") {
                config.database_url = url.trim().to_string();
            } else {
                tracing::warn!(
                    "DATABASE_URL must be a sqlite: URL, using default: {}",
                    config.database_url
                );
            }
        }

        config.control_api_addr =
            env_override("CONTROL_API_ADDR", config.control_api_addr, |_| true);
        config.control_api_requests_per_minute = env_override(
            "CONTROL_API_REQUESTS_PER_MINUTE",
            config.control_api_requests_per_minute,
            |v| *v > 0,
        );

        if let Ok(keys) = std::env::var("CONTROL_API_KEYS") {
            config.control_api_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }

        config
    }

    /// Fail-secure check: the control API never starts without a strong key
    pub fn validate(&self) -> Result<(), String> {
        if self.control_api_keys.is_empty() {
            return Err(
                "CONTROL_API_KEYS is not set. Set it to a comma-separated list of keys \
                 (generate one with: openssl rand -base64 32)"
                    .to_string(),
            );
        }
        if let Some(weak) = self
            .control_api_keys
            .iter()
            .find(|k| k.len() < MIN_API_KEY_LENGTH)
        {
            return Err(format!(
                "Control API key is too weak (length: {}, minimum: {})",
                weak.len(),
                MIN_API_KEY_LENGTH
            ));
        }
        Ok(())
    }

    pub fn gateway_config(&self) -> CoinbaseGatewayConfig {
        CoinbaseGatewayConfig {
            api_base: self.exchange_api_base.clone(),
            quote_currency: self.quote_currency.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_response_bytes: self.max_response_bytes,
            requests_per_second: self.requests_per_second,
            ..CoinbaseGatewayConfig::default()
        }
    }

    pub fn bot_schedule(&self) -> BotSchedule {
        BotSchedule {
            pass_interval: Duration::from_secs(self.bot_pass_interval_seconds),
            idle_interval: Duration::from_secs(self.bot_idle_interval_seconds),
            backoff_interval: Duration::from_secs(self.bot_backoff_interval_seconds),
        }
    }

    pub fn rate_limiter_config(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            requests_per_minute: self.control_api_requests_per_minute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.exchange_api_base, "https://api.coinbase.com");
        assert_eq!(config.quote_currency, "USD");
        assert_eq!(config.bot_pass_interval_seconds, 300);
        assert_eq!(config.bot_idle_interval_seconds, 60);
        assert_eq!(config.bot_backoff_interval_seconds, 60);
        assert_eq!(config.control_api_addr.port(), 8080);
    }

    #[test]
    fn test_env_override_rejects_out_of_range() {
        std::env::set_var("SIGNALPILOT_TEST_OVERRIDE_A", "0");
        assert_eq!(env_override("SIGNALPILOT_TEST_OVERRIDE_A", 60u64, |v| *v >= 1), 60);

        std::env::set_var("SIGNALPILOT_TEST_OVERRIDE_A", "abc");
        assert_eq!(env_override("SIGNALPILOT_TEST_OVERRIDE_A", 60u64, |v| *v >= 1), 60);

        std::env::set_var("SIGNALPILOT_TEST_OVERRIDE_A", " 120 ");
        assert_eq!(env_override("SIGNALPILOT_TEST_OVERRIDE_A", 60u64, |v| *v >= 1), 120);

        std::env::remove_var("SIGNALPILOT_TEST_OVERRIDE_A");
        assert_eq!(env_override("SIGNALPILOT_TEST_OVERRIDE_A", 60u64, |v| *v >= 1), 60);
    }

    #[test]
    fn test_validate_requires_strong_keys() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err());

        config.control_api_keys = vec!["short".to_string()];
        assert!(config.validate().is_err());

        config.control_api_keys = vec!["k".repeat(MIN_API_KEY_LENGTH)];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_configs() {
        let mut config = AppConfig::default();
        config.request_timeout_ms = 2500;
        config.bot_pass_interval_seconds = 30;

        let gateway = config.gateway_config();
        assert_eq!(gateway.request_timeout, Duration::from_millis(2500));
        assert_eq!(gateway.quote_currency, "USD");

        let schedule = config.bot_schedule();
        assert_eq!(schedule.pass_interval, Duration::from_secs(30));
        assert_eq!(schedule.idle_interval, Duration::from_secs(60));
    }
}
