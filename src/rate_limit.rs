use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Inbound limiter for the control API
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Rate limiter configuration
pub struct RateLimiterConfig {
    /// Maximum requests per minute
    pub requests_per_minute: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 100,
        }
    }
}

/// Create the control API limiter. A zero quota falls back to one request per minute.
pub fn create_rate_limiter(config: RateLimiterConfig) -> GlobalRateLimiter {
    let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)))
}

/// Middleware rejecting control API calls over quota with 429
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    match limiter.check() {
        Ok(_) => next.run(request).await,
        Err(_) => {
            tracing::warn!("Rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.",
            )
                .into_response()
        }
    }
}

/// Outbound throttle for exchange REST calls. Callers wait instead of failing.
pub struct RequestLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RequestLimiter {
    /// `requests_per_second == 0` disables throttling
    pub fn per_second(requests_per_second: u32) -> Self {
        let limiter = NonZeroU32::new(requests_per_second)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));
        Self { limiter }
    }

    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
