pub mod control_handler;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::auth::{require_auth, ApiKeys};
use crate::rate_limit::{rate_limit_middleware, GlobalRateLimiter};
use control_handler::*;

/// Largest request body the control API accepts
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Control API. Everything but `/health` needs a bearer key.
pub fn router(state: AppState, keys: ApiKeys, limiter: GlobalRateLimiter) -> Router {
    let protected = Router::new()
        .route("/bot/status", get(bot_status))
        .route("/bot/start", post(start_bot))
        .route("/bot/stop", post(stop_bot))
        .route("/portfolio", get(get_portfolio))
        .route("/trades", get(get_trades))
        .route("/trades/manual", post(place_manual_trade))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/products", get(list_products))
        .route("/credentials", put(put_credentials))
        .route("/mock-mode", delete(clear_mock_mode))
        .layer(middleware::from_fn_with_state(keys, require_auth));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
