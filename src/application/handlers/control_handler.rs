use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::services::bot_controller::{BotController, BotState, BotStatus};
use crate::domain::entities::credentials::Credentials;
use crate::domain::entities::market::ProductPage;
use crate::domain::entities::order::OrderSide;
use crate::domain::entities::portfolio::PortfolioPosition;
use crate::domain::entities::settings::UserSettings;
use crate::domain::entities::trade::{FailedOrderAttempt, TradeRecord};
use crate::domain::errors::TradingError;
use crate::domain::repositories::exchange_gateway::ExchangeGateway;
use crate::domain::repositories::ledger::LedgerStore;
use crate::domain::repositories::settings_store::SettingsStore;
use crate::domain::services::trade_executor::{ExecutionOutcome, TradeExecutor};

/// Shared services behind the control API
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<BotController>,
    pub executor: Arc<TradeExecutor>,
    pub gateway: Arc<dyn ExchangeGateway>,
    pub ledger: Arc<dyn LedgerStore>,
    pub settings: Arc<dyn SettingsStore>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub struct ApiError(StatusCode, TradingError);

impl From<TradingError> for ApiError {
    fn from(error: TradingError) -> Self {
        let status = match &error {
            TradingError::Validation(_) => StatusCode::BAD_REQUEST,
            TradingError::NotFound(_) => StatusCode::NOT_FOUND,
            TradingError::ExchangeRejection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TradingError::Auth(_) | TradingError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            TradingError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
            TradingError::Storage(_) | TradingError::Signal(_) | TradingError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError(status, error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(status, error) = self;
        if status.is_server_error() {
            tracing::error!("Control API request failed: {}", error);
        }
        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                code: error.error_code().to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub bot: BotState,
    pub using_mock_data: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running",
        bot: state.controller.state(),
        using_mock_data: state.gateway.is_using_mock_data(),
    })
}

pub async fn bot_status(State(state): State<AppState>) -> Json<BotStatus> {
    Json(state.controller.status())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransitionResponse {
    /// Whether this call changed the state
    pub changed: bool,
    pub state: BotState,
}

pub async fn start_bot(State(state): State<AppState>) -> Json<TransitionResponse> {
    let changed = state.controller.start().await;
    Json(TransitionResponse {
        changed,
        state: state.controller.state(),
    })
}

pub async fn stop_bot(State(state): State<AppState>) -> Json<TransitionResponse> {
    let changed = state.controller.stop().await;
    Json(TransitionResponse {
        changed,
        state: state.controller.state(),
    })
}

pub async fn get_portfolio(State(state): State<AppState>) -> ApiResult<Json<Vec<PortfolioPosition>>> {
    Ok(Json(state.ledger.portfolio().await?))
}

#[derive(Debug, Serialize)]
pub struct TradeHistoryResponse {
    pub trades: Vec<TradeRecord>,
    pub failed_orders: Vec<FailedOrderAttempt>,
}

pub async fn get_trades(State(state): State<AppState>) -> ApiResult<Json<TradeHistoryResponse>> {
    Ok(Json(TradeHistoryResponse {
        trades: state.ledger.trades().await?,
        failed_orders: state.ledger.failed_attempts().await?,
    }))
}

/// Manual trade. BUY `amount` is quote currency, SELL `amount` is asset units.
#[derive(Debug, Deserialize)]
pub struct ManualTradeRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub amount: f64,
    #[serde(default)]
    pub client_order_id: Option<String>,
}

/// Place a manual order
pub async fn place_manual_trade(
    State(state): State<AppState>,
    Json(payload): Json<ManualTradeRequest>,
) -> ApiResult<(StatusCode, Json<TradeRecord>)> {
    tracing::info!(
        "Manual {} {} amount={}",
        payload.side,
        payload.symbol,
        payload.amount
    );
    let outcome = state
        .executor
        .execute_manual(
            &payload.symbol,
            payload.side,
            payload.amount,
            payload.client_order_id,
        )
        .await?;

    match outcome {
        ExecutionOutcome::Executed(trade) => Ok((StatusCode::CREATED, Json(trade))),
        ExecutionOutcome::AlreadyRecorded(trade) => Ok((StatusCode::OK, Json(trade))),
        ExecutionOutcome::Skipped { symbol } => Err(TradingError::InvalidResponse(format!(
            "manual trade for {} was not executed",
            symbol
        ))
        .into()),
    }
}

pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<UserSettings>> {
    Ok(Json(state.settings.load().await?))
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<UserSettings>,
) -> ApiResult<Json<UserSettings>> {
    state.settings.save(&settings).await?;
    tracing::info!(
        "Settings updated: {} symbol(s), risk {}, trading {}",
        settings.monitored_symbols.len(),
        settings.risk_level.as_str(),
        if settings.trading_enabled { "enabled" } else { "disabled" }
    );
    Ok(Json(settings))
}

/// Query parameters for the product listing
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    /// Results per page (default 10)
    pub page_size: Option<usize>,
    /// Zero-based page number (default 0)
    pub page_offset: Option<usize>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductsQuery>,
) -> ApiResult<Json<ProductPage>> {
    let page = state
        .gateway
        .list_products(params.page_size.unwrap_or(10), params.page_offset.unwrap_or(0))
        .await?;
    Ok(Json(page))
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub key_id: String,
    pub secret: String,
}

/// Replace exchange credentials; a `null` body clears them and forces mock data
pub async fn put_credentials(
    State(state): State<AppState>,
    Json(payload): Json<Option<CredentialsRequest>>,
) -> Response {
    let credentials = payload.map(|p| Credentials::new(p.key_id, p.secret));
    match state.gateway.set_credentials(credentials) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        // the caller supplied the bad key, not the exchange
        Err(e @ TradingError::Auth(_)) => ApiError(StatusCode::BAD_REQUEST, e).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn clear_mock_mode(State(state): State<AppState>) -> StatusCode {
    state.gateway.clear_mock_mode();
    StatusCode::NO_CONTENT
}
