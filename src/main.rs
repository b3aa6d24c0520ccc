use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signalpilot::application::handlers::control_handler::AppState;
use signalpilot::application::handlers::router;
use signalpilot::application::services::bot_controller::BotController;
use signalpilot::auth::ApiKeys;
use signalpilot::config::AppConfig;
use signalpilot::domain::repositories::credential_store::CredentialStore;
use signalpilot::domain::repositories::exchange_gateway::ExchangeGateway;
use signalpilot::domain::repositories::ledger::LedgerStore;
use signalpilot::domain::repositories::notification::NotificationSink;
use signalpilot::domain::repositories::settings_store::SettingsStore;
use signalpilot::domain::services::trade_executor::{TradeExecutor, TradeExecutorConfig};
use signalpilot::infrastructure::coinbase_advanced_client::CoinbaseAdvancedGateway;
use signalpilot::infrastructure::heuristic_signals::HeuristicSignalProvider;
use signalpilot::infrastructure::log_notifier::LogNotifier;
use signalpilot::infrastructure::news_feed::StaticNewsFeed;
use signalpilot::persistence::init_database;
use signalpilot::persistence::repository::{SqliteLedger, SqliteSettingsStore};
use signalpilot::rate_limit::create_rate_limiter;
use signalpilot::secrets::{CredentialSources, EnvCredentialStore, SecretConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to read .env: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signalpilot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    if let Err(e) = config.validate() {
        error!("SECURITY ERROR: {}", e);
        return Err(e.into());
    }

    info!("signalpilot starting, quote currency {}", config.quote_currency);

    let pool = init_database(&config.database_url).await?;
    let ledger: Arc<dyn LedgerStore> = Arc::new(SqliteLedger::new(pool.clone()));
    let settings: Arc<dyn SettingsStore> = Arc::new(SqliteSettingsStore::new(pool.clone()));

    let credentials =
        EnvCredentialStore::new(CredentialSources::default(), SecretConfig::from_env()).load();
    let gateway = Arc::new(CoinbaseAdvancedGateway::new(config.gateway_config(), credentials)?);
    if gateway.is_using_mock_data() {
        warn!("No exchange credentials, serving mock market data and simulated fills");
    }
    let gateway: Arc<dyn ExchangeGateway> = gateway;

    let notifier: Arc<dyn NotificationSink> = Arc::new(LogNotifier);
    let executor = Arc::new(TradeExecutor::new(
        TradeExecutorConfig {
            quote_currency: config.quote_currency.clone(),
        },
        gateway.clone(),
        ledger.clone(),
        notifier.clone(),
    ));
    let controller = Arc::new(BotController::new(
        gateway.clone(),
        Arc::new(HeuristicSignalProvider::new()),
        Arc::new(StaticNewsFeed::default()),
        settings.clone(),
        executor.clone(),
        notifier,
        config.bot_schedule(),
    ));

    let state = AppState {
        controller: controller.clone(),
        executor,
        gateway,
        ledger,
        settings,
    };
    let app = router(
        state,
        ApiKeys::new(config.control_api_keys.clone()),
        create_rate_limiter(config.rate_limiter_config()),
    );

    let listener = tokio::net::TcpListener::bind(config.control_api_addr).await?;
    info!("Control API listening on {}", config.control_api_addr);

    let shutdown_signal = async {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutting down gracefully...");
    controller.stop().await;
    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}
