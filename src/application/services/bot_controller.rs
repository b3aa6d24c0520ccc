//! BotController - RUNNING/STOPPED state machine around the evaluation loop
//!
//! One loop iteration ([`BotController::step`]) reads the settings and, when
//! trading is enabled, runs every monitored symbol through
//! history -> prediction -> news sentiment -> decision -> execution.
//! The background task started by [`BotController::start`] repeats `step`
//! with a sleep between iterations that a `CancellationToken` cuts short.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::entities::settings::UserSettings;
use crate::domain::errors::{TradingError, TradingResult};
use crate::domain::repositories::exchange_gateway::ExchangeGateway;
use crate::domain::repositories::notification::{BotEvent, NotificationSink};
use crate::domain::repositories::settings_store::SettingsStore;
use crate::domain::repositories::signal_provider::{NewsFeed, SignalProvider};
use crate::domain::services::decision_engine::{DecisionEngine, TradeAction, TradeDecision};
use crate::domain::services::trade_executor::{
    base_symbol, ExecutionOutcome, ExecutionStats, TradeExecutor,
};
use crate::domain::value_objects::Signal;

/// Sleep lengths between loop iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotSchedule {
    /// After a completed pass
    pub pass_interval: Duration,
    /// While trading is disabled
    pub idle_interval: Duration,
    /// First retry delay after a failed pass; doubles up to half of `pass_interval`
    pub backoff_interval: Duration,
}

impl Default for BotSchedule {
    fn default() -> Self {
        Self {
            pass_interval: Duration::from_secs(300),
            idle_interval: Duration::from_secs(60),
            backoff_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BotState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub code: &'static str,
    pub error: String,
}

/// What one pass over the monitored symbols did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Symbols that produced a decision
    pub evaluated: usize,
    pub executed: usize,
    pub held: usize,
    /// Orders refused by validation or by the exchange
    pub rejected: usize,
    pub failures: Vec<SymbolFailure>,
    /// Stop was requested before the pass finished
    pub interrupted: bool,
}

impl PassReport {
    fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            evaluated: 0,
            executed: 0,
            held: 0,
            rejected: 0,
            failures: Vec::new(),
            interrupted: false,
        }
    }

    fn fail(&mut self, symbol: &str, error: &TradingError) {
        self.failures.push(SymbolFailure {
            symbol: symbol.to_string(),
            code: error.error_code(),
            error: error.to_string(),
        });
    }
}

/// Result of one loop iteration, deciding the following sleep
#[derive(Debug, Clone, PartialEq)]
pub enum LoopStep {
    /// Trading disabled
    Idle,
    Pass(PassReport),
    /// Settings unreadable or every symbol failed
    Backoff { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub state: BotState,
    pub using_mock_data: bool,
    pub last_pass: Option<PassReport>,
    pub execution: ExecutionStats,
}

/// Doubling retry delay, reset by a successful pass.
///
/// Capped at half the pass interval so a retry always comes sooner than the
/// next regular pass would.
#[derive(Debug)]
struct Backoff {
    initial: Duration,
    max: Duration,
    next: Duration,
    consecutive_failures: u32,
}

impl Backoff {
    fn new(initial: Duration, pass_interval: Duration) -> Self {
        let max = pass_interval / 2;
        let initial = initial.min(max);
        Self {
            initial,
            max,
            next: initial,
            consecutive_failures: 0,
        }
    }

    fn record_failure(&mut self) -> Duration {
        let delay = self.next;
        self.consecutive_failures += 1;
        self.next = std::cmp::min(self.next * 2, self.max);
        delay
    }

    fn reset(&mut self) {
        if self.consecutive_failures > 0 {
            info!(
                "Trading loop recovered after {} failed pass(es)",
                self.consecutive_failures
            );
        }
        self.consecutive_failures = 0;
        self.next = self.initial;
    }
}

struct RunHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

pub struct BotController {
    gateway: Arc<dyn ExchangeGateway>,
    signals: Arc<dyn SignalProvider>,
    news: Arc<dyn NewsFeed>,
    settings: Arc<dyn SettingsStore>,
    executor: Arc<TradeExecutor>,
    notifier: Arc<dyn NotificationSink>,
    engine: DecisionEngine,
    schedule: BotSchedule,
    run: Mutex<Option<RunHandle>>,
    last_pass: RwLock<Option<PassReport>>,
}

impl BotController {
    pub fn new(
        gateway: Arc<dyn ExchangeGateway>,
        signals: Arc<dyn SignalProvider>,
        news: Arc<dyn NewsFeed>,
        settings: Arc<dyn SettingsStore>,
        executor: Arc<TradeExecutor>,
        notifier: Arc<dyn NotificationSink>,
        schedule: BotSchedule,
    ) -> Self {
        Self {
            gateway,
            signals,
            news,
            settings,
            executor,
            notifier,
            engine: DecisionEngine::new(),
            schedule,
            run: Mutex::new(None),
            last_pass: RwLock::new(None),
        }
    }

    pub fn state(&self) -> BotState {
        let run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        match run.as_ref() {
            Some(handle) if !handle.task.is_finished() => BotState::Running,
            _ => BotState::Stopped,
        }
    }

    pub fn last_pass(&self) -> Option<PassReport> {
        self.last_pass
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn status(&self) -> BotStatus {
        BotStatus {
            state: self.state(),
            using_mock_data: self.gateway.is_using_mock_data(),
            last_pass: self.last_pass(),
            execution: self.executor.stats(),
        }
    }

    /// STOPPED -> RUNNING. Returns `false` when already running.
    pub async fn start(self: &Arc<Self>) -> bool {
        {
            let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(run.as_ref(), Some(handle) if !handle.task.is_finished()) {
                debug!("start ignored, bot already running");
                return false;
            }

            let token = CancellationToken::new();
            let controller = Arc::clone(self);
            let loop_token = token.clone();
            let task = tokio::spawn(async move { controller.run_loop(loop_token).await });
            *run = Some(RunHandle { token, task });
        }

        info!("Trading bot started");
        self.notify(BotEvent::BotStarted).await;
        true
    }

    /// RUNNING -> STOPPED. Returns `false` when already stopped.
    ///
    /// In-flight exchange calls complete; nothing new is started and a
    /// decision reached after this point is discarded.
    pub async fn stop(&self) -> bool {
        let handle = self
            .run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            debug!("stop ignored, bot not running");
            return false;
        };
        handle.token.cancel();

        info!("Trading bot stopped");
        self.notify(BotEvent::BotStopped).await;
        true
    }

    async fn run_loop(&self, token: CancellationToken) {
        let mut backoff = Backoff::new(self.schedule.backoff_interval, self.schedule.pass_interval);

        while !token.is_cancelled() {
            let delay = match self.step(&token).await {
                LoopStep::Idle => self.schedule.idle_interval,
                LoopStep::Pass(report) => {
                    backoff.reset();
                    info!(
                        evaluated = report.evaluated,
                        executed = report.executed,
                        held = report.held,
                        rejected = report.rejected,
                        failures = report.failures.len(),
                        "trading pass complete"
                    );
                    self.schedule.pass_interval
                }
                LoopStep::Backoff { reason } => {
                    let delay = backoff.record_failure();
                    warn!("Trading pass failed ({}), retrying in {:?}", reason, delay);
                    delay
                }
            };

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        debug!("trading loop exited");
    }

    /// One loop iteration, without the sleep that follows it
    pub async fn step(&self, token: &CancellationToken) -> LoopStep {
        let settings = match self.settings.load().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Could not read settings: {}", e);
                return LoopStep::Backoff {
                    reason: e.to_string(),
                };
            }
        };

        if !settings.trading_enabled {
            debug!("trading disabled, idling");
            return LoopStep::Idle;
        }

        let report = self.run_pass(&settings, token).await;
        *self.last_pass.write().unwrap_or_else(PoisonError::into_inner) = Some(report.clone());

        let attempted = report.evaluated + report.failures.len();
        if !report.interrupted && attempted > 0 && report.evaluated == 0 {
            return LoopStep::Backoff {
                reason: format!("all {} symbols failed", attempted),
            };
        }
        LoopStep::Pass(report)
    }

    async fn run_pass(&self, settings: &UserSettings, token: &CancellationToken) -> PassReport {
        let mut report = PassReport::begin();

        for symbol in &settings.monitored_symbols {
            if token.is_cancelled() {
                report.interrupted = true;
                break;
            }

            let decision = match self.evaluate(symbol, settings).await {
                Ok(decision) => decision,
                Err(e) => {
                    warn!("Skipping {} this pass [{}]: {}", symbol, e.error_code(), e);
                    report.fail(symbol, &e);
                    continue;
                }
            };
            report.evaluated += 1;

            if token.is_cancelled() {
                info!(
                    "Stop requested, discarding {} decision for {}",
                    decision.action, decision.symbol
                );
                report.interrupted = true;
                break;
            }

            if decision.action == TradeAction::Hold {
                report.held += 1;
                continue;
            }

            match self.executor.execute(&decision).await {
                Ok(ExecutionOutcome::Executed(_)) => report.executed += 1,
                Ok(ExecutionOutcome::Skipped { .. }) => report.held += 1,
                Ok(ExecutionOutcome::AlreadyRecorded(_)) => {}
                Err(TradingError::Validation(_)) | Err(TradingError::ExchangeRejection(_)) => {
                    report.rejected += 1
                }
                Err(e) => report.fail(symbol, &e),
            }
        }

        report.finished_at = Utc::now();
        report
    }

    async fn evaluate(&self, symbol: &str, settings: &UserSettings) -> TradingResult<TradeDecision> {
        let base = base_symbol(symbol)?;
        let product_id = self.executor.product_id(&base)?;

        let candles = self.gateway.get_historical_data(&product_id).await?;
        let prediction = self.signals.predict(&base, &candles).await?;
        let sentiment = self.news_sentiment(&base).await?;

        Ok(self.engine.decide(
            &base,
            &prediction,
            &sentiment,
            settings.risk_level,
            settings.max_trade_amount,
        ))
    }

    /// Sentiment over recent headlines; neutral when there are none
    async fn news_sentiment(&self, symbol: &str) -> TradingResult<Signal> {
        let news = match self.news.recent_news(symbol).await {
            Ok(news) => news,
            Err(e) => {
                warn!("News unavailable for {}: {}", symbol, e);
                Vec::new()
            }
        };
        if news.is_empty() {
            return Ok(Signal::neutral());
        }

        let text = news
            .iter()
            .map(|item| format!("{} {}", item.title, item.description))
            .collect::<Vec<_>>()
            .join(" ");
        self.signals.sentiment(&text).await
    }

    async fn notify(&self, event: BotEvent) {
        if let Err(e) = self.notifier.notify(event).await {
            warn!("Notification failed (ignored): {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::candle::Candle;
    use crate::domain::repositories::ledger::LedgerStore;
    use crate::domain::repositories::signal_provider::NewsItem;
    use crate::domain::services::trade_executor::TradeExecutorConfig;
    use crate::domain::value_objects::RiskLevel;
    use crate::infrastructure::coinbase_advanced_client::{
        CoinbaseAdvancedGateway, CoinbaseGatewayConfig,
    };
    use crate::infrastructure::news_feed::StaticNewsFeed;
    use crate::persistence::memory::{InMemoryLedger, InMemorySettingsStore};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed prediction per symbol, neutral sentiment
    #[derive(Default)]
    struct ScriptedSignals {
        predictions: HashMap<String, f64>,
        failing: HashSet<String>,
        cancel_on_predict: Option<CancellationToken>,
        predict_calls: AtomicUsize,
    }

    impl ScriptedSignals {
        fn predicting(pairs: &[(&str, f64)]) -> Self {
            Self {
                predictions: pairs.iter().map(|(s, v)| (s.to_string(), *v)).collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SignalProvider for ScriptedSignals {
        async fn predict(&self, symbol: &str, candles: &[Candle]) -> TradingResult<Signal> {
            assert!(!candles.is_empty());
            self.predict_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_on_predict {
                token.cancel();
            }
            if self.failing.contains(symbol) {
                return Err(TradingError::Signal(format!("model down for {}", symbol)));
            }
            let value = self.predictions.get(symbol).copied().unwrap_or(0.0);
            Ok(Signal::new(value, 0.8)?)
        }

        async fn sentiment(&self, _text: &str) -> TradingResult<Signal> {
            Ok(Signal::neutral())
        }
    }

    struct FailingSettings {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl SettingsStore for FailingSettings {
        async fn load(&self) -> TradingResult<UserSettings> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Err(TradingError::Storage("database is locked".to_string()))
        }

        async fn save(&self, _: &UserSettings) -> TradingResult<()> {
            Ok(())
        }
    }

    struct FailingNews;

    #[async_trait]
    impl NewsFeed for FailingNews {
        async fn recent_news(&self, _: &str) -> TradingResult<Vec<NewsItem>> {
            Err(TradingError::Signal("feed offline".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<BotEvent>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingNotifier {
        async fn notify(&self, event: BotEvent) -> Result<(), String> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    struct Harness {
        controller: Arc<BotController>,
        ledger: Arc<InMemoryLedger>,
        signals: Arc<ScriptedSignals>,
        notifier: Arc<RecordingNotifier>,
    }

    fn enabled(symbols: &[&str]) -> UserSettings {
        UserSettings {
            monitored_symbols: symbols.iter().map(|s| s.to_string()).collect(),
            risk_level: RiskLevel::Medium,
            max_trade_amount: 100.0,
            trading_enabled: true,
        }
    }

    fn harness_with(
        signals: ScriptedSignals,
        settings: Arc<dyn SettingsStore>,
        news: Arc<dyn NewsFeed>,
    ) -> Harness {
        let gateway: Arc<dyn ExchangeGateway> = Arc::new(
            CoinbaseAdvancedGateway::new(CoinbaseGatewayConfig::default(), None).unwrap(),
        );
        let ledger = Arc::new(InMemoryLedger::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let signals = Arc::new(signals);
        let executor = Arc::new(TradeExecutor::new(
            TradeExecutorConfig::default(),
            gateway.clone(),
            ledger.clone(),
            notifier.clone(),
        ));
        let controller = Arc::new(BotController::new(
            gateway,
            signals.clone(),
            news,
            settings,
            executor,
            notifier.clone(),
            BotSchedule::default(),
        ));
        Harness {
            controller,
            ledger,
            signals,
            notifier,
        }
    }

    fn harness(signals: ScriptedSignals, settings: UserSettings) -> Harness {
        harness_with(
            signals,
            Arc::new(InMemorySettingsStore::with_settings(settings)),
            Arc::new(StaticNewsFeed::default()),
        )
    }

    #[tokio::test]
    async fn test_disabled_trading_idles() {
        let mut settings = enabled(&["BTC"]);
        settings.trading_enabled = false;
        let h = harness(ScriptedSignals::predicting(&[("BTC", 0.9)]), settings);

        let step = h.controller.step(&CancellationToken::new()).await;

        assert_eq!(step, LoopStep::Idle);
        assert_eq!(h.signals.predict_calls.load(Ordering::SeqCst), 0);
        assert!(h.ledger.trades().await.unwrap().is_empty());
        assert!(h.controller.last_pass().is_none());
    }

    #[tokio::test]
    async fn test_pass_buys_on_strong_signal() {
        let h = harness(
            ScriptedSignals::predicting(&[("BTC", 0.5)]),
            enabled(&["BTC", "ETH"]),
        );

        let LoopStep::Pass(report) = h.controller.step(&CancellationToken::new()).await else {
            panic!("expected a pass");
        };

        assert_eq!(report.evaluated, 2);
        assert_eq!(report.executed, 1);
        assert_eq!(report.held, 1);
        assert!(report.failures.is_empty());

        let trades = h.ledger.trades().await.unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].symbol, "BTC");
        assert!((h.ledger.holding("BTC").await.unwrap() - 0.002).abs() < 1e-12);
        assert_eq!(h.controller.last_pass(), Some(report));
    }

    #[tokio::test]
    async fn test_symbol_failure_does_not_stop_pass() {
        let mut signals = ScriptedSignals::predicting(&[("ETH", 0.5)]);
        signals.failing.insert("BTC".to_string());
        let h = harness(signals, enabled(&["BTC", "ETH", "NOPE"]));

        let LoopStep::Pass(report) = h.controller.step(&CancellationToken::new()).await else {
            panic!("expected a pass");
        };

        assert_eq!(report.evaluated, 1);
        assert_eq!(report.executed, 1);
        let failed: Vec<&str> = report.failures.iter().map(|f| f.symbol.as_str()).collect();
        assert_eq!(failed, vec!["BTC", "NOPE"]);
        assert_eq!(report.failures[0].code, "ERR_SIGNAL");
        assert_eq!(report.failures[1].code, "ERR_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_every_symbol_failing_backs_off() {
        let mut signals = ScriptedSignals::default();
        signals.failing.insert("BTC".to_string());
        signals.failing.insert("ETH".to_string());
        let h = harness(signals, enabled(&["BTC", "ETH"]));

        let step = h.controller.step(&CancellationToken::new()).await;
        assert!(matches!(step, LoopStep::Backoff { .. }));
        assert_eq!(h.controller.last_pass().unwrap().failures.len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_settings_backs_off() {
        let settings = Arc::new(FailingSettings {
            loads: AtomicUsize::new(0),
        });
        let h = harness_with(
            ScriptedSignals::default(),
            settings,
            Arc::new(StaticNewsFeed::default()),
        );

        let step = h.controller.step(&CancellationToken::new()).await;
        assert!(matches!(step, LoopStep::Backoff { reason } if reason.contains("database is locked")));
    }

    #[tokio::test]
    async fn test_news_outage_means_neutral_sentiment() {
        let h = harness_with(
            ScriptedSignals::predicting(&[("BTC", 0.5)]),
            Arc::new(InMemorySettingsStore::with_settings(enabled(&["BTC"]))),
            Arc::new(FailingNews),
        );

        let LoopStep::Pass(report) = h.controller.step(&CancellationToken::new()).await else {
            panic!("expected a pass");
        };
        assert_eq!(report.executed, 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_pass_does_nothing() {
        let h = harness(
            ScriptedSignals::predicting(&[("BTC", 0.9)]),
            enabled(&["BTC"]),
        );
        let token = CancellationToken::new();
        token.cancel();

        let LoopStep::Pass(report) = h.controller.step(&token).await else {
            panic!("expected a pass");
        };
        assert!(report.interrupted);
        assert_eq!(report.evaluated, 0);
        assert_eq!(h.signals.predict_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_decision_after_stop_is_discarded() {
        let token = CancellationToken::new();
        let mut signals = ScriptedSignals::predicting(&[("BTC", 0.9), ("ETH", 0.9)]);
        signals.cancel_on_predict = Some(token.clone());
        let h = harness(signals, enabled(&["BTC", "ETH"]));

        let LoopStep::Pass(report) = h.controller.step(&token).await else {
            panic!("expected a pass");
        };

        assert!(report.interrupted);
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.executed, 0);
        assert!(h.ledger.trades().await.unwrap().is_empty());
        assert_eq!(h.signals.predict_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_stop_idempotent_and_resumable() {
        let mut settings = enabled(&["BTC"]);
        settings.trading_enabled = false;
        let h = harness(ScriptedSignals::default(), settings);

        assert_eq!(h.controller.state(), BotState::Stopped);
        assert!(!h.controller.stop().await);

        assert!(h.controller.start().await);
        assert!(!h.controller.start().await);
        assert_eq!(h.controller.state(), BotState::Running);

        assert!(h.controller.stop().await);
        assert!(!h.controller.stop().await);
        assert_eq!(h.controller.state(), BotState::Stopped);

        assert!(h.controller.start().await);
        assert_eq!(h.controller.state(), BotState::Running);
        h.controller.stop().await;

        let events = h.notifier.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                BotEvent::BotStarted,
                BotEvent::BotStopped,
                BotEvent::BotStarted,
                BotEvent::BotStopped,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_sleeps_pass_interval_between_passes() {
        let h = harness(ScriptedSignals::default(), enabled(&["BTC"]));

        h.controller.start().await;
        tokio::time::sleep(Duration::from_secs(301)).await;
        h.controller.stop().await;

        // passes at t=0 and t=300
        assert_eq!(h.signals.predict_calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(h.signals.predict_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_after_failures() {
        let settings = Arc::new(FailingSettings {
            loads: AtomicUsize::new(0),
        });
        let h = harness_with(
            ScriptedSignals::default(),
            settings.clone(),
            Arc::new(StaticNewsFeed::default()),
        );

        h.controller.start().await;
        tokio::time::sleep(Duration::from_secs(200)).await;
        // attempts at t=0, 60 and 180
        assert_eq!(settings.loads.load(Ordering::SeqCst), 3);

        // third delay is capped at 150s, below the 300s pass interval
        tokio::time::sleep(Duration::from_secs(140)).await;
        h.controller.stop().await;
        assert_eq!(settings.loads.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_backoff_capped_and_reset() {
        let mut backoff = Backoff::new(Duration::from_secs(60), Duration::from_secs(300));
        let delays: Vec<u64> = (0..5).map(|_| backoff.record_failure().as_secs()).collect();
        assert_eq!(delays, vec![60, 120, 150, 150, 150]);

        backoff.reset();
        assert_eq!(backoff.record_failure(), Duration::from_secs(60));
    }

    #[test]
    fn test_backoff_always_shorter_than_pass_interval() {
        let pass = Duration::from_secs(300);
        let mut backoff = Backoff::new(Duration::from_secs(600), pass);
        for _ in 0..10 {
            assert!(backoff.record_failure() < pass);
        }
    }
}
