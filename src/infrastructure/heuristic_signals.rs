//! Deterministic built-in signal provider
//!
//! Lets the bot run without an external model: prediction follows the
//! recent closing-price trend, sentiment counts lexicon hits in headlines.

use async_trait::async_trait;
use std::collections::HashSet;
use once_cell::sync::Lazy;

use crate::domain::entities::candle::Candle;
use crate::domain::errors::{TradingError, TradingResult};
use crate::domain::repositories::signal_provider::SignalProvider;
use crate::domain::value_objects::Signal;

/// Closes considered by the trend prediction
pub const TREND_WINDOW: usize = 5;
/// Relative move over the window that saturates the prediction at +/-1
pub const TREND_SATURATION: f64 = 0.05;
/// Tokens a negation word reaches forward
const NEGATION_REACH: usize = 3;

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bullish", "surge", "soar", "gain", "rally", "rise", "up", "high", "growth",
        "positive", "profit", "success", "breakthrough", "adoption", "partnership",
        "launch", "upgrade", "improve", "innovation", "opportunity", "potential",
        "strong", "support", "confidence", "momentum", "outperform", "beat", "exceed",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bearish", "crash", "plunge", "drop", "fall", "down", "low", "decline",
        "negative", "loss", "fail", "risk", "threat", "ban", "regulation", "concern",
        "fear", "uncertainty", "volatility", "sell", "dump", "weak", "resistance",
        "underperform", "miss", "below", "warning", "trouble", "problem", "hack", "scam",
    ]
    .into_iter()
    .collect()
});

static NEGATION_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["not", "no", "never", "none", "neither", "nor", "hardly", "barely"]
        .into_iter()
        .collect()
});

/// Trend of the last [`TREND_WINDOW`] closes.
///
/// Value is the relative move scaled by [`TREND_SATURATION`]; confidence
/// grows from 0.5 to 0.9 with the share of steps moving in the trend's
/// direction. Fewer than two usable closes yields a neutral signal.
pub fn trend_signal(candles: &[Candle]) -> TradingResult<Signal> {
    let closes: Vec<f64> = candles
        .iter()
        .rev()
        .take(TREND_WINDOW)
        .rev()
        .map(|c| c.close)
        .filter(|c| c.is_finite() && *c > 0.0)
        .collect();

    let (Some(first), Some(last)) = (closes.first(), closes.last()) else {
        return Ok(Signal::neutral());
    };
    if closes.len() < 2 {
        return Ok(Signal::neutral());
    }

    let trend = (last - first) / first;
    let steps = closes.len() - 1;
    let agreeing = closes
        .windows(2)
        .filter(|w| {
            let step = w[1] - w[0];
            (trend > 0.0 && step > 0.0) || (trend < 0.0 && step < 0.0)
        })
        .count();
    let consistency = agreeing as f64 / steps as f64;

    Ok(Signal::new(trend / TREND_SATURATION, 0.5 + 0.4 * consistency)?)
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lexicon sentiment: `(positive - negative) / (positive + negative)`.
///
/// A negation word flips the next sentiment word within three tokens.
/// Confidence is the share of tokens that carried sentiment, floored at 0.3
/// once anything matched.
pub fn lexicon_sentiment(text: &str) -> Signal {
    let tokens = tokenize(text);
    let mut positive = 0usize;
    let mut negative = 0usize;
    let mut negation_left = 0usize;

    for token in &tokens {
        let token = token.as_str();
        if NEGATION_WORDS.contains(token) {
            negation_left = NEGATION_REACH;
            continue;
        }

        let negated = negation_left > 0;
        if POSITIVE_WORDS.contains(token) {
            if negated { negative += 1 } else { positive += 1 }
            negation_left = 0;
        } else if NEGATIVE_WORDS.contains(token) {
            if negated { positive += 1 } else { negative += 1 }
            negation_left = 0;
        } else {
            negation_left = negation_left.saturating_sub(1);
        }
    }

    let hits = positive + negative;
    if hits == 0 {
        return Signal::neutral();
    }

    let score = (positive as f64 - negative as f64) / hits as f64;
    let confidence = (hits as f64 / tokens.len() as f64).max(0.3);
    Signal::new(score, confidence).unwrap_or_else(|_| Signal::neutral())
}

/// Default `SignalProvider` used by the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSignalProvider;

impl HeuristicSignalProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignalProvider for HeuristicSignalProvider {
    async fn predict(&self, symbol: &str, candles: &[Candle]) -> TradingResult<Signal> {
        let signal = trend_signal(candles)
            .map_err(|e| TradingError::Signal(format!("prediction for {}: {}", symbol, e)))?;
        tracing::debug!(
            symbol,
            candles = candles.len(),
            value = signal.value(),
            confidence = signal.confidence(),
            "trend prediction"
        );
        Ok(signal)
    }

    async fn sentiment(&self, text: &str) -> TradingResult<Signal> {
        Ok(lexicon_sentiment(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candles(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: start + Duration::hours(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_steady_uptrend() {
        // only the last five closes count: 100 -> 102 is +2%
        let signal = trend_signal(&candles(&[50.0, 60.0, 100.0, 100.5, 101.0, 101.5, 102.0])).unwrap();
        assert!((signal.value() - 0.4).abs() < 1e-9);
        assert!((signal.confidence() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_crash_saturates_negative() {
        let signal = trend_signal(&candles(&[100.0, 95.0, 90.0, 85.0, 80.0])).unwrap();
        assert_eq!(signal.value(), -1.0);
    }

    #[test]
    fn test_choppy_trend_lowers_confidence() {
        let signal = trend_signal(&candles(&[100.0, 101.0, 100.0, 101.0, 101.0])).unwrap();
        assert!(signal.value() > 0.0);
        assert!((signal.confidence() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_candles_is_neutral() {
        assert_eq!(trend_signal(&[]).unwrap(), Signal::neutral());
        assert_eq!(trend_signal(&candles(&[100.0])).unwrap(), Signal::neutral());
    }

    #[test]
    fn test_positive_headline() {
        let signal = lexicon_sentiment(
            "Bitcoin Surges Past $50,000 as Institutional Adoption Grows",
        );
        // "surges" is not in the lexicon, "adoption" is
        assert_eq!(signal.value(), 1.0);
        assert!(signal.confidence() >= 0.3);
    }

    #[test]
    fn test_negative_headline() {
        let signal = lexicon_sentiment(
            "Crypto Market Faces Correction as Regulatory Concerns Mount amid regulatory uncertainty",
        );
        assert_eq!(signal.value(), -1.0);
    }

    #[test]
    fn test_negation_flips_next_sentiment_word() {
        assert_eq!(lexicon_sentiment("this is not a strong rally").value(), 0.0);
        assert_eq!(lexicon_sentiment("no crash").value(), 1.0);
        // out of reach after three neutral tokens
        assert_eq!(lexicon_sentiment("not the usual kind of crash").value(), -1.0);
    }

    #[test]
    fn test_mixed_and_empty_text() {
        let signal = lexicon_sentiment("gain gain loss");
        assert!((signal.value() - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(lexicon_sentiment(""), Signal::neutral());
        assert_eq!(lexicon_sentiment("nothing to see here"), Signal::neutral());
    }

    #[tokio::test]
    async fn test_provider_delegates() {
        let provider = HeuristicSignalProvider::new();
        let prediction = provider
            .predict("BTC", &candles(&[100.0, 101.0, 102.0]))
            .await
            .unwrap();
        assert!(prediction.value() > 0.0);
        assert_eq!(provider.sentiment("bullish").await.unwrap().value(), 1.0);
    }
}
