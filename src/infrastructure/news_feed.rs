//! Built-in headline catalog

use async_trait::async_trait;

use crate::domain::errors::TradingResult;
use crate::domain::repositories::signal_provider::{NewsFeed, NewsItem};

// (title, description, source, related symbols), newest first
const HEADLINES: &[(&str, &str, &str, &[&str])] = &[
    (
        "Bitcoin Surges Past $50,000 as Institutional Adoption Grows",
        "Bitcoin has surpassed the $50,000 mark as more institutions add it to their balance sheets.",
        "Crypto News",
        &["BTC"],
    ),
    (
        "Ethereum 2.0 Upgrade on Track for Q3 Completion",
        "The Ethereum network upgrade to proof-of-stake is progressing well according to developers.",
        "DeFi Daily",
        &["ETH"],
    ),
    (
        "Solana Experiences Network Outage, Developers Working on Fix",
        "The Solana blockchain experienced a temporary outage due to high transaction volume.",
        "Blockchain Report",
        &["SOL"],
    ),
    (
        "Cardano Launches Smart Contract Functionality",
        "Cardano has successfully implemented smart contract capabilities on its mainnet.",
        "Crypto Insider",
        &["ADA"],
    ),
    (
        "Crypto Market Faces Correction as Regulatory Concerns Mount",
        "The overall cryptocurrency market is experiencing a pullback amid regulatory uncertainty.",
        "Financial Times",
        &["BTC", "ETH", "SOL", "ADA", "DOT"],
    ),
];

/// Fixed headlines, filtered per symbol and capped at `limit` items
#[derive(Debug, Clone)]
pub struct StaticNewsFeed {
    items: Vec<NewsItem>,
    limit: usize,
}

impl Default for StaticNewsFeed {
    fn default() -> Self {
        Self::new(10)
    }
}

impl StaticNewsFeed {
    pub fn new(limit: usize) -> Self {
        let items = HEADLINES
            .iter()
            .map(|(title, description, source, related)| NewsItem {
                title: title.to_string(),
                description: description.to_string(),
                source: source.to_string(),
                related_to: related.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Self { items, limit }
    }

    pub fn with_items(items: Vec<NewsItem>, limit: usize) -> Self {
        Self { items, limit }
    }
}

#[async_trait]
impl NewsFeed for StaticNewsFeed {
    async fn recent_news(&self, symbol: &str) -> TradingResult<Vec<NewsItem>> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.related_to.iter().any(|s| s.eq_ignore_ascii_case(symbol)))
            .take(self.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_filters_by_symbol() {
        let feed = StaticNewsFeed::default();

        let btc = feed.recent_news("btc").await.unwrap();
        assert_eq!(btc.len(), 2);
        assert!(btc[0].title.starts_with("Bitcoin Surges"));

        assert_eq!(feed.recent_news("DOT").await.unwrap().len(), 1);
        assert!(feed.recent_news("XLM").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_limit_applies() {
        let feed = StaticNewsFeed::new(1);
        assert_eq!(feed.recent_news("ETH").await.unwrap().len(), 1);
    }
}
