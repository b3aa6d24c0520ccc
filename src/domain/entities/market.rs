//! Product and account snapshots served by the exchange gateway

use serde::{Deserialize, Serialize};

/// Tradable product as listed by the brokerage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub base_currency: String,
    pub quote_currency: String,
    pub base_name: String,
    pub price: f64,
    pub volume_24h: f64,
    pub price_percent_change_24h: f64,
}

/// One page of the volume-sorted product listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub has_more: bool,
}

impl ProductPage {
    /// Slice page `page_offset` out of an already filtered and sorted listing
    pub fn from_sorted(sorted: &[Product], page_size: usize, page_offset: usize) -> Self {
        let start = page_offset.saturating_mul(page_size);
        let items: Vec<Product> = sorted.iter().skip(start).take(page_size).cloned().collect();
        let has_more = page_size > 0 && items.len() == page_size;
        ProductPage { items, has_more }
    }
}

/// Keep products quoted in `quote_currency` and sort them by 24h volume, largest first
pub fn filter_and_rank(products: Vec<Product>, quote_currency: &str) -> Vec<Product> {
    let mut filtered: Vec<Product> = products
        .into_iter()
        .filter(|p| p.quote_currency.eq_ignore_ascii_case(quote_currency))
        .collect();
    filtered.sort_by(|a, b| b.volume_24h.total_cmp(&a.volume_24h));
    filtered
}

/// Balance held in one currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub currency: String,
    pub available: f64,
    pub hold: f64,
}

/// Available balance for `currency`, zero when no such account exists
pub fn available_balance(accounts: &[Account], currency: &str) -> f64 {
    accounts
        .iter()
        .filter(|a| a.currency.eq_ignore_ascii_case(currency))
        .map(|a| a.available)
        .sum()
}
