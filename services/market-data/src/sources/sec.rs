//! SEC company-ticker feed: the primary US-equity universe source.

use crate::symbols::{is_common_stock, normalize_symbol};
use crate::types::{MarketDataError, Result};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

pub const SEC_URLS: [&str; 2] = [
    "https://www.sec.gov/files/company_tickers.json",
    "https://www.sec.gov/files/company_tickers_exchange.json",
];

/// When the payload carries an exchange field, keep major exchanges only.
const ALLOWED_EXCHANGES: [&str; 5] = ["NYSE", "NASDAQ", "NYSE AMERICAN", "NYSEMKT", "NYSE ARCA"];

pub struct SecSource {
    client: Client,
    urls: Vec<Url>,
}

impl SecSource {
    pub fn new(client: Client) -> Self {
        let urls = SEC_URLS
            .iter()
            .map(|u| u.parse().expect("valid SEC url"))
            .collect();
        Self { client, urls }
    }

    /// Point the source at different endpoints (used by tests).
    pub fn with_urls(client: Client, urls: Vec<Url>) -> Self {
        Self { client, urls }
    }

    pub fn cache_key(&self) -> String {
        self.urls
            .iter()
            .map(Url::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Pull both feeds; a single feed failure is logged and skipped.
    /// Errors only when no feed yields any symbol.
    pub async fn fetch_symbols(&self) -> Result<BTreeSet<String>> {
        let mut syms = BTreeSet::new();
        for url in &self.urls {
            match self.fetch_one(url.clone()).await {
                Ok(batch) => syms.extend(batch),
                Err(e) => tracing::warn!("SEC fetch failed: {} -> {}", url, e),
            }
        }
        if syms.is_empty() {
            return Err(MarketDataError::UniverseSource(
                "no symbols from any SEC feed".to_string(),
            ));
        }
        Ok(syms)
    }

    async fn fetch_one(&self, url: Url) -> Result<BTreeSet<String>> {
        let resp = self
            .client
            .get(url.clone())
            .timeout(Duration::from_secs(25))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| MarketDataError::Api(e.to_string()))?;
        let data: Value = resp.json().await?;
        Ok(parse_sec_payload(&data))
    }
}

/// The SEC serves either a dict of rows or a list of rows; accept both.
fn parse_sec_payload(data: &Value) -> BTreeSet<String> {
    let rows: Vec<&Value> = match data {
        Value::Object(map) => map.values().collect(),
        Value::Array(list) => list.iter().collect(),
        _ => Vec::new(),
    };

    let mut syms = BTreeSet::new();
    for row in rows {
        let raw = row.get("ticker").and_then(Value::as_str).unwrap_or("");
        let exch = row
            .get("exchange")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_uppercase();
        if !exch.is_empty() && !ALLOWED_EXCHANGES.contains(&exch.as_str()) {
            continue;
        }
        if is_common_stock(raw) {
            let t = normalize_symbol(raw);
            if !t.is_empty() {
                syms.insert(t);
            }
        }
    }
    syms
}
