//! Nasdaq Trader symbol directories: pipe-delimited text feeds used as a
//! secondary US-equity universe source. Some networks block these hosts, so
//! failures are logged and non-fatal.

use crate::types::{MarketDataError, Result};
use reqwest::Client;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

pub const NASDAQ_URLS: [&str; 3] = [
    "https://ftp.nasdaqtrader.com/dynamic/SymDir/nasdaqtraded.txt",
    "https://ftp.nasdaqtrader.com/dynamic/SymDir/otherlisted.txt",
    "https://ftp.nasdaqtrader.com/dynamic/SymDir/nasdaqlisted.txt",
];

pub struct NasdaqSource {
    client: Client,
    urls: Vec<Url>,
}

impl NasdaqSource {
    pub fn new(client: Client) -> Self {
        let urls = NASDAQ_URLS
            .iter()
            .map(|u| u.parse().expect("valid Nasdaq url"))
            .collect();
        Self { client, urls }
    }

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

    pub async fn fetch_symbols(&self) -> Result<BTreeSet<String>> {
        let mut syms = BTreeSet::new();
        for url in &self.urls {
            match self.fetch_one(url.clone()).await {
                Ok(batch) => syms.extend(batch),
                Err(e) => tracing::warn!("Nasdaq directory failed: {} -> {}", url, e),
            }
        }
        if syms.is_empty() {
            return Err(MarketDataError::UniverseSource(
                "no symbols from any Nasdaq directory".to_string(),
            ));
        }
        Ok(syms)
    }

    async fn fetch_one(&self, url: Url) -> Result<BTreeSet<String>> {
        let resp = self
            .client
            .get(url)
            .timeout(Duration::from_secs(25))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| MarketDataError::Api(e.to_string()))?;
        let body = resp.text().await?;
        Ok(parse_symbol_directory(&body))
    }
}

/// Parse a pipe-delimited symbol directory. Column positions come from the
/// header row; ETFs and test issues are skipped.
fn parse_symbol_directory(body: &str) -> BTreeSet<String> {
    let mut lines = body.trim().lines();
    let Some(header_line) = lines.next() else {
        return BTreeSet::new();
    };
    let header: Vec<&str> = header_line.split('|').collect();
    let idx = |name: &str| header.iter().position(|h| *h == name);

    let i_sym = idx("Symbol").or_else(|| idx("ACT Symbol")).unwrap_or(0);
    let i_etf = idx("ETF");
    let i_test = idx("Test Issue");

    let mut syms = BTreeSet::new();
    for line in lines {
        let parts: Vec<&str> = line.split('|').collect();
        let Some(raw) = parts.get(i_sym) else { continue };
        let s = raw.trim().to_uppercase();
        if s.is_empty() || s.contains(['.', '$', '^', ' ']) {
            continue;
        }
        let flagged = |i: Option<usize>| {
            i.and_then(|i| parts.get(i))
                .map(|v| v.trim().eq_ignore_ascii_case("Y"))
                .unwrap_or(false)
        };
        if flagged(i_etf) || flagged(i_test) {
            continue;
        }
        syms.insert(s);
    }
    syms
}
