//! S&P 500 constituents scraped from the Wikipedia table. A thin,
//! tolerant extraction: on any failure callers fall back to a static
//! blue-chip list, so this never needs to be bulletproof.

use crate::symbols::normalize_symbol;
use crate::types::{MarketDataError, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

pub const SP500_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

pub struct Sp500Source {
    client: Client,
    url: Url,
}

impl Sp500Source {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: SP500_URL.parse().expect("valid wikipedia url"),
        }
    }

    pub fn with_url(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn cache_key(&self) -> String {
        self.url.as_str().to_string()
    }

    pub async fn fetch_symbols(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(self.url.clone())
            .timeout(Duration::from_secs(25))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| MarketDataError::Api(e.to_string()))?;
        let html = resp.text().await?;
        let syms = extract_constituents(&html);
        if syms.is_empty() {
            return Err(MarketDataError::InvalidResponse(
                "no tickers found in constituents table".to_string(),
            ));
        }
        Ok(syms)
    }
}

/// Pull the ticker out of the first cell of each row of the constituents
/// table, preserving table order.
fn extract_constituents(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("table#constituents tr td:first-child")
        .expect("valid constituents selector");

    let mut out = Vec::new();
    for cell in document.select(&selector) {
        let text = cell.text().collect::<String>();
        let sym = normalize_symbol(text.trim());
        if looks_like_ticker(&sym) && !out.contains(&sym) {
            out.push(sym);
        }
    }
    out
}

fn looks_like_ticker(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 6
        && s.chars().all(|c| c.is_ascii_uppercase() || c == '-')
}
