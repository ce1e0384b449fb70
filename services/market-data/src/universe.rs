//! Ticker-universe provider: remote symbol feeds behind an injected cache,
//! degrading to a static fallback list when every source is unreachable.

use crate::cache::UniverseCache;
use crate::sources::nasdaq::NasdaqSource;
use crate::sources::sec::SecSource;
use crate::sources::sp500::Sp500Source;
use std::collections::BTreeSet;

/// Which symbol population a strategy screens over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniverseKind {
    /// US common stock from the SEC + Nasdaq feeds
    UsEquities,
    /// S&P 500 constituents
    Sp500,
}

/// Last-resort lists when every remote source fails; small but enough to
/// produce a non-empty screen.
const US_FALLBACK: [&str; 20] = [
    "AAPL", "MSFT", "JNJ", "WMT", "PG", "XOM", "KO", "PFE", "PEP", "CVX", "DIS", "INTC", "IBM",
    "VZ", "T", "JPM", "BAC", "C", "MA", "V",
];
const SP500_FALLBACK: [&str; 10] =
    ["AAPL", "MSFT", "JNJ", "KO", "PG", "WMT", "JPM", "UNH", "DIS", "V"];

/// Static last-resort tickers for a universe kind. Also used by callers
/// whose post-fetch filters empty the table outright.
pub fn fallback_tickers(kind: UniverseKind) -> Vec<String> {
    match kind {
        UniverseKind::UsEquities => US_FALLBACK.iter().map(|s| s.to_string()).collect(),
        UniverseKind::Sp500 => SP500_FALLBACK.iter().map(|s| s.to_string()).collect(),
    }
}

pub struct UniverseProvider {
    sec: SecSource,
    nasdaq: NasdaqSource,
    sp500: Sp500Source,
    cache: UniverseCache,
}

impl UniverseProvider {
    pub fn new(
        sec: SecSource,
        nasdaq: NasdaqSource,
        sp500: Sp500Source,
        cache: UniverseCache,
    ) -> Self {
        Self {
            sec,
            nasdaq,
            sp500,
            cache,
        }
    }

    /// Unique, normalized symbols for the requested universe, capped at
    /// `limit`. Never fails: source failures degrade to the fallback list,
    /// and in the worst case the result is simply smaller.
    pub async fn get_universe(&self, kind: UniverseKind, limit: usize) -> Vec<String> {
        let mut syms = match kind {
            UniverseKind::UsEquities => self.us_equities().await,
            UniverseKind::Sp500 => self.sp500_constituents().await,
        };
        if limit > 0 {
            syms.truncate(limit);
        }
        syms
    }

    async fn us_equities(&self) -> Vec<String> {
        // Key covers every feed the cached value merges
        let key = format!("{},{}", self.sec.cache_key(), self.nasdaq.cache_key());
        if let Some(cached) = self.cache.load(&key) {
            tracing::info!("universe: loaded {} tickers from cache", cached.len());
            return cached;
        }

        let mut syms: BTreeSet<String> = BTreeSet::new();
        match self.nasdaq.fetch_symbols().await {
            Ok(batch) => syms.extend(batch),
            Err(e) => tracing::warn!("universe: Nasdaq unavailable: {}", e),
        }
        match self.sec.fetch_symbols().await {
            Ok(batch) => syms.extend(batch),
            Err(e) => tracing::warn!("universe: SEC unavailable: {}", e),
        }

        if syms.is_empty() {
            tracing::warn!("universe: all US feeds failed, using fallback list");
            return fallback_tickers(UniverseKind::UsEquities);
        }

        let out: Vec<String> = syms.into_iter().collect();
        self.cache.store(&key, &out);
        tracing::info!("universe: {} US tickers fetched", out.len());
        out
    }

    async fn sp500_constituents(&self) -> Vec<String> {
        let key = self.sp500.cache_key();
        if let Some(cached) = self.cache.load(&key) {
            tracing::info!("universe: loaded {} S&P 500 tickers from cache", cached.len());
            return cached;
        }
        match self.sp500.fetch_symbols().await {
            Ok(syms) => {
                self.cache.store(&key, &syms);
                syms
            }
            Err(e) => {
                tracing::warn!("universe: S&P 500 scrape failed ({}), using fallback", e);
                fallback_tickers(UniverseKind::Sp500)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_cache() -> UniverseCache {
        let path = std::env::temp_dir().join(format!(
            "universe_provider_test_{}_{}.json",
            std::process::id(),
            rand::random::<u32>()
        ));
        UniverseCache::new(path, Duration::from_secs(3600))
    }

    fn provider(
        server: &MockServer,
        sec_path: &str,
        nasdaq_path: &str,
        cache: UniverseCache,
    ) -> UniverseProvider {
        let sec = SecSource::with_urls(
            Client::new(),
            vec![format!("{}{}", server.uri(), sec_path).parse().unwrap()],
        );
        let nasdaq = NasdaqSource::with_urls(
            Client::new(),
            vec![format!("{}{}", server.uri(), nasdaq_path).parse().unwrap()],
        );
        let sp500 =
            Sp500Source::with_url(Client::new(), format!("{}/sp500", server.uri()).parse().unwrap());
        UniverseProvider::new(sec, nasdaq, sp500, cache)
    }

    #[tokio::test]
    async fn changing_any_feed_url_invalidates_the_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sec.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"ticker": "AAPL"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nasdaq_a.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Symbol|ETF|Test Issue\nMSFT|N|N\n"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nasdaq_b.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Symbol|ETF|Test Issue\nORCL|N|N\n"),
            )
            .mount(&server)
            .await;

        let cache = temp_cache();
        let first = provider(&server, "/sec.json", "/nasdaq_a.txt", cache.clone())
            .get_universe(UniverseKind::UsEquities, 100)
            .await;
        assert_eq!(first, vec!["AAPL", "MSFT"]);

        // Same cache file, different Nasdaq feed: the key must miss
        let second = provider(&server, "/sec.json", "/nasdaq_b.txt", cache)
            .get_universe(UniverseKind::UsEquities, 100)
            .await;
        assert_eq!(second, vec!["AAPL", "ORCL"]);
    }
}
