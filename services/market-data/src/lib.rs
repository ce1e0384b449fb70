pub mod types;
pub mod sources {
    pub mod nasdaq;
    pub mod sec;
    pub mod sp500;
    pub mod yahoo;
}
pub mod cache;
pub mod fetcher;
pub mod normalizers;
pub mod symbols;
pub mod universe;

pub use fetcher::{fetch_many, FetchProfile};
pub use sources::yahoo::{FundamentalsSource, MomentumSource, YahooClient};
pub use types::*;
pub use universe::{fallback_tickers, UniverseKind, UniverseProvider};

use cache::UniverseCache;
use reqwest::Client;
use sources::{nasdaq::NasdaqSource, sec::SecSource, sp500::Sp500Source};
use std::path::Path;
use std::time::Duration;

/// Build a universe provider wired to the default remote sources.
pub fn default_universe_provider(cache_path: impl AsRef<Path>, ttl: Duration) -> UniverseProvider {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("StockCopilot/1.0 (+contact@example.com) Mozilla/5.0")
        .build()
        .expect("Failed to create HTTP client");
    UniverseProvider::new(
        SecSource::new(client.clone()),
        NasdaqSource::new(client.clone()),
        Sp500Source::new(client),
        UniverseCache::new(cache_path, ttl),
    )
}
