pub mod config;
pub mod handlers;
pub mod screen;

use market_data::{UniverseProvider, YahooClient};
use std::sync::Arc;

/// Application state shared across handlers and the CLI runner.
pub struct AppState {
    pub universe: UniverseProvider,
    pub yahoo: Arc<YahooClient>,
    pub max_workers: usize,
}

impl AppState {
    pub fn from_settings(settings: &config::Settings) -> Self {
        Self {
            universe: market_data::default_universe_provider(
                &settings.cache_path,
                settings.cache_ttl,
            ),
            yahoo: Arc::new(YahooClient::new()),
            max_workers: settings.max_workers,
        }
    }
}
