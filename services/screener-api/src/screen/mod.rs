//! Screening pipeline: universe -> fetch -> checklist -> composite ->
//! rank -> shape. Every strategy is a parameterization of this one path.

pub mod config;
pub mod engine;
pub mod output;
pub mod presets;

pub use config::{FetchKind, SortOrder, StrategyConfig};
pub use presets::Strategy;

use crate::AppState;
use market_data::types::MetricSource;
use market_data::{fetch_many, FundamentalsSource, MomentumSource};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Validated request parameters for one screening run.
#[derive(Debug, Clone, Copy)]
pub struct ScreenParams {
    pub top_n: usize,
    pub limit: usize,
    pub order: SortOrder,
    pub include_metric_details: bool,
}

impl ScreenParams {
    pub fn defaults_for(strategy: Strategy) -> Self {
        Self {
            top_n: 15,
            limit: strategy.config().default_limit as usize,
            order: SortOrder::Core,
            include_metric_details: true,
        }
    }
}

/// Run one strategy end to end and shape the top-N records.
///
/// Degrades instead of failing: an empty universe or a fully failed fetch
/// produces an empty result. The fetch join is the only await of substance;
/// scoring itself is pure and synchronous.
pub async fn run_screen(state: &AppState, strategy: Strategy, params: ScreenParams) -> Vec<Value> {
    let cfg = strategy.config();

    let tickers = state.universe.get_universe(cfg.universe, params.limit).await;
    info!("{}: universe size {}", cfg.name, tickers.len());
    if tickers.is_empty() {
        return Vec::new();
    }

    let source: Arc<dyn MetricSource> = match cfg.fetch_kind {
        FetchKind::Fundamentals => Arc::new(FundamentalsSource::new(Arc::clone(&state.yahoo))),
        FetchKind::Momentum => Arc::new(MomentumSource::new(Arc::clone(&state.yahoo))),
    };

    let profile = cfg
        .fetch_profile
        .with_workers(cfg.fetch_profile.max_workers.min(state.max_workers));
    let mut table = fetch_many(Arc::clone(&source), &tickers, profile, cfg.expected_metrics).await;

    if cfg.require_positive_market_cap {
        table.retain_positive(market_data::types::cols::MARKET_CAP);
        if table.is_empty() {
            info!(
                "{}: no rows with a known market cap, retrying fallback tickers",
                cfg.name
            );
            let fallback = market_data::fallback_tickers(cfg.universe);
            table = fetch_many(source, &fallback, profile, cfg.expected_metrics).await;
            table.retain_positive(market_data::types::cols::MARKET_CAP);
        }
        info!("{}: {} rows with known market cap", cfg.name, table.len());
    }
    if table.is_empty() {
        return Vec::new();
    }

    let mut scored = engine::score_table(table, cfg);
    engine::rank(&mut scored, params.order, params.top_n);
    output::shape(&scored, cfg, params.include_metric_details)
}
