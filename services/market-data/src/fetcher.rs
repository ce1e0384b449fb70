//! Bounded-concurrency metric fetch.
//!
//! A semaphore caps in-flight provider calls and a small uniform jitter
//! spaces them out. The join is a barrier: the table is returned only once
//! every ticker has resolved, and an individual failure becomes a bare row
//! rather than an error.

use crate::types::{MetricRow, MetricSource, MetricTable};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Pacing parameters for one fetch run. The momentum profile hits the
/// history endpoint, which throttles harder, so it runs narrower and slower.
#[derive(Debug, Clone, Copy)]
pub struct FetchProfile {
    pub max_workers: usize,
    pub jitter_ms: (u64, u64),
}

impl FetchProfile {
    pub const FUNDAMENTALS: FetchProfile = FetchProfile {
        max_workers: 12,
        jitter_ms: (20, 60),
    };

    pub const MOMENTUM: FetchProfile = FetchProfile {
        max_workers: 6,
        jitter_ms: (50, 150),
    };

    pub fn with_workers(self, max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            ..self
        }
    }
}

/// Fetch one row per ticker, then pad every row with the expected metric
/// set so the scoring engine sees a rectangular table.
pub async fn fetch_many(
    source: Arc<dyn MetricSource>,
    tickers: &[String],
    profile: FetchProfile,
    expected: &[&str],
) -> MetricTable {
    let semaphore = Arc::new(Semaphore::new(profile.max_workers.max(1)));
    let (lo, hi) = profile.jitter_ms;

    let futures = tickers.iter().map(|ticker| {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        let ticker = ticker.clone();
        async move {
            // Semaphore is never closed while fetching
            let _permit = semaphore.acquire().await.expect("semaphore open");
            let delay = rand::thread_rng().gen_range(lo..=hi.max(lo));
            tokio::time::sleep(Duration::from_millis(delay)).await;

            match source.fetch_row(&ticker).await {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("{}: fetch failed for {}: {}", source.name(), ticker, e);
                    MetricRow::bare(ticker)
                }
            }
        }
    });

    let rows = futures::future::join_all(futures).await;
    let mut table = MetricTable::from_rows(rows);
    table.pad(expected);
    table
}
