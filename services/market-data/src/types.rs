use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known metric column names shared between the fetch layer and the
/// screening engine. Strategies reference metrics by these strings.
pub mod cols {
    pub const MARKET_CAP: &str = "MarketCap";
    pub const PRICE: &str = "Price";
    pub const PE: &str = "P/E";
    pub const PB: &str = "P/B";
    pub const PEG: &str = "PEG";
    pub const EPS_TTM: &str = "EPS_ttm";
    pub const PRICE_TO_52W_LOW: &str = "PriceTo52wLow";
    pub const DRAWDOWN_FROM_HIGH_PCT: &str = "DrawdownFromHigh%";
    pub const DIVIDEND_YIELD_PCT: &str = "DividendYield%";
    pub const ROE_PCT: &str = "ROE%";
    pub const DEBT_TO_EQUITY: &str = "DebtToEquity";
    pub const CURRENT_RATIO: &str = "CurrentRatio";
    pub const EARNINGS_GROWTH_PCT: &str = "EarningsGrowth%";
    pub const EV_EBITDA: &str = "EV/EBITDA";
    pub const FCF_YIELD_PCT: &str = "FCFYield%";
    pub const NET_CASH_TO_MKT_CAP_PCT: &str = "NetCashToMktCap%";
    pub const INTEREST_COVERAGE: &str = "InterestCoverage";
    pub const MOM_12M_PCT: &str = "Mom12m%";
    pub const MOM_3M_PCT: &str = "Mom3m%";
    pub const TREND_200_PCT: &str = "Trend200%";
    pub const TREND_50_PCT: &str = "Trend50%";
    pub const VOLATILITY_20D_PCT: &str = "Volatility20d%";
    pub const MAX_DRAWDOWN_PCT: &str = "MaxDrawdown%";
    pub const DOLLAR_VOL_20D: &str = "DollarVol20d";
}

/// One security's data for one screening run.
///
/// A missing metric is `None`, which means "unknown" rather than zero; the
/// engine's renormalization and fail-closed checklist policies both depend on
/// that distinction. Non-finite values are coerced to `None` on insertion so
/// NaN never leaks into comparisons downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRow {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    metrics: BTreeMap<String, Option<f64>>,
}

impl MetricRow {
    pub fn new(ticker: impl Into<String>) -> Self {
        let ticker = ticker.into();
        Self {
            name: ticker.clone(),
            sector: String::new(),
            ticker,
            metrics: BTreeMap::new(),
        }
    }

    /// Row for a ticker whose fetch failed: identifier only, every metric
    /// unknown. Failed fetches degrade to missing data, never to errors.
    pub fn bare(ticker: impl Into<String>) -> Self {
        Self::new(ticker)
    }

    /// Insert a metric value. NaN and infinities are stored as `None`.
    pub fn set(&mut self, metric: impl Into<String>, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        self.metrics.insert(metric.into(), value);
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).copied().flatten()
    }

    /// Ensure every expected metric key exists, padding absentees with `None`.
    pub fn pad(&mut self, expected: &[&str]) {
        for m in expected {
            self.metrics.entry((*m).to_string()).or_insert(None);
        }
    }
}

/// In-memory table of one `MetricRow` per security. Built fresh per request
/// and discarded once the response is shaped.
#[derive(Debug, Clone, Default)]
pub struct MetricTable {
    rows: Vec<MetricRow>,
}

impl MetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: MetricRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<MetricRow> {
        self.rows
    }

    /// Pad every row with the expected metric set. Scoring assumes each
    /// configured metric exists in each row, possibly as `None`.
    pub fn pad(&mut self, expected: &[&str]) {
        for row in &mut self.rows {
            row.pad(expected);
        }
    }

    /// Drop rows without the given metric strictly positive. Used by
    /// strategies that require a known market cap before scoring.
    pub fn retain_positive(&mut self, metric: &str) {
        self.rows.retain(|r| r.get(metric).map_or(false, |v| v > 0.0));
    }
}

/// Error types for market data retrieval
#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Universe source failed: {0}")]
    UniverseSource(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(e: reqwest::Error) -> Self {
        MarketDataError::Api(e.to_string())
    }
}

/// Result type for market data operations
pub type Result<T> = std::result::Result<T, MarketDataError>;

/// Trait for per-ticker metric sources. A source never fails a whole run:
/// callers convert individual errors into bare rows.
#[async_trait::async_trait]
pub trait MetricSource: Send + Sync {
    /// Fetch whatever metrics are obtainable for one ticker.
    async fn fetch_row(&self, ticker: &str) -> Result<MetricRow>;

    /// Source name (for logs)
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_stored_as_missing() {
        let mut row = MetricRow::new("AAPL");
        row.set(cols::PE, Some(f64::NAN));
        row.set(cols::PB, Some(f64::INFINITY));
        row.set(cols::ROE_PCT, Some(21.5));
        assert_eq!(row.get(cols::PE), None);
        assert_eq!(row.get(cols::PB), None);
        assert_eq!(row.get(cols::ROE_PCT), Some(21.5));
    }

    #[test]
    fn pad_adds_missing_columns_only() {
        let mut row = MetricRow::new("MSFT");
        row.set(cols::PE, Some(30.0));
        row.pad(&[cols::PE, cols::PB]);
        assert_eq!(row.get(cols::PE), Some(30.0));
        assert_eq!(row.get(cols::PB), None);
    }

    #[test]
    fn retain_positive_drops_missing_and_nonpositive() {
        let mut a = MetricRow::new("A");
        a.set(cols::MARKET_CAP, Some(1e9));
        let mut b = MetricRow::new("B");
        b.set(cols::MARKET_CAP, Some(0.0));
        let c = MetricRow::new("C");

        let mut table = MetricTable::from_rows(vec![a, b, c]);
        table.retain_positive(cols::MARKET_CAP);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].ticker, "A");
    }
}
