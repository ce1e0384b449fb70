//! Strategy parameterization.
//!
//! Every investor style runs the same pipeline; a `StrategyConfig` is the
//! whole difference between them: which universe to screen, which metrics to
//! weight, which thresholds gate, and which columns the response carries.

use market_data::{FetchProfile, UniverseKind};

/// One metric's contribution to the composite score.
#[derive(Debug, Clone, Copy)]
pub struct MetricWeight {
    pub metric: &'static str,
    pub weight: f64,
    /// true = a larger raw value earns a higher percentile
    pub higher_is_better: bool,
}

impl MetricWeight {
    pub fn direction_label(&self) -> &'static str {
        if self.higher_is_better {
            "higher"
        } else {
            "lower"
        }
    }
}

/// Threshold comparison operators used by checklist rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Le,
    Ge,
    Gt,
    Lt,
}

impl Cmp {
    pub fn eval(self, value: f64, threshold: f64) -> bool {
        match self {
            Cmp::Le => value <= threshold,
            Cmp::Ge => value >= threshold,
            Cmp::Gt => value > threshold,
            Cmp::Lt => value < threshold,
        }
    }
}

/// A named pass/fail predicate over one metric. An absent metric value fails
/// the rule: missing data never grants a pass.
#[derive(Debug, Clone, Copy)]
pub struct ChecklistRule {
    pub name: &'static str,
    pub metric: &'static str,
    pub cmp: Cmp,
    pub threshold: f64,
}

/// Which metric family a strategy screens on, and therefore which provider
/// endpoint its fetch goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Quote-summary fundamentals (value strategies)
    Fundamentals,
    /// Daily-history momentum statistics
    Momentum,
}

/// Static, per-strategy parameterization of the screening pipeline.
#[derive(Debug, Clone, Copy)]
pub struct StrategyConfig {
    pub name: &'static str,
    /// Column name for the all-rules-passed flag (e.g. "GrahamGate")
    pub gate_column: &'static str,
    pub universe: UniverseKind,
    pub fetch_kind: FetchKind,
    pub fetch_profile: FetchProfile,
    pub default_limit: u32,
    pub weights: &'static [MetricWeight],
    pub checklist: &'static [ChecklistRule],
    /// Response column order; identity and score columns plus raw metrics
    pub columns: &'static [&'static str],
    /// Metric keys padded into every row before scoring
    pub expected_metrics: &'static [&'static str],
    /// Drop rows without a positive market cap before scoring
    pub require_positive_market_cap: bool,
}

impl StrategyConfig {
    pub fn direction_of(&self, metric: &str) -> Option<&MetricWeight> {
        self.weights.iter().find(|w| w.metric == metric)
    }
}

/// Requested sort mode for the ranked output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Descending CoreScore
    #[default]
    Core,
    /// Gate tier first, then checklist passes, then CoreScore
    Gate,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(SortOrder::Core),
            "gate" => Ok(SortOrder::Gate),
            other => Err(format!("invalid order '{}', expected 'core' or 'gate'", other)),
        }
    }
}
