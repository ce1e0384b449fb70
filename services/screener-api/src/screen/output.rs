//! Result shaping: project the ranked rows onto the strategy's column
//! selection and attach the per-metric breakdown callers use to explain a
//! score. Absent numerics serialize as JSON `null`, never NaN.

use crate::screen::config::StrategyConfig;
use crate::screen::engine::{round1, round2, ScoredRow};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Per-metric explainability payload. Present for every metric in the
/// strategy's weight map, even when the row's raw data is incomplete.
#[derive(Debug, Clone, Serialize)]
pub struct MetricDetail {
    pub metric: &'static str,
    pub value: Option<f64>,
    pub percentile_score: Option<f64>,
    pub weight: f64,
    pub direction: &'static str,
    pub weighted_contribution: Option<f64>,
}

/// Shape the top-N rows into JSON records in ranked order.
pub fn shape(scored: &[ScoredRow], cfg: &StrategyConfig, include_metric_details: bool) -> Vec<Value> {
    scored
        .iter()
        .map(|s| shape_row(s, cfg, include_metric_details))
        .collect()
}

fn shape_row(s: &ScoredRow, cfg: &StrategyConfig, include_metric_details: bool) -> Value {
    let mut record = Map::new();
    for col in cfg.columns {
        let v = match *col {
            "Ticker" => json!(s.row.ticker),
            "Name" => json!(s.row.name),
            "Sector" => json!(s.row.sector),
            "CoreScore" => json!(s.core_score),
            "ChecklistScore" => json!(s.checklist_score),
            c if c == cfg.gate_column => json!(s.gate),
            metric => match s.row.get(metric) {
                Some(v) => json!(v),
                None => Value::Null,
            },
        };
        record.insert((*col).to_string(), v);
    }

    for (name, pass) in &s.checks {
        record.insert((*name).to_string(), json!(pass));
    }

    if include_metric_details {
        let metrics: Vec<MetricDetail> = cfg
            .weights
            .iter()
            .map(|w| {
                let value = s.row.get(w.metric);
                let pct = s.percentiles.get(w.metric).copied().flatten().map(round1);
                MetricDetail {
                    metric: w.metric,
                    value,
                    percentile_score: pct,
                    weight: w.weight,
                    direction: w.direction_label(),
                    weighted_contribution: pct.map(|p| round2(p * w.weight)),
                }
            })
            .collect();
        record.insert(
            "metrics".to_string(),
            serde_json::to_value(metrics).unwrap_or(Value::Null),
        );
    }

    Value::Object(record)
}
