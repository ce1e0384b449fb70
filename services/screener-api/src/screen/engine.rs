//! Scoring and ranking engine: percentile normalization, weighted composite
//! with missing-data renormalization, checklist gate, and ordering.
//!
//! Pure and synchronous. Each request builds its own table, runs through
//! here once, and the result is discarded after shaping; nothing is shared
//! between requests.

use crate::screen::config::{SortOrder, StrategyConfig};
use market_data::types::{MetricRow, MetricTable};
use std::collections::BTreeMap;

/// A row plus everything derived from it during one pipeline run. Derived
/// fields are only ever recomputed from the row's metrics, never edited.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub row: MetricRow,
    /// Percentile score per weighted metric; `None` where the raw value is absent
    pub percentiles: BTreeMap<&'static str, Option<f64>>,
    /// Checklist outcomes in rule order
    pub checks: Vec<(&'static str, bool)>,
    pub checklist_score: u32,
    pub gate: bool,
    /// Weighted composite percentile, 0-100, one decimal
    pub core_score: f64,
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Percentile rank (0..100) of each present value within the column, using
/// average rank for ties. `higher_is_better = false` inverts the scale.
/// Absent inputs stay absent; defaulting happens at composite time, not here.
pub fn percentile_scores(values: &[Option<f64>], higher_is_better: bool) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    let n = present.len();
    if n == 0 {
        return out;
    }
    present.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && present[j + 1].1 == present[i].1 {
            j += 1;
        }
        // Tied values share the mean of the 1-based ranks they span
        let avg_rank = (i + j + 2) as f64 / 2.0;
        let pct = avg_rank / n as f64 * 100.0;
        let score = if higher_is_better { pct } else { 100.0 - pct };
        for k in i..=j {
            out[present[k].0] = Some(score);
        }
        i = j + 1;
    }
    out
}

/// Run the checklist evaluator and composite scorer over the table.
/// Ordering is a separate step (`rank`).
pub fn score_table(table: MetricTable, cfg: &StrategyConfig) -> Vec<ScoredRow> {
    let mut scored: Vec<ScoredRow> = table
        .into_rows()
        .into_iter()
        .map(|row| {
            // A rule over an absent value fails: missing data never grants a pass
            let checks: Vec<(&'static str, bool)> = cfg
                .checklist
                .iter()
                .map(|r| {
                    let pass = row
                        .get(r.metric)
                        .map_or(false, |v| r.cmp.eval(v, r.threshold));
                    (r.name, pass)
                })
                .collect();
            let checklist_score = checks.iter().filter(|(_, p)| *p).count() as u32;
            let gate = checks.iter().all(|(_, p)| *p);
            ScoredRow {
                row,
                percentiles: BTreeMap::new(),
                checks,
                checklist_score,
                gate,
                core_score: 0.0,
            }
        })
        .collect();

    for w in cfg.weights {
        let column: Vec<Option<f64>> = scored.iter().map(|s| s.row.get(w.metric)).collect();
        let pcts = percentile_scores(&column, w.higher_is_better);
        for (s, p) in scored.iter_mut().zip(pcts) {
            s.percentiles.insert(w.metric, p);
        }
    }

    // Composite: renormalize by the weight actually available per row, so a
    // row missing a metric competes on its remaining weight instead of
    // against a phantom zero contribution.
    for s in &mut scored {
        let mut weighted_sum = 0.0;
        let mut available_weight = 0.0;
        for w in cfg.weights {
            if let Some(Some(p)) = s.percentiles.get(w.metric) {
                weighted_sum += p * w.weight;
                available_weight += w.weight;
            }
        }
        s.core_score = if available_weight > 0.0 {
            round1(weighted_sum / available_weight)
        } else {
            0.0
        };
    }

    scored
}

/// Order the scored rows and keep the first `top_n`. Ticker is the final
/// tie-break in both modes, making the order fully deterministic.
pub fn rank(scored: &mut Vec<ScoredRow>, order: SortOrder, top_n: usize) {
    match order {
        SortOrder::Core => scored.sort_by(|a, b| {
            b.core_score
                .total_cmp(&a.core_score)
                .then_with(|| a.row.ticker.cmp(&b.row.ticker))
        }),
        SortOrder::Gate => scored.sort_by(|a, b| {
            b.gate
                .cmp(&a.gate)
                .then(b.checklist_score.cmp(&a.checklist_score))
                .then(b.core_score.total_cmp(&a.core_score))
                .then_with(|| a.row.ticker.cmp(&b.row.ticker))
        }),
    }
    scored.truncate(top_n);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::config::{ChecklistRule, Cmp, FetchKind, MetricWeight};
    use market_data::types::cols;
    use market_data::{FetchProfile, UniverseKind};

    fn row(ticker: &str, metrics: &[(&str, Option<f64>)]) -> MetricRow {
        let mut r = MetricRow::new(ticker);
        for (m, v) in metrics {
            r.set(*m, *v);
        }
        r
    }

    fn test_config(
        weights: &'static [MetricWeight],
        checklist: &'static [ChecklistRule],
    ) -> StrategyConfig {
        StrategyConfig {
            name: "test",
            gate_column: "TestGate",
            universe: UniverseKind::UsEquities,
            fetch_kind: FetchKind::Fundamentals,
            fetch_profile: FetchProfile::FUNDAMENTALS,
            default_limit: 100,
            weights,
            checklist,
            columns: &[],
            expected_metrics: &[],
            require_positive_market_cap: false,
        }
    }

    const PE_ROE_WEIGHTS: [MetricWeight; 2] = [
        MetricWeight {
            metric: cols::PE,
            weight: 0.5,
            higher_is_better: false,
        },
        MetricWeight {
            metric: cols::ROE_PCT,
            weight: 0.5,
            higher_is_better: true,
        },
    ];

    #[test]
    fn distinct_values_cover_the_rank_grid() {
        let col = vec![Some(3.0), Some(1.0), Some(4.0), Some(2.0)];
        let mut pcts: Vec<f64> = percentile_scores(&col, true)
            .into_iter()
            .flatten()
            .collect();
        pcts.sort_by(f64::total_cmp);
        assert_eq!(pcts, vec![25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn all_equal_values_share_average_rank() {
        let col = vec![Some(7.0); 5];
        for p in percentile_scores(&col, true) {
            assert_eq!(p, Some(60.0)); // avg rank 3 of 5
        }
        // A singleton column is always the maximum rank share
        let single = vec![Some(7.0)];
        assert_eq!(percentile_scores(&single, true), vec![Some(100.0)]);
        assert_eq!(percentile_scores(&single, false), vec![Some(0.0)]);
    }

    #[test]
    fn ties_share_average_rank() {
        let col = vec![Some(1.0), Some(2.0), Some(2.0), Some(3.0)];
        let pcts = percentile_scores(&col, true);
        assert_eq!(pcts[0], Some(25.0));
        // ranks 2 and 3 average to 2.5 -> 62.5
        assert_eq!(pcts[1], Some(62.5));
        assert_eq!(pcts[2], Some(62.5));
        assert_eq!(pcts[3], Some(100.0));
    }

    #[test]
    fn direction_inversion_law() {
        let col = vec![Some(5.0), None, Some(2.0), Some(2.0), Some(9.0)];
        let up = percentile_scores(&col, true);
        let down = percentile_scores(&col, false);
        for (u, d) in up.iter().zip(&down) {
            match (u, d) {
                (Some(u), Some(d)) => assert!((u + d - 100.0).abs() < 1e-9),
                (None, None) => {}
                _ => panic!("presence must match between directions"),
            }
        }
    }

    #[test]
    fn absent_stays_absent_through_normalization() {
        let col = vec![None, Some(1.0), None];
        let pcts = percentile_scores(&col, true);
        assert_eq!(pcts, vec![None, Some(100.0), None]);
    }

    #[test]
    fn two_rows_clean_sweep_scenario() {
        // T1 dominates on both metrics. With average-rank percentiles the
        // winner of a 2-row column lands at min(rank)/n = 50 inverted / 100
        // direct, so the sweep composites to 75 vs 25.
        let table = MetricTable::from_rows(vec![
            row("T1", &[(cols::PE, Some(10.0)), (cols::ROE_PCT, Some(20.0))]),
            row("T2", &[(cols::PE, Some(20.0)), (cols::ROE_PCT, Some(10.0))]),
        ]);
        let cfg = test_config(&PE_ROE_WEIGHTS, &[]);
        let scored = score_table(table, &cfg);
        assert_eq!(scored[0].core_score, 75.0);
        assert_eq!(scored[1].core_score, 25.0);
        assert!(scored[0].core_score > scored[1].core_score);
    }

    #[test]
    fn no_usable_metric_scores_zero() {
        let table = MetricTable::from_rows(vec![row("T1", &[(cols::PE, None)])]);
        static W: [MetricWeight; 1] = [MetricWeight {
            metric: cols::PE,
            weight: 1.0,
            higher_is_better: false,
        }];
        let cfg = test_config(&W, &[]);
        let scored = score_table(table, &cfg);
        assert_eq!(scored[0].core_score, 0.0);
    }

    #[test]
    fn weight_renormalization_ignores_missing_metrics() {
        // ROE missing everywhere: scores must match a run configured
        // without ROE at all.
        let rows = || {
            MetricTable::from_rows(vec![
                row("T1", &[(cols::PE, Some(10.0)), (cols::ROE_PCT, None)]),
                row("T2", &[(cols::PE, Some(20.0)), (cols::ROE_PCT, None)]),
                row("T3", &[(cols::PE, Some(30.0)), (cols::ROE_PCT, None)]),
            ])
        };
        static PE_ONLY: [MetricWeight; 1] = [MetricWeight {
            metric: cols::PE,
            weight: 0.5,
            higher_is_better: false,
        }];
        let both = score_table(rows(), &test_config(&PE_ROE_WEIGHTS, &[]));
        let pe_only = score_table(rows(), &test_config(&PE_ONLY, &[]));
        for (a, b) in both.iter().zip(&pe_only) {
            assert_eq!(a.core_score, b.core_score);
        }
    }

    static PE_RULE: [ChecklistRule; 1] = [ChecklistRule {
        name: "PE_low",
        metric: cols::PE,
        cmp: Cmp::Le,
        threshold: 15.0,
    }];

    #[test]
    fn absent_metric_fails_its_rule() {
        let table = MetricTable::from_rows(vec![
            row("T1", &[(cols::PE, Some(10.0))]),
            row("T2", &[(cols::PE, None)]),
        ]);
        let cfg = test_config(&PE_ROE_WEIGHTS, &PE_RULE);
        let scored = score_table(table, &cfg);
        assert_eq!(scored[0].checks, vec![("PE_low", true)]);
        assert!(scored[0].gate);
        assert_eq!(scored[1].checks, vec![("PE_low", false)]);
        assert!(!scored[1].gate);
        assert_eq!(scored[1].checklist_score, 0);
    }

    #[test]
    fn empty_checklist_gates_everything() {
        let table = MetricTable::from_rows(vec![row("T1", &[(cols::PE, Some(10.0))])]);
        let cfg = test_config(&PE_ROE_WEIGHTS, &[]);
        let scored = score_table(table, &cfg);
        assert!(scored[0].gate);
        assert_eq!(scored[0].checklist_score, 0);
    }

    #[test]
    fn gate_order_puts_gated_rows_first() {
        // T2 fails the PE rule; gate order puts T1 first regardless
        let table = MetricTable::from_rows(vec![
            row("T1", &[(cols::PE, Some(12.0)), (cols::ROE_PCT, Some(5.0))]),
            row("T2", &[(cols::PE, Some(20.0)), (cols::ROE_PCT, Some(50.0))]),
        ]);
        let cfg = test_config(&PE_ROE_WEIGHTS, &PE_RULE);
        let mut scored = score_table(table, &cfg);
        rank(&mut scored, SortOrder::Gate, 10);
        assert_eq!(scored[0].row.ticker, "T1");
        assert!(scored[0].gate);
        assert!(!scored[1].gate);
    }

    #[test]
    fn core_order_ignores_the_gate() {
        let table = MetricTable::from_rows(vec![
            row("T1", &[(cols::PE, Some(12.0)), (cols::ROE_PCT, Some(5.0))]),
            row("T2", &[(cols::PE, Some(20.0)), (cols::ROE_PCT, Some(50.0))]),
        ]);
        let cfg = test_config(&PE_ROE_WEIGHTS, &PE_RULE);
        let mut scored = score_table(table, &cfg);
        rank(&mut scored, SortOrder::Core, 10);
        // Equal composites tie-break on ticker
        assert_eq!(scored[0].row.ticker, "T1");
    }

    #[test]
    fn ranking_is_deterministic_on_full_ties() {
        let table = MetricTable::from_rows(vec![
            row("ZED", &[(cols::PE, Some(10.0))]),
            row("ABC", &[(cols::PE, Some(10.0))]),
            row("MID", &[(cols::PE, Some(10.0))]),
        ]);
        static W: [MetricWeight; 1] = [MetricWeight {
            metric: cols::PE,
            weight: 1.0,
            higher_is_better: false,
        }];
        let cfg = test_config(&W, &[]);
        let mut scored = score_table(table, &cfg);
        rank(&mut scored, SortOrder::Gate, 10);
        let order: Vec<&str> = scored.iter().map(|s| s.row.ticker.as_str()).collect();
        assert_eq!(order, vec!["ABC", "MID", "ZED"]);
    }

    #[test]
    fn rerun_is_idempotent() {
        let table = MetricTable::from_rows(vec![
            row("T1", &[(cols::PE, Some(10.0)), (cols::ROE_PCT, Some(20.0))]),
            row("T2", &[(cols::PE, Some(18.0)), (cols::ROE_PCT, None)]),
            row("T3", &[(cols::PE, None), (cols::ROE_PCT, Some(7.0))]),
        ]);
        let cfg = test_config(&PE_ROE_WEIGHTS, &PE_RULE);
        let a = score_table(table.clone(), &cfg);
        let b = score_table(table, &cfg);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.core_score, y.core_score);
            assert_eq!(x.checklist_score, y.checklist_score);
            assert_eq!(x.gate, y.gate);
            assert_eq!(x.percentiles, y.percentiles);
        }
    }

    #[test]
    fn truncates_to_top_n() {
        let table = MetricTable::from_rows(vec![
            row("T1", &[(cols::PE, Some(10.0))]),
            row("T2", &[(cols::PE, Some(20.0))]),
            row("T3", &[(cols::PE, Some(30.0))]),
        ]);
        static W: [MetricWeight; 1] = [MetricWeight {
            metric: cols::PE,
            weight: 1.0,
            higher_is_better: false,
        }];
        let cfg = test_config(&W, &[]);
        let mut scored = score_table(table, &cfg);
        rank(&mut scored, SortOrder::Core, 2);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].row.ticker, "T1");
    }
}
