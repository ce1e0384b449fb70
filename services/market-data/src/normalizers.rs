//! Normalization logic for unifying metric shapes from the quote provider.
//!
//! The provider is inconsistent about units: ratios sometimes arrive as
//! fractions (0.23) and sometimes as percents (23.0), dividend yields in three
//! different scales. Everything here converts to one canonical unit and
//! computes the derived metrics the strategies score on.

/// Convert a fraction (e.g. 0.23) to percent (23.0). Values above 2.0 are
/// assumed to already be percent-like and pass through.
pub fn frac_to_pct(x: Option<f64>) -> Option<f64> {
    let v = x.filter(|v| v.is_finite())?;
    if (0.0..=2.0).contains(&v) {
        Some(v * 100.0)
    } else {
        Some(v)
    }
}

/// The provider may report a dividend yield as 0.023 (2.3%), 2.3, or 230.
/// Normalize to percent.
pub fn normalize_div_yield(x: Option<f64>) -> Option<f64> {
    let v = x.filter(|v| v.is_finite())?;
    if (0.0..=1.0).contains(&v) {
        Some(v * 100.0)
    } else if v > 50.0 {
        Some(v / 100.0)
    } else {
        Some(v)
    }
}

/// Trailing P/E from price and trailing EPS when the provider omits it.
pub fn pe_fallback(price: Option<f64>, eps_ttm: Option<f64>) -> Option<f64> {
    let (p, e) = (price?, eps_ttm?);
    if e != 0.0 {
        Some(p / e)
    } else {
        None
    }
}

/// P/B from price, share count and total equity when the provider omits it.
pub fn pb_fallback(price: Option<f64>, shares: Option<f64>, equity: Option<f64>) -> Option<f64> {
    let (p, s, eq) = (price?, shares?, equity?);
    if s > 0.0 && eq > 0.0 {
        let bvps = eq / s;
        if bvps > 0.0 {
            return Some(p / bvps);
        }
    }
    None
}

/// Price relative to the 52-week low (1.0 = at the low).
pub fn price_to_52w_low(price: Option<f64>, low: Option<f64>) -> Option<f64> {
    let (p, l) = (price?, low?);
    if l > 0.0 {
        Some(p / l)
    } else {
        None
    }
}

/// Percent distance below the 52-week high.
pub fn drawdown_from_high_pct(price: Option<f64>, high: Option<f64>) -> Option<f64> {
    let (p, h) = (price?, high?);
    if h > 0.0 {
        Some((h - p) / h * 100.0)
    } else {
        None
    }
}

/// EV/EBITDA; only meaningful for positive EBITDA.
pub fn ev_to_ebitda(ev: Option<f64>, ebitda: Option<f64>) -> Option<f64> {
    let (e, b) = (ev?, ebitda?);
    if b > 0.0 {
        Some(e / b)
    } else {
        None
    }
}

/// A value expressed as percent of market cap (FCF yield, net cash ratio).
pub fn pct_of_market_cap(value: Option<f64>, market_cap: Option<f64>) -> Option<f64> {
    let (v, m) = (value?, market_cap?);
    if m > 0.0 {
        Some(v / m * 100.0)
    } else {
        None
    }
}

/// Momentum-profile statistics derived from ~1y of daily closes/volumes.
/// Each field is `None` when the history is too short to support it.
#[derive(Debug, Clone, Default)]
pub struct MomentumStats {
    pub price: Option<f64>,
    pub mom_12m_pct: Option<f64>,
    pub mom_3m_pct: Option<f64>,
    pub trend_200_pct: Option<f64>,
    pub trend_50_pct: Option<f64>,
    pub volatility_20d_pct: Option<f64>,
    pub max_drawdown_pct: Option<f64>,
    pub dollar_vol_20d: Option<f64>,
}

pub fn momentum_stats(closes: &[f64], volumes: &[f64]) -> MomentumStats {
    let mut stats = MomentumStats::default();
    let n = closes.len();
    let Some(&price) = closes.last() else {
        return stats;
    };
    stats.price = Some(price);

    if n >= 2 && closes[0] > 0.0 {
        stats.mom_12m_pct = Some((price / closes[0] - 1.0) * 100.0);
    }
    // ~3 months of trading days back
    if n >= 64 && closes[n - 63] > 0.0 {
        stats.mom_3m_pct = Some((price / closes[n - 63] - 1.0) * 100.0);
    }

    stats.trend_200_pct = trend_vs_sma(closes, 200);
    stats.trend_50_pct = trend_vs_sma(closes, 50);

    // 20d annualized stdev of daily returns, as percent
    let rets: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    if rets.len() >= 20 {
        let tail = &rets[rets.len() - 20..];
        stats.volatility_20d_pct = Some(sample_stdev(tail) * (252.0_f64).sqrt() * 100.0);
    }

    if n >= 20 {
        let mut running_max = f64::MIN;
        let mut max_dd = 0.0_f64;
        for &c in closes {
            running_max = running_max.max(c);
            if running_max > 0.0 {
                max_dd = max_dd.min(c / running_max - 1.0);
            }
        }
        stats.max_drawdown_pct = Some(max_dd * 100.0);

        let dv: f64 = closes[n - 20..]
            .iter()
            .zip(&volumes[volumes.len().saturating_sub(20)..])
            .map(|(c, v)| c * v)
            .sum();
        stats.dollar_vol_20d = Some(dv / 20.0);
    }

    stats
}

fn trend_vs_sma(closes: &[f64], window: usize) -> Option<f64> {
    let n = closes.len();
    if n < window {
        return None;
    }
    let sma: f64 = closes[n - window..].iter().sum::<f64>() / window as f64;
    let price = *closes.last()?;
    if sma > 0.0 {
        Some((price / sma - 1.0) * 100.0)
    } else {
        None
    }
}

fn sample_stdev(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let mean = xs.iter().sum::<f64>() / n as f64;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    var.sqrt()
}
