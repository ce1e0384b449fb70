//! The six investor-style presets. Each is a constant `StrategyConfig`;
//! the engine never branches on which strategy is running.

use crate::screen::config::{ChecklistRule, Cmp, FetchKind, MetricWeight, StrategyConfig};
use market_data::types::cols;
use market_data::{FetchProfile, UniverseKind};

/// Named investor styles exposed by the API and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Graham,
    Buffett,
    Lynch,
    Klarman,
    Templeton,
    Soros,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Graham,
        Strategy::Buffett,
        Strategy::Lynch,
        Strategy::Klarman,
        Strategy::Templeton,
        Strategy::Soros,
    ];

    pub fn config(self) -> &'static StrategyConfig {
        match self {
            Strategy::Graham => &GRAHAM,
            Strategy::Buffett => &BUFFETT,
            Strategy::Lynch => &LYNCH,
            Strategy::Klarman => &KLARMAN,
            Strategy::Templeton => &TEMPLETON,
            Strategy::Soros => &SOROS,
        }
    }

    pub fn name(self) -> &'static str {
        self.config().name
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "graham" => Ok(Strategy::Graham),
            "buffett" => Ok(Strategy::Buffett),
            "lynch" => Ok(Strategy::Lynch),
            "klarman" => Ok(Strategy::Klarman),
            "templeton" => Ok(Strategy::Templeton),
            "soros" => Ok(Strategy::Soros),
            other => Err(format!(
                "unknown strategy '{}', expected one of: graham, buffett, lynch, klarman, templeton, soros",
                other
            )),
        }
    }
}

const fn weight(metric: &'static str, weight: f64, higher_is_better: bool) -> MetricWeight {
    MetricWeight {
        metric,
        weight,
        higher_is_better,
    }
}

const fn rule(
    name: &'static str,
    metric: &'static str,
    cmp: Cmp,
    threshold: f64,
) -> ChecklistRule {
    ChecklistRule {
        name,
        metric,
        cmp,
        threshold,
    }
}

/// Deep value: cheap on earnings and book, near the 52-week low, paying a
/// dividend, conservatively financed.
static GRAHAM: StrategyConfig = StrategyConfig {
    name: "graham",
    gate_column: "GrahamGate",
    universe: UniverseKind::UsEquities,
    fetch_kind: FetchKind::Fundamentals,
    fetch_profile: FetchProfile::FUNDAMENTALS,
    default_limit: 6000,
    weights: &[
        weight(cols::PE, 0.25, false),
        weight(cols::PB, 0.20, false),
        weight(cols::PRICE_TO_52W_LOW, 0.15, false),
        weight(cols::DIVIDEND_YIELD_PCT, 0.15, true),
        weight(cols::ROE_PCT, 0.10, true),
        weight(cols::DEBT_TO_EQUITY, 0.10, false),
        weight(cols::CURRENT_RATIO, 0.05, true),
    ],
    checklist: &[
        rule("PE_low", cols::PE, Cmp::Le, 15.0),
        rule("PB_low", cols::PB, Cmp::Le, 1.2),
        rule("Near_52w_low", cols::PRICE_TO_52W_LOW, Cmp::Le, 1.20),
        rule("Debt_OK", cols::DEBT_TO_EQUITY, Cmp::Le, 1.0),
        rule("CR_OK", cols::CURRENT_RATIO, Cmp::Ge, 1.5),
        rule("Div_OK", cols::DIVIDEND_YIELD_PCT, Cmp::Ge, 2.0),
        rule("ROE_OK", cols::ROE_PCT, Cmp::Ge, 5.0),
    ],
    columns: &[
        "Ticker",
        "Name",
        "Sector",
        "CoreScore",
        "ChecklistScore",
        "GrahamGate",
        cols::MARKET_CAP,
        cols::PE,
        cols::PB,
        cols::PRICE_TO_52W_LOW,
        cols::DIVIDEND_YIELD_PCT,
        cols::ROE_PCT,
        cols::DEBT_TO_EQUITY,
        cols::CURRENT_RATIO,
        cols::DRAWDOWN_FROM_HIGH_PCT,
    ],
    expected_metrics: &[
        cols::MARKET_CAP,
        cols::PE,
        cols::PB,
        cols::PRICE,
        cols::PRICE_TO_52W_LOW,
        cols::DRAWDOWN_FROM_HIGH_PCT,
        cols::DIVIDEND_YIELD_PCT,
        cols::ROE_PCT,
        cols::DEBT_TO_EQUITY,
        cols::CURRENT_RATIO,
    ],
    require_positive_market_cap: true,
};

/// Quality compounders: durable profitability, shareholder payout, low debt,
/// large caps only.
static BUFFETT: StrategyConfig = StrategyConfig {
    name: "buffett",
    gate_column: "BuffettGate",
    universe: UniverseKind::Sp500,
    fetch_kind: FetchKind::Fundamentals,
    fetch_profile: FetchProfile::FUNDAMENTALS,
    default_limit: 6000,
    weights: &[
        weight(cols::PE, 0.25, false),
        weight(cols::DIVIDEND_YIELD_PCT, 0.20, true),
        weight(cols::ROE_PCT, 0.25, true),
        weight(cols::DEBT_TO_EQUITY, 0.15, false),
        weight(cols::MARKET_CAP, 0.15, true),
    ],
    checklist: &[
        rule("PE_ok", cols::PE, Cmp::Le, 25.0),
        rule("Div_OK", cols::DIVIDEND_YIELD_PCT, Cmp::Ge, 2.0),
        rule("Debt_OK", cols::DEBT_TO_EQUITY, Cmp::Le, 0.5),
        rule("ROE_OK", cols::ROE_PCT, Cmp::Ge, 15.0),
        rule("MarketCap_OK", cols::MARKET_CAP, Cmp::Ge, 2e9),
    ],
    columns: &[
        "Ticker",
        "Name",
        "Sector",
        "CoreScore",
        "ChecklistScore",
        "BuffettGate",
        cols::MARKET_CAP,
        cols::PE,
        cols::PRICE,
        cols::DIVIDEND_YIELD_PCT,
        cols::ROE_PCT,
        cols::DEBT_TO_EQUITY,
    ],
    expected_metrics: &[
        cols::MARKET_CAP,
        cols::PE,
        cols::PRICE,
        cols::DIVIDEND_YIELD_PCT,
        cols::ROE_PCT,
        cols::DEBT_TO_EQUITY,
    ],
    require_positive_market_cap: false,
};

/// Growth at a reasonable price: PEG-driven, favors smaller caps the market
/// hasn't fully priced.
static LYNCH: StrategyConfig = StrategyConfig {
    name: "lynch",
    gate_column: "LynchGate",
    universe: UniverseKind::Sp500,
    fetch_kind: FetchKind::Fundamentals,
    fetch_profile: FetchProfile::FUNDAMENTALS,
    default_limit: 6000,
    weights: &[
        weight(cols::PE, 0.25, false),
        weight(cols::PEG, 0.25, false),
        weight(cols::ROE_PCT, 0.20, true),
        weight(cols::DEBT_TO_EQUITY, 0.15, false),
        weight(cols::MARKET_CAP, 0.15, true),
    ],
    checklist: &[
        rule("PE_ok", cols::PE, Cmp::Le, 25.0),
        rule("PEG_ok", cols::PEG, Cmp::Le, 1.0),
        rule("ROE_OK", cols::ROE_PCT, Cmp::Ge, 15.0),
        rule("Debt_OK", cols::DEBT_TO_EQUITY, Cmp::Le, 0.5),
        rule("MarketCap_OK", cols::MARKET_CAP, Cmp::Ge, 500e6),
    ],
    columns: &[
        "Ticker",
        "Name",
        "Sector",
        "CoreScore",
        "ChecklistScore",
        "LynchGate",
        cols::MARKET_CAP,
        cols::PE,
        cols::PRICE,
        cols::PEG,
        cols::ROE_PCT,
        cols::DEBT_TO_EQUITY,
    ],
    expected_metrics: &[
        cols::MARKET_CAP,
        cols::PE,
        cols::PRICE,
        cols::PEG,
        cols::ROE_PCT,
        cols::DEBT_TO_EQUITY,
    ],
    require_positive_market_cap: false,
};

/// Margin-of-safety value: cash generation and balance-sheet strength over
/// earnings optics.
static KLARMAN: StrategyConfig = StrategyConfig {
    name: "klarman",
    gate_column: "KlarmanGate",
    universe: UniverseKind::UsEquities,
    fetch_kind: FetchKind::Fundamentals,
    fetch_profile: FetchProfile::FUNDAMENTALS,
    default_limit: 1000,
    weights: &[
        weight(cols::FCF_YIELD_PCT, 0.30, true),
        weight(cols::EV_EBITDA, 0.25, false),
        weight(cols::PB, 0.15, false),
        weight(cols::NET_CASH_TO_MKT_CAP_PCT, 0.15, true),
        weight(cols::CURRENT_RATIO, 0.10, true),
        weight(cols::INTEREST_COVERAGE, 0.05, true),
    ],
    checklist: &[
        rule("FCF_Positive", cols::FCF_YIELD_PCT, Cmp::Ge, 5.0),
        rule("EVEBITDA_low", cols::EV_EBITDA, Cmp::Le, 8.0),
        rule("PB_low", cols::PB, Cmp::Le, 1.2),
        rule("NetCash_OK", cols::NET_CASH_TO_MKT_CAP_PCT, Cmp::Ge, -10.0),
        rule("CR_OK", cols::CURRENT_RATIO, Cmp::Ge, 1.5),
        rule("Interest_OK", cols::INTEREST_COVERAGE, Cmp::Ge, 4.0),
    ],
    columns: &[
        "Ticker",
        "Name",
        "Sector",
        "CoreScore",
        "ChecklistScore",
        "KlarmanGate",
        cols::MARKET_CAP,
        cols::PB,
        cols::EV_EBITDA,
        cols::FCF_YIELD_PCT,
        cols::NET_CASH_TO_MKT_CAP_PCT,
        cols::CURRENT_RATIO,
        cols::INTEREST_COVERAGE,
        cols::PRICE,
    ],
    expected_metrics: &[
        cols::MARKET_CAP,
        cols::PB,
        cols::EV_EBITDA,
        cols::FCF_YIELD_PCT,
        cols::NET_CASH_TO_MKT_CAP_PCT,
        cols::CURRENT_RATIO,
        cols::INTEREST_COVERAGE,
        cols::PRICE,
    ],
    require_positive_market_cap: true,
};

/// Contrarian value: maximum pessimism proxies, looser quality bar than
/// Graham but demands survivable financials.
static TEMPLETON: StrategyConfig = StrategyConfig {
    name: "templeton",
    gate_column: "TempletonGate",
    universe: UniverseKind::UsEquities,
    fetch_kind: FetchKind::Fundamentals,
    fetch_profile: FetchProfile::FUNDAMENTALS,
    default_limit: 6000,
    weights: &[
        weight(cols::PE, 0.20, false),
        weight(cols::PB, 0.15, false),
        weight(cols::PRICE_TO_52W_LOW, 0.20, false),
        weight(cols::DIVIDEND_YIELD_PCT, 0.10, true),
        weight(cols::ROE_PCT, 0.15, true),
        weight(cols::DEBT_TO_EQUITY, 0.10, false),
        weight(cols::EARNINGS_GROWTH_PCT, 0.10, true),
    ],
    checklist: &[
        rule("PE_low", cols::PE, Cmp::Le, 12.0),
        rule("PB_low", cols::PB, Cmp::Le, 1.5),
        rule("Near_52w_low", cols::PRICE_TO_52W_LOW, Cmp::Le, 1.30),
        rule("Debt_OK", cols::DEBT_TO_EQUITY, Cmp::Le, 1.5),
        rule("CR_OK", cols::CURRENT_RATIO, Cmp::Ge, 1.5),
        rule("Div_OK", cols::DIVIDEND_YIELD_PCT, Cmp::Ge, 0.0),
        rule("Growth_OK", cols::EARNINGS_GROWTH_PCT, Cmp::Gt, -5.0),
    ],
    columns: &[
        "Ticker",
        "Name",
        "Sector",
        "CoreScore",
        "ChecklistScore",
        "TempletonGate",
        cols::MARKET_CAP,
        cols::PRICE,
        cols::PE,
        cols::PB,
        cols::PRICE_TO_52W_LOW,
        cols::DIVIDEND_YIELD_PCT,
        cols::ROE_PCT,
        cols::DEBT_TO_EQUITY,
        cols::CURRENT_RATIO,
        cols::EARNINGS_GROWTH_PCT,
        cols::DRAWDOWN_FROM_HIGH_PCT,
    ],
    expected_metrics: &[
        cols::MARKET_CAP,
        cols::PE,
        cols::PB,
        cols::PRICE,
        cols::PRICE_TO_52W_LOW,
        cols::DRAWDOWN_FROM_HIGH_PCT,
        cols::DIVIDEND_YIELD_PCT,
        cols::ROE_PCT,
        cols::DEBT_TO_EQUITY,
        cols::CURRENT_RATIO,
        cols::EARNINGS_GROWTH_PCT,
    ],
    require_positive_market_cap: true,
};

/// Reflexivity-flavored momentum: ride persistent trends in liquid names,
/// penalize volatility and deep drawdowns. No checklist; pure composite.
static SOROS: StrategyConfig = StrategyConfig {
    name: "soros",
    gate_column: "SorosGate",
    universe: UniverseKind::UsEquities,
    fetch_kind: FetchKind::Momentum,
    fetch_profile: FetchProfile::MOMENTUM,
    default_limit: 600,
    weights: &[
        weight(cols::MOM_12M_PCT, 0.35, true),
        weight(cols::MOM_3M_PCT, 0.20, true),
        weight(cols::TREND_200_PCT, 0.15, true),
        weight(cols::TREND_50_PCT, 0.10, true),
        weight(cols::VOLATILITY_20D_PCT, 0.10, false),
        weight(cols::MAX_DRAWDOWN_PCT, 0.05, false),
        weight(cols::DOLLAR_VOL_20D, 0.05, true),
    ],
    checklist: &[],
    columns: &[
        "Ticker",
        "Name",
        "Sector",
        "CoreScore",
        cols::PRICE,
        cols::MOM_12M_PCT,
        cols::MOM_3M_PCT,
        cols::TREND_200_PCT,
        cols::TREND_50_PCT,
        cols::VOLATILITY_20D_PCT,
        cols::MAX_DRAWDOWN_PCT,
        cols::DOLLAR_VOL_20D,
    ],
    expected_metrics: &[
        cols::PRICE,
        cols::MOM_12M_PCT,
        cols::MOM_3M_PCT,
        cols::TREND_200_PCT,
        cols::TREND_50_PCT,
        cols::VOLATILITY_20D_PCT,
        cols::MAX_DRAWDOWN_PCT,
        cols::DOLLAR_VOL_20D,
    ],
    require_positive_market_cap: false,
};
