//! Quote-provider client: per-ticker fundamentals and daily history.
//!
//! Every numeric field resolves through an explicit ordered candidate list in
//! `FIELD_CANDIDATES`; provider payloads rename fields between API versions
//! and the first present synonym wins.

use crate::normalizers::{
    drawdown_from_high_pct, ev_to_ebitda, frac_to_pct, momentum_stats, normalize_div_yield,
    pb_fallback, pct_of_market_cap, pe_fallback, price_to_52w_low,
};
use crate::types::{cols, MarketDataError, MetricRow, MetricSource, Result};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "StockCopilot/1.0 (+contact@example.com) Mozilla/5.0";
const QUOTE_MODULES: &str = "price,summaryDetail,financialData,defaultKeyStatistics,summaryProfile";

/// Ordered provider field names per logical metric. The modules the summary
/// endpoint returns are searched in order and the first present, finite value
/// is used.
static FIELD_CANDIDATES: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "price" => &["currentPrice", "regularMarketPrice"],
    "market_cap" => &["marketCap"],
    "shares_outstanding" => &["sharesOutstanding", "impliedSharesOutstanding"],
    "fifty_two_week_low" => &["fiftyTwoWeekLow"],
    "fifty_two_week_high" => &["fiftyTwoWeekHigh"],
    "trailing_pe" => &["trailingPE"],
    "price_to_book" => &["priceToBook"],
    "eps_ttm" => &["trailingEps"],
    "debt_to_equity" => &["debtToEquity"],
    "current_ratio" => &["currentRatio"],
    "return_on_equity" => &["returnOnEquity"],
    "dividend_yield" => &["dividendYield", "trailingAnnualDividendYield"],
    "earnings_growth" => &["earningsGrowth", "earningsQuarterlyGrowth"],
    "peg_ratio" => &["pegRatio", "trailingPegRatio"],
    "enterprise_value" => &["enterpriseValue"],
    "ebitda" => &["ebitda"],
    "total_debt" => &["totalDebt"],
    "total_cash" => &["totalCash"],
    "free_cashflow" => &["freeCashflow", "freeCashFlow"],
    "total_equity" => &["totalStockholderEquity", "stockholdersEquity"],
    // Per-share figure, not a balance-sheet total
    "book_value_per_share" => &["bookValue"],
    "ebit" => &["ebit", "operatingIncome"],
    "interest_expense" => &["interestExpense", "interestExpenseNonOperating"],
};

/// Quote-provider API client
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: Url,
}

impl YahooClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.parse().expect("valid default base url"))
    }

    /// Point the client at a different host (used by tests).
    pub fn with_base_url(base_url: Url) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(25))
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, base_url }
    }

    /// GET with one retry on 429/5xx.
    async fn get_json(&self, url: Url) -> Result<Value> {
        for attempt in 0..2 {
            let resp = self.client.get(url.clone()).send().await;
            match resp {
                Ok(r) => {
                    let status = r.status();
                    if status.as_u16() == 429 || status.is_server_error() {
                        if attempt == 0 {
                            tokio::time::sleep(Duration::from_millis(400)).await;
                            continue;
                        }
                        return Err(MarketDataError::Api(format!("{}: {}", url, status)));
                    }
                    if !status.is_success() {
                        return Err(MarketDataError::Api(format!("{}: {}", url, status)));
                    }
                    return Ok(r.json::<Value>().await?);
                }
                Err(e) if attempt == 0 => {
                    tracing::debug!("retrying {} after {}", url, e);
                    tokio::time::sleep(Duration::from_millis(400)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        unreachable!("retry loop always returns")
    }

    /// Fetch the quote-summary modules for one ticker.
    pub async fn quote_summary(&self, ticker: &str) -> Result<Value> {
        let mut url = self
            .base_url
            .join(&format!("/v10/finance/quoteSummary/{}", ticker))
            .map_err(|e| MarketDataError::Api(e.to_string()))?;
        url.query_pairs_mut().append_pair("modules", QUOTE_MODULES);

        let body = self.get_json(url).await?;
        let result = body
            .pointer("/quoteSummary/result/0")
            .cloned()
            .ok_or_else(|| {
                MarketDataError::InvalidResponse(format!("no quoteSummary result for {}", ticker))
            })?;
        Ok(result)
    }

    /// Fetch ~1y of daily closes/volumes for one ticker.
    pub async fn daily_history(&self, ticker: &str) -> Result<(Vec<f64>, Vec<f64>)> {
        let mut url = self
            .base_url
            .join(&format!("/v8/finance/chart/{}", ticker))
            .map_err(|e| MarketDataError::Api(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("range", "1y")
            .append_pair("interval", "1d");

        let body = self.get_json(url).await?;
        let quote = body
            .pointer("/chart/result/0/indicators/quote/0")
            .ok_or_else(|| {
                MarketDataError::InvalidResponse(format!("no chart result for {}", ticker))
            })?;

        let closes_raw = quote.pointer("/close").and_then(Value::as_array);
        let volumes_raw = quote.pointer("/volume").and_then(Value::as_array);
        let (Some(closes_raw), Some(volumes_raw)) = (closes_raw, volumes_raw) else {
            return Err(MarketDataError::InvalidResponse(format!(
                "chart missing close/volume series for {}",
                ticker
            )));
        };

        // Drop sessions with a null close, keeping the series aligned
        let mut closes = Vec::with_capacity(closes_raw.len());
        let mut volumes = Vec::with_capacity(closes_raw.len());
        for (c, v) in closes_raw.iter().zip(volumes_raw) {
            if let Some(c) = c.as_f64().filter(|c| c.is_finite()) {
                closes.push(c);
                volumes.push(v.as_f64().unwrap_or(0.0));
            }
        }
        Ok((closes, volumes))
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Unwrap the provider's `{"raw": 1.23, "fmt": "1.23"}` number envelopes;
/// plain numbers pass through.
fn raw_num(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::Object(o) => o.get("raw").and_then(Value::as_f64).filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Resolve a logical metric through its candidate field names, searching
/// every module object in the summary result.
fn pick(summary: &Value, logical: &str) -> Option<f64> {
    let candidates = FIELD_CANDIDATES.get(logical)?;
    let modules = summary.as_object()?;
    for field in candidates.iter() {
        for module in modules.values() {
            if let Some(v) = module.get(*field) {
                if let Some(n) = raw_num(v) {
                    return Some(n);
                }
            }
        }
    }
    None
}

fn pick_str<'a>(summary: &'a Value, module: &str, field: &str) -> Option<&'a str> {
    summary.pointer(&format!("/{}/{}", module, field)).and_then(Value::as_str)
}

fn display_fields(summary: &Value, ticker: &str) -> (String, String) {
    let name = pick_str(summary, "price", "shortName")
        .or_else(|| pick_str(summary, "price", "longName"))
        .unwrap_or(ticker)
        .to_string();
    let sector = pick_str(summary, "summaryProfile", "sector")
        .unwrap_or("")
        .to_string();
    (name, sector)
}

/// Fundamentals profile: one quote-summary call per ticker, value-strategy
/// metrics derived locally.
pub struct FundamentalsSource {
    client: Arc<YahooClient>,
}

impl FundamentalsSource {
    pub fn new(client: Arc<YahooClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MetricSource for FundamentalsSource {
    async fn fetch_row(&self, ticker: &str) -> Result<MetricRow> {
        let summary = self.client.quote_summary(ticker).await?;

        let price = pick(&summary, "price");
        let shares = pick(&summary, "shares_outstanding");
        let mut mcap = pick(&summary, "market_cap");
        if mcap.is_none() {
            if let (Some(p), Some(s)) = (price, shares) {
                mcap = Some(p * s);
            }
        }

        let eps = pick(&summary, "eps_ttm");
        let pe = pick(&summary, "trailing_pe").or_else(|| pe_fallback(price, eps));
        let pb = pick(&summary, "price_to_book")
            .or_else(|| pb_fallback(price, shares, pick(&summary, "total_equity")))
            .or_else(|| {
                let bvps = pick(&summary, "book_value_per_share").filter(|b| *b > 0.0)?;
                Some(price? / bvps)
            });

        let wk_low = pick(&summary, "fifty_two_week_low");
        let wk_high = pick(&summary, "fifty_two_week_high");

        let ev = pick(&summary, "enterprise_value").or_else(|| {
            let m = mcap?;
            let debt = pick(&summary, "total_debt");
            let cash = pick(&summary, "total_cash");
            if debt.is_none() && cash.is_none() {
                return None;
            }
            Some(m + debt.unwrap_or(0.0) - cash.unwrap_or(0.0))
        });
        let ebitda = pick(&summary, "ebitda");
        let debt = pick(&summary, "total_debt");
        let cash = pick(&summary, "total_cash");
        let fcf = pick(&summary, "free_cashflow");
        let net_cash = match (cash, debt) {
            (Some(c), Some(d)) => Some(c - d),
            _ => None,
        };
        let int_cov = match (pick(&summary, "ebit"), pick(&summary, "interest_expense")) {
            (Some(ebit), Some(ie)) if ie.abs() > 0.0 => Some(ebit / ie.abs()),
            _ => None,
        };

        let (name, sector) = display_fields(&summary, ticker);
        let mut row = MetricRow::new(ticker);
        row.name = name;
        row.sector = sector;

        row.set(cols::PRICE, price);
        row.set(cols::MARKET_CAP, mcap);
        row.set(cols::PE, pe);
        row.set(cols::PB, pb);
        row.set(cols::PEG, pick(&summary, "peg_ratio"));
        row.set(cols::EPS_TTM, eps);
        row.set(cols::PRICE_TO_52W_LOW, price_to_52w_low(price, wk_low));
        row.set(
            cols::DRAWDOWN_FROM_HIGH_PCT,
            drawdown_from_high_pct(price, wk_high),
        );
        row.set(
            cols::DIVIDEND_YIELD_PCT,
            normalize_div_yield(pick(&summary, "dividend_yield")),
        );
        row.set(cols::ROE_PCT, frac_to_pct(pick(&summary, "return_on_equity")));
        row.set(cols::DEBT_TO_EQUITY, pick(&summary, "debt_to_equity"));
        row.set(cols::CURRENT_RATIO, pick(&summary, "current_ratio"));
        row.set(
            cols::EARNINGS_GROWTH_PCT,
            frac_to_pct(pick(&summary, "earnings_growth")),
        );
        row.set(cols::EV_EBITDA, ev_to_ebitda(ev, ebitda));
        row.set(cols::FCF_YIELD_PCT, pct_of_market_cap(fcf, mcap));
        row.set(
            cols::NET_CASH_TO_MKT_CAP_PCT,
            pct_of_market_cap(net_cash, mcap),
        );
        row.set(cols::INTEREST_COVERAGE, int_cov);

        Ok(row)
    }

    fn name(&self) -> &str {
        "yahoo_fundamentals"
    }
}

/// Momentum profile: daily history plus a best-effort summary call for the
/// display fields.
pub struct MomentumSource {
    client: Arc<YahooClient>,
}

impl MomentumSource {
    pub fn new(client: Arc<YahooClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MetricSource for MomentumSource {
    async fn fetch_row(&self, ticker: &str) -> Result<MetricRow> {
        let (closes, volumes) = self.client.daily_history(ticker).await?;
        if closes.is_empty() {
            return Err(MarketDataError::InvalidResponse(format!(
                "empty history for {}",
                ticker
            )));
        }
        let stats = momentum_stats(&closes, &volumes);

        let mut row = MetricRow::new(ticker);
        if let Ok(summary) = self.client.quote_summary(ticker).await {
            let (name, sector) = display_fields(&summary, ticker);
            row.name = name;
            row.sector = sector;
        }

        row.set(cols::PRICE, stats.price);
        row.set(cols::MOM_12M_PCT, stats.mom_12m_pct);
        row.set(cols::MOM_3M_PCT, stats.mom_3m_pct);
        row.set(cols::TREND_200_PCT, stats.trend_200_pct);
        row.set(cols::TREND_50_PCT, stats.trend_50_pct);
        row.set(cols::VOLATILITY_20D_PCT, stats.volatility_20d_pct);
        row.set(cols::MAX_DRAWDOWN_PCT, stats.max_drawdown_pct);
        row.set(cols::DOLLAR_VOL_20D, stats.dollar_vol_20d);
        Ok(row)
    }

    fn name(&self) -> &str {
        "yahoo_momentum"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summary_body() -> Value {
        serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "regularMarketPrice": {"raw": 100.0, "fmt": "100.00"},
                        "shortName": "Test Corp"
                    },
                    "summaryProfile": {"sector": "Technology"},
                    "summaryDetail": {
                        "trailingPE": {"raw": 10.0},
                        "dividendYield": {"raw": 0.02},
                        "fiftyTwoWeekLow": {"raw": 80.0},
                        "fiftyTwoWeekHigh": {"raw": 125.0},
                        "marketCap": {"raw": 1.0e9}
                    },
                    "financialData": {
                        "returnOnEquity": {"raw": 0.18},
                        "currentRatio": {"raw": 2.1},
                        "debtToEquity": {"raw": 45.0},
                        "totalCash": {"raw": 2.0e8},
                        "totalDebt": {"raw": 1.0e8},
                        "ebitda": {"raw": 1.5e8},
                        "freeCashflow": {"raw": 8.0e7}
                    },
                    "defaultKeyStatistics": {
                        "trailingEps": {"raw": 10.0},
                        "enterpriseValue": {"raw": 9.0e8},
                        "pegRatio": {"raw": 1.4}
                    }
                }],
                "error": null
            }
        })
    }

    #[tokio::test]
    async fn fundamentals_row_from_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/TEST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body()))
            .mount(&server)
            .await;

        let client = Arc::new(YahooClient::with_base_url(server.uri().parse().unwrap()));
        let source = FundamentalsSource::new(client);
        let row = source.fetch_row("TEST").await.unwrap();

        assert_eq!(row.name, "Test Corp");
        assert_eq!(row.sector, "Technology");
        assert_eq!(row.get(cols::PE), Some(10.0));
        assert_eq!(row.get(cols::ROE_PCT), Some(18.0));
        assert_eq!(row.get(cols::DIVIDEND_YIELD_PCT), Some(2.0));
        assert!((row.get(cols::PRICE_TO_52W_LOW).unwrap() - 1.25).abs() < 1e-9);
        assert!((row.get(cols::DRAWDOWN_FROM_HIGH_PCT).unwrap() - 20.0).abs() < 1e-9);
        assert!((row.get(cols::EV_EBITDA).unwrap() - 6.0).abs() < 1e-9);
        assert!((row.get(cols::FCF_YIELD_PCT).unwrap() - 8.0).abs() < 1e-9);
        assert!((row.get(cols::NET_CASH_TO_MKT_CAP_PCT).unwrap() - 10.0).abs() < 1e-9);
        // No income-statement fields in the payload
        assert_eq!(row.get(cols::INTEREST_COVERAGE), None);
    }

    #[tokio::test]
    async fn pb_fallback_treats_book_value_as_per_share() {
        // bookValue is per share; dividing it by shares again would put the
        // fallback P/B off by the share count.
        let body = serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "price": {"regularMarketPrice": {"raw": 100.0}},
                    "defaultKeyStatistics": {
                        "sharesOutstanding": {"raw": 1.0e9},
                        "bookValue": {"raw": 5.0}
                    }
                }],
                "error": null
            }
        });
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/BOOK"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = Arc::new(YahooClient::with_base_url(server.uri().parse().unwrap()));
        let source = FundamentalsSource::new(client);
        let row = source.fetch_row("BOOK").await.unwrap();

        assert!((row.get(cols::PB).unwrap() - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_result_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "quoteSummary": {"result": null, "error": {"code": "Not Found"}}
            })))
            .mount(&server)
            .await;

        let client = Arc::new(YahooClient::with_base_url(server.uri().parse().unwrap()));
        let source = FundamentalsSource::new(client);
        assert!(source.fetch_row("NOPE").await.is_err());
    }

    #[test]
    fn raw_num_unwraps_envelopes_and_plain_numbers() {
        assert_eq!(raw_num(&serde_json::json!(1.5)), Some(1.5));
        assert_eq!(raw_num(&serde_json::json!({"raw": 2.5, "fmt": "2.5"})), Some(2.5));
        assert_eq!(raw_num(&serde_json::json!("2.5")), None);
        assert_eq!(raw_num(&serde_json::json!(null)), None);
    }
}
