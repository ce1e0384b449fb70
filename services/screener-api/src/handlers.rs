use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::screen::{run_screen, ScreenParams, SortOrder, Strategy};
use crate::AppState;

/// Query params for a screening request. Omitted fields fall back to the
/// strategy's own defaults.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct ScreenQuery {
    #[validate(range(min = 1, max = 100))]
    pub top_n: Option<usize>,
    #[validate(range(min = 10, max = 100_000))]
    pub limit: Option<usize>,
    pub order: Option<String>,
    pub details: Option<bool>,
}

/// GET /{strategy} - run one screen and return the shaped top-N records.
pub async fn run_strategy(
    State(state): State<Arc<AppState>>,
    Path(strategy): Path<String>,
    Query(query): Query<ScreenQuery>,
) -> Result<Json<Vec<Value>>, (StatusCode, String)> {
    let strategy: Strategy = strategy.parse().map_err(|e: String| {
        (StatusCode::NOT_FOUND, e)
    })?;

    query
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let mut params = ScreenParams::defaults_for(strategy);
    if let Some(top_n) = query.top_n {
        params.top_n = top_n;
    }
    if let Some(limit) = query.limit {
        params.limit = limit;
    }
    if let Some(order) = &query.order {
        params.order = order
            .parse::<SortOrder>()
            .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    }
    if let Some(details) = query.details {
        params.include_metric_details = details;
    }

    info!(
        "Screening {} (top_n={}, limit={})",
        strategy.name(),
        params.top_n,
        params.limit
    );

    let records = run_screen(&state, strategy, params).await;
    Ok(Json(records))
}

/// GET /health - liveness check.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "ok": true }))
}
