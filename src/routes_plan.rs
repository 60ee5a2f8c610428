use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::clock::format_decimal_hours;
use crate::error::ApiError;
use crate::logic::{self, NowPlan};
use crate::models::DailyStat;
use crate::state::{AppState, AtQuery};
use crate::stats::{self, HeatmapDay};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub date: String,
    pub now: String,
    pub clock: String, // "HH:MM" the plan was computed for
    #[serde(flatten)]
    pub plan: NowPlan,
}

// -----------------------------
// GET /api/plan/now[?at=HH:MM]
// Frog and remaining tasks for the active block
// -----------------------------
pub async fn get_now_plan(
    State(state): State<Arc<AppState>>,
    Query(at): Query<AtQuery>,
) -> Result<Json<PlanResponse>, ApiError> {
    let now = state.now();
    let minutes = at.minutes(now)?;
    let db = state.read(now.date_naive()).await?;

    let plan = logic::build_now_plan(&db.tasks, &db.blocks, minutes);

    Ok(Json(PlanResponse {
        date: now.date_naive().to_string(),
        now: now.to_rfc3339(),
        clock: format_decimal_hours(minutes as f64 / 60.0),
        plan,
    }))
}

// -----------------------------
// GET /api/stats
// -----------------------------
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<Vec<DailyStat>>, ApiError> {
    let db = state.read(state.now().date_naive()).await?;
    Ok(Json(db.daily_stats))
}

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    pub year: Option<i32>,
}

// -----------------------------
// GET /api/stats/heatmap[?year=YYYY]
// One entry per day of the year
// -----------------------------
pub async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HeatmapQuery>,
) -> Result<Json<Vec<HeatmapDay>>, ApiError> {
    let today = state.now().date_naive();
    let db = state.read(today).await?;
    let year = q.year.unwrap_or(today.year());
    Ok(Json(stats::year_heatmap(&db.daily_stats, year, today)))
}
