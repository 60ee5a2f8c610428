// --------------------------------------------------
// Handles API endpoints related to time blocks.
// -------------------------------------------------

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{ApiError, PlannerError};
use crate::models::ScheduleBlock;
use crate::planner::{self, NewBlock};
use crate::schedule::{self, SlotProposal};
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

// -----------------------------
// GET /api/blocks
// -----------------------------
pub async fn get_blocks(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ScheduleBlock>> {
    let db = state.read(state.now().date_naive()).await?;
    Ok(Json(db.blocks))
}

// -----------------------------
// POST /api/blocks
// Creates a block; the list stays sorted by start time
// -----------------------------
pub async fn create_block(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewBlock>,
) -> ApiResult<ScheduleBlock> {
    let today = state.now().date_naive();
    let block = state
        .update(today, |db| planner::add_block(db, input, Uuid::new_v4()).map_err(ApiError::from))
        .await?;
    Ok(Json(block))
}

// -----------------------------
// DELETE /api/blocks/:id
// Its tasks become unassigned
// -----------------------------
pub async fn delete_block(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let today = state.now().date_naive();
    state
        .update(today, |db| Ok((planner::delete_block(db, id)?, ())))
        .await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// -----------------------------
// GET /api/blocks/:id/proposal
// Where a new task in this block would be placed
// -----------------------------
pub async fn get_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<SlotProposal> {
    let db = state.read(state.now().date_naive()).await?;
    let block = db.block(id).ok_or(PlannerError::BlockNotFound(id))?;
    let proposal = schedule::assign_task_to_block(block, &db.tasks).map_err(PlannerError::from)?;
    Ok(Json(proposal))
}
