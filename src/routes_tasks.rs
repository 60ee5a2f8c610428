// --------------------------------------------------
// Handles API endpoints related to tasks.
//
// Responsibilities:
// - Create / read / update / delete tasks
// - Toggle, reorder and re-block tasks
// - Complete a task (frog check + daily stats) or record a failure
// -------------------------------------------------

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, PlannerError};
use crate::logic::{self, Direction};
use crate::models::{DailyStat, Task};
use crate::planner::{self, NewTask, TaskEdit};
use crate::state::{AppState, AtQuery};

type ApiResult<T> = Result<Json<T>, ApiError>;

// -----------------------------
// GET /api/tasks
// Returns all tasks, priority order
// -----------------------------
pub async fn get_tasks(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Task>> {
    let today = state.now().date_naive();
    let db = state.read(today).await?;
    Ok(Json(logic::sort_tasks(&db.tasks)))
}

// -----------------------------
// POST /api/tasks
// Creates a task, chained into its block
// -----------------------------
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewTask>,
) -> ApiResult<Task> {
    let now = state.now();
    let task = state
        .update(now.date_naive(), |db| {
            planner::add_task(db, input, Uuid::new_v4(), now.timestamp_millis()).map_err(ApiError::from)
        })
        .await?;
    Ok(Json(task))
}

// -----------------------------
// PUT /api/tasks/:id
// Partial update of an existing task
// ----------------------------
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(edit): Json<TaskEdit>,
) -> ApiResult<Task> {
    let today = state.now().date_naive();
    let task = state
        .update(today, |db| planner::edit_task(db, id, edit).map_err(ApiError::from))
        .await?;
    Ok(Json(task))
}

// -----------------------------
// DELETE /api/tasks/:id
// Removes a task permanently
// -----------------------------
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let today = state.now().date_naive();
    state
        .update(today, |db| Ok((planner::delete_task(db, id)?, ())))
        .await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// -----------------------------
// POST /api/tasks/:id/toggle
// Flips completed without recording stats
// -----------------------------
pub async fn toggle_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Task> {
    let today = state.now().date_naive();
    let task = state
        .update(today, |db| planner::toggle_task(db, id).map_err(ApiError::from))
        .await?;
    Ok(Json(task))
}

#[derive(Debug, Deserialize)]
pub struct MoveInput {
    pub direction: Direction,
}

// -----------------------------
// POST /api/tasks/:id/move
// Swaps the task with its neighbour inside the priority class
// -----------------------------
pub async fn move_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<MoveInput>,
) -> ApiResult<Vec<Task>> {
    let today = state.now().date_naive();
    let tasks = state
        .update(today, |db| {
            let next = planner::move_task(db, id, input.direction)?;
            let sorted = logic::sort_tasks(&next.tasks);
            Ok((next, sorted))
        })
        .await?;
    Ok(Json(tasks))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBlockInput {
    pub block_id: Option<Uuid>,
}

// -----------------------------
// POST /api/tasks/:id/block
// Reassigns the task and re-chains its window
// -----------------------------
pub async fn change_block(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<ChangeBlockInput>,
) -> ApiResult<Task> {
    let today = state.now().date_naive();
    let task = state
        .update(today, |db| planner::change_block(db, id, input.block_id).map_err(ApiError::from))
        .await?;
    Ok(Json(task))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub task: Task,
    pub was_frog: bool,
    pub today: Option<DailyStat>,
}

// -----------------------------
// POST /api/tasks/:id/complete[?at=HH:MM]
// Completes a task and records today's stats
// -----------------------------
pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(at): Query<AtQuery>,
) -> ApiResult<CompletionResponse> {
    let now = state.now();
    let minutes = at.minutes(now)?;
    let today = now.date_naive();

    let response = state
        .update(today, |db| {
            let (next, was_frog) = planner::complete_task(db, id, minutes, today)?;
            let response = CompletionResponse {
                task: next.task(id).cloned().ok_or(PlannerError::TaskNotFound(id))?,
                was_frog,
                today: next.daily_stats.iter().find(|s| s.date == today).cloned(),
            };
            Ok((next, response))
        })
        .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct FailInput {
    pub reason: String,
}

// -----------------------------
// POST /api/tasks/:id/fail
// Stores why an attempt was abandoned
// -----------------------------
pub async fn fail_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<FailInput>,
) -> ApiResult<Task> {
    let today = state.now().date_naive();
    let task = state
        .update(today, |db| {
            let next = planner::fail_task(db, id, &input.reason)?;
            let task = next.task(id).cloned().ok_or(PlannerError::TaskNotFound(id))?;
            Ok((next, task))
        })
        .await?;
    Ok(Json(task))
}
