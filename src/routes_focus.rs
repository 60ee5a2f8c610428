// --------------------------------------------------
// Focus timer endpoints.
// One in-memory session at a time; finishing it completes or fails the task.
// -------------------------------------------------

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, PlannerError};
use crate::focus::{self, FocusStatus};
use crate::planner;
use crate::state::{AppState, AtQuery};

// -----------------------------
// GET /api/focus
// -----------------------------
pub async fn get_focus(State(state): State<Arc<AppState>>) -> Json<Option<FocusStatus>> {
    let now = state.now();
    Json(state.focus().map(|s| FocusStatus::at(s, now)))
}

// -----------------------------
// POST /api/focus/start/:id
// Replaces any running session
// -----------------------------
pub async fn start_focus(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FocusStatus>, ApiError> {
    let now = state.now();
    let db = state.read(now.date_naive()).await?;
    let task = db.task(id).ok_or(PlannerError::TaskNotFound(id))?;
    let session = focus::start_focus(task, now)?;

    log::info!("focus started on '{}' for {}s", task.title, session.duration_secs);
    state.set_focus(Some(session.clone()));
    Ok(Json(FocusStatus::at(session, now)))
}

#[derive(Debug, Deserialize)]
pub struct FinishInput {
    pub success: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishResponse {
    pub task_id: Uuid,
    pub success: bool,
    pub was_frog: bool,
}

// -----------------------------
// POST /api/focus/finish[?at=HH:MM]
// Success completes the task; failure needs a reason
// -----------------------------
pub async fn finish_focus(
    State(state): State<Arc<AppState>>,
    Query(at): Query<AtQuery>,
    Json(input): Json<FinishInput>,
) -> Result<Json<FinishResponse>, ApiError> {
    let session = state.focus().ok_or(ApiError::NoFocusSession)?;
    let now = state.now();
    let minutes = at.minutes(now)?;
    let today = now.date_naive();
    let task_id = session.task_id;

    // The session survives a rejected finish so the user can retry.
    let was_frog = if input.success {
        state
            .update(today, |db| planner::complete_task(db, task_id, minutes, today).map_err(ApiError::from))
            .await?
    } else {
        let reason = input.reason.unwrap_or_default();
        state
            .update(today, |db| Ok((planner::fail_task(db, task_id, &reason)?, false)))
            .await?
    };

    if !state.clear_focus_if(&session) {
        log::debug!("focus session replaced while finishing task {task_id}");
    }
    Ok(Json(FinishResponse {
        task_id,
        success: input.success,
        was_frog,
    }))
}
