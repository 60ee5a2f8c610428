// Define data modules
pub mod models; // Data structures (Task, ScheduleBlock, DailyStat, Db)
pub mod error; // Error taxonomy shared by core and API
pub mod clock; // "HH:MM" / decimal hour arithmetic
pub mod logic; // Task ordering and active-context resolution
pub mod schedule; // Chaining tasks inside time blocks
pub mod stats; // Completion, failure, rollover, heatmap
pub mod focus; // Focus timer sessions
pub mod planner; // User intents over the whole state
pub mod store; // Persistent storage (one JSON blob per key)
pub mod config; // Runtime configuration
pub mod state; // Shared state for the HTTP handlers
pub mod routes_tasks; // HTTP handlers for tasks
pub mod routes_blocks; // HTTP handlers for time blocks
pub mod routes_plan; // HTTP handlers for the now plan & stats
pub mod routes_focus; // HTTP handlers for the focus timer

use std::{path::Path, sync::Arc};

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::state::AppState;

// The `/api` routes alone, without static files.
pub fn api(state: Arc<AppState>) -> Router {
    Router::new()
        // plan & stats
        .route("/plan/now", get(routes_plan::get_now_plan))
        .route("/stats", get(routes_plan::get_stats))
        .route("/stats/heatmap", get(routes_plan::get_heatmap))
        // tasks
        .route("/tasks", get(routes_tasks::get_tasks).post(routes_tasks::create_task))
        .route("/tasks/:id", put(routes_tasks::update_task).delete(routes_tasks::delete_task))
        .route("/tasks/:id/toggle", post(routes_tasks::toggle_task))
        .route("/tasks/:id/move", post(routes_tasks::move_task))
        .route("/tasks/:id/block", post(routes_tasks::change_block))
        .route("/tasks/:id/complete", post(routes_tasks::complete_task))
        .route("/tasks/:id/fail", post(routes_tasks::fail_task))
        // blocks
        .route("/blocks", get(routes_blocks::get_blocks).post(routes_blocks::create_block))
        .route("/blocks/:id", delete(routes_blocks::delete_block))
        .route("/blocks/:id/proposal", get(routes_blocks::get_proposal))
        // focus timer
        .route("/focus", get(routes_focus::get_focus))
        .route("/focus/start/:id", post(routes_focus::start_focus))
        .route("/focus/finish", post(routes_focus::finish_focus))
        .with_state(state)
}

pub fn app(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .nest("/api", api(state))
        .fallback_service(ServeDir::new(static_dir))
}
