use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("invalid clock time '{0}', expected HH:MM")]
    Malformed(String),
}

// Reasons an intent is rejected. A rejected intent leaves the state as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    #[error("title required")]
    EmptyTitle,

    #[error("duration must be positive")]
    NonPositiveDuration,

    #[error("duration longer than a day: {0}")]
    DurationTooLong(String),

    #[error("a start hour is required to set an end hour")]
    StartRequired,

    #[error("hour out of range: {0}")]
    InvalidHour(String),

    #[error("failure reason required")]
    EmptyReason,

    #[error("a time block is required")]
    BlockRequired,

    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("block not found: {0}")]
    BlockNotFound(Uuid),

    #[error("task already completed: {0}")]
    AlreadyCompleted(Uuid),

    #[error(transparent)]
    Clock(#[from] ClockError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("no focus session running")]
    NoFocusSession,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Planner(PlannerError::TaskNotFound(_))
            | ApiError::Planner(PlannerError::BlockNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Planner(PlannerError::AlreadyCompleted(_)) | ApiError::NoFocusSession => {
                StatusCode::CONFLICT
            }
            ApiError::Planner(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("request failed: {self}");
        } else {
            log::debug!("request rejected: {self}");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
