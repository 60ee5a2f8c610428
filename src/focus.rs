// Focus timer for working on a single task.
//
// A session counts down the task's estimate (half an hour when unset). It
// lives in memory only; finishing it completes or fails the task.

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{DEFAULT_SLOT_HOURS, MAX_DURATION_HOURS};
use crate::error::PlannerError;
use crate::models::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub task_id: Uuid,
    pub started_at: DateTime<FixedOffset>,
    pub duration_secs: i64,
}

// Seconds on the clock for a task, at most one day.
pub fn timer_seconds(task: &Task) -> i64 {
    let hours = task
        .estimated_hours
        .filter(|h| h.is_finite() && *h > 0.0)
        .unwrap_or(DEFAULT_SLOT_HOURS)
        .min(MAX_DURATION_HOURS);
    (hours * 3600.0).round() as i64
}

pub fn start_focus(task: &Task, now: DateTime<FixedOffset>) -> Result<FocusSession, PlannerError> {
    if task.completed {
        return Err(PlannerError::AlreadyCompleted(task.id));
    }
    Ok(FocusSession {
        task_id: task.id,
        started_at: now,
        duration_secs: timer_seconds(task),
    })
}

impl FocusSession {
    // `None` when the end is outside the representable range.
    pub fn ends_at(&self) -> Option<DateTime<FixedOffset>> {
        TimeDelta::try_seconds(self.duration_secs).and_then(|d| self.started_at.checked_add_signed(d))
    }

    pub fn remaining_secs(&self, now: DateTime<FixedOffset>) -> i64 {
        match self.ends_at() {
            Some(end) => (end - now).num_seconds().max(0),
            None => self.duration_secs.max(0),
        }
    }

    pub fn is_elapsed(&self, now: DateTime<FixedOffset>) -> bool {
        self.remaining_secs(now) == 0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusStatus {
    pub session: FocusSession,
    pub remaining_secs: i64,
    pub elapsed: bool,
}

impl FocusStatus {
    pub fn at(session: FocusSession, now: DateTime<FixedOffset>) -> Self {
        FocusStatus {
            remaining_secs: session.remaining_secs(now),
            elapsed: session.is_elapsed(now),
            session,
        }
    }
}
