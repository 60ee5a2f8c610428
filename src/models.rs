use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ABCDE priority. Declaration order is urgency order: A sorts first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    A,
    B,
    C,
    D,
    E,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<f64>, // decimal hour of day, 0.0..24.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_hour: Option<f64>,
    #[serde(default)]
    pub ends_next_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<Uuid>, // weak reference, may dangle
    // Sequence inside the priority class. Older data may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub created_at: i64, // unix millis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlock {
    pub id: Uuid,
    pub title: String,
    pub start_time: String, // "HH:MM"
    pub end_time: String,   // "HH:MM", may be earlier than start (overnight)
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub tasks_completed: u32,
    pub frog_eaten: bool,
}

// Everything the planner persists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Db {
    pub tasks: Vec<Task>,
    pub blocks: Vec<ScheduleBlock>,
    pub daily_stats: Vec<DailyStat>,
    pub last_visit: Option<NaiveDate>,
}

impl Db {
    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn block(&self, id: Uuid) -> Option<&ScheduleBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }
}
