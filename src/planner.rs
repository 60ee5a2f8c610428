// User intents applied to the planner state.
//
// Each intent takes the current `Db` and returns the next one. A rejected
// intent returns an error and the caller keeps the state it already had.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{block_duration_minutes, parse_clock, TaskWindow, DEFAULT_SLOT_HOURS, MAX_DURATION_HOURS};
use crate::error::PlannerError;
use crate::logic::{self, Direction};
use crate::models::{Db, Priority, ScheduleBlock, Task};
use crate::schedule::{assign_task_to_block, overlapping_blocks};
use crate::stats::{self, Completion};

type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub is_recurring: bool,
    pub estimated_hours: Option<f64>,
    pub block_id: Option<Uuid>,
    pub start_hour: Option<f64>,
    pub end_hour: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub is_recurring: Option<bool>,
    pub estimated_hours: Option<f64>,
    pub start_hour: Option<f64>,
    pub end_hour: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlock {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub color: String,
}

fn require_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PlannerError::EmptyTitle);
    }
    Ok(title.to_string())
}

fn require_duration(hours: f64) -> Result<f64> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(PlannerError::NonPositiveDuration);
    }
    if hours > MAX_DURATION_HOURS {
        return Err(PlannerError::DurationTooLong(hours.to_string()));
    }
    Ok(hours)
}

// Start hours are 0.0..24.0; end hours may be 24.0 (midnight).
fn require_hour(hour: f64, allow_midnight: bool) -> Result<f64> {
    let in_range = if allow_midnight {
        (0.0..=24.0).contains(&hour)
    } else {
        (0.0..24.0).contains(&hour)
    };
    if !in_range {
        return Err(PlannerError::InvalidHour(hour.to_string()));
    }
    Ok(hour)
}

fn replace_task(tasks: &[Task], updated: &Task) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| if t.id == updated.id { updated.clone() } else { t.clone() })
        .collect()
}

fn find_task(db: &Db, id: Uuid) -> Result<&Task> {
    db.task(id).ok_or(PlannerError::TaskNotFound(id))
}

fn apply_window(task: &mut Task, window: TaskWindow) {
    task.start_hour = Some(window.start_hour);
    task.end_hour = window.end_hour;
    task.ends_next_day = window.ends_next_day;
    task.estimated_hours = Some(window.duration_hours);
}

// Window for a task entering `block`, chained after the block's other tasks.
fn chained_window(block: &ScheduleBlock, others: &[Task], estimate: Option<f64>) -> Result<TaskWindow> {
    let slot = assign_task_to_block(block, others)?;
    let duration = estimate.unwrap_or(slot.duration_hours);
    Ok(TaskWindow::new(slot.start_hour, duration))
}

/// Create a task in a block.
///
/// Without an explicit start the task is chained after the block's existing
/// tasks. An explicit end takes precedence over the estimate when both are
/// given.
pub fn add_task(db: &Db, input: NewTask, id: Uuid, now_millis: i64) -> Result<(Db, Task)> {
    let title = require_title(&input.title)?;
    let estimate = input.estimated_hours.map(require_duration).transpose()?;
    let block_id = input.block_id.ok_or(PlannerError::BlockRequired)?;
    let block = db.block(block_id).ok_or(PlannerError::BlockNotFound(block_id))?;

    let window = match input.start_hour {
        Some(start) => {
            let start = require_hour(start, false)?;
            let base = TaskWindow::new(start, estimate.unwrap_or(DEFAULT_SLOT_HOURS));
            match input.end_hour {
                Some(end) => base.with_end(require_hour(end, true)? % 24.0),
                None => base,
            }
        }
        None => chained_window(block, &db.tasks, estimate)?,
    };
    require_duration(window.duration_hours)?;

    let mut task = Task {
        id,
        title,
        description: input.description.filter(|d| !d.trim().is_empty()),
        priority: input.priority,
        completed: false,
        is_recurring: input.is_recurring,
        estimated_hours: None,
        start_hour: None,
        end_hour: None,
        ends_next_day: false,
        block_id: Some(block_id),
        order: None,
        created_at: now_millis,
        failure_reason: None,
    };
    task.order = Some(logic::next_order(&db.tasks, &task));
    apply_window(&mut task, window);

    log::debug!(
        "added task {} priority={:?} order={:?} block={}",
        task.id,
        task.priority,
        task.order,
        block.title
    );

    let mut next = db.clone();
    next.tasks.push(task.clone());
    Ok((next, task))
}

pub fn edit_task(db: &Db, id: Uuid, edit: TaskEdit) -> Result<(Db, Task)> {
    let mut task = find_task(db, id)?.clone();

    if let Some(title) = &edit.title {
        task.title = require_title(title)?;
    }
    if let Some(description) = edit.description {
        task.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if let Some(recurring) = edit.is_recurring {
        task.is_recurring = recurring;
    }
    if let Some(priority) = edit.priority {
        if priority != task.priority {
            task.priority = priority;
            task.order = Some(logic::next_order(&db.tasks, &task));
        }
    }

    let estimate = edit.estimated_hours.map(require_duration).transpose()?;
    let start = edit.start_hour.map(|h| require_hour(h, false)).transpose()?;
    let end = edit.end_hour.map(|h| require_hour(h, true)).transpose()?;

    match (start.or(task.start_hour), estimate, end) {
        (Some(current_start), _, _) if start.is_some() || estimate.is_some() || end.is_some() => {
            let duration = estimate.or(task.estimated_hours).unwrap_or(DEFAULT_SLOT_HOURS);
            let mut window = TaskWindow::new(current_start, duration);
            if let Some(end) = end {
                window = window.with_end(end % 24.0);
            }
            require_duration(window.duration_hours)?;
            apply_window(&mut task, window);
        }
        (None, _, Some(_)) => return Err(PlannerError::StartRequired),
        (None, Some(estimate), None) => task.estimated_hours = Some(estimate),
        _ => {}
    }

    log::debug!("edited task {}", task.id);
    let mut next = db.clone();
    next.tasks = replace_task(&db.tasks, &task);
    Ok((next, task))
}

// Move a task into another block (or out of all blocks) and re-chain it.
pub fn change_block(db: &Db, id: Uuid, block_id: Option<Uuid>) -> Result<(Db, Task)> {
    let mut task = find_task(db, id)?.clone();

    match block_id {
        Some(block_id) => {
            let block = db.block(block_id).ok_or(PlannerError::BlockNotFound(block_id))?;
            let others: Vec<Task> = db.tasks.iter().filter(|t| t.id != id).cloned().collect();
            let window = chained_window(block, &others, task.estimated_hours)?;
            task.block_id = Some(block_id);
            apply_window(&mut task, window);
        }
        None => task.block_id = None,
    }

    log::debug!("task {} moved to block {:?}", task.id, task.block_id);
    let mut next = db.clone();
    next.tasks = replace_task(&db.tasks, &task);
    Ok((next, task))
}

// Plain checkbox flip. Statistics are only recorded by `complete_task`.
pub fn toggle_task(db: &Db, id: Uuid) -> Result<(Db, Task)> {
    let mut task = find_task(db, id)?.clone();
    task.completed = !task.completed;
    let mut next = db.clone();
    next.tasks = replace_task(&db.tasks, &task);
    Ok((next, task))
}

pub fn delete_task(db: &Db, id: Uuid) -> Result<Db> {
    find_task(db, id)?;
    let mut next = db.clone();
    next.tasks.retain(|t| t.id != id);
    log::debug!("deleted task {id}");
    Ok(next)
}

pub fn move_task(db: &Db, id: Uuid, direction: Direction) -> Result<Db> {
    find_task(db, id)?;
    let mut next = db.clone();
    next.tasks = logic::move_task(&db.tasks, id, direction);
    Ok(next)
}

// Complete a task, checking it against the frog of the context active at `now_minutes`.
pub fn complete_task(db: &Db, id: Uuid, now_minutes: u32, today: NaiveDate) -> Result<(Db, bool)> {
    let context = logic::context_tasks(&db.tasks, &db.blocks, now_minutes);
    let Completion { tasks, stats, was_frog } =
        stats::complete_task(&db.tasks, id, &context, &db.daily_stats, today)?;

    if was_frog {
        log::info!("frog eaten on {today}");
    }
    let mut next = db.clone();
    next.tasks = tasks;
    next.daily_stats = stats;
    Ok((next, was_frog))
}

pub fn fail_task(db: &Db, id: Uuid, reason: &str) -> Result<Db> {
    let mut next = db.clone();
    next.tasks = stats::fail_task(&db.tasks, id, reason)?;
    log::debug!("task {id} marked failed");
    Ok(next)
}

pub fn add_block(db: &Db, input: NewBlock, id: Uuid) -> Result<(Db, ScheduleBlock)> {
    let title = require_title(&input.title)?;
    let start = parse_clock(&input.start_time)?;
    let end = parse_clock(&input.end_time)?;

    // Stored zero-padded so the list sorts by time.
    let block = ScheduleBlock {
        id,
        title,
        start_time: format!("{:02}:{:02}", start / 60, start % 60),
        end_time: format!("{:02}:{:02}", end / 60, end % 60),
        color: input.color,
    };

    for other in overlapping_blocks(&db.blocks, &block) {
        log::warn!(
            "block '{}' overlaps '{}' ({}-{}); the earlier one in the list wins",
            block.title,
            other.title,
            other.start_time,
            other.end_time
        );
    }

    log::debug!(
        "added block '{}' {}-{} ({} min)",
        block.title,
        block.start_time,
        block.end_time,
        block_duration_minutes(&block)?
    );

    let mut next = db.clone();
    next.blocks.push(block.clone());
    next.blocks.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    Ok((next, block))
}

// Tasks of a deleted block survive, unassigned.
pub fn delete_block(db: &Db, id: Uuid) -> Result<Db> {
    db.block(id).ok_or(PlannerError::BlockNotFound(id))?;
    let mut next = db.clone();
    next.blocks.retain(|b| b.id != id);
    for task in next.tasks.iter_mut().filter(|t| t.block_id == Some(id)) {
        task.block_id = None;
    }
    log::debug!("deleted block {id}");
    Ok(next)
}

// Apply the start-of-day sweep if the date changed. Returns whether it ran.
pub fn open_day(db: &Db, today: NaiveDate) -> (Db, bool) {
    let rollover = stats::daily_rollover(&db.tasks, db.last_visit, today);
    if rollover.applied {
        log::info!(
            "new day {today}: {} of {} tasks carried over",
            rollover.tasks.len(),
            db.tasks.len()
        );
    }
    let mut next = db.clone();
    next.tasks = rollover.tasks;
    next.last_visit = Some(rollover.last_visit);
    (next, rollover.applied)
}
