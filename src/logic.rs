/*
Prioritization and context logic.
Module was independently written from HTTP / Axum for testing.
Every function takes "now" and the collections explicitly and returns new values.
*/

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{parse_clock, MINUTES_PER_DAY};
use crate::models::{ScheduleBlock, Task};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

// Secondary sort key inside a priority class.
//
// Tasks written before `order` existed fall back to their creation time.
pub fn sequence_key(task: &Task) -> i64 {
    match task.order {
        Some(order) => order,
        None => task.created_at,
    }
}

// Sorting rules:
// 1) Priority A before B ... before E
// 2) If tied, lower sequence key first
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| sequence_key(a).cmp(&sequence_key(b)))
}

// Stable: tasks that compare equal keep their input order.
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(compare_tasks);
    sorted
}

// First incomplete task of an already filtered context.
pub fn frog(tasks: &[Task]) -> Option<&Task> {
    tasks
        .iter()
        .filter(|t| !t.completed)
        .min_by(|a, b| compare_tasks(a, b))
}

// Next free sequence number for a priority class.
pub fn next_order(tasks: &[Task], task: &Task) -> i64 {
    tasks
        .iter()
        .filter(|t| t.priority == task.priority && t.id != task.id)
        .map(|t| t.order.unwrap_or(0))
        .fold(0, i64::max)
        + 1
}

/// Move a task one step within its priority class.
///
/// Only incomplete tasks of the same priority take part. The task swaps its
/// `order` with the neighbour in `direction`; nothing else is renumbered, so
/// sequence numbers stay unique. At either end of the class this is a no-op.
pub fn move_task(tasks: &[Task], task_id: Uuid, direction: Direction) -> Vec<Task> {
    let Some(target) = tasks.iter().find(|t| t.id == task_id) else {
        return tasks.to_vec();
    };

    let mut class: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.priority == target.priority && !t.completed)
        .collect();
    class.sort_by_key(|t| t.order.unwrap_or(0));

    let Some(pos) = class.iter().position(|t| t.id == task_id) else {
        return tasks.to_vec();
    };
    let neighbour = match direction {
        Direction::Up => pos.checked_sub(1),
        Direction::Down => Some(pos + 1).filter(|i| *i < class.len()),
    };
    let Some(neighbour) = neighbour.map(|i| class[i]) else {
        return tasks.to_vec();
    };

    let (a_id, a_order) = (target.id, target.order.unwrap_or(0));
    let (b_id, b_order) = (neighbour.id, neighbour.order.unwrap_or(0));

    tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.id == a_id {
                t.order = Some(b_order);
            } else if t.id == b_id {
                t.order = Some(a_order);
            }
            t
        })
        .collect()
}

// Whether `now` (minute of day) falls in the block's [start, end).
// An overnight block covers [start, 1440) and [0, end).
pub fn block_contains(block: &ScheduleBlock, now_minutes: u32) -> bool {
    let (Ok(start), Ok(end)) = (parse_clock(&block.start_time), parse_clock(&block.end_time))
    else {
        return false;
    };
    let now = now_minutes % MINUTES_PER_DAY;
    if start <= end {
        start <= now && now < end
    } else {
        now >= start || now < end
    }
}

// Overlapping blocks are not rejected; the first match in list order wins.
pub fn find_active_block(blocks: &[ScheduleBlock], now_minutes: u32) -> Option<&ScheduleBlock> {
    blocks.iter().find(|b| block_contains(b, now_minutes))
}

/// Tasks relevant to the current moment.
///
/// With an active block only its own tasks count. Without one, tasks that are
/// unassigned or point at a block that no longer exists count.
pub fn filter_to_context(
    tasks: &[Task],
    blocks: &[ScheduleBlock],
    active_block: Option<&ScheduleBlock>,
) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| match active_block {
            Some(active) => t.block_id == Some(active.id),
            None => match t.block_id {
                None => true,
                Some(id) => !blocks.iter().any(|b| b.id == id),
            },
        })
        .cloned()
        .collect()
}

// Incomplete context tasks in priority order. The head is the frog.
pub fn context_tasks(tasks: &[Task], blocks: &[ScheduleBlock], now_minutes: u32) -> Vec<Task> {
    let active: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
    let active_block = find_active_block(blocks, now_minutes);
    sort_tasks(&filter_to_context(&active, blocks, active_block))
}

// What the dashboard shows for a given minute of the day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlan {
    pub active_block: Option<ScheduleBlock>,
    pub frog: Option<Task>,
    pub other_tasks: Vec<Task>,
    pub completed_tasks: Vec<Task>,
    pub context_count: usize,
    pub active_count: usize,
}

pub fn build_now_plan(tasks: &[Task], blocks: &[ScheduleBlock], now_minutes: u32) -> NowPlan {
    let active_block = find_active_block(blocks, now_minutes).cloned();
    let mut context = context_tasks(tasks, blocks, now_minutes);
    let context_count = context.len();
    let frog = if context.is_empty() {
        None
    } else {
        Some(context.remove(0))
    };

    NowPlan {
        active_block,
        frog,
        other_tasks: context,
        completed_tasks: tasks.iter().filter(|t| t.completed).cloned().collect(),
        context_count,
        active_count: tasks.iter().filter(|t| !t.completed).count(),
    }
}
