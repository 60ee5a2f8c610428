// Completion, failure and day rollover, plus the per-day activity record.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PlannerError;
use crate::logic::sort_tasks;
use crate::models::{DailyStat, Task};

/// Whether `task_id` is the frog of `context`.
///
/// `context` must be the task list of the current scheduling context as it
/// was *before* the task is marked completed.
pub fn is_frog(task_id: Uuid, context: &[Task]) -> bool {
    let active: Vec<Task> = context.iter().filter(|t| !t.completed).cloned().collect();
    sort_tasks(&active).first().is_some_and(|t| t.id == task_id)
}

// Count one completion for `today`. `frog_eaten` never goes back to false.
pub fn record_completion(stats: &[DailyStat], today: NaiveDate, was_frog: bool) -> Vec<DailyStat> {
    let mut next = stats.to_vec();
    match next.iter_mut().find(|s| s.date == today) {
        Some(stat) => {
            stat.tasks_completed += 1;
            stat.frog_eaten = stat.frog_eaten || was_frog;
        }
        None => next.push(DailyStat {
            date: today,
            tasks_completed: 1,
            frog_eaten: was_frog,
        }),
    }
    next
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub tasks: Vec<Task>,
    pub stats: Vec<DailyStat>,
    pub was_frog: bool,
}

pub fn complete_task(
    tasks: &[Task],
    task_id: Uuid,
    context: &[Task],
    stats: &[DailyStat],
    today: NaiveDate,
) -> Result<Completion, PlannerError> {
    let task = tasks
        .iter()
        .find(|t| t.id == task_id)
        .ok_or(PlannerError::TaskNotFound(task_id))?;
    if task.completed {
        return Err(PlannerError::AlreadyCompleted(task_id));
    }

    let was_frog = is_frog(task_id, context);
    let tasks = tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.id == task_id {
                t.completed = true;
            }
            t
        })
        .collect();

    Ok(Completion {
        tasks,
        stats: record_completion(stats, today, was_frog),
        was_frog,
    })
}

// Record why a timed attempt was abandoned. Completion state is untouched.
pub fn fail_task(tasks: &[Task], task_id: Uuid, reason: &str) -> Result<Vec<Task>, PlannerError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(PlannerError::EmptyReason);
    }
    if !tasks.iter().any(|t| t.id == task_id) {
        return Err(PlannerError::TaskNotFound(task_id));
    }
    Ok(tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.id == task_id {
                t.failure_reason = Some(reason.to_string());
            }
            t
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct Rollover {
    pub tasks: Vec<Task>,
    pub last_visit: NaiveDate,
    pub applied: bool,
}

/// Start-of-day sweep.
///
/// Recurring tasks are reopened, completed one-off tasks are dropped, the rest
/// are kept as they are. Runs only when the date changed since the last visit.
pub fn daily_rollover(tasks: &[Task], last_visit: Option<NaiveDate>, today: NaiveDate) -> Rollover {
    if last_visit == Some(today) {
        return Rollover {
            tasks: tasks.to_vec(),
            last_visit: today,
            applied: false,
        };
    }

    let tasks = tasks
        .iter()
        .filter(|t| t.is_recurring || !t.completed)
        .map(|t| {
            let mut t = t.clone();
            if t.is_recurring {
                t.completed = false;
            }
            t
        })
        .collect();

    Rollover {
        tasks,
        last_visit: today,
        applied: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    FrogEaten,
    TasksDone,
    Missed,
    Pending,
    Upcoming,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub tasks_completed: u32,
}

fn day_status(stat: Option<&DailyStat>, date: NaiveDate, today: NaiveDate) -> DayStatus {
    match stat {
        Some(s) if s.frog_eaten => DayStatus::FrogEaten,
        Some(s) if s.tasks_completed > 0 => DayStatus::TasksDone,
        _ if date < today => DayStatus::Missed,
        _ if date == today => DayStatus::Pending,
        _ => DayStatus::Upcoming,
    }
}

// One entry per calendar day of `year`.
pub fn year_heatmap(stats: &[DailyStat], year: i32, today: NaiveDate) -> Vec<HeatmapDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.year() == year)
        .map(|date| {
            let stat = stats.iter().find(|s| s.date == date);
            HeatmapDay {
                date,
                status: day_status(stat, date, today),
                tasks_completed: stat.map_or(0, |s| s.tasks_completed),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::tests::task;
    use crate::models::Priority;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn completing_the_frog_is_sticky_for_the_day() {
        let today = date(2025, 3, 14);
        let report = task("Write report", Priority::A, Some(1), 0);
        let email = task("Email boss", Priority::A, Some(2), 0);
        let tasks = vec![report.clone(), email.clone()];

        let first = complete_task(&tasks, report.id, &tasks, &[], today).unwrap();
        assert!(first.was_frog);
        assert_eq!(
            first.stats,
            vec![DailyStat { date: today, tasks_completed: 1, frog_eaten: true }]
        );

        let second =
            complete_task(&first.tasks, email.id, &first.tasks, &first.stats, today).unwrap();
        assert_eq!(second.stats.len(), 1);
        assert_eq!(second.stats[0].tasks_completed, 2);
        assert!(second.stats[0].frog_eaten);
    }

    #[test]
    fn completing_a_non_frog_does_not_eat_it() {
        let today = date(2025, 3, 14);
        let report = task("Write report", Priority::A, Some(1), 0);
        let email = task("Email boss", Priority::A, Some(2), 0);
        let tasks = vec![report, email.clone()];

        let done = complete_task(&tasks, email.id, &tasks, &[], today).unwrap();
        assert!(!done.was_frog);
        assert!(!done.stats[0].frog_eaten);
        assert!(done.tasks.iter().find(|t| t.id == email.id).unwrap().completed);
    }

    #[test]
    fn frog_flag_resets_on_a_new_day() {
        let stats = record_completion(&[], date(2025, 3, 14), true);
        let stats = record_completion(&stats, date(2025, 3, 15), false);
        assert_eq!(stats.len(), 2);
        assert!(stats[0].frog_eaten);
        assert!(!stats[1].frog_eaten);
    }

    #[test]
    fn completing_twice_is_rejected() {
        let today = date(2025, 3, 14);
        let mut t = task("done", Priority::B, Some(1), 0);
        t.completed = true;
        let tasks = vec![t.clone()];
        assert_eq!(
            complete_task(&tasks, t.id, &tasks, &[], today).unwrap_err(),
            PlannerError::AlreadyCompleted(t.id)
        );
        let missing = Uuid::new_v4();
        assert_eq!(
            complete_task(&tasks, missing, &tasks, &[], today).unwrap_err(),
            PlannerError::TaskNotFound(missing)
        );
    }

    #[test]
    fn failure_needs_a_reason() {
        let t = task("gym", Priority::C, Some(1), 0);
        let tasks = vec![t.clone()];

        assert_eq!(fail_task(&tasks, t.id, "   ").unwrap_err(), PlannerError::EmptyReason);

        let failed = fail_task(&tasks, t.id, " too tired ").unwrap();
        assert_eq!(failed[0].failure_reason.as_deref(), Some("too tired"));
        assert!(!failed[0].completed);
    }

    #[test]
    fn rollover_reopens_recurring_and_drops_finished() {
        let mut recurring = task("stretch", Priority::B, Some(1), 0);
        recurring.is_recurring = true;
        recurring.completed = true;
        let mut one_off = task("call bank", Priority::A, Some(1), 0);
        one_off.completed = true;
        let pending = task("taxes", Priority::A, Some(2), 0);

        let tasks = vec![recurring.clone(), one_off.clone(), pending.clone()];
        let result = daily_rollover(&tasks, Some(date(2025, 3, 14)), date(2025, 3, 15));

        assert!(result.applied);
        assert_eq!(result.last_visit, date(2025, 3, 15));
        assert_eq!(result.tasks.len(), 2);
        let reopened = result.tasks.iter().find(|t| t.id == recurring.id).unwrap();
        assert!(!reopened.completed);
        assert!(result.tasks.iter().all(|t| t.id != one_off.id));
        assert!(result.tasks.iter().any(|t| t.id == pending.id));
    }

    #[test]
    fn rollover_is_skipped_on_same_day() {
        let mut one_off = task("call bank", Priority::A, Some(1), 0);
        one_off.completed = true;
        let tasks = vec![one_off];
        let today = date(2025, 3, 15);
        let result = daily_rollover(&tasks, Some(today), today);
        assert!(!result.applied);
        assert_eq!(result.tasks, tasks);
    }

    #[test]
    fn heatmap_covers_the_whole_year() {
        let today = date(2024, 6, 15);
        let stats = vec![
            DailyStat { date: date(2024, 6, 10), tasks_completed: 3, frog_eaten: true },
            DailyStat { date: date(2024, 6, 11), tasks_completed: 1, frog_eaten: false },
        ];
        let days = year_heatmap(&stats, 2024, today);
        assert_eq!(days.len(), 366);

        let status_of = |d: NaiveDate| days.iter().find(|h| h.date == d).unwrap().status;
        assert_eq!(status_of(date(2024, 6, 10)), DayStatus::FrogEaten);
        assert_eq!(status_of(date(2024, 6, 11)), DayStatus::TasksDone);
        assert_eq!(status_of(date(2024, 6, 12)), DayStatus::Missed);
        assert_eq!(status_of(today), DayStatus::Pending);
        assert_eq!(status_of(date(2024, 12, 31)), DayStatus::Upcoming);
    }
}
