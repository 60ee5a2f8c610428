/*
Clock arithmetic.
"HH:MM" strings, decimal hours and minute-of-day, with midnight wraparound.
*/

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ClockError;
use crate::models::ScheduleBlock;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

// Slot used when a block has no room left.
pub const DEFAULT_SLOT_HOURS: f64 = 0.5;

// A window never spans more than one day.
pub const MAX_DURATION_HOURS: f64 = 24.0;

// Parse "HH:MM" into minutes since midnight (0..1439).
pub fn parse_clock(s: &str) -> Result<u32, ClockError> {
    let malformed = || ClockError::Malformed(s.to_string());
    let (h, m) = s.trim().split_once(':').ok_or_else(malformed)?;
    let h: u32 = h.parse().map_err(|_| malformed())?;
    let m: u32 = m.parse().map_err(|_| malformed())?;
    if h >= 24 || m >= 60 {
        return Err(malformed());
    }
    Ok(h * 60 + m)
}

// "09:30" -> 9.5
pub fn to_decimal_hours(s: &str) -> Result<f64, ClockError> {
    Ok(parse_clock(s)? as f64 / 60.0)
}

pub fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

// Decimal hour -> "HH:MM", for display and logs.
pub fn format_decimal_hours(hours: f64) -> String {
    let total = (hours * 60.0).round() as i64;
    let total = total.rem_euclid(MINUTES_PER_DAY as i64);
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndTime {
    pub end: f64,
    pub wraps_next_day: bool,
}

/// End of a window starting at `start` and lasting `duration` hours.
///
/// Returns `None` when no sensible end exists: a non-positive or non-finite
/// duration, or a window that would run past the following midnight.
pub fn compute_end(start: f64, duration: f64) -> Option<EndTime> {
    if !start.is_finite() || !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    let mut end = start + duration;
    let mut wraps_next_day = false;
    if end >= 24.0 {
        end -= 24.0;
        wraps_next_day = true;
    }
    if !(0.0..24.0).contains(&end) {
        return None;
    }
    Some(EndTime { end, wraps_next_day })
}

// Length of a block in minutes. Blocks ending before they start run past midnight.
pub fn block_duration_minutes(block: &ScheduleBlock) -> Result<u32, ClockError> {
    let start = parse_clock(&block.start_time)?;
    let end = parse_clock(&block.end_time)?;
    Ok((end + MINUTES_PER_DAY - start) % MINUTES_PER_DAY)
}

/// A task's scheduled window as the user edits it.
///
/// The three fields are linked: changing start or duration recomputes the end,
/// changing the end recomputes the duration. The start is only ever set
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWindow {
    pub start_hour: f64,
    pub end_hour: Option<f64>,
    pub duration_hours: f64,
    pub ends_next_day: bool,
}

impl TaskWindow {
    pub fn new(start_hour: f64, duration_hours: f64) -> Self {
        let mut window = TaskWindow {
            start_hour,
            end_hour: None,
            duration_hours,
            ends_next_day: false,
        };
        window.recompute_end();
        window
    }

    pub fn with_start(mut self, start_hour: f64) -> Self {
        self.start_hour = start_hour;
        self.recompute_end();
        self
    }

    pub fn with_duration(mut self, duration_hours: f64) -> Self {
        self.duration_hours = duration_hours;
        self.recompute_end();
        self
    }

    // Editing the end never moves the start.
    pub fn with_end(mut self, end_hour: f64) -> Self {
        let mut diff = end_hour - self.start_hour;
        if diff < 0.0 {
            diff += 24.0;
        }
        self.duration_hours = (diff * 10.0).round() / 10.0;
        self.end_hour = Some(end_hour);
        self.ends_next_day = end_hour < self.start_hour;
        self
    }

    // Leaves the end unset when it cannot be computed.
    fn recompute_end(&mut self) {
        match compute_end(self.start_hour, self.duration_hours) {
            Some(end) => {
                self.end_hour = Some(end.end);
                self.ends_next_day = end.wraps_next_day;
            }
            None => {
                self.end_hour = None;
                self.ends_next_day = false;
            }
        }
    }
}
