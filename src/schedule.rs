// Placing new tasks inside time blocks.
//
// New tasks queue up behind the latest-ending task already scheduled in the
// block ("chaining"). All arithmetic is in decimal hours.

use serde::{Deserialize, Serialize};

use crate::clock::{parse_clock, to_decimal_hours, DEFAULT_SLOT_HOURS, MINUTES_PER_DAY};
use crate::error::ClockError;
use crate::models::{ScheduleBlock, Task};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotProposal {
    pub start_hour: f64,
    pub end_hour: f64,
    pub duration_hours: f64,
}

/// Propose a slot for a new task in `block`.
///
/// `existing` may contain any tasks; only incomplete ones assigned to this
/// block are considered. When the block is already full the proposal is a
/// default half-hour slot starting where the block's last task ends.
///
/// Overnight blocks (end before start) are not unwrapped here, so they always
/// take the fallback path. Ends are compared as raw hours of day, so a task
/// that wraps past midnight (end 0.5 say) never counts as the latest; the
/// proposal can then overlap it.
pub fn assign_task_to_block(
    block: &ScheduleBlock,
    existing: &[Task],
) -> Result<SlotProposal, ClockError> {
    let mut start = to_decimal_hours(&block.start_time)?;

    let latest_end = existing
        .iter()
        .filter(|t| t.block_id == Some(block.id) && !t.completed)
        .filter_map(|t| t.end_hour)
        .fold(None, |acc: Option<f64>, end| Some(acc.map_or(end, |a| a.max(end))));
    if let Some(latest_end) = latest_end {
        if latest_end > start {
            start = latest_end;
        }
    }

    let mut end = to_decimal_hours(&block.end_time)?;
    if start >= end {
        end = start + DEFAULT_SLOT_HOURS;
    }

    Ok(SlotProposal {
        start_hour: start,
        end_hour: end,
        duration_hours: end - start,
    })
}

// Minute ranges covered by a block; an overnight block yields two.
fn minute_ranges(block: &ScheduleBlock) -> Result<Vec<(u32, u32)>, ClockError> {
    let start = parse_clock(&block.start_time)?;
    let end = parse_clock(&block.end_time)?;
    Ok(if start < end {
        vec![(start, end)]
    } else if start > end {
        vec![(start, MINUTES_PER_DAY), (0, end)]
    } else {
        Vec::new()
    })
}

pub fn blocks_overlap(a: &ScheduleBlock, b: &ScheduleBlock) -> Result<bool, ClockError> {
    let a_ranges = minute_ranges(a)?;
    let b_ranges = minute_ranges(b)?;
    Ok(a_ranges
        .iter()
        .any(|(a0, a1)| b_ranges.iter().any(|(b0, b1)| a0 < b1 && b0 < a1)))
}

// Existing blocks whose windows intersect `block`. Used for warnings only.
pub fn overlapping_blocks<'a>(
    blocks: &'a [ScheduleBlock],
    block: &ScheduleBlock,
) -> Vec<&'a ScheduleBlock> {
    blocks
        .iter()
        .filter(|other| other.id != block.id)
        .filter(|other| blocks_overlap(other, block).unwrap_or(false))
        .collect()
}
