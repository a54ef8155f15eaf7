//! Pure view-model helpers for the dashboard. Everything here is a
//! function over loaded data; no store access, no terminal access.

use chrono::NaiveDate;

use crate::task::{self, Quadrant, Task};

/// Indices of tasks matching the live filter, in store order
pub fn filter_task_indices(tasks: &[Task], filter: &str) -> Vec<usize> {
    task::filter_task_indices(tasks, filter)
}

/// Re-select a task by project id after a reload, falling back to the
/// first filtered row
pub fn select_by_id(
    tasks: &[Task],
    filtered: &[usize],
    previous_id: Option<&str>,
) -> Option<usize> {
    if let Some(id) = previous_id {
        if let Some(&index) = filtered
            .iter()
            .find(|&&index| tasks[index].project_id == id)
        {
            return Some(index);
        }
    }
    filtered.first().copied()
}

/// Filtered task indices bucketed by importance/urgency quadrant
pub fn quadrant_buckets(tasks: &[Task], filtered: &[usize]) -> [(Quadrant, Vec<usize>); 4] {
    let mut buckets = Quadrant::ALL.map(|quadrant| (quadrant, Vec::new()));
    for &index in filtered {
        let quadrant = task::quadrant(&tasks[index]);
        for (candidate, members) in buckets.iter_mut() {
            if *candidate == quadrant {
                members.push(index);
                break;
            }
        }
    }
    buckets
}

/// Earliest start and latest due across the filtered rows
pub fn timeline_bounds(tasks: &[Task], filtered: &[usize]) -> Option<(NaiveDate, NaiveDate)> {
    let start = filtered.iter().map(|&i| tasks[i].start_date).min()?;
    let due = filtered.iter().map(|&i| tasks[i].due_date).max()?;
    Some((start, due.max(start)))
}

/// Offset and length (in cells) of a task's bar on a timeline of `width`
/// cells spanning `bounds`. Degenerate spans still get a 1-cell bar.
pub fn timeline_bar(
    task: &Task,
    bounds: (NaiveDate, NaiveDate),
    width: u16,
) -> (u16, u16) {
    let (lo, hi) = bounds;
    let span = (hi - lo).num_days().max(1) as f64;
    let width = f64::from(width.max(1));

    let start = task.start_date.clamp(lo, hi);
    let due = task.due_date.clamp(lo, hi).max(start);

    let offset = ((start - lo).num_days() as f64 / span * width).floor() as u16;
    let len = (((due - start).num_days().max(0) + 1) as f64 / span * width).ceil() as u16;
    let len = len.max(1);
    let offset = offset.min(width as u16 - 1);
    (offset, len.min(width as u16 - offset))
}
