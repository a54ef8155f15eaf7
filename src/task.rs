//! Task model for tempo.
//!
//! A task is one tracked project: identity metadata, an importance/urgency
//! rating pair, a status, a pair of calendar dates, free-text notes, and an
//! ordered weighted sub-task decomposition. The aggregate `progress` field
//! is derived from the sub-tasks but is also directly mutable (direct edits,
//! journal deltas), so it can drift until the next sub-task edit recomputes
//! it. The drift is a documented limitation, not repaired anywhere.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Wire format for all calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Task status, free-standing: never derived from progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
    Paused,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not-started",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
            TaskStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "not-started" | "not_started" => Ok(TaskStatus::NotStarted),
            "in-progress" | "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            "paused" => Ok(TaskStatus::Paused),
            _ => Err(Error::InvalidArgument(format!(
                "invalid status '{s}': must be not-started, in-progress, done, or paused"
            ))),
        }
    }
}

/// One weighted, completable component of a task.
///
/// The id is assigned once, at task creation, as `{project_id}-{NN}`.
/// Sub-tasks appended later keep an empty id; addressing falls back to the
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Percent weight of the parent's total progress contribution
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub done: bool,
}

/// One tracked project row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub name: String,
    pub category: String,
    /// 1..=10
    pub importance: u8,
    /// 1..=10
    pub urgency: u8,
    /// 0..=100, derived from sub-tasks but directly mutable
    pub progress: u8,
    pub status: TaskStatus,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: String,
    pub subtasks: Vec<Subtask>,
    /// Per-task notes pad, distinct from the `notes` column
    pub notebook: String,
    /// `{PREFIX}-{NN}`, unique per prefix by "highest seen + 1" only
    pub project_id: String,
}

impl Task {
    /// Recompute the aggregate progress from the sub-task decomposition
    pub fn recompute_progress(&mut self) {
        self.progress = recompute_progress(&self.subtasks);
    }

    /// Total advisory weight of the decomposition
    pub fn total_weight(&self) -> u32 {
        self.subtasks.iter().map(|sub| sub.weight).sum()
    }

    /// Find a sub-task by id, falling back to a name match
    pub fn find_subtask(&self, key: &str) -> Option<usize> {
        self.subtasks
            .iter()
            .position(|sub| !sub.id.is_empty() && sub.id == key)
            .or_else(|| self.subtasks.iter().position(|sub| sub.name == key))
    }
}

/// Progress from a weighted decomposition: `floor(100 * done / total)`
/// clamped to 100, exactly 0 when the total weight is 0.
pub fn recompute_progress(subtasks: &[Subtask]) -> u8 {
    let total: u64 = subtasks.iter().map(|sub| u64::from(sub.weight)).sum();
    if total == 0 {
        return 0;
    }
    let done: u64 = subtasks
        .iter()
        .filter(|sub| sub.done)
        .map(|sub| u64::from(sub.weight))
        .sum();
    (100 * done / total).min(100) as u8
}

/// Next project id for a prefix: parse the numeric suffix of every existing
/// `{prefix}-{NN}` id, take the max, and return `{prefix}-{max+1:02}`.
/// Returns `{prefix}-01` when no id yields a suffix.
///
/// Uniqueness is only "highest seen + 1": two creations racing between
/// preview and save can collide. Single-user tool; not guarded.
pub fn generate_project_id(tasks: &[Task], prefix: &str) -> String {
    let mut max_seen: Option<u32> = None;
    for task in tasks {
        let Some(rest) = task.project_id.strip_prefix(prefix) else {
            continue;
        };
        let Some(suffix) = rest.strip_prefix('-') else {
            continue;
        };
        if let Ok(value) = suffix.parse::<u32>() {
            max_seen = Some(max_seen.map_or(value, |seen| seen.max(value)));
        }
    }
    format!("{prefix}-{:02}", max_seen.map_or(1, |seen| seen + 1))
}

/// Assign creation-time sub-task ids: `{project_id}-{NN}`, 1-based
pub fn assign_subtask_ids(project_id: &str, subtasks: &mut [Subtask]) {
    for (index, sub) in subtasks.iter_mut().enumerate() {
        sub.id = format!("{project_id}-{:02}", index + 1);
    }
}

/// Serialize a decomposition to its stored JSON form
pub fn subtasks_to_json(subtasks: &[Subtask]) -> String {
    serde_json::to_string(subtasks).unwrap_or_else(|_| "[]".to_string())
}

/// Parse a stored decomposition; parse failure yields an empty list
pub fn subtasks_from_json(raw: &str) -> Vec<Subtask> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_default()
}

/// Case-insensitive substring match across name, project id, category, and
/// the serialized sub-task text. Pure; never mutates the store.
pub fn matches_query(task: &Task, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    task.name.to_lowercase().contains(&needle)
        || task.project_id.to_lowercase().contains(&needle)
        || task.category.to_lowercase().contains(&needle)
        || subtasks_to_json(&task.subtasks)
            .to_lowercase()
            .contains(&needle)
}

/// Indices of tasks matching a search query, in store order
pub fn filter_task_indices(tasks: &[Task], query: &str) -> Vec<usize> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| matches_query(task, query))
        .map(|(index, _)| index)
        .collect()
}

/// Find a task by project id, falling back to an exact name match
pub fn find_task(tasks: &[Task], key: &str) -> Option<usize> {
    tasks
        .iter()
        .position(|task| task.project_id == key)
        .or_else(|| tasks.iter().position(|task| task.name == key))
}

/// Importance/urgency quadrant, split above the scale midpoint. Display
/// concern only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    UrgentImportant,
    Important,
    Urgent,
    Neither,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UrgentImportant,
        Quadrant::Important,
        Quadrant::Urgent,
        Quadrant::Neither,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::UrgentImportant => "urgent + important",
            Quadrant::Important => "important",
            Quadrant::Urgent => "urgent",
            Quadrant::Neither => "neither",
        }
    }
}

pub fn quadrant(task: &Task) -> Quadrant {
    match (task.importance > 5, task.urgency > 5) {
        (true, true) => Quadrant::UrgentImportant,
        (true, false) => Quadrant::Important,
        (false, true) => Quadrant::Urgent,
        (false, false) => Quadrant::Neither,
    }
}

/// Dashboard rollup over the whole table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total: usize,
    pub in_progress: usize,
    /// importance >= 8
    pub high_importance: usize,
    /// mean progress, rounded to the nearest percent; 0 for an empty table
    pub mean_progress: u8,
}

pub fn stats(tasks: &[Task]) -> StatsSummary {
    let total = tasks.len();
    let in_progress = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::InProgress)
        .count();
    let high_importance = tasks.iter().filter(|task| task.importance >= 8).count();
    let mean_progress = if total == 0 {
        0
    } else {
        let sum: u64 = tasks.iter().map(|task| u64::from(task.progress)).sum();
        ((sum as f64 / total as f64).round()) as u8
    };
    StatsSummary {
        total,
        in_progress,
        high_importance,
        mean_progress,
    }
}
