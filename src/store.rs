//! Flat-file storage for tempo.
//!
//! Two CSV files live in the data directory:
//! - `tasks.csv` - the full task table, rewritten whole on every save
//! - `progress_log.csv` - the append-only progress journal (see `journal`)
//!
//! Reads fail soft: an absent or unparseable file is an empty store, and
//! malformed dates are repaired to defaults at read time (today /
//! today + 7). The repair is not persisted until the next explicit save.
//!
//! Writes are atomic (temp file + rename) but unlocked: there is no
//! cross-process coordination, so two sessions against the same files lose
//! updates - last overwrite wins. Single-user tool.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::task::{
    subtasks_from_json, subtasks_to_json, Task, TaskStatus, DATE_FORMAT,
};

/// Column order of the task table; the external contract
pub const TASK_HEADERS: [&str; 12] = [
    "name",
    "category",
    "importance",
    "urgency",
    "progress",
    "status",
    "start_date",
    "due_date",
    "notes",
    "subtasks",
    "notebook",
    "project_id",
];

/// Resolve the data directory: an explicit flag (or `TEMPO_DATA`) wins,
/// then a current directory that already holds a task table, then the
/// platform data dir.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let cwd = std::env::current_dir()?;
    if cwd.join(crate::config::CONFIG_FILE).exists()
        || cwd.join("tasks.csv").exists()
    {
        return Ok(cwd);
    }

    let dirs = directories::ProjectDirs::from("", "", "tempo").ok_or_else(|| {
        Error::OperationFailed("could not determine a data directory".to_string())
    })?;
    let dir = dirs.data_dir().to_path_buf();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write data atomically using temp file + rename
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Raw CSV row; every field tolerates absence so partial tables still read
#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskRow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    importance: String,
    #[serde(default)]
    urgency: String,
    #[serde(default)]
    progress: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    due_date: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    subtasks: String,
    #[serde(default)]
    notebook: String,
    #[serde(default)]
    project_id: String,
}

impl TaskRow {
    fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            category: task.category.clone(),
            importance: task.importance.to_string(),
            urgency: task.urgency.to_string(),
            progress: task.progress.to_string(),
            status: task.status.as_str().to_string(),
            start_date: task.start_date.format(DATE_FORMAT).to_string(),
            due_date: task.due_date.format(DATE_FORMAT).to_string(),
            notes: task.notes.clone(),
            subtasks: subtasks_to_json(&task.subtasks),
            notebook: task.notebook.clone(),
            project_id: task.project_id.clone(),
        }
    }

    /// Normalize a row into a typed task, repairing what cannot parse
    fn into_task(self, today: NaiveDate) -> Task {
        Task {
            name: self.name,
            category: self.category,
            importance: self.importance.trim().parse().unwrap_or(5),
            urgency: self.urgency.trim().parse().unwrap_or(5),
            progress: self.progress.trim().parse::<u8>().unwrap_or(0).min(100),
            status: self.status.parse::<TaskStatus>().unwrap_or_default(),
            start_date: parse_date_or(&self.start_date, today),
            due_date: parse_date_or(&self.due_date, today + Duration::days(7)),
            notes: self.notes,
            subtasks: subtasks_from_json(&self.subtasks),
            notebook: self.notebook,
            project_id: self.project_id,
        }
    }
}

fn parse_date_or(raw: &str, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).unwrap_or(fallback)
}

/// The task table
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn open(dir: &Path, config: &Config) -> Self {
        Self {
            path: dir.join(&config.data.tasks_file),
        }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ordered task table. Absent or unparseable files yield an
    /// empty table; malformed dates are repaired against today's date.
    pub fn load(&self) -> Vec<Task> {
        self.load_as_of(Local::now().date_naive())
    }

    /// Load with an explicit "today" for the date repair
    pub fn load_as_of(&self, today: NaiveDate) -> Vec<Task> {
        let reader = match csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "task table absent or unreadable");
                return Vec::new();
            }
        };

        let mut tasks = Vec::new();
        for record in reader.into_deserialize::<TaskRow>() {
            match record {
                Ok(row) => tasks.push(row.into_task(today)),
                Err(err) => {
                    tracing::debug!(path = %self.path.display(), %err, "task table unparseable");
                    return Vec::new();
                }
            }
        }
        tasks
    }

    /// Overwrite the entire table. No partial writes, no merge - last
    /// writer wins. All twelve columns are always written.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(TASK_HEADERS)?;
        for task in tasks {
            writer.serialize(TaskRow::from_task(task))?;
        }
        let data = writer
            .into_inner()
            .map_err(|err| Error::OperationFailed(format!("task table flush: {err}")))?;
        write_atomic(&self.path, &data)
    }
}

/// Drop every task matching the predicate, preserving order of the rest
pub fn delete_where<F>(tasks: Vec<Task>, predicate: F) -> Vec<Task>
where
    F: Fn(&Task) -> bool,
{
    tasks.into_iter().filter(|task| !predicate(task)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Subtask;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn sample_task() -> Task {
        Task {
            name: "Draft Paper".to_string(),
            category: "study".to_string(),
            importance: 8,
            urgency: 6,
            progress: 40,
            status: TaskStatus::InProgress,
            start_date: date("2026-08-01"),
            due_date: date("2026-08-15"),
            notes: "submission window opens soon".to_string(),
            subtasks: vec![
                Subtask {
                    id: "STUDY-01-01".to_string(),
                    name: "outline".to_string(),
                    weight: 40,
                    done: true,
                },
                Subtask {
                    id: "STUDY-01-02".to_string(),
                    name: "full draft".to_string(),
                    weight: 60,
                    done: false,
                },
            ],
            notebook: "ideas: tighten the intro".to_string(),
            project_id: "STUDY-01".to_string(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> TaskStore {
        TaskStore::at(dir.path().join("tasks.csv"))
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn unparseable_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), b"\xff\xfe not a table").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_load_round_trip_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let tasks = vec![sample_task()];
        store.save(&tasks).unwrap();
        let loaded = store.load_as_of(date("2026-08-06"));
        assert_eq!(loaded, tasks);

        // and saving what was loaded leaves the bytes unchanged
        let before = fs::read(store.path()).unwrap();
        store.save(&loaded).unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn all_columns_written_even_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut task = sample_task();
        task.notes.clear();
        task.notebook.clear();
        store.save(&[task]).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        let header = raw.lines().next().unwrap();
        assert_eq!(header, TASK_HEADERS.join(","));
    }

    #[test]
    fn malformed_dates_repair_to_today_and_week_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let raw = format!(
            "{}\nDraft,study,8,6,0,not-started,garbage,,,,\"\",STUDY-01\n",
            TASK_HEADERS.join(",")
        );
        fs::write(store.path(), raw).unwrap();
        let today = date("2026-08-06");
        let loaded = store.load_as_of(today);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].start_date, today);
        assert_eq!(loaded[0].due_date, date("2026-08-13"));
    }

    #[test]
    fn corrupt_subtask_cell_becomes_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let raw = format!(
            "{}\nDraft,study,8,6,0,not-started,2026-08-01,2026-08-15,,not-json,,STUDY-01\n",
            TASK_HEADERS.join(",")
        );
        fs::write(store.path(), raw).unwrap();
        let loaded = store.load_as_of(date("2026-08-06"));
        assert!(loaded[0].subtasks.is_empty());
    }

    #[test]
    fn unknown_status_defaults_to_not_started() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let raw = format!(
            "{}\nDraft,study,8,6,0,shipped,2026-08-01,2026-08-15,,,,STUDY-01\n",
            TASK_HEADERS.join(",")
        );
        fs::write(store.path(), raw).unwrap();
        let loaded = store.load_as_of(date("2026-08-06"));
        assert_eq!(loaded[0].status, TaskStatus::NotStarted);
    }

    #[test]
    fn delete_where_retains_non_matching_in_order() {
        let mut a = sample_task();
        a.name = "a".to_string();
        let mut b = sample_task();
        b.name = "b".to_string();
        let mut c = sample_task();
        c.name = "a".to_string();
        c.project_id = "STUDY-02".to_string();

        let kept = delete_where(vec![a, b.clone(), c], |task| task.name == "a");
        assert_eq!(kept, vec![b]);
    }

    #[test]
    fn save_is_a_full_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&[sample_task()]).unwrap();
        store.save(&[]).unwrap();
        assert!(store.load().is_empty());
        // header survives an empty save
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("name,category"));
    }
}
