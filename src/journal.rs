//! Append-only progress journal.
//!
//! One row per daily update: date, project (by display name - a rename
//! orphans history, a known defect carried from the source data), sub-task
//! name, free-text content, and the progress delta contributed that day.
//! Rows are never mutated or deleted by the system.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::task::DATE_FORMAT;

/// Column order of the journal; the external contract
pub const LOG_HEADERS: [&str; 5] = ["date", "project", "subtask", "content", "progress_delta"];

/// One immutable progress record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    /// Task display name, not a project id
    pub project: String,
    pub subtask: String,
    pub content: String,
    pub progress_delta: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LogRow {
    #[serde(default)]
    date: String,
    #[serde(default)]
    project: String,
    #[serde(default)]
    subtask: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    progress_delta: String,
}

impl LogRow {
    fn from_entry(entry: &LogEntry) -> Self {
        Self {
            date: entry.date.format(DATE_FORMAT).to_string(),
            project: entry.project.clone(),
            subtask: entry.subtask.clone(),
            content: entry.content.clone(),
            progress_delta: entry.progress_delta.to_string(),
        }
    }

    fn into_entry(self) -> Option<LogEntry> {
        // rows whose date cannot parse are dropped; everything else is
        // tolerated with defaults
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()?;
        Some(LogEntry {
            date,
            project: self.project,
            subtask: self.subtask,
            content: self.content,
            progress_delta: self.progress_delta.trim().parse().unwrap_or(0),
        })
    }
}

/// The progress journal
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn open(dir: &Path, config: &Config) -> Self {
        Self {
            path: dir.join(&config.data.log_file),
        }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the journal in file order. Absent or unparseable files yield
    /// an empty journal.
    pub fn load(&self) -> Vec<LogEntry> {
        let reader = match csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "journal absent or unreadable");
                return Vec::new();
            }
        };

        let mut entries = Vec::new();
        for record in reader.into_deserialize::<LogRow>() {
            match record {
                Ok(row) => {
                    if let Some(entry) = row.into_entry() {
                        entries.push(entry);
                    }
                }
                Err(err) => {
                    tracing::debug!(path = %self.path.display(), %err, "journal unparseable");
                    return Vec::new();
                }
            }
        }
        entries
    }

    /// Append one entry without rewriting prior rows; creates the journal
    /// with its header when absent.
    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let fresh = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer.write_record(LOG_HEADERS)?;
        }
        writer.serialize(LogRow::from_entry(entry))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn entry(day: &str, project: &str, delta: i64) -> LogEntry {
        LogEntry {
            date: date(day),
            project: project.to_string(),
            subtask: "draft".to_string(),
            content: "made progress".to_string(),
            progress_delta: delta,
        }
    }

    #[test]
    fn missing_journal_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::at(dir.path().join("progress_log.csv"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn append_writes_header_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::at(dir.path().join("progress_log.csv"));
        store.append(&entry("2026-08-01", "Draft Paper", 10)).unwrap();
        store.append(&entry("2026-08-02", "Draft Paper", 5)).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let headers: Vec<&str> = raw
            .lines()
            .filter(|line| line.starts_with("date,"))
            .collect();
        assert_eq!(headers.len(), 1);

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].progress_delta, 10);
        assert_eq!(loaded[1].date, date("2026-08-02"));
    }

    #[test]
    fn append_preserves_prior_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::at(dir.path().join("progress_log.csv"));
        store.append(&entry("2026-08-01", "A", 10)).unwrap();
        let before = store.load();
        store.append(&entry("2026-08-02", "B", 5)).unwrap();
        let after = store.load();
        assert_eq!(&after[..1], &before[..]);
    }

    #[test]
    fn rows_with_bad_dates_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::at(dir.path().join("progress_log.csv"));
        let raw = format!(
            "{}\nnot-a-date,A,s,text,5\n2026-08-02,B,s,text,3\n",
            LOG_HEADERS.join(",")
        );
        std::fs::write(store.path(), raw).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].project, "B");
    }

    #[test]
    fn content_with_commas_and_newlines_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::at(dir.path().join("progress_log.csv"));
        let mut tricky = entry("2026-08-01", "Draft, Paper", 2);
        tricky.content = "line one\nline two, with commas".to_string();
        store.append(&tricky).unwrap();
        assert_eq!(store.load(), vec![tricky]);
    }
}
