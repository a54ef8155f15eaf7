//! Weekly rollup and progress trend over the journal.
//!
//! Both are pure functions over loaded entries; nothing here touches the
//! stores.

use chrono::{Duration, NaiveDate};

use crate::journal::LogEntry;
use crate::task::DATE_FORMAT;

/// Entries inside the trailing 7-day window (`today-7d <= date <= today`),
/// sorted date-ascending. Sorting is stable, so same-day entries keep
/// journal order.
pub fn weekly_window(entries: &[LogEntry], today: NaiveDate) -> Vec<&LogEntry> {
    let start = today - Duration::days(7);
    let mut window: Vec<&LogEntry> = entries
        .iter()
        .filter(|entry| entry.date >= start && entry.date <= today)
        .collect();
    window.sort_by_key(|entry| entry.date);
    window
}

/// Group windowed entries by project name, key order = first-seen order in
/// the date-ascending sequence.
fn group_by_project<'a>(window: &[&'a LogEntry]) -> Vec<(&'a str, Vec<&'a LogEntry>)> {
    let mut groups: Vec<(&str, Vec<&LogEntry>)> = Vec::new();
    for entry in window {
        match groups
            .iter_mut()
            .find(|(project, _)| *project == entry.project)
        {
            Some((_, members)) => members.push(entry),
            None => groups.push((entry.project.as_str(), vec![entry])),
        }
    }
    groups
}

/// Render the weekly markdown report. Returns `None` when the window is
/// empty so callers can warn instead of emitting a hollow document.
pub fn weekly_report(entries: &[LogEntry], today: NaiveDate) -> Option<String> {
    let window = weekly_window(entries, today);
    if window.is_empty() {
        return None;
    }

    let mut out = String::new();
    out.push_str("# Weekly Report\n\n");
    out.push_str(&format!("Generated: {}\n\n", today.format(DATE_FORMAT)));

    for (project, members) in group_by_project(&window) {
        out.push_str(&format!("## {project}\n"));
        for entry in members {
            out.push_str(&format!(
                "- **{}**: {} (progress +{}%)\n",
                entry.date.format("%m-%d"),
                entry.content,
                entry.progress_delta
            ));
        }
        out.push('\n');
    }

    Some(out)
}

/// Cumulative progress series for one project: the running sum of journal
/// deltas in date order (the burn-up line).
pub fn trend(entries: &[LogEntry], project: &str) -> Vec<(NaiveDate, i64)> {
    let mut relevant: Vec<&LogEntry> = entries
        .iter()
        .filter(|entry| entry.project == project)
        .collect();
    relevant.sort_by_key(|entry| entry.date);

    let mut total = 0i64;
    relevant
        .into_iter()
        .map(|entry| {
            total += entry.progress_delta;
            (entry.date, total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn entry(day: &str, project: &str, content: &str, delta: i64) -> LogEntry {
        LogEntry {
            date: date(day),
            project: project.to_string(),
            subtask: String::new(),
            content: content.to_string(),
            progress_delta: delta,
        }
    }

    #[test]
    fn window_keeps_trailing_week_only() {
        let today = date("2026-08-10");
        let entries = vec![
            entry("2026-08-09", "A", "yesterday", 5),
            entry("2026-08-04", "A", "six days ago", 3),
            entry("2026-07-31", "A", "ten days ago", 2),
        ];
        let report = weekly_report(&entries, today).unwrap();
        assert!(report.contains("yesterday"));
        assert!(report.contains("six days ago"));
        assert!(!report.contains("ten days ago"));
        // one heading for the single project
        assert_eq!(report.matches("## A").count(), 1);
        // date-ascending within the group
        let six = report.find("six days ago").unwrap();
        let yesterday = report.find("yesterday").unwrap();
        assert!(six < yesterday);
    }

    #[test]
    fn window_excludes_future_dates() {
        let today = date("2026-08-10");
        let entries = vec![entry("2026-08-12", "A", "scheduled", 5)];
        assert!(weekly_report(&entries, today).is_none());
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let today = date("2026-08-10");
        let entries = vec![
            entry("2026-08-03", "A", "window edge", 1),
            entry("2026-08-10", "A", "today", 1),
        ];
        assert_eq!(weekly_window(&entries, today).len(), 2);
    }

    #[test]
    fn groups_appear_in_first_seen_order() {
        let today = date("2026-08-10");
        let entries = vec![
            entry("2026-08-09", "Beta", "later project first in file", 1),
            entry("2026-08-05", "Alpha", "earlier date", 1),
            entry("2026-08-08", "Alpha", "more alpha", 1),
        ];
        let report = weekly_report(&entries, today).unwrap();
        // date-ascending normalization puts Alpha first
        let alpha = report.find("## Alpha").unwrap();
        let beta = report.find("## Beta").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn empty_window_yields_none() {
        assert!(weekly_report(&[], date("2026-08-10")).is_none());
    }

    #[test]
    fn trend_is_cumulative_in_date_order() {
        let entries = vec![
            entry("2026-08-05", "A", "", 10),
            entry("2026-08-01", "A", "", 20),
            entry("2026-08-03", "B", "", 99),
        ];
        let series = trend(&entries, "A");
        assert_eq!(
            series,
            vec![(date("2026-08-01"), 20), (date("2026-08-05"), 30)]
        );
    }
}
