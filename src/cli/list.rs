//! tempo list / show / stats command implementations.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::journal::LogEntry;
use crate::task::{self, Task, TaskStatus, DATE_FORMAT};

use super::open_env;

pub struct ListOptions {
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub task: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct StatsOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct TaskSummary {
    project_id: String,
    name: String,
    category: String,
    status: TaskStatus,
    progress: u8,
    importance: u8,
    urgency: u8,
    due_date: String,
}

impl TaskSummary {
    fn from_task(task: &Task) -> Self {
        Self {
            project_id: task.project_id.clone(),
            name: task.name.clone(),
            category: task.category.clone(),
            status: task.status,
            progress: task.progress,
            importance: task.importance,
            urgency: task.urgency,
            due_date: task.due_date.format(DATE_FORMAT).to_string(),
        }
    }
}

pub fn run_list(opts: ListOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let status_filter = opts
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?;

    let mut tasks = env.tasks.load();
    if let Some(query) = opts.search.as_deref() {
        tasks.retain(|task| task::matches_query(task, query));
    }
    if let Some(status) = status_filter {
        tasks.retain(|task| task.status == status);
    }
    if let Some(category) = opts.category.as_deref() {
        tasks.retain(|task| task.category.eq_ignore_ascii_case(category));
    }

    if opts.json {
        let summaries: Vec<TaskSummary> = tasks.iter().map(TaskSummary::from_task).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    if opts.quiet {
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks match.");
        return Ok(());
    }

    println!(
        "{:<10} {:<30} {:<8} {:<12} {:>5}  {}",
        "ID", "NAME", "CAT", "STATUS", "PROG", "DUE"
    );
    for task in &tasks {
        println!(
            "{:<10} {:<30} {:<8} {:<12} {:>4}%  {}",
            task.project_id,
            truncate(&task.name, 30),
            task.category,
            task.status,
            task.progress,
            task.due_date.format(DATE_FORMAT),
        );
    }
    Ok(())
}

pub fn run_show(opts: ShowOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let tasks = env.tasks.load();
    let index = task::find_task(&tasks, &opts.task)
        .ok_or_else(|| Error::TaskNotFound(opts.task.clone()))?;
    let task = &tasks[index];

    let journal = env.journal.load();
    let mut history: Vec<&LogEntry> = journal
        .iter()
        .filter(|entry| entry.project == task.name)
        .collect();
    history.sort_by_key(|entry| std::cmp::Reverse(entry.date));

    if opts.json {
        #[derive(serde::Serialize)]
        struct ShowOutput<'a> {
            task: &'a Task,
            quadrant: task::Quadrant,
            journal: Vec<&'a LogEntry>,
        }
        let output = ShowOutput {
            task,
            quadrant: task::quadrant(task),
            journal: history,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    if opts.quiet {
        return Ok(());
    }

    println!("{} {}", task.project_id, task.name);
    println!(
        "  category: {}   status: {}   progress: {}%",
        task.category, task.status, task.progress
    );
    println!(
        "  importance: {}   urgency: {}   quadrant: {}",
        task.importance,
        task.urgency,
        task::quadrant(task).label()
    );
    println!(
        "  {} -> {}",
        task.start_date.format(DATE_FORMAT),
        task.due_date.format(DATE_FORMAT)
    );
    if !task.notes.is_empty() {
        println!("  notes: {}", task.notes);
    }

    if task.subtasks.is_empty() {
        println!("\nNo sub-tasks.");
    } else {
        println!("\nSub-tasks ({}% total weight):", task.total_weight());
        for sub in &task.subtasks {
            let mark = if sub.done { "x" } else { " " };
            let id = if sub.id.is_empty() { "-" } else { &sub.id };
            println!("  [{mark}] {:<14} {:<30} {:>3}%", id, truncate(&sub.name, 30), sub.weight);
        }
    }

    if !task.notebook.is_empty() {
        println!("\nNotebook:");
        for line in task.notebook.lines() {
            println!("  {line}");
        }
    }

    if history.is_empty() {
        println!("\nNo journal entries.");
    } else {
        println!("\nJournal (newest first):");
        for entry in history.iter().take(10) {
            println!(
                "  {}  +{:<3} {} [{}]",
                entry.date.format(DATE_FORMAT),
                entry.progress_delta,
                entry.content,
                entry.subtask
            );
        }
        if history.len() > 10 {
            println!("  ... {} older entries", history.len() - 10);
        }
    }

    Ok(())
}

pub fn run_stats(opts: StatsOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let tasks = env.tasks.load();
    let summary = task::stats(&tasks);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    if opts.quiet {
        return Ok(());
    }

    println!("Tasks: {}", summary.total);
    println!("  in progress:     {}", summary.in_progress);
    println!("  high importance: {}", summary.high_importance);
    println!("  mean progress:   {}%", summary.mean_progress);
    println!("  data: {}", env.data_dir.display());
    Ok(())
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
