//! tempo log / report / trend command implementations.

use std::path::PathBuf;

use chrono::Local;

use crate::error::{Error, Result};
use crate::journal::LogEntry;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::report;
use crate::task::{self, DATE_FORMAT};

use super::{open_env, parse_date_arg};

pub struct LogOptions {
    pub project: String,
    pub subtask: String,
    pub content: Option<String>,
    pub delta: i64,
    pub date: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ReportOptions {
    pub out: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct TrendOptions {
    pub project: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct LogOutput {
    project: String,
    subtask: String,
    date: String,
    progress_delta: i64,
    progress: u8,
}

#[derive(serde::Serialize)]
struct ReportOutput {
    entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<String>,
}

#[derive(serde::Serialize)]
struct TrendPoint {
    date: String,
    cumulative: i64,
}

pub fn run_log(opts: LogOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let mut tasks = env.tasks.load();
    let index = task::find_task(&tasks, &opts.project)
        .ok_or_else(|| Error::TaskNotFound(opts.project.clone()))?;

    let sub_index = tasks[index].find_subtask(&opts.subtask).ok_or_else(|| {
        Error::SubtaskNotFound {
            task: tasks[index].project_id.clone(),
            subtask: opts.subtask.clone(),
        }
    })?;
    let weight = i64::from(tasks[index].subtasks[sub_index].weight);
    if opts.delta < 0 || opts.delta > weight {
        return Err(Error::InvalidArgument(format!(
            "delta must be in 0..={weight} (the sub-task's weight), got {}",
            opts.delta
        )));
    }

    let date = match &opts.date {
        Some(raw) => parse_date_arg(raw)?,
        None => Local::now().date_naive(),
    };

    // the journal references the task by display name, not project id
    let entry = LogEntry {
        date,
        project: tasks[index].name.clone(),
        subtask: tasks[index].subtasks[sub_index].name.clone(),
        content: opts.content.unwrap_or_default(),
        progress_delta: opts.delta,
    };
    env.journal.append(&entry)?;

    // bump the stored progress directly; this path never recomputes from
    // the sub-task decomposition, so the two can disagree until the next
    // sub-task edit
    let bumped = (i64::from(tasks[index].progress) + opts.delta).clamp(0, 100) as u8;
    tasks[index].progress = bumped;
    env.tasks.save(&tasks)?;

    let output = LogOutput {
        project: entry.project.clone(),
        subtask: entry.subtask.clone(),
        date: entry.date.format(DATE_FORMAT).to_string(),
        progress_delta: entry.progress_delta,
        progress: bumped,
    };
    let mut human = HumanOutput::new(format!(
        "Logged +{}% on {} / {}",
        entry.progress_delta, entry.project, entry.subtask
    ));
    human.push_summary("progress", format!("{bumped}%"));
    human.push_next_step("tempo report".to_string());

    emit_success(
        OutputOptions {
            json: opts.json,
            quiet: opts.quiet,
        },
        "log",
        &output,
        Some(&human),
    )
}

pub fn run_report(opts: ReportOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let entries = env.journal.load();
    let today = Local::now().date_naive();

    let Some(rendered) = report::weekly_report(&entries, today) else {
        let output = ReportOutput {
            entries: 0,
            out: None,
            report: None,
        };
        let mut human = HumanOutput::new("Weekly report");
        human.push_warning("no journal entries in the trailing 7 days".to_string());
        return emit_success(
            OutputOptions {
                json: opts.json,
                quiet: opts.quiet,
            },
            "report",
            &output,
            Some(&human),
        );
    };

    let windowed = report::weekly_window(&entries, today).len();

    if let Some(path) = &opts.out {
        std::fs::write(path, &rendered)?;
        let output = ReportOutput {
            entries: windowed,
            out: Some(path.display().to_string()),
            report: None,
        };
        let mut human = HumanOutput::new("Weekly report written");
        human.push_summary("entries", windowed.to_string());
        human.push_summary("file", path.display().to_string());
        return emit_success(
            OutputOptions {
                json: opts.json,
                quiet: opts.quiet,
            },
            "report",
            &output,
            Some(&human),
        );
    }

    if opts.json {
        let output = ReportOutput {
            entries: windowed,
            out: None,
            report: Some(rendered),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    if !opts.quiet {
        print!("{rendered}");
    }
    Ok(())
}

pub fn run_trend(opts: TrendOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let entries = env.journal.load();

    // resolve ids to names when possible, but let raw names through so
    // history for deleted tasks stays reachable
    let tasks = env.tasks.load();
    let project = task::find_task(&tasks, &opts.project)
        .map(|index| tasks[index].name.clone())
        .unwrap_or_else(|| opts.project.clone());

    let series = report::trend(&entries, &project);

    if opts.json {
        let points: Vec<TrendPoint> = series
            .iter()
            .map(|(date, cumulative)| TrendPoint {
                date: date.format(DATE_FORMAT).to_string(),
                cumulative: *cumulative,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }
    if opts.quiet {
        return Ok(());
    }

    if series.is_empty() {
        println!("No journal entries for '{project}'.");
        return Ok(());
    }

    println!("Progress trend for {project}:");
    for (date, cumulative) in series {
        println!("  {}  {:>4}", date.format(DATE_FORMAT), cumulative);
    }
    Ok(())
}
