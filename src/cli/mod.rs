//! Command-line interface for tempo
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in the submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::journal::LogStore;
use crate::store::{self, TaskStore};

mod add;
mod delete;
mod edit;
mod list;
mod log;

/// tempo - personal task command center
///
/// Tracks tasks with weighted sub-task decomposition, keeps a daily
/// progress journal, and rolls the journal into weekly reports.
#[derive(Parser, Debug)]
#[command(name = "tempo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding tasks.csv and progress_log.csv
    #[arg(long, global = true, env = "TEMPO_DATA")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new task
    Add {
        /// Task display name
        name: String,

        /// Category label (resolves to the project-id prefix)
        #[arg(long)]
        category: String,

        /// Importance, 1-10
        #[arg(long)]
        importance: Option<u8>,

        /// Urgency, 1-10
        #[arg(long)]
        urgency: Option<u8>,

        /// Start date (YYYY-MM-DD, default today)
        #[arg(long)]
        start: Option<String>,

        /// Due date (YYYY-MM-DD, default today + 7 days)
        #[arg(long)]
        due: Option<String>,

        /// Sub-task spec NAME:WEIGHT, repeatable
        #[arg(long = "subtask")]
        subtasks: Vec<String>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Preview the next project id for a category
    Id {
        /// Category label
        category: String,
    },

    /// List tasks
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,

        /// Filter by category label
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive search over name, id, category, sub-tasks
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one task in full, including its journal tail
    Show {
        /// Project id or exact task name
        task: String,
    },

    /// Table-level rollup (totals, in-progress, high-importance, mean progress)
    Stats,

    /// Edit task fields in place
    Edit {
        /// Project id or exact task name
        task: String,

        /// Rename the task (orphans its journal history)
        #[arg(long)]
        name: Option<String>,

        /// Change the category label (the project id is never regenerated)
        #[arg(long)]
        category: Option<String>,

        /// Set status: not-started, in-progress, done, paused
        #[arg(long)]
        status: Option<String>,

        /// Set progress directly, 0-100 (not recomputed from sub-tasks)
        #[arg(long)]
        progress: Option<u8>,

        /// Importance, 1-10
        #[arg(long)]
        importance: Option<u8>,

        /// Urgency, 1-10
        #[arg(long)]
        urgency: Option<u8>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Replace the notes field
        #[arg(long)]
        notes: Option<String>,
    },

    /// Edit the per-task notebook
    Note {
        /// Project id or exact task name
        task: String,

        /// Notebook text; omit to open $VISUAL/$EDITOR
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Sub-task operations (edits recompute the task's progress)
    #[command(subcommand)]
    Subtask(SubtaskCommands),

    /// Record a daily progress update (appends to the journal and bumps
    /// the task's stored progress by the delta)
    Log {
        /// Project id or exact task name
        project: String,

        /// Sub-task id or name the work was done on
        #[arg(long)]
        subtask: String,

        /// What was done
        #[arg(short = 'm', long)]
        content: Option<String>,

        /// Progress contributed, 0 up to the sub-task's weight
        #[arg(long, default_value_t = 0)]
        delta: i64,

        /// Entry date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Weekly markdown report over the trailing 7 days
    Report {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Cumulative progress series for one project
    Trend {
        /// Project id or exact task name
        project: String,
    },

    /// Delete tasks by exact name (journal rows are left untouched)
    Delete {
        /// Task name to delete
        name: String,
    },

    /// Interactive dashboard
    Ui,
}

/// Sub-task subcommands
#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Append a sub-task (appended rows carry no id)
    Add {
        /// Project id or exact task name
        task: String,

        /// Sub-task name
        name: String,

        /// Percent weight
        #[arg(long, default_value_t = 0)]
        weight: u32,
    },

    /// Edit a sub-task's name or weight (the id never changes)
    Set {
        /// Project id or exact task name
        task: String,

        /// Sub-task id or name
        subtask: String,

        /// New sub-task name
        #[arg(long)]
        name: Option<String>,

        /// New percent weight
        #[arg(long)]
        weight: Option<u32>,
    },

    /// Mark a sub-task done
    Done {
        /// Project id or exact task name
        task: String,

        /// Sub-task id or name
        subtask: String,
    },

    /// Mark a sub-task not done
    Undone {
        /// Project id or exact task name
        task: String,

        /// Sub-task id or name
        subtask: String,
    },

    /// Remove a sub-task
    Rm {
        /// Project id or exact task name
        task: String,

        /// Sub-task id or name
        subtask: String,
    },
}

/// Everything a command needs to touch the stores
pub(crate) struct Env {
    pub data_dir: PathBuf,
    pub config: Config,
    pub tasks: TaskStore,
    pub journal: LogStore,
}

pub(crate) fn open_env(data_dir: Option<PathBuf>) -> Result<Env> {
    let dir = store::resolve_data_dir(data_dir)?;
    let config = Config::load_from_dir(&dir);
    let tasks = TaskStore::open(&dir, &config);
    let journal = LogStore::open(&dir, &config);
    tracing::debug!(data_dir = %dir.display(), "opened stores");
    Ok(Env {
        data_dir: dir,
        config,
        tasks,
        journal,
    })
}

pub(crate) fn parse_date_arg(raw: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw.trim(), crate::task::DATE_FORMAT)
        .map_err(|_| crate::error::Error::InvalidDate(raw.to_string()))
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Add {
                name,
                category,
                importance,
                urgency,
                start,
                due,
                subtasks,
                notes,
            } => add::run(add::AddOptions {
                name,
                category,
                importance,
                urgency,
                start,
                due,
                subtasks,
                notes,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Id { category } => add::run_id(add::IdOptions {
                category,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List {
                status,
                category,
                search,
            } => list::run_list(list::ListOptions {
                status,
                category,
                search,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Show { task } => list::run_show(list::ShowOptions {
                task,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Stats => list::run_stats(list::StatsOptions {
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Edit {
                task,
                name,
                category,
                status,
                progress,
                importance,
                urgency,
                start,
                due,
                notes,
            } => edit::run_edit(edit::EditOptions {
                task,
                name,
                category,
                status,
                progress,
                importance,
                urgency,
                start,
                due,
                notes,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Note { task, message } => edit::run_note(edit::NoteOptions {
                task,
                message,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Subtask(cmd) => {
                let (action, task, key) = match cmd {
                    SubtaskCommands::Add { task, name, weight } => (
                        edit::SubtaskAction::Add { name, weight },
                        task,
                        String::new(),
                    ),
                    SubtaskCommands::Set {
                        task,
                        subtask,
                        name,
                        weight,
                    } => (edit::SubtaskAction::Update { name, weight }, task, subtask),
                    SubtaskCommands::Done { task, subtask } => {
                        (edit::SubtaskAction::SetDone(true), task, subtask)
                    }
                    SubtaskCommands::Undone { task, subtask } => {
                        (edit::SubtaskAction::SetDone(false), task, subtask)
                    }
                    SubtaskCommands::Rm { task, subtask } => {
                        (edit::SubtaskAction::Remove, task, subtask)
                    }
                };
                edit::run_subtask(edit::SubtaskOptions {
                    task,
                    key,
                    action,
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                })
            }
            Commands::Log {
                project,
                subtask,
                content,
                delta,
                date,
            } => log::run_log(log::LogOptions {
                project,
                subtask,
                content,
                delta,
                date,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Report { out } => log::run_report(log::ReportOptions {
                out,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Trend { project } => log::run_trend(log::TrendOptions {
                project,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Delete { name } => delete::run(delete::DeleteOptions {
                name,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Ui => {
                let env = open_env(self.data_dir)?;
                crate::ui::dashboard::run(env.tasks, env.journal, env.config)
            }
        }
    }
}
