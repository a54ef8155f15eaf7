//! tempo add / tempo id command implementations.

use std::path::PathBuf;

use chrono::{Duration, Local};

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{self, Subtask, Task, TaskStatus};

use super::{open_env, parse_date_arg};

pub struct AddOptions {
    pub name: String,
    pub category: String,
    pub importance: Option<u8>,
    pub urgency: Option<u8>,
    pub start: Option<String>,
    pub due: Option<String>,
    pub subtasks: Vec<String>,
    pub notes: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct IdOptions {
    pub category: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct AddOutput {
    project_id: String,
    name: String,
    category: String,
    status: TaskStatus,
    start_date: String,
    due_date: String,
    subtasks: usize,
    total_weight: u32,
}

#[derive(serde::Serialize)]
struct IdOutput {
    category: String,
    prefix: String,
    next_id: String,
}

/// Parse a `NAME:WEIGHT` sub-task spec; a bare `NAME` gets weight 0
fn parse_subtask_spec(spec: &str) -> Result<Subtask> {
    let (name, weight) = match spec.rsplit_once(':') {
        Some((name, weight)) => {
            let weight = weight.trim().parse::<u32>().map_err(|_| {
                Error::InvalidArgument(format!(
                    "invalid sub-task spec '{spec}': weight must be an integer percent"
                ))
            })?;
            (name, weight)
        }
        None => (spec, 0),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "invalid sub-task spec '{spec}': name cannot be empty"
        )));
    }
    Ok(Subtask {
        id: String::new(),
        name: name.to_string(),
        weight,
        done: false,
    })
}

pub fn run(opts: AddOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let prefix = env.config.prefix_for(&opts.category)?.to_string();

    if opts.name.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "task name cannot be empty".to_string(),
        ));
    }

    let today = Local::now().date_naive();
    let start_date = match &opts.start {
        Some(raw) => parse_date_arg(raw)?,
        None => today,
    };
    let due_date = match &opts.due {
        Some(raw) => parse_date_arg(raw)?,
        None => today + Duration::days(env.config.tasks.due_in_days),
    };

    for (field, value) in [("importance", opts.importance), ("urgency", opts.urgency)] {
        if let Some(value) = value {
            if !(1..=10).contains(&value) {
                return Err(Error::InvalidArgument(format!(
                    "{field} must be in 1..=10, got {value}"
                )));
            }
        }
    }

    // Preview pass: the id shown to the user, and the stem for sub-task
    // ids. The store is re-read at save time and the final id generated
    // against that snapshot; the two can diverge if the table changed in
    // between, and uniqueness is only "highest seen + 1".
    let preview = task::generate_project_id(&env.tasks.load(), &prefix);

    let mut subtasks = opts
        .subtasks
        .iter()
        .map(|spec| parse_subtask_spec(spec))
        .collect::<Result<Vec<_>>>()?;
    task::assign_subtask_ids(&preview, &mut subtasks);
    let total_weight: u32 = subtasks.iter().map(|sub| sub.weight).sum();

    let mut tasks = env.tasks.load();
    let project_id = task::generate_project_id(&tasks, &prefix);
    tracing::debug!(%preview, %project_id, "generated project id");

    let new_task = Task {
        name: opts.name.clone(),
        category: opts.category.to_lowercase(),
        importance: opts.importance.unwrap_or(env.config.tasks.importance),
        urgency: opts.urgency.unwrap_or(env.config.tasks.urgency),
        progress: 0,
        status: TaskStatus::NotStarted,
        start_date,
        due_date,
        notes: opts.notes.unwrap_or_default(),
        subtasks,
        notebook: String::new(),
        project_id: project_id.clone(),
    };
    let created = new_task.clone();
    tasks.push(new_task);
    env.tasks.save(&tasks)?;

    let mut human = HumanOutput::new(format!("Created {project_id}: {}", created.name));
    human.push_summary("category", created.category.clone());
    human.push_summary("due", created.due_date.format(task::DATE_FORMAT).to_string());
    if !created.subtasks.is_empty() {
        human.push_summary(
            "sub-tasks",
            format!("{} ({total_weight}% total weight)", created.subtasks.len()),
        );
    }
    if !created.subtasks.is_empty() && total_weight != 100 {
        if total_weight < 100 {
            human.push_warning(format!(
                "sub-task weights sum to {total_weight}%, {}% short of 100",
                100 - total_weight
            ));
        } else {
            human.push_warning(format!(
                "sub-task weights sum to {total_weight}%, {}% over 100",
                total_weight - 100
            ));
        }
    }
    human.push_next_step(format!("tempo show {project_id}"));

    let output = AddOutput {
        project_id: created.project_id.clone(),
        name: created.name.clone(),
        category: created.category.clone(),
        status: created.status,
        start_date: created.start_date.format(task::DATE_FORMAT).to_string(),
        due_date: created.due_date.format(task::DATE_FORMAT).to_string(),
        subtasks: created.subtasks.len(),
        total_weight,
    };
    emit_success(
        OutputOptions {
            json: opts.json,
            quiet: opts.quiet,
        },
        "add",
        &output,
        Some(&human),
    )
}

pub fn run_id(opts: IdOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let prefix = env.config.prefix_for(&opts.category)?.to_string();
    let next_id = task::generate_project_id(&env.tasks.load(), &prefix);

    let mut human = HumanOutput::new(format!("Next id for {}: {next_id}", opts.category));
    human.push_detail("another creation before yours can take this id".to_string());

    let output = IdOutput {
        category: opts.category.to_lowercase(),
        prefix,
        next_id,
    };
    emit_success(
        OutputOptions {
            json: opts.json,
            quiet: opts.quiet,
        },
        "id",
        &output,
        Some(&human),
    )
}
