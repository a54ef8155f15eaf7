//! tempo edit / note / subtask command implementations.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{self, Subtask, TaskStatus};

use super::{open_env, parse_date_arg};

pub struct EditOptions {
    pub task: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub progress: Option<u8>,
    pub importance: Option<u8>,
    pub urgency: Option<u8>,
    pub start: Option<String>,
    pub due: Option<String>,
    pub notes: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct NoteOptions {
    pub task: String,
    pub message: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub enum SubtaskAction {
    Add {
        name: String,
        weight: u32,
    },
    Update {
        name: Option<String>,
        weight: Option<u32>,
    },
    SetDone(bool),
    Remove,
}

pub struct SubtaskOptions {
    pub task: String,
    /// Sub-task id or name; unused for Add
    pub key: String,
    pub action: SubtaskAction,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct EditOutput {
    project_id: String,
    name: String,
    changed: Vec<String>,
}

#[derive(serde::Serialize)]
struct NoteOutput {
    project_id: String,
    notebook_bytes: usize,
}

#[derive(serde::Serialize)]
struct SubtaskOutput {
    project_id: String,
    subtasks: usize,
    total_weight: u32,
    progress: u8,
    recomputed: bool,
}

pub fn run_edit(opts: EditOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let status = opts
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?;
    let start = opts.start.as_deref().map(parse_date_arg).transpose()?;
    let due = opts.due.as_deref().map(parse_date_arg).transpose()?;

    for (field, value) in [("importance", opts.importance), ("urgency", opts.urgency)] {
        if let Some(value) = value {
            if !(1..=10).contains(&value) {
                return Err(Error::InvalidArgument(format!(
                    "{field} must be in 1..=10, got {value}"
                )));
            }
        }
    }
    if let Some(progress) = opts.progress {
        if progress > 100 {
            return Err(Error::InvalidArgument(format!(
                "progress must be in 0..=100, got {progress}"
            )));
        }
    }
    if let Some(category) = opts.category.as_deref() {
        env.config.prefix_for(category)?;
    }

    let mut tasks = env.tasks.load();
    let index = task::find_task(&tasks, &opts.task)
        .ok_or_else(|| Error::TaskNotFound(opts.task.clone()))?;
    let task = &mut tasks[index];

    let mut changed = Vec::new();
    if let Some(name) = opts.name {
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "task name cannot be empty".to_string(),
            ));
        }
        task.name = name;
        changed.push("name".to_string());
    }
    if let Some(category) = opts.category {
        task.category = category.to_lowercase();
        changed.push("category".to_string());
    }
    if let Some(status) = status {
        task.status = status;
        changed.push("status".to_string());
    }
    if let Some(progress) = opts.progress {
        // direct progress edits bypass the sub-task derivation
        task.progress = progress;
        changed.push("progress".to_string());
    }
    if let Some(importance) = opts.importance {
        task.importance = importance;
        changed.push("importance".to_string());
    }
    if let Some(urgency) = opts.urgency {
        task.urgency = urgency;
        changed.push("urgency".to_string());
    }
    if let Some(start) = start {
        task.start_date = start;
        changed.push("start_date".to_string());
    }
    if let Some(due) = due {
        task.due_date = due;
        changed.push("due_date".to_string());
    }
    if let Some(notes) = opts.notes {
        task.notes = notes;
        changed.push("notes".to_string());
    }

    if changed.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change: pass at least one field flag".to_string(),
        ));
    }

    let output = EditOutput {
        project_id: task.project_id.clone(),
        name: task.name.clone(),
        changed: changed.clone(),
    };
    let mut human = HumanOutput::new(format!("Updated {}", task.project_id));
    human.push_summary("fields", changed.join(", "));
    if changed.iter().any(|field| field == "name") {
        human.push_warning(
            "journal entries reference tasks by name; history stays under the old name".to_string(),
        );
    }

    env.tasks.save(&tasks)?;
    emit_success(
        OutputOptions {
            json: opts.json,
            quiet: opts.quiet,
        },
        "edit",
        &output,
        Some(&human),
    )
}

pub fn run_note(opts: NoteOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let mut tasks = env.tasks.load();
    let index = task::find_task(&tasks, &opts.task)
        .ok_or_else(|| Error::TaskNotFound(opts.task.clone()))?;

    let notebook = match opts.message {
        Some(message) => message,
        None => edit_text_external(&tasks[index].notebook)?,
    };
    tasks[index].notebook = notebook;

    let output = NoteOutput {
        project_id: tasks[index].project_id.clone(),
        notebook_bytes: tasks[index].notebook.len(),
    };
    let human = HumanOutput::new(format!("Saved notebook for {}", tasks[index].project_id));

    env.tasks.save(&tasks)?;
    emit_success(
        OutputOptions {
            json: opts.json,
            quiet: opts.quiet,
        },
        "note",
        &output,
        Some(&human),
    )
}

pub fn run_subtask(opts: SubtaskOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let mut tasks = env.tasks.load();
    let index = task::find_task(&tasks, &opts.task)
        .ok_or_else(|| Error::TaskNotFound(opts.task.clone()))?;
    let task = &mut tasks[index];

    let before = task::subtasks_to_json(&task.subtasks);

    match opts.action {
        SubtaskAction::Add { name, weight } => {
            if name.trim().is_empty() {
                return Err(Error::InvalidArgument(
                    "sub-task name cannot be empty".to_string(),
                ));
            }
            // appended rows never get an id; only creation-time rows do
            task.subtasks.push(Subtask {
                id: String::new(),
                name,
                weight,
                done: false,
            });
        }
        SubtaskAction::Update { name, weight } => {
            if name.is_none() && weight.is_none() {
                return Err(Error::InvalidArgument(
                    "nothing to change: pass --name or --weight".to_string(),
                ));
            }
            let sub_index = task.find_subtask(&opts.key).ok_or_else(|| {
                Error::SubtaskNotFound {
                    task: task.project_id.clone(),
                    subtask: opts.key.clone(),
                }
            })?;
            if let Some(name) = name {
                if name.trim().is_empty() {
                    return Err(Error::InvalidArgument(
                        "sub-task name cannot be empty".to_string(),
                    ));
                }
                task.subtasks[sub_index].name = name;
            }
            if let Some(weight) = weight {
                task.subtasks[sub_index].weight = weight;
            }
        }
        SubtaskAction::SetDone(done) => {
            let sub_index = task.find_subtask(&opts.key).ok_or_else(|| {
                Error::SubtaskNotFound {
                    task: task.project_id.clone(),
                    subtask: opts.key.clone(),
                }
            })?;
            task.subtasks[sub_index].done = done;
        }
        SubtaskAction::Remove => {
            let sub_index = task.find_subtask(&opts.key).ok_or_else(|| {
                Error::SubtaskNotFound {
                    task: task.project_id.clone(),
                    subtask: opts.key.clone(),
                }
            })?;
            task.subtasks.remove(sub_index);
        }
    }

    // recompute only on a detected structural change, then persist
    let after = task::subtasks_to_json(&task.subtasks);
    let recomputed = after != before;
    if recomputed {
        task.recompute_progress();
    }

    let output = SubtaskOutput {
        project_id: task.project_id.clone(),
        subtasks: task.subtasks.len(),
        total_weight: task.total_weight(),
        progress: task.progress,
        recomputed,
    };
    let mut human = HumanOutput::new(format!(
        "{}: {} sub-tasks, progress {}%",
        task.project_id,
        task.subtasks.len(),
        task.progress
    ));
    let total = task.total_weight();
    if !task.subtasks.is_empty() && total != 100 {
        human.push_warning(format!("sub-task weights sum to {total}%, not 100%"));
    }

    env.tasks.save(&tasks)?;
    emit_success(
        OutputOptions {
            json: opts.json,
            quiet: opts.quiet,
        },
        "subtask",
        &output,
        Some(&human),
    )
}

/// Round-trip a text body through $VISUAL/$EDITOR via a temp file
fn edit_text_external(body: &str) -> Result<String> {
    let mut temp = tempfile::NamedTempFile::new()?;
    temp.write_all(body.as_bytes())?;
    temp.flush()?;
    let path = temp.path().to_path_buf();

    let status = launch_editor(&path)?;
    if !status.success() {
        let detail = status
            .code()
            .map(|code| format!("exit code {code}"))
            .unwrap_or_else(|| "signal".to_string());
        return Err(Error::OperationFailed(format!("editor exited with {detail}")));
    }

    Ok(std::fs::read_to_string(&path)?)
}

fn launch_editor(path: &std::path::Path) -> Result<std::process::ExitStatus> {
    let candidates = editor_candidates();
    let mut attempted: Vec<String> = Vec::new();
    for candidate in candidates {
        let parts = split_editor_command(&candidate);
        if parts.is_empty() {
            continue;
        }
        attempted.push(parts[0].clone());
        let mut command = Command::new(&parts[0]);
        if parts.len() > 1 {
            command.args(&parts[1..]);
        }
        command.arg(path);
        match command.status() {
            Ok(status) => return Ok(status),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                continue;
            }
            Err(err) => {
                return Err(Error::OperationFailed(format!(
                    "failed to launch editor '{}': {err}",
                    parts[0]
                )));
            }
        }
    }
    let tried = if attempted.is_empty() {
        "no editor candidates".to_string()
    } else {
        attempted.join(", ")
    };
    Err(Error::OperationFailed(format!(
        "no editor found (tried {tried}); set $VISUAL or $EDITOR"
    )))
}

fn editor_candidates() -> Vec<String> {
    let mut out = Vec::new();
    if let Ok(value) = std::env::var("VISUAL") {
        if !value.trim().is_empty() {
            out.push(value);
        }
    }
    if let Ok(value) = std::env::var("EDITOR") {
        if !value.trim().is_empty() {
            out.push(value);
        }
    }
    out.push("vi".to_string());
    out
}

fn split_editor_command(value: &str) -> Vec<String> {
    value
        .split_whitespace()
        .map(|part| part.to_string())
        .collect()
}
