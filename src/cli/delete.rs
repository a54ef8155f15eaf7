//! tempo delete command implementation.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store;

use super::open_env;

pub struct DeleteOptions {
    pub name: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct DeleteOutput {
    name: String,
    removed: usize,
    remaining: usize,
}

pub fn run(opts: DeleteOptions) -> Result<()> {
    let env = open_env(opts.data_dir)?;
    let tasks = env.tasks.load();
    let before = tasks.len();

    // every row with a matching name goes; names are not unique
    let kept = store::delete_where(tasks, |task| task.name == opts.name);
    let removed = before - kept.len();
    if removed == 0 {
        return Err(Error::TaskNotFound(opts.name.clone()));
    }
    env.tasks.save(&kept)?;

    let output = DeleteOutput {
        name: opts.name.clone(),
        removed,
        remaining: kept.len(),
    };
    let mut human = HumanOutput::new(format!("Deleted {removed} task(s) named '{}'", opts.name));
    human.push_detail(
        "journal entries referencing this name are kept; they are now orphaned".to_string(),
    );

    emit_success(
        OutputOptions {
            json: opts.json,
            quiet: opts.quiet,
        },
        "delete",
        &output,
        Some(&human),
    )
}
