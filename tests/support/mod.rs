#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated data directory for one test, driven through the binary
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A tempo command pointed at this home
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tempo").expect("tempo binary");
        cmd.arg("--data-dir").arg(self.dir.path());
        cmd.env_remove("TEMPO_DATA");
        cmd
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.dir.path().join("tasks.csv")
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.path().join("progress_log.csv")
    }

    pub fn write_tasks(&self, contents: &str) -> Result<()> {
        fs::write(self.tasks_file(), contents)?;
        Ok(())
    }

    pub fn write_log(&self, contents: &str) -> Result<()> {
        fs::write(self.log_file(), contents)?;
        Ok(())
    }

    pub fn read_tasks_raw(&self) -> Result<String> {
        Ok(fs::read_to_string(self.tasks_file())?)
    }

    pub fn read_log_raw(&self) -> Result<String> {
        Ok(fs::read_to_string(self.log_file())?)
    }

    /// Run `tempo show <task> --json` and parse the envelope-free payload
    pub fn show_json(&self, task: &str) -> Result<serde_json::Value> {
        let output = self.cmd().args(["show", task, "--json"]).output()?;
        assert!(
            output.status.success(),
            "show {task} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// A minimal task table with the full header and the given rows
pub fn tasks_csv(rows: &[&str]) -> String {
    let mut out = String::from(
        "name,category,importance,urgency,progress,status,start_date,due_date,notes,subtasks,notebook,project_id\n",
    );
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}
