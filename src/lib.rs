//! tempo - Personal Task Command Center
//!
//! This library backs the tempo CLI: a single-user productivity tool that
//! tracks tasks with weighted sub-task decomposition, keeps an append-only
//! daily progress journal, and rolls the journal into weekly reports.
//!
//! # Core Concepts
//!
//! - **Tasks**: one row per tracked project, with importance/urgency
//!   ratings, dates, notes, and an ordered weighted sub-task decomposition
//! - **Progress**: derived from sub-task weights on every sub-task edit,
//!   but also bumped directly by journal deltas - the two paths can
//!   disagree until the next sub-task edit
//! - **Project IDs**: `{PREFIX}-{NN}` per category, "highest seen + 1"
//! - **Journal**: append-only daily updates referencing tasks by name
//! - **Weekly Report**: markdown rollup of the trailing 7 days
//!
//! # Limitations
//!
//! The stores are plain CSV files with no locking and no transactional
//! guarantees: every save is a full-file rewrite, last writer wins. This is
//! acceptable only under the single-user, single-session assumption the
//! tool is built for - two concurrent sessions can lose updates.
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `tempo.toml`
//! - `error`: error types and result aliases
//! - `task`: task model, progress recomputation, id generation, search
//! - `store`: task table storage (CSV, atomic full rewrites)
//! - `journal`: append-only progress journal (CSV)
//! - `report`: weekly rollup and progress trend
//! - `output`: shared CLI output formatting
//! - `ui`: interactive dashboard (ratatui)

pub mod cli;
pub mod config;
pub mod error;
pub mod journal;
pub mod output;
pub mod report;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
