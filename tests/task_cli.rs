mod support;

use predicates::prelude::*;
use predicates::str::contains;
use support::{tasks_csv, TestHome};

#[test]
fn add_assigns_first_id_for_fresh_prefix() {
    let home = TestHome::new().expect("home");

    home.cmd()
        .args(["add", "Draft Paper", "--category", "study"])
        .assert()
        .success()
        .stdout(contains("STUDY-01"));

    let shown = home.show_json("STUDY-01").expect("show");
    assert_eq!(shown["task"]["project_id"], "STUDY-01");
    assert_eq!(shown["task"]["status"], "not-started");
    assert_eq!(shown["task"]["progress"], 0);
}

#[test]
fn add_increments_past_existing_ids() {
    let home = TestHome::new().expect("home");
    let rows: Vec<String> = (1..=5)
        .map(|n| {
            format!(
                "task {n},work,5,5,0,not-started,2026-08-01,2026-08-08,,[],,WORK-{n:02}"
            )
        })
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    home.write_tasks(&tasks_csv(&rows)).expect("seed");

    home.cmd()
        .args(["add", "Sixth", "--category", "work"])
        .assert()
        .success()
        .stdout(contains("WORK-06"));
}

#[test]
fn id_previews_without_creating() {
    let home = TestHome::new().expect("home");

    home.cmd()
        .args(["id", "study"])
        .assert()
        .success()
        .stdout(contains("STUDY-01"));

    // nothing was created: the preview repeats
    home.cmd()
        .args(["id", "study"])
        .assert()
        .success()
        .stdout(contains("STUDY-01"));
}

#[test]
fn unknown_category_is_exit_code_2() {
    let home = TestHome::new().expect("home");

    home.cmd()
        .args(["add", "Dinner", "--category", "cooking"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Unknown category"));
}

#[test]
fn add_warns_when_weights_do_not_sum_to_100() {
    let home = TestHome::new().expect("home");

    home.cmd()
        .args([
            "add",
            "Draft Paper",
            "--category",
            "study",
            "--subtask",
            "outline:40",
            "--subtask",
            "draft:45",
        ])
        .assert()
        .success()
        .stdout(contains("15% short of 100"));
}

#[test]
fn search_matches_name_id_and_subtask_text() {
    let home = TestHome::new().expect("home");
    home.cmd()
        .args([
            "add",
            "Draft Paper",
            "--category",
            "study",
            "--subtask",
            "literature review:50",
        ])
        .assert()
        .success();
    home.cmd()
        .args(["add", "Quarterly Planning", "--category", "work"])
        .assert()
        .success();

    home.cmd()
        .args(["list", "--search", "literature"])
        .assert()
        .success()
        .stdout(contains("Draft Paper").and(contains("Quarterly Planning").not()));

    home.cmd()
        .args(["list", "--search", "WORK-01"])
        .assert()
        .success()
        .stdout(contains("Quarterly Planning"));
}

#[test]
fn subtask_edit_recomputes_weighted_progress() {
    let home = TestHome::new().expect("home");
    home.cmd()
        .args([
            "add",
            "Draft Paper",
            "--category",
            "study",
            "--subtask",
            "outline:40",
            "--subtask",
            "full draft:60",
        ])
        .assert()
        .success();

    // creation-time rows carry derived ids
    home.cmd()
        .args(["subtask", "done", "STUDY-01", "STUDY-01-01"])
        .assert()
        .success();

    let shown = home.show_json("STUDY-01").expect("show");
    assert_eq!(shown["task"]["progress"], 40);
}

#[test]
fn subtask_weight_change_recomputes_progress() {
    let home = TestHome::new().expect("home");
    home.cmd()
        .args([
            "add",
            "Draft Paper",
            "--category",
            "study",
            "--subtask",
            "outline:40",
            "--subtask",
            "full draft:60",
        ])
        .assert()
        .success();
    home.cmd()
        .args(["subtask", "done", "STUDY-01", "outline"])
        .assert()
        .success();

    // 60 done of 120 total after the reweight
    home.cmd()
        .args(["subtask", "set", "STUDY-01", "outline", "--weight", "60"])
        .assert()
        .success();
    assert_eq!(home.show_json("STUDY-01").expect("show")["task"]["progress"], 50);
}

#[test]
fn delete_removes_all_matching_rows_but_not_the_journal() {
    let home = TestHome::new().expect("home");
    home.cmd()
        .args([
            "add",
            "Draft Paper",
            "--category",
            "study",
            "--subtask",
            "outline:100",
        ])
        .assert()
        .success();
    home.cmd()
        .args([
            "log",
            "Draft Paper",
            "--subtask",
            "outline",
            "-m",
            "first pass",
            "--delta",
            "10",
        ])
        .assert()
        .success();

    let journal_before = home.read_log_raw().expect("journal");
    assert!(journal_before.contains("Draft Paper"));

    home.cmd()
        .args(["delete", "Draft Paper"])
        .assert()
        .success();

    home.cmd()
        .args(["list"])
        .assert()
        .success()
        .stdout(contains("Draft Paper").not());

    // the journal still references the deleted name
    assert_eq!(home.read_log_raw().expect("journal"), journal_before);

    // and its history stays reachable through trend
    home.cmd()
        .args(["trend", "Draft Paper"])
        .assert()
        .success()
        .stdout(contains("10"));
}

#[test]
fn delete_of_unknown_name_is_exit_code_2() {
    let home = TestHome::new().expect("home");
    home.cmd()
        .args(["delete", "Nothing Here"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn log_and_subtask_progress_paths_are_not_unified() {
    let home = TestHome::new().expect("home");

    // create "Draft Paper" in the STUDY category with a 40/60 split
    home.cmd()
        .args([
            "add",
            "Draft Paper",
            "--category",
            "study",
            "--subtask",
            "outline:40",
            "--subtask",
            "full draft:60",
        ])
        .assert()
        .success()
        .stdout(contains("STUDY-01"));

    // marking the 40-weight sub-task done derives progress 40
    home.cmd()
        .args(["subtask", "done", "STUDY-01", "outline"])
        .assert()
        .success();
    assert_eq!(home.show_json("STUDY-01").expect("show")["task"]["progress"], 40);

    // a +10 journal delta on the other sub-task bumps the stored value to
    // 50, even though a fresh recompute from the decomposition says 40
    home.cmd()
        .args([
            "log",
            "STUDY-01",
            "--subtask",
            "full draft",
            "-m",
            "intro section",
            "--delta",
            "10",
        ])
        .assert()
        .success();
    assert_eq!(home.show_json("STUDY-01").expect("show")["task"]["progress"], 50);

    // an idempotent sub-task command changes nothing structurally, so the
    // drifted value survives
    home.cmd()
        .args(["subtask", "undone", "STUDY-01", "full draft"])
        .assert()
        .success();
    assert_eq!(home.show_json("STUDY-01").expect("show")["task"]["progress"], 50);

    // the next real sub-task edit recomputes and overwrites the drift
    home.cmd()
        .args(["subtask", "undone", "STUDY-01", "outline"])
        .assert()
        .success();
    assert_eq!(home.show_json("STUDY-01").expect("show")["task"]["progress"], 0);
}

#[test]
fn log_delta_cannot_exceed_subtask_weight() {
    let home = TestHome::new().expect("home");
    home.cmd()
        .args([
            "add",
            "Draft Paper",
            "--category",
            "study",
            "--subtask",
            "outline:40",
        ])
        .assert()
        .success();

    home.cmd()
        .args([
            "log",
            "Draft Paper",
            "--subtask",
            "outline",
            "--delta",
            "55",
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn edit_renames_and_warns_about_orphaned_history() {
    let home = TestHome::new().expect("home");
    home.cmd()
        .args(["add", "Draft Paper", "--category", "study"])
        .assert()
        .success();

    home.cmd()
        .args(["edit", "STUDY-01", "--name", "Camera-Ready Paper"])
        .assert()
        .success()
        .stdout(contains("history stays under the old name"));

    home.cmd()
        .args(["list"])
        .assert()
        .success()
        .stdout(contains("Camera-Ready Paper"));
}

#[test]
fn later_subtasks_carry_no_id() {
    let home = TestHome::new().expect("home");
    home.cmd()
        .args([
            "add",
            "Draft Paper",
            "--category",
            "study",
            "--subtask",
            "outline:40",
        ])
        .assert()
        .success();
    home.cmd()
        .args(["subtask", "add", "STUDY-01", "revisions", "--weight", "60"])
        .assert()
        .success();

    let shown = home.show_json("STUDY-01").expect("show");
    let subs = shown["task"]["subtasks"].as_array().expect("subtasks");
    assert_eq!(subs[0]["id"], "STUDY-01-01");
    assert_eq!(subs[1]["id"], "");
}
