//! Integration tests for task execution, planning and listing

use crate::helpers::{TestRepo, cargo_ship, run_cargo_ship, stderr, stdout};
use anyhow::Result;

const CUSTOM_TASKS: &str = r#"
[test]
sandbox_dir = "sandbox"

[tasks.publish]
run = ["sh", "-c", "echo published >> published.log"]

[tasks.greet]
description = "Leave a greeting"
run = ["sh", "-c", "echo hi > greeted.txt"]

[tasks.fail]
run = ["sh", "-c", "exit 7"]

[tasks.after-fail]
run = ["touch", "after.txt"]
prerequisites = ["fail"]

[tasks.show-env]
run = ["sh", "-c", "echo $GREETING > env.txt"]
env = { GREETING = "hello" }
"#;

#[test]
fn test_plan_orders_prerequisites() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = run_cargo_ship(&repo.path, &["plan", "install"])?;
  let out = stdout(&output);

  let positions: Vec<usize> = ["1. clean-build", "2. clean-test", "3. clean", "4. install"]
    .iter()
    .map(|line| out.find(line).unwrap_or_else(|| panic!("missing '{}' in:\n{}", line, out)))
    .collect();
  assert!(positions.windows(2).all(|w| w[0] < w[1]));
  assert!(out.contains("nothing was executed"));
  Ok(())
}

#[test]
fn test_plan_release_minor_json() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = run_cargo_ship(&repo.path, &["plan", "release-minor", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  let runs: Vec<&str> = json["runs"]
    .as_array()
    .unwrap()
    .iter()
    .map(|run| run["run"].as_str().unwrap())
    .collect();
  assert_eq!(
    runs,
    vec!["check-release", "bump-minor", "check-release", "bump-release", "publish", "bump-patch"]
  );

  // Planning touches nothing
  assert_eq!(repo.manifest_version()?, "0.1.0-rc.0");
  assert_eq!(repo.publish_count(), 0);
  Ok(())
}

#[test]
fn test_list_json() -> Result<()> {
  let repo = TestRepo::with_config(CUSTOM_TASKS)?;

  let output = run_cargo_ship(&repo.path, &["list", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  let names: Vec<&str> = json["tasks"]
    .as_array()
    .unwrap()
    .iter()
    .map(|task| task["name"].as_str().unwrap())
    .collect();
  for expected in ["clean", "install", "check-release", "bump-candidate", "image-build", "greet"] {
    assert!(names.contains(&expected), "missing {} in {:?}", expected, names);
  }

  assert_eq!(json["release_commands"].as_array().unwrap().len(), 4);
  assert!(json["cycles"].as_array().unwrap().is_empty());
  Ok(())
}

#[test]
fn test_cycle_is_listed_and_runs_nothing() -> Result<()> {
  let repo = TestRepo::with_config(
    r#"
[tasks.a]
run = ["touch", "ran-a"]
prerequisites = ["b"]

[tasks.b]
run = ["touch", "ran-b"]
prerequisites = ["a"]
"#,
  )?;

  let output = run_cargo_ship(&repo.path, &["list"])?;
  assert!(stdout(&output).contains("Prerequisite cycles"));

  let output = cargo_ship(&repo.path, &["run", "a"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("cycle"), "stderr: {}", stderr(&output));
  assert!(!repo.file_exists("ran-a"));
  assert!(!repo.file_exists("ran-b"));
  Ok(())
}

#[test]
fn test_config_task_as_subcommand() -> Result<()> {
  let repo = TestRepo::with_config(CUSTOM_TASKS)?;

  let output = run_cargo_ship(&repo.path, &["greet"])?;
  assert!(stdout(&output).contains("greet complete (1 task)"));
  assert_eq!(repo.read_file("greeted.txt")?.trim(), "hi");
  Ok(())
}

#[test]
fn test_config_task_rejects_arguments() -> Result<()> {
  let repo = TestRepo::with_config(CUSTOM_TASKS)?;

  let output = cargo_ship(&repo.path, &["greet", "loudly"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(!repo.file_exists("greeted.txt"));
  Ok(())
}

#[test]
fn test_tool_exit_status_propagates() -> Result<()> {
  let repo = TestRepo::with_config(CUSTOM_TASKS)?;

  let output = cargo_ship(&repo.path, &["run", "fail"])?;
  assert_eq!(output.status.code(), Some(7));
  Ok(())
}

#[test]
fn test_failed_prerequisite_stops_run() -> Result<()> {
  let repo = TestRepo::with_config(CUSTOM_TASKS)?;

  let output = cargo_ship(&repo.path, &["after-fail"])?;
  assert_eq!(output.status.code(), Some(7));
  assert!(!repo.file_exists("after.txt"));
  Ok(())
}

#[test]
fn test_task_env() -> Result<()> {
  let repo = TestRepo::with_config(CUSTOM_TASKS)?;

  run_cargo_ship(&repo.path, &["show-env"])?;
  assert_eq!(repo.read_file("env.txt")?.trim(), "hello");
  Ok(())
}

#[test]
fn test_clean_test_removes_sandbox() -> Result<()> {
  let repo = TestRepo::with_config(CUSTOM_TASKS)?;
  std::fs::create_dir_all(repo.path.join("sandbox/nested"))?;
  std::fs::write(repo.path.join("sandbox/nested/state"), "x")?;

  run_cargo_ship(&repo.path, &["clean-test"])?;
  assert!(!repo.file_exists("sandbox"));

  // Nothing left to remove is not an error
  run_cargo_ship(&repo.path, &["clean-test"])?;
  Ok(())
}

#[test]
fn test_run_routes_release_commands() -> Result<()> {
  let repo = TestRepo::new()?;

  run_cargo_ship(&repo.path, &["run", "release-candidate"])?;
  assert_eq!(repo.publish_count(), 1);
  assert_eq!(repo.manifest_version()?, "0.1.0-rc.1");
  Ok(())
}

#[test]
fn test_unknown_task() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = cargo_ship(&repo.path, &["run", "nope"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Unknown task 'nope'"));
  Ok(())
}

#[test]
fn test_release_names_are_reserved() -> Result<()> {
  let repo = TestRepo::with_config(
    r#"
[tasks.release]
run = ["true"]
"#,
  )?;

  let output = cargo_ship(&repo.path, &["list"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("release"));
  Ok(())
}

#[test]
fn test_docs_output_dir_cannot_be_project_root() -> Result<()> {
  let repo = TestRepo::with_config(
    r#"
[docs]
output_dir = "."
command = ["true"]
"#,
  )?;

  let output = cargo_ship(&repo.path, &["docs"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("docs.output_dir"), "stderr: {}", stderr(&output));
  assert!(repo.file_exists("Cargo.toml"));
  assert!(repo.file_exists("CHANGELOG.md"));
  Ok(())
}
