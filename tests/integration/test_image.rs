//! Integration tests for the image-* tasks against a scripted container engine

use crate::helpers::{TestRepo, cargo_ship, run_cargo_ship, stderr};
use anyhow::Result;
use std::os::unix::fs::PermissionsExt;

/// Logs its arguments and remembers builds in a marker file
const FAKE_ENGINE: &str = r#"#!/bin/sh
echo "$@" >> engine.log
case "$1" in
  build) touch .image-built ;;
  image) [ -f .image-built ] || exit 1 ;;
  save) touch env.tar ;;
esac
"#;

/// A repo whose image engine is the fake script
fn repo_with_engine() -> Result<TestRepo> {
  let repo = TestRepo::new()?;
  let engine = repo.path.join("fake-engine.sh");
  std::fs::write(&engine, FAKE_ENGINE)?;
  std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755))?;

  std::fs::write(
    repo.path.join("ship.toml"),
    format!(
      r#"
[image]
engine = "{}"
tag = "env:test"
archive = "env.tar"
container = "env-test"
"#,
      engine.display()
    ),
  )?;
  Ok(repo)
}

fn engine_log(repo: &TestRepo) -> Vec<String> {
  repo
    .read_file("engine.log")
    .map(|log| log.lines().map(String::from).collect())
    .unwrap_or_default()
}

#[test]
fn test_save_without_image_fails() -> Result<()> {
  let repo = TestRepo::with_config(
    r#"
[image]
engine = "false"
"#,
  )?;

  let output = cargo_ship(&repo.path, &["image-save"])?;
  assert_eq!(output.status.code(), Some(1));
  let err = stderr(&output);
  assert!(err.contains("Cannot save image while it is absent"), "stderr: {}", err);
  assert!(err.contains("image-build"), "stderr: {}", err);
  Ok(())
}

#[test]
fn test_build_then_save() -> Result<()> {
  let repo = repo_with_engine()?;

  run_cargo_ship(&repo.path, &["image-build"])?;
  assert!(engine_log(&repo).contains(&"build -f Dockerfile -t env:test .".to_string()));

  run_cargo_ship(&repo.path, &["image-save"])?;
  assert!(
    engine_log(&repo)
      .iter()
      .any(|line| line.starts_with("save -o ") && line.ends_with("env.tar env:test"))
  );
  Ok(())
}

#[test]
fn test_start_requires_built_image() -> Result<()> {
  let repo = repo_with_engine()?;

  let output = cargo_ship(&repo.path, &["image-start"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(!engine_log(&repo).iter().any(|line| line.starts_with("run")));

  run_cargo_ship(&repo.path, &["image-build"])?;
  run_cargo_ship(&repo.path, &["image-start"])?;
  assert!(engine_log(&repo).contains(&"run --rm -d -p 8888:8888 --name env-test env:test".to_string()));
  Ok(())
}

#[test]
fn test_push_needs_aliases() -> Result<()> {
  let repo = repo_with_engine()?;
  run_cargo_ship(&repo.path, &["image-build"])?;

  let output = cargo_ship(&repo.path, &["image-push"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(!engine_log(&repo).iter().any(|line| line.starts_with("push")));
  Ok(())
}
