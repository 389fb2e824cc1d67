//! Integration tests for the check-* guard tasks

use crate::helpers::{TestRepo, cargo_ship, run_cargo_ship, stderr};
use anyhow::Result;

#[test]
fn test_check_master_on_master() -> Result<()> {
  let repo = TestRepo::new()?;
  run_cargo_ship(&repo.path, &["check-master"])?;
  Ok(())
}

#[test]
fn test_check_master_on_feature_branch() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.checkout_new("feature-x")?;

  let output = cargo_ship(&repo.path, &["check-master"])?;
  assert_eq!(output.status.code(), Some(3));
  let err = stderr(&output);
  assert!(err.contains("feature-x"), "stderr: {}", err);
  assert!(err.contains("master"), "stderr: {}", err);
  Ok(())
}

#[test]
fn test_check_history_requires_changelog_update() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = cargo_ship(&repo.path, &["check-history"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("CHANGELOG.md"));

  repo.update_changelog("0.1.0")?;
  run_cargo_ship(&repo.path, &["check-history"])?;
  Ok(())
}

#[test]
fn test_check_history_sees_uncommitted_edits() -> Result<()> {
  let repo = TestRepo::new()?;
  std::fs::write(repo.path.join("CHANGELOG.md"), "# Changelog\n\n## Unreleased\n")?;

  run_cargo_ship(&repo.path, &["check-history"])?;
  Ok(())
}

#[test]
fn test_check_release_reports_branch_before_changelog() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.checkout_new("feature-x")?;

  // Changelog is unchanged too, but the branch failure comes first
  let output = cargo_ship(&repo.path, &["check-release"])?;
  assert_eq!(output.status.code(), Some(3));
  let err = stderr(&output);
  assert!(err.contains("feature-x"), "stderr: {}", err);
  assert!(!err.contains("CHANGELOG.md"), "stderr: {}", err);
  Ok(())
}

#[test]
fn test_check_release_passes() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.update_changelog("0.1.0")?;
  run_cargo_ship(&repo.path, &["check-release"])?;
  Ok(())
}

#[test]
fn test_custom_trunk_and_changelog() -> Result<()> {
  let repo = TestRepo::with_config(
    r#"
[vcs]
trunk = "main"

[changelog]
path = "HISTORY.md"
remote_ref = "HEAD"
"#,
  )?;
  repo.checkout_new("main")?;
  std::fs::write(repo.path.join("HISTORY.md"), "history\n")?;
  repo.commit("Add history")?;

  // Committed, so no diff against HEAD
  let output = cargo_ship(&repo.path, &["check-release"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("HISTORY.md"));

  std::fs::write(repo.path.join("HISTORY.md"), "history\nmore\n")?;
  run_cargo_ship(&repo.path, &["check-release"])?;
  Ok(())
}
