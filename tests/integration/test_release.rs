//! Integration tests for the release commands and version bumps

use crate::helpers::{TestRepo, cargo_ship, run_cargo_ship, stdout};
use anyhow::Result;

#[test]
fn test_release_full_pipeline() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.update_changelog("0.1.0")?;

  let output = run_cargo_ship(&repo.path, &["release"])?;
  let out = stdout(&output);
  assert!(out.contains("check-release → bump-release → publish → bump-patch"), "stdout: {}", out);

  assert_eq!(repo.tags()?, vec!["v0.1.0"]);
  assert_eq!(repo.manifest_version_at("v0.1.0")?, "0.1.0");
  assert_eq!(repo.manifest_version_at("release")?, "0.1.0");
  assert_eq!(repo.publish_count(), 1);

  // Back on trunk with the next patch series open
  assert_eq!(repo.current_branch()?, "master");
  assert_eq!(repo.manifest_version()?, "0.1.1-rc.0");
  Ok(())
}

#[test]
fn test_release_keeps_manifest_formatting() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.update_changelog("0.1.0")?;

  run_cargo_ship(&repo.path, &["release"])?;

  let manifest = repo.read_file("Cargo.toml")?;
  assert!(manifest.starts_with("# Demo crate"));
  assert!(manifest.contains("# managed by cargo-ship"));
  Ok(())
}

#[test]
fn test_release_without_changelog_changes_nothing() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = cargo_ship(&repo.path, &["release"])?;
  assert_eq!(output.status.code(), Some(3));

  assert!(repo.tags()?.is_empty());
  assert!(!repo.branch_exists("release"));
  assert_eq!(repo.publish_count(), 0);
  assert_eq!(repo.manifest_version()?, "0.1.0-rc.0");
  Ok(())
}

#[test]
fn test_release_candidate_on_master() -> Result<()> {
  let repo = TestRepo::new()?;

  run_cargo_ship(&repo.path, &["release-candidate"])?;

  assert_eq!(repo.publish_count(), 1);
  assert_eq!(repo.manifest_version()?, "0.1.0-rc.1");
  // Candidates are never tagged
  assert!(repo.tags()?.is_empty());
  Ok(())
}

#[test]
fn test_release_candidate_off_master_never_publishes() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.checkout_new("feature-x")?;

  let output = cargo_ship(&repo.path, &["release-candidate"])?;
  assert_eq!(output.status.code(), Some(3));
  assert_eq!(repo.publish_count(), 0);
  assert_eq!(repo.manifest_version()?, "0.1.0-rc.0");
  Ok(())
}

#[test]
fn test_release_minor() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.update_changelog("0.2.0")?;

  run_cargo_ship(&repo.path, &["release-minor"])?;

  assert_eq!(repo.tags()?, vec!["v0.2.0"]);
  assert_eq!(repo.manifest_version()?, "0.2.1-rc.0");
  assert_eq!(repo.publish_count(), 1);
  Ok(())
}

#[test]
fn test_release_major() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.update_changelog("1.0.0")?;

  run_cargo_ship(&repo.path, &["release-major"])?;

  assert_eq!(repo.tags()?, vec!["v1.0.0"]);
  assert_eq!(repo.manifest_version()?, "1.0.1-rc.0");
  Ok(())
}

#[test]
fn test_publish_failure_stops_release() -> Result<()> {
  let repo = TestRepo::with_config(
    r#"
[tasks.publish]
run = ["sh", "-c", "exit 42"]
"#,
  )?;
  repo.update_changelog("0.1.0")?;

  let output = cargo_ship(&repo.path, &["release"])?;
  assert_eq!(output.status.code(), Some(42));

  // The tag was cut before publishing and is not rolled back
  assert_eq!(repo.tags()?, vec!["v0.1.0"]);
  // bump-patch never ran
  assert_eq!(repo.current_branch()?, "release");
  assert_eq!(repo.manifest_version()?, "0.1.0");
  Ok(())
}

#[test]
fn test_version_preview() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = run_cargo_ship(&repo.path, &["version", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(json["current"], "0.1.0-rc.0");
  let next = json["next"].as_array().unwrap();
  let release = next.iter().find(|n| n["bump"] == "release").unwrap();
  assert_eq!(release["version"], "0.1.0");
  assert_eq!(release["tag"], "v0.1.0");
  let candidate = next.iter().find(|n| n["bump"] == "candidate").unwrap();
  assert_eq!(candidate["version"], "0.1.0-rc.1");
  assert!(candidate["tag"].is_null());
  Ok(())
}

#[test]
fn test_command_bumper_delegates() -> Result<()> {
  let repo = TestRepo::with_config(
    r#"
[version]
bumper = "command"
command = ["sh", "-c", "echo \"$1 $2\" >> bumps.log", "bump"]

[tasks.publish]
run = ["true"]
"#,
  )?;

  run_cargo_ship(&repo.path, &["release-candidate"])?;

  assert_eq!(repo.read_file("bumps.log")?.trim(), "candidate --no-tag");
  // The manifest is the tool's business
  assert_eq!(repo.manifest_version()?, "0.1.0-rc.0");
  Ok(())
}
