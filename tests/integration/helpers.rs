//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Default ship.toml for test repos: publishing is a local marker file
pub const SHIP_TOML: &str = r#"
[tasks.publish]
run = ["sh", "-c", "echo published >> published.log"]
"#;

/// A crate in a git repo on `master`, with `origin` pointing at a bare clone
pub struct TestRepo {
  _root: TempDir,
  _remote: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create a repo at version `0.1.0-rc.0` with the default ship.toml
  pub fn new() -> Result<Self> {
    Self::with_config(SHIP_TOML)
  }

  pub fn with_config(ship_toml: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let remote = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=master"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(
      path.join("Cargo.toml"),
      r#"# Demo crate
[package]
name = "demo"
version = "0.1.0-rc.0" # managed by cargo-ship
edition = "2021"
"#,
    )?;
    std::fs::write(path.join("CHANGELOG.md"), "# Changelog\n")?;
    std::fs::write(path.join("ship.toml"), ship_toml)?;
    std::fs::write(path.join(".gitignore"), "published.log\nsandbox/\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;

    git(remote.path(), &["init", "--bare"])?;
    let remote_url = remote.path().display().to_string();
    git(&path, &["remote", "add", "origin", &remote_url])?;
    git(&path, &["push", "origin", "master"])?;

    Ok(Self {
      _root: root,
      _remote: remote,
      path,
    })
  }

  /// Add release notes and commit them locally (not pushed)
  pub fn update_changelog(&self, entry: &str) -> Result<()> {
    let mut changelog = self.read_file("CHANGELOG.md")?;
    changelog.push_str(&format!("\n## {}\n", entry));
    std::fs::write(self.path.join("CHANGELOG.md"), changelog)?;
    self.commit("Update changelog")
  }

  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  pub fn checkout_new(&self, branch: &str) -> Result<()> {
    git(&self.path, &["checkout", "-b", branch])?;
    Ok(())
  }

  pub fn current_branch(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "--list"])?;
    Ok(String::from_utf8_lossy(&output.stdout).lines().map(String::from).collect())
  }

  pub fn branch_exists(&self, branch: &str) -> bool {
    git(&self.path, &["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)]).is_ok()
  }

  /// Version string in Cargo.toml on the checked-out branch
  pub fn manifest_version(&self) -> Result<String> {
    version_in(&self.read_file("Cargo.toml")?)
  }

  /// Version string in Cargo.toml at `rev`
  pub fn manifest_version_at(&self, rev: &str) -> Result<String> {
    let output = git(&self.path, &["show", &format!("{}:Cargo.toml", rev)])?;
    version_in(&String::from_utf8_lossy(&output.stdout))
  }

  /// How many times the publish task ran
  pub fn publish_count(&self) -> usize {
    self
      .read_file("published.log")
      .map(|log| log.lines().count())
      .unwrap_or(0)
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

fn version_in(manifest: &str) -> Result<String> {
  let doc: toml_edit::DocumentMut = manifest.parse()?;
  doc["package"]["version"]
    .as_str()
    .map(String::from)
    .context("package.version missing")
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run cargo-ship and return its output whatever the exit status
pub fn cargo_ship(cwd: &Path, args: &[&str]) -> Result<Output> {
  let cargo_ship_bin = env!("CARGO_BIN_EXE_cargo-ship");

  Command::new(cargo_ship_bin)
    .current_dir(cwd)
    .arg("ship")
    .args(args)
    .output()
    .context("Failed to run cargo-ship")
}

/// Run cargo-ship, failing unless it succeeds
pub fn run_cargo_ship(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = cargo_ship(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "cargo-ship command failed: cargo ship {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
