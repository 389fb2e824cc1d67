//! Release-side operations for SystemGit (branches, merges, commits, tags, pushes)
//! and its implementations of the guard and bump ports.

use super::system_git::{SystemGit, path_to_git_format};
use crate::core::error::{GitError, ShipError, ShipResult};
use crate::guards::{BranchSource, ChangelogSource};
use crate::release::VersionControl;
use std::path::Path;

impl SystemGit {
  /// Count lines of `git diff <reference> -- <path>` (working tree vs reference)
  pub fn diff_line_count(&self, reference: &str, path: &Path) -> ShipResult<usize> {
    let path = path_to_git_format(path);
    let output = self.run_checked(&["diff", reference, "--", &path])?;
    Ok(String::from_utf8_lossy(&output.stdout).lines().count())
  }

  /// Check if a local branch exists
  pub fn has_branch(&self, branch: &str) -> ShipResult<bool> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)])
      .output()?;
    Ok(output.status.success())
  }

  /// Stage `paths` and commit them with `message`
  pub fn commit_paths(&self, paths: &[&Path], message: &str) -> ShipResult<()> {
    let formatted: Vec<String> = paths.iter().map(|p| path_to_git_format(p)).collect();
    let mut args = vec!["add", "--"];
    args.extend(formatted.iter().map(String::as_str));
    self.run_checked(&args)?;

    self.run_checked(&["commit", "-m", message])?;
    Ok(())
  }

  /// Create an annotated tag at HEAD
  pub fn create_annotated_tag(&self, tag: &str, message: &str) -> ShipResult<()> {
    self.run_checked(&["tag", "-a", tag, "-m", message])?;
    Ok(())
  }

  /// List all tags
  #[cfg(test)]
  pub fn list_tags(&self) -> ShipResult<Vec<String>> {
    let output = self.run_checked(&["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect(),
    )
  }
}

impl BranchSource for SystemGit {
  fn current_branch(&self) -> ShipResult<String> {
    self.current_branch_name()
  }
}

impl ChangelogSource for SystemGit {
  fn changelog_diff(&self, path: &Path, remote_ref: &str) -> ShipResult<usize> {
    self.diff_line_count(remote_ref, path)
  }
}

impl VersionControl for SystemGit {
  fn branch_exists(&self, branch: &str) -> ShipResult<bool> {
    self.has_branch(branch)
  }

  fn create_branch(&self, branch: &str, start_point: &str) -> ShipResult<()> {
    self.run_checked(&["branch", branch, start_point])?;
    Ok(())
  }

  fn checkout_branch(&self, branch: &str) -> ShipResult<()> {
    self.run_checked(&["checkout", branch])?;
    Ok(())
  }

  fn merge(&self, from: &str, no_ff: bool) -> ShipResult<()> {
    let mut cmd = self.git_cmd();
    cmd.args(["merge", "--no-edit"]);
    if no_ff {
      cmd.arg("--no-ff");
    }
    cmd.arg(from);

    let output = cmd.output()?;
    if !output.status.success() {
      let into = self.current_branch_name()?;
      let stderr = String::from_utf8_lossy(&output.stderr);
      let stdout = String::from_utf8_lossy(&output.stdout);
      return Err(ShipError::Git(GitError::MergeFailed {
        from: from.to_string(),
        into,
        reason: format!("{}{}", stdout.trim(), stderr.trim()),
      }));
    }

    Ok(())
  }

  fn push(&self, remote: &str, branch: &str, with_tags: bool) -> ShipResult<()> {
    println!("   Pushing to remote '{}'...", remote);

    let mut cmd = self.git_cmd();
    cmd.arg("push");
    if with_tags {
      cmd.arg("--follow-tags");
    }
    cmd.args([remote, branch]);

    let output = cmd.output()?;
    if !output.status.success() {
      return Err(ShipError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        branch: branch.to_string(),
        reason: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    println!("   ✅ Pushed to {}/{}", remote, branch);
    Ok(())
  }
}
