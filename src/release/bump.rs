//! Version bump controller
//!
//! The controller owns the branch choreography around each bump; the version
//! arithmetic and the tag itself belong to the [`VersionBumper`] collaborator.
//!
//! | Bump      | Branch                                             | Tag |
//! |-----------|----------------------------------------------------|-----|
//! | release   | release branch (created from trunk), `--no-ff` merge of trunk | yes |
//! | patch     | trunk, after merging the release branch in         | no  |
//! | minor     | trunk                                              | no  |
//! | major     | trunk                                              | no  |
//! | candidate | current branch                                     | no  |

use crate::core::config::VcsConfig;
use crate::core::error::ShipResult;
use serde::Serialize;
use std::fmt;

/// The five mutually exclusive bump operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
  Release,
  Patch,
  Minor,
  Major,
  Candidate,
}

impl BumpKind {
  pub const ALL: [BumpKind; 5] = [
    BumpKind::Release,
    BumpKind::Patch,
    BumpKind::Minor,
    BumpKind::Major,
    BumpKind::Candidate,
  ];

  /// Part name as understood by bump tools
  pub fn part(self) -> &'static str {
    match self {
      BumpKind::Release => "release",
      BumpKind::Patch => "patch",
      BumpKind::Minor => "minor",
      BumpKind::Major => "major",
      BumpKind::Candidate => "candidate",
    }
  }

  /// Name of the task that performs this bump
  pub fn task_name(self) -> String {
    format!("bump-{}", self.part())
  }

  /// Only release bumps are tagged
  pub fn tags(self) -> bool {
    matches!(self, BumpKind::Release)
  }
}

impl fmt::Display for BumpKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.part())
  }
}

/// Branch operations needed around a bump
pub trait VersionControl {
  fn branch_exists(&self, branch: &str) -> ShipResult<bool>;

  /// Create `branch` at `start_point` without checking it out
  fn create_branch(&self, branch: &str, start_point: &str) -> ShipResult<()>;

  fn checkout_branch(&self, branch: &str) -> ShipResult<()>;

  /// Merge `from` into the checked-out branch
  fn merge(&self, from: &str, no_ff: bool) -> ShipResult<()>;

  fn push(&self, remote: &str, branch: &str, with_tags: bool) -> ShipResult<()>;
}

/// Applies a version bump on the checked-out branch, tagging when asked
pub trait VersionBumper {
  fn bump(&self, kind: BumpKind, tag: bool) -> ShipResult<()>;
}

/// Sequences branch moves, merges and bumper calls
pub struct BumpController<'a> {
  vcs: &'a dyn VersionControl,
  bumper: &'a dyn VersionBumper,
  trunk: String,
  release_branch: String,
  remote: String,
  push: bool,
}

impl<'a> BumpController<'a> {
  pub fn new(vcs: &'a dyn VersionControl, bumper: &'a dyn VersionBumper, config: &VcsConfig) -> Self {
    Self {
      vcs,
      bumper,
      trunk: config.trunk.clone(),
      release_branch: config.release_branch.clone(),
      remote: config.remote.clone(),
      push: config.push,
    }
  }

  pub fn bump(&self, kind: BumpKind) -> ShipResult<()> {
    match kind {
      BumpKind::Release => self.bump_release(),
      BumpKind::Patch => self.bump_patch(),
      BumpKind::Minor => self.bump_on_trunk(BumpKind::Minor),
      BumpKind::Major => self.bump_on_trunk(BumpKind::Major),
      BumpKind::Candidate => self.bump_candidate(),
    }
  }

  /// Move to the release branch, bring trunk in, and cut the tagged release
  pub fn bump_release(&self) -> ShipResult<()> {
    if !self.vcs.branch_exists(&self.release_branch)? {
      println!("   Creating branch '{}' from '{}'", self.release_branch, self.trunk);
      self.vcs.create_branch(&self.release_branch, &self.trunk)?;
    }
    self.vcs.checkout_branch(&self.release_branch)?;
    self.vcs.merge(&self.trunk, true)?;
    self.bumper.bump(BumpKind::Release, true)?;

    if self.push {
      self.vcs.push(&self.remote, &self.release_branch, true)?;
    }
    Ok(())
  }

  /// Back on trunk, take the release in and open the next patch series
  pub fn bump_patch(&self) -> ShipResult<()> {
    self.vcs.checkout_branch(&self.trunk)?;
    self.vcs.merge(&self.release_branch, false)?;
    self.bumper.bump(BumpKind::Patch, false)?;

    if self.push {
      self.vcs.push(&self.remote, &self.trunk, false)?;
    }
    Ok(())
  }

  fn bump_on_trunk(&self, kind: BumpKind) -> ShipResult<()> {
    self.vcs.checkout_branch(&self.trunk)?;
    self.bumper.bump(kind, false)
  }

  pub fn bump_candidate(&self) -> ShipResult<()> {
    self.bumper.bump(BumpKind::Candidate, false)
  }
}
