//! Precondition guards
//!
//! A guard is a predicate over externally observed repository state. Guards are
//! attached to tasks and evaluated by the executor right before the task's
//! action; they never cache what they observe.
//!
//! # Built-in guards
//!
//! - **branch**: the checked-out branch must equal the trunk (`check-master`)
//! - **changelog**: the release notes must differ from the remote copy (`check-history`)
//! - **all**: ordered conjunction, first failure wins (`check-release`)

mod evaluator;

pub use evaluator::GuardEvaluator;

use crate::core::error::ShipResult;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Reads the currently checked-out branch
pub trait BranchSource {
  fn current_branch(&self) -> ShipResult<String>;
}

/// Counts changed lines of a file against a reference
pub trait ChangelogSource {
  /// Number of diff lines between `path` in the working tree and `remote_ref`.
  /// Zero means the file is unmodified.
  fn changelog_diff(&self, path: &Path, remote_ref: &str) -> ShipResult<usize>;
}

/// A precondition attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Guard {
  /// Current branch must equal `expected`
  Branch { expected: String },
  /// `path` must have changed against `remote_ref`
  Changelog { path: PathBuf, remote_ref: String },
  /// Every guard must pass, evaluated in order
  All { guards: Vec<Guard> },
}

impl Guard {
  pub fn branch(expected: impl Into<String>) -> Self {
    Guard::Branch {
      expected: expected.into(),
    }
  }

  pub fn changelog(path: impl Into<PathBuf>, remote_ref: impl Into<String>) -> Self {
    Guard::Changelog {
      path: path.into(),
      remote_ref: remote_ref.into(),
    }
  }

  pub fn all(guards: Vec<Guard>) -> Self {
    Guard::All { guards }
  }
}

impl fmt::Display for Guard {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Guard::Branch { expected } => write!(f, "on branch {}", expected),
      Guard::Changelog { path, remote_ref } => write!(f, "{} changed vs {}", path.display(), remote_ref),
      Guard::All { guards } => {
        let parts: Vec<String> = guards.iter().map(|g| g.to_string()).collect();
        write!(f, "{}", parts.join(" and "))
      }
    }
  }
}
