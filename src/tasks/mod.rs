//! Named tasks with prerequisite edges
//!
//! A [`Task`] is static: the catalog is built once at startup from the built-in
//! definitions plus `[tasks]` overrides in ship.toml and never changes after.
//! The [`TaskGraph`] resolves a task's prerequisite closure and the [`Executor`]
//! runs it, one action at a time.

pub mod catalog;
mod executor;
mod graph;
#[cfg(test)]
pub(crate) mod testing;
pub mod tools;

pub use catalog::build_catalog;
pub use executor::Executor;
pub use graph::TaskGraph;

use crate::guards::Guard;
use crate::image::ImageOp;
use crate::release::BumpKind;
use serde::Serialize;
use std::path::PathBuf;
use tools::ToolCommand;

/// What a task does once its prerequisites and guard have passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Action {
  /// Aggregate or guard-only task
  None,
  Tool { command: ToolCommand },
  /// Delete files or directories relative to the project root
  RemovePaths { paths: Vec<PathBuf> },
  /// Wipe `output_dir`, then run `command` to produce it again
  Regenerate { output_dir: PathBuf, command: ToolCommand },
  Bump { bump: BumpKind },
  Image { op: ImageOp },
}

impl Action {
  pub fn tool(command: ToolCommand) -> Self {
    Action::Tool { command }
  }

  /// The external command this action runs, if any
  pub fn command(&self) -> Option<&ToolCommand> {
    match self {
      Action::Tool { command } | Action::Regenerate { command, .. } => Some(command),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Task {
  pub name: String,
  /// Run before this task, in this order
  pub prerequisites: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub guard: Option<Guard>,
  pub action: Action,
  pub description: String,
}

impl Task {
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      prerequisites: Vec::new(),
      guard: None,
      action: Action::None,
      description: description.into(),
    }
  }

  pub fn requires<I, S>(mut self, prerequisites: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
    self
  }

  pub fn guarded(mut self, guard: Guard) -> Self {
    self.guard = Some(guard);
    self
  }

  pub fn runs(mut self, action: Action) -> Self {
    self.action = action;
    self
  }
}
