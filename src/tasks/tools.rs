//! External tool invocation
//!
//! Lint, test, docs, publish, bump tools and the container engine are all opaque
//! subprocesses. The executor only cares whether they succeeded.

use crate::core::error::{ShipError, ShipResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A program with arguments and extra environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCommand {
  pub program: String,
  pub args: Vec<String>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub env: BTreeMap<String, String>,
}

impl ToolCommand {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      env: BTreeMap::new(),
    }
  }

  /// Build from an argv list such as `["cargo", "test"]`
  pub fn from_argv(argv: &[String]) -> Option<Self> {
    let (program, args) = argv.split_first()?;
    Some(Self::new(program.clone()).args(args.iter().cloned()))
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }
}

impl fmt::Display for ToolCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (key, value) in &self.env {
      write!(f, "{}={} ", key, value)?;
    }
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      if arg.contains(char::is_whitespace) {
        write!(f, " \"{}\"", arg)?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    Ok(())
  }
}

/// Captured result of a quiet query command
#[derive(Debug, Clone, Default)]
pub struct Captured {
  pub success: bool,
  pub stdout: String,
}

/// Runs external tools
pub trait ToolRunner {
  /// Run to completion with inherited stdio.
  /// Non-success becomes `ShipError::Tool { task, status }`.
  fn run(&self, task: &str, command: &ToolCommand) -> ShipResult<()>;

  /// Run quietly, capturing stdout; exit status is reported, not raised
  fn capture(&self, command: &ToolCommand) -> ShipResult<Captured>;
}

/// Spawns real processes from the project root
pub struct SystemToolRunner {
  root: PathBuf,
}

impl SystemToolRunner {
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
    }
  }

  fn command(&self, command: &ToolCommand) -> Command {
    let mut cmd = Command::new(&command.program);
    cmd.current_dir(&self.root).args(&command.args).envs(&command.env);
    cmd
  }

  fn spawn_error(command: &ToolCommand, err: std::io::Error) -> ShipError {
    if err.kind() == std::io::ErrorKind::NotFound {
      ShipError::with_help(
        format!("Failed to execute `{}`: program not found", command.program),
        format!("Install `{}` or override the task's `run` in ship.toml", command.program),
      )
    } else {
      ShipError::message(format!("Failed to execute `{}`: {}", command, err))
    }
  }
}

impl ToolRunner for SystemToolRunner {
  fn run(&self, task: &str, command: &ToolCommand) -> ShipResult<()> {
    tracing::debug!(task, "executing: {}", command);

    let status = self
      .command(command)
      .status()
      .map_err(|e| Self::spawn_error(command, e))?;

    if !status.success() {
      return Err(ShipError::tool(task, status.code().unwrap_or(-1)));
    }
    Ok(())
  }

  fn capture(&self, command: &ToolCommand) -> ShipResult<Captured> {
    tracing::trace!("capturing: {}", command);

    let output = self
      .command(command)
      .output()
      .map_err(|e| Self::spawn_error(command, e))?;

    Ok(Captured {
      success: output.status.success(),
      stdout: String::from_utf8_lossy(&output.stdout).to_string(),
    })
  }
}
