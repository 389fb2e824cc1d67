//! Error types for cargo-ship with contextual messages and exit codes
//!
//! Every failure that can abort a pipeline is a variant here. Guard failures and
//! cycles are raised before the failing branch performs any side effect; tool
//! failures may happen after earlier steps already ran and are never compensated.

use crate::image::ImageState;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for cargo-ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, unknown task, task cycle)
  User,
  /// System error (git, I/O)
  System,
  /// A guard rejected the pipeline
  Validation,
  /// An external tool failed; its status is propagated
  Tool(i32),
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    match self {
      ExitCode::User => 1,
      ExitCode::System => 2,
      ExitCode::Validation => 3,
      // A zero status can't signal failure
      ExitCode::Tool(0) => 1,
      ExitCode::Tool(status) => status,
    }
  }
}

/// Main error type for cargo-ship
#[derive(Debug)]
pub enum ShipError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// A precondition guard failed
  Guard(GuardError),

  /// The task graph contains a prerequisite cycle through `task`
  Cycle { task: String },

  /// No task with this name exists
  UnknownTask { name: String },

  /// An external tool reported non-success
  Tool { task: String, status: i32 },

  /// Image operation is not valid in the current image state
  Docker { operation: String, state: ImageState },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Shorthand for an external tool failure
  pub fn tool(task: impl Into<String>, status: i32) -> Self {
    ShipError::Tool {
      task: task.into(),
      status,
    }
  }

  /// Shorthand for an image state violation
  pub fn docker(operation: impl Into<String>, state: ImageState) -> Self {
    ShipError::Docker {
      operation: operation.into(),
      state,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipError::Message { message, context, help } => ShipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ShipError::Io(err) => ShipError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ShipError::Config(_) => ExitCode::User,
      ShipError::Git(_) => ExitCode::System,
      ShipError::Guard(_) => ExitCode::Validation,
      ShipError::Cycle { .. } => ExitCode::User,
      ShipError::UnknownTask { .. } => ExitCode::User,
      ShipError::Tool { status, .. } => ExitCode::Tool(*status),
      ShipError::Docker { .. } => ExitCode::User,
      ShipError::Io(_) => ExitCode::System,
      ShipError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipError::Config(e) => e.help_message(),
      ShipError::Git(e) => e.help_message(),
      ShipError::Guard(e) => e.help_message(),
      ShipError::Cycle { .. } => {
        Some("Run `cargo ship list` to see the cycle and fix `prerequisites` in ship.toml.".to_string())
      }
      ShipError::UnknownTask { .. } => Some("Run `cargo ship list` to see the available tasks.".to_string()),
      ShipError::Docker { state, .. } => match state {
        ImageState::Absent => Some("Build the image first with `cargo ship image-build`.".to_string()),
        ImageState::Archived => Some("Load the archived image with `cargo ship image-load`.".to_string()),
        ImageState::Running => Some("Stop the running container with `cargo ship image-stop`.".to_string()),
        ImageState::Building => Some("Wait for the running build to finish.".to_string()),
        ImageState::Built => None,
      },
      ShipError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ShipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipError::Config(e) => write!(f, "{}", e),
      ShipError::Git(e) => write!(f, "{}", e),
      ShipError::Guard(e) => write!(f, "{}", e),
      ShipError::Cycle { task } => write!(f, "Prerequisite cycle detected at task '{}'", task),
      ShipError::UnknownTask { name } => write!(f, "Unknown task '{}'", name),
      ShipError::Tool { task, status } => write!(f, "Task '{}' failed with exit status {}", task, status),
      ShipError::Docker { operation, state } => {
        write!(f, "Cannot {} image while it is {}", operation, state)
      }
      ShipError::Io(e) => write!(f, "I/O error: {}", e),
      ShipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipError {
  fn from(err: io::Error) -> Self {
    ShipError::Io(err)
  }
}

impl From<String> for ShipError {
  fn from(msg: String) -> Self {
    ShipError::message(msg)
  }
}

impl From<&str> for ShipError {
  fn from(msg: &str) -> Self {
    ShipError::message(msg)
  }
}

impl From<toml_edit::TomlError> for ShipError {
  fn from(err: toml_edit::TomlError) -> Self {
    ShipError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ShipError {
  fn from(err: toml_edit::de::Error) -> Self {
    ShipError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ShipError {
  fn from(err: serde_json::Error) -> Self {
    ShipError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for ShipError {
  fn from(err: semver::Error) -> Self {
    ShipError::message(format!("Invalid version: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ShipError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ShipError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit --config path does not exist
  NotFound { path: PathBuf },

  /// A task lists a prerequisite that is not defined
  UnknownPrerequisite { task: String, prerequisite: String },

  /// A task definition is unusable
  InvalidTask { task: String, reason: String },

  /// Invalid value for a field
  InvalidField { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Omit --config to use ship.toml discovery and defaults.".to_string()),
      ConfigError::UnknownPrerequisite { prerequisite, .. } => Some(format!(
        "Define `[tasks.{}]` in ship.toml or remove it from the prerequisites.",
        prerequisite
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => {
        write!(f, "Configuration file not found: {}", path.display())
      }
      ConfigError::UnknownPrerequisite { task, prerequisite } => {
        write!(f, "Task '{}' lists unknown prerequisite '{}'", task, prerequisite)
      }
      ConfigError::InvalidTask { task, reason } => {
        write!(f, "Invalid task '{}': {}", task, reason)
      }
      ConfigError::InvalidField { field, reason } => {
        write!(f, "Invalid config field '{}': {}", field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Merge did not complete cleanly
  MergeFailed { from: String, into: String, reason: String },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull first, then re-run the release.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your SSH key permissions and remote access.".to_string())
        } else {
          None
        }
      }
      GitError::MergeFailed { into, .. } => Some(format!(
        "Resolve the merge on '{}' by hand (or `git merge --abort`), then re-run.",
        into
      )),
      GitError::RepoNotFound { path } => Some(format!(
        "Run cargo ship inside a git repository (looked in {}).",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::MergeFailed { from, into, reason } => {
        write!(f, "Merging '{}' into '{}' failed: {}", from, into, reason)
      }
      GitError::PushFailed { remote, branch, reason } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason)
      }
    }
  }
}

/// Guard failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
  /// Current branch is not the expected one
  WrongBranch { actual: String, expected: String },

  /// The changelog has no changes against the remote reference
  MissingChangelog { path: PathBuf, remote_ref: String },
}

impl GuardError {
  fn help_message(&self) -> Option<String> {
    match self {
      GuardError::WrongBranch { expected, .. } => Some(format!("Run `git checkout {}` and try again.", expected)),
      GuardError::MissingChangelog { path, .. } => Some(format!(
        "Describe this release in {} before releasing.",
        path.display()
      )),
    }
  }
}

impl fmt::Display for GuardError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GuardError::WrongBranch { actual, expected } => {
        write!(f, "Releases must run on '{}', but the current branch is '{}'", expected, actual)
      }
      GuardError::MissingChangelog { path, remote_ref } => {
        write!(f, "{} has no changes against {}", path.display(), remote_ref)
      }
    }
  }
}

/// Result type alias for cargo-ship
pub type ShipResult<T> = Result<T, ShipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ShipError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for ShipError {
  fn from(err: anyhow::Error) -> Self {
    ShipError::message(err.to_string())
  }
}
