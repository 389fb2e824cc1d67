//! CLI commands for cargo-ship
//!
//! ## Running
//! - **run**: run a task and its prerequisites (every task subcommand lands here)
//! - **release**: the composite release commands
//!
//! ## Inspection
//! - **list**: every task and release command, plus prerequisite cycles
//! - **plan**: what a task or release command would execute, without running it
//! - **version**: the manifest version and what each bump would produce
//!
//! All commands accept `&ShipContext` so config and git are opened once.

pub mod list;
pub mod plan;
pub mod release;
pub mod run;
pub mod version;

pub use list::run_list;
pub use plan::run_plan;
pub use release::run_release;
pub use run::run_task;
pub use version::run_version;

use crate::tasks::Action;

/// One-line human description of an action
pub(crate) fn describe_action(action: &Action) -> String {
  match action {
    Action::None => "-".to_string(),
    Action::Tool { command } => command.to_string(),
    Action::RemovePaths { paths } => {
      let paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
      format!("remove {}", paths.join(", "))
    }
    Action::Regenerate { output_dir, command } => format!("rm -r {} && {}", output_dir.display(), command),
    Action::Bump { bump } => format!("bump {}", bump),
    Action::Image { op } => format!("image {}", op.name()),
  }
}
