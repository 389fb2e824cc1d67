//! Project context - build once, pass everywhere
//!
//! ```text
//! main.rs:
//!   ShipContext::build() -> &ShipContext
//!   |
//!   v
//! commands/run.rs, release.rs, ...:
//!   ctx.with_executor(|executor| ...)
//! ```
//!
//! The context owns the long-lived collaborators (git, tool runner, config).
//! Everything that borrows them (bumper, image runtime, executor) is assembled
//! per command in [`ShipContext::with_executor`].

use crate::core::config::{BumperKind, ShipConfig};
use crate::core::error::ShipResult;
use crate::core::vcs::SystemGit;
use crate::guards::GuardEvaluator;
use crate::image::{DockerCli, ImageManager};
use crate::release::{BumpController, CommandBumper, ManifestBumper, VersionBumper};
use crate::tasks::tools::SystemToolRunner;
use crate::tasks::{Executor, TaskGraph, build_catalog};
use std::path::{Path, PathBuf};

pub struct ShipContext {
  /// Repository work tree root (absolute path)
  pub root: PathBuf,

  pub config: ShipConfig,

  pub git: SystemGit,

  pub runner: SystemToolRunner,
}

impl ShipContext {
  /// Open the repository containing `cwd` and load its configuration.
  ///
  /// `config_path` overrides the ship.toml search.
  pub fn build(cwd: &Path, config_path: Option<&Path>) -> ShipResult<Self> {
    let git = SystemGit::open(cwd)?;
    let root = git.work_tree().to_path_buf();

    let config = match config_path {
      Some(path) => ShipConfig::load_file(path)?,
      None => ShipConfig::discover(&root)?,
    };

    Ok(Self {
      runner: SystemToolRunner::new(&root),
      root,
      config,
      git,
    })
  }

  /// Task graph for this project (built-ins plus `[tasks]`)
  pub fn task_graph(&self) -> ShipResult<TaskGraph> {
    TaskGraph::new(build_catalog(&self.config)?)
  }

  /// Wire the executor against the real collaborators and hand it to `f`
  pub fn with_executor<T>(&self, f: impl FnOnce(&mut Executor<'_>) -> ShipResult<T>) -> ShipResult<T> {
    let graph = self.task_graph()?;

    let manifest_bumper;
    let command_bumper;
    let bumper: &dyn VersionBumper = match self.config.version.bumper {
      BumperKind::Manifest => {
        manifest_bumper = ManifestBumper::new(&self.git, &self.config.version);
        &manifest_bumper
      }
      BumperKind::Command => {
        command_bumper = CommandBumper::new(&self.runner, &self.config.version);
        &command_bumper
      }
    };

    let docker = DockerCli::new(&self.runner, &self.config.image, &self.root);

    let mut executor = Executor::new(
      graph,
      &self.root,
      GuardEvaluator::new(&self.git, &self.git),
      &self.runner,
      BumpController::new(&self.git, bumper, &self.config.vcs),
      ImageManager::new(&docker, &self.config.image, &self.root),
    );

    f(&mut executor)
  }
}
