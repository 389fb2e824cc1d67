//! In-memory collaborators for executor and orchestrator tests.
//!
//! Every fake appends to one shared call log so tests can assert the global
//! order of side effects.

use super::tools::{Captured, ToolCommand, ToolRunner};
use super::{Executor, Task, TaskGraph, build_catalog};
use crate::core::config::ShipConfig;
use crate::core::error::{ShipError, ShipResult};
use crate::guards::{BranchSource, ChangelogSource, GuardEvaluator};
use crate::image::{ImageManager, ImageRuntime, ImageState};
use crate::release::BumpController;
use crate::release::bump::tests::{CallLog, FakeBumper, FakeVcs};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

pub(crate) struct FakeRepo {
  branch: RefCell<String>,
  diff: Cell<usize>,
}

impl BranchSource for FakeRepo {
  fn current_branch(&self) -> ShipResult<String> {
    Ok(self.branch.borrow().clone())
  }
}

impl ChangelogSource for FakeRepo {
  fn changelog_diff(&self, _path: &Path, _remote_ref: &str) -> ShipResult<usize> {
    Ok(self.diff.get())
  }
}

/// Logs `run <task>`; fails tasks registered with [`Harness::fail_tool`]
pub(crate) struct LoggingRunner {
  log: CallLog,
  failures: RefCell<HashMap<String, i32>>,
}

impl ToolRunner for LoggingRunner {
  fn run(&self, task: &str, _command: &ToolCommand) -> ShipResult<()> {
    self.log.borrow_mut().push(format!("run {}", task));
    match self.failures.borrow().get(task) {
      Some(&status) => Err(ShipError::tool(task, status)),
      None => Ok(()),
    }
  }

  fn capture(&self, _command: &ToolCommand) -> ShipResult<Captured> {
    Ok(Captured::default())
  }
}

pub(crate) struct FakeImages {
  log: CallLog,
}

impl FakeImages {
  fn record(&self, call: &str) -> ShipResult<()> {
    self.log.borrow_mut().push(format!("image {}", call));
    Ok(())
  }
}

impl ImageRuntime for FakeImages {
  fn observe(&self) -> ShipResult<ImageState> {
    Ok(ImageState::Absent)
  }

  fn build(&self) -> ShipResult<()> {
    self.record("build")
  }

  fn save(&self, _archive: &Path) -> ShipResult<()> {
    self.record("save")
  }

  fn load(&self, _archive: &Path) -> ShipResult<()> {
    self.record("load")
  }

  fn run(&self, detach: bool) -> ShipResult<()> {
    self.record(if detach { "start" } else { "run" })
  }

  fn stop(&self) -> ShipResult<()> {
    self.record("stop")
  }

  fn push(&self, alias: &str) -> ShipResult<()> {
    self.record(&format!("push {}", alias))
  }
}

pub(crate) struct Harness {
  root: tempfile::TempDir,
  log: CallLog,
  pub repo: FakeRepo,
  runner: LoggingRunner,
  vcs: FakeVcs,
  pub bumper: FakeBumper,
  images: FakeImages,
  config: ShipConfig,
}

impl Harness {
  pub fn new(branch: &str, changelog_diff: usize) -> Self {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    Self {
      root: tempfile::TempDir::new().unwrap(),
      repo: FakeRepo {
        branch: RefCell::new(branch.to_string()),
        diff: Cell::new(changelog_diff),
      },
      runner: LoggingRunner {
        log: log.clone(),
        failures: RefCell::new(HashMap::new()),
      },
      vcs: FakeVcs::new(log.clone(), &["master"]),
      bumper: FakeBumper {
        log: log.clone(),
        fail: None,
      },
      images: FakeImages { log: log.clone() },
      config: ShipConfig::default(),
      log,
    }
  }

  pub fn root(&self) -> &Path {
    self.root.path()
  }

  pub fn fail_tool(&self, task: &str, status: i32) {
    self.runner.failures.borrow_mut().insert(task.to_string(), status);
  }

  pub fn calls(&self) -> Vec<String> {
    self.log.borrow().clone()
  }

  pub fn executor(&self, tasks: Vec<Task>) -> Executor<'_> {
    Executor::new(
      TaskGraph::new(tasks).unwrap(),
      self.root.path(),
      GuardEvaluator::new(&self.repo, &self.repo),
      &self.runner,
      BumpController::new(&self.vcs, &self.bumper, &self.config.vcs),
      ImageManager::new(&self.images, &self.config.image, self.root.path()),
    )
  }

  pub fn default_executor(&self) -> Executor<'_> {
    self.executor(build_catalog(&self.config).unwrap())
  }
}
