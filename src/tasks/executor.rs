use super::{Action, Task, TaskGraph};
use crate::core::error::{ResultExt, ShipResult};
use crate::guards::GuardEvaluator;
use crate::image::ImageManager;
use crate::release::BumpController;
use crate::tasks::tools::ToolRunner;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Tasks executed by one [`Executor::run`] call, in execution order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
  pub executed: Vec<String>,
}

/// Runs a task's prerequisite closure, then the task, strictly one at a time.
///
/// Stops at the first guard or action failure; completed actions are not undone.
pub struct Executor<'a> {
  graph: TaskGraph,
  root: PathBuf,
  guards: GuardEvaluator<'a>,
  runner: &'a dyn ToolRunner,
  bumps: BumpController<'a>,
  images: ImageManager<'a>,
}

impl<'a> Executor<'a> {
  pub fn new(
    graph: TaskGraph,
    root: &Path,
    guards: GuardEvaluator<'a>,
    runner: &'a dyn ToolRunner,
    bumps: BumpController<'a>,
    images: ImageManager<'a>,
  ) -> Self {
    Self {
      graph,
      root: root.to_path_buf(),
      guards,
      runner,
      bumps,
      images,
    }
  }

  pub fn run(&mut self, name: &str) -> ShipResult<RunReport> {
    // Resolution fails on cycles before anything runs
    let plan: Vec<Task> = self.graph.resolve(name)?.into_iter().cloned().collect();
    let total = plan.len();
    let mut report = RunReport::default();

    for (i, task) in plan.iter().enumerate() {
      println!("📌 [{}/{}] {}", i + 1, total, task.name);

      if let Some(guard) = &task.guard {
        self.guards.evaluate(guard)?;
        println!("   ✅ {}", guard);
      }
      self.perform(task)?;
      report.executed.push(task.name.clone());
    }

    Ok(report)
  }

  fn perform(&mut self, task: &Task) -> ShipResult<()> {
    match &task.action {
      Action::None => Ok(()),
      Action::Tool { command } => self.runner.run(&task.name, command),
      Action::RemovePaths { paths } => paths.iter().try_for_each(|path| self.remove(path)),
      Action::Regenerate { output_dir, command } => {
        self.remove(output_dir)?;
        self.runner.run(&task.name, command)
      }
      Action::Bump { bump } => self.bumps.bump(*bump),
      Action::Image { op } => self.images.perform(*op),
    }
  }

  /// Delete a file or directory under the root; missing paths are fine
  fn remove(&self, relative: &Path) -> ShipResult<()> {
    let path = self.root.join(relative);
    if path.is_dir() {
      fs::remove_dir_all(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    } else if path.exists() {
      fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    } else {
      tracing::debug!("nothing to remove at {}", path.display());
      return Ok(());
    }
    println!("   Removed {}", relative.display());
    Ok(())
  }
}
