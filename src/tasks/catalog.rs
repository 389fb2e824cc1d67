//! Built-in task catalog and `[tasks]` overrides

use super::tools::ToolCommand;
use super::{Action, Task};
use crate::core::config::{ShipConfig, TaskConfig};
use crate::core::error::{ConfigError, ShipError, ShipResult};
use crate::guards::Guard;
use crate::image::ImageOp;
use crate::release::{BumpKind, ReleaseCommand};
use std::collections::BTreeMap;

fn cargo<const N: usize>(args: [&str; N]) -> ToolCommand {
  ToolCommand::new("cargo").args(args)
}

/// Tasks every project gets, shaped by config
fn builtin_tasks(config: &ShipConfig) -> Vec<Task> {
  let trunk = config.vcs.trunk.as_str();
  let branch_guard = Guard::branch(trunk);
  let changelog_guard = Guard::changelog(config.changelog.path.clone(), config.changelog_remote_ref());

  let mut tasks = vec![
    Task::new("clean-build", "Remove build artifacts").runs(Action::tool(cargo(["clean"]))),
    Task::new("clean-test", "Remove the test sandbox").runs(Action::RemovePaths {
      paths: vec![config.test.sandbox_dir.clone()],
    }),
    Task::new("clean", "Remove build artifacts and the test sandbox").requires(["clean-build", "clean-test"]),
    Task::new("install", "Install the binary from a clean tree")
      .requires(["clean"])
      .runs(Action::tool(cargo(["install", "--path", ".", "--locked"]))),
    Task::new("lint", "Run clippy with warnings denied").runs(Action::tool(cargo([
      "clippy",
      "--all-targets",
      "--",
      "-D",
      "warnings",
    ]))),
    Task::new("test", "Run the test suite in a fresh sandbox")
      .requires(["clean-test"])
      .runs(Action::tool(cargo(["test"]).env(
        config.test.sandbox_env.as_str(),
        config.test.sandbox_dir.display().to_string(),
      ))),
    Task::new("docs", "Regenerate documentation from scratch").runs(Action::Regenerate {
      output_dir: config.docs.output_dir.clone(),
      command: ToolCommand::from_argv(&config.docs.command).unwrap_or_else(|| cargo(["doc", "--no-deps"])),
    }),
    Task::new("publish", "Build and upload the package").runs(Action::tool(cargo(["publish"]))),
    Task::new("check-master", format!("Require the '{}' branch", trunk)).guarded(branch_guard.clone()),
    Task::new("check-history", "Require an updated changelog").guarded(changelog_guard.clone()),
    Task::new("check-release", "Require the trunk branch and an updated changelog")
      .guarded(Guard::all(vec![branch_guard, changelog_guard])),
  ];

  for kind in BumpKind::ALL {
    tasks.push(Task::new(kind.task_name(), bump_description(kind)).runs(Action::Bump { bump: kind }));
  }

  for op in ImageOp::ALL {
    tasks.push(Task::new(op.task_name(), image_description(op)).runs(Action::Image { op }));
  }

  tasks
}

fn bump_description(kind: BumpKind) -> &'static str {
  match kind {
    BumpKind::Release => "Finalize the version on the release branch and tag it",
    BumpKind::Patch => "Merge the release back to trunk and open the next patch",
    BumpKind::Minor => "Bump the minor version on trunk",
    BumpKind::Major => "Bump the major version on trunk",
    BumpKind::Candidate => "Bump the release candidate on the current branch",
  }
}

fn image_description(op: ImageOp) -> &'static str {
  match op {
    ImageOp::Build => "Build the environment image",
    ImageOp::Save => "Save the image to an archive",
    ImageOp::Load => "Load the image from its archive",
    ImageOp::Run => "Run the image in the foreground",
    ImageOp::Start => "Start the image in the background",
    ImageOp::Stop => "Stop the running container",
    ImageOp::Push => "Push the image under every registry alias",
  }
}

/// Built-in catalog with ship.toml `[tasks]` applied on top
pub fn build_catalog(config: &ShipConfig) -> ShipResult<Vec<Task>> {
  let mut tasks: BTreeMap<String, Task> = builtin_tasks(config)
    .into_iter()
    .map(|task| (task.name.clone(), task))
    .collect();

  for (name, overrides) in &config.tasks {
    if ReleaseCommand::from_name(name).is_some() {
      return Err(invalid(name, "name is reserved for a release command"));
    }

    let task = match tasks.remove(name) {
      Some(builtin) => apply_override(builtin, overrides)?,
      None => define_task(name, overrides)?,
    };
    tasks.insert(name.clone(), task);
  }

  Ok(tasks.into_values().collect())
}

fn invalid(task: &str, reason: impl Into<String>) -> ShipError {
  ShipError::Config(ConfigError::InvalidTask {
    task: task.to_string(),
    reason: reason.into(),
  })
}

fn command_from(name: &str, config: &TaskConfig, argv: &[String]) -> ShipResult<ToolCommand> {
  let mut command = ToolCommand::from_argv(argv).ok_or_else(|| invalid(name, "`run` must not be empty"))?;
  command.env.extend(config.env.clone());
  Ok(command)
}

/// Replace the fields an override sets; unset fields keep the built-in values
fn apply_override(mut task: Task, config: &TaskConfig) -> ShipResult<Task> {
  if let Some(prerequisites) = &config.prerequisites {
    task.prerequisites = prerequisites.clone();
  }
  if let Some(description) = &config.description {
    task.description = description.clone();
  }

  let Some(argv) = &config.run else {
    match &mut task.action {
      Action::Tool { command } | Action::Regenerate { command, .. } => command.env.extend(config.env.clone()),
      _ if !config.env.is_empty() => return Err(invalid(&task.name, "`env` needs a task that runs a command")),
      _ => {}
    }
    return Ok(task);
  };

  if matches!(task.action, Action::Bump { .. } | Action::Image { .. }) {
    return Err(invalid(&task.name, "built-in bump and image tasks cannot be given a command"));
  }

  let replacement = command_from(&task.name, config, argv)?;
  if let Action::Regenerate { command, .. } = &mut task.action {
    *command = replacement;
  } else {
    task.action = Action::tool(replacement);
  }

  Ok(task)
}

/// A task that only exists in ship.toml
fn define_task(name: &str, config: &TaskConfig) -> ShipResult<Task> {
  if config.run.is_none() && config.prerequisites.is_none() {
    return Err(invalid(name, "needs `run`, `prerequisites`, or both"));
  }
  if config.run.is_none() && !config.env.is_empty() {
    return Err(invalid(name, "`env` needs `run`"));
  }

  let mut task = Task::new(name, config.description.clone().unwrap_or_default())
    .requires(config.prerequisites.clone().unwrap_or_default());
  if let Some(argv) = &config.run {
    task.action = Action::tool(command_from(name, config, argv)?);
  }
  Ok(task)
}
