use crate::commands::describe_action;
use crate::core::context::ShipContext;
use crate::core::error::ShipResult;
use crate::release::ReleaseCommand;
use crate::tasks::Task;
use serde::Serialize;

#[derive(Serialize)]
struct ReleaseCommandInfo {
  name: &'static str,
  description: &'static str,
  steps: Vec<String>,
}

#[derive(Serialize)]
struct Listing<'g> {
  tasks: Vec<&'g Task>,
  release_commands: Vec<ReleaseCommandInfo>,
  cycles: Vec<Vec<String>>,
}

/// List every task and release command
pub fn run_list(ctx: &ShipContext, json: bool) -> ShipResult<()> {
  let graph = ctx.task_graph()?;

  let listing = Listing {
    tasks: graph.tasks(),
    release_commands: ReleaseCommand::ALL
      .into_iter()
      .map(|command| ReleaseCommandInfo {
        name: command.name(),
        description: command.description(),
        steps: command.steps(),
      })
      .collect(),
    cycles: graph.cycles(),
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&listing)?);
    return Ok(());
  }

  let width = listing
    .tasks
    .iter()
    .map(|t| t.name.len())
    .chain(listing.release_commands.iter().map(|c| c.name.len()))
    .max()
    .unwrap_or(0);

  println!("📋 Tasks\n");
  for task in &listing.tasks {
    println!("  {:width$}  {}", task.name, task.description, width = width);
    if !task.prerequisites.is_empty() {
      println!("  {:width$}    requires: {}", "", task.prerequisites.join(", "), width = width);
    }
    if let Some(guard) = &task.guard {
      println!("  {:width$}    guard: {}", "", guard, width = width);
    }
    if task.action.command().is_some() {
      println!("  {:width$}    runs: {}", "", describe_action(&task.action), width = width);
    }
  }

  println!("\n🚀 Release commands\n");
  for command in &listing.release_commands {
    println!("  {:width$}  {}", command.name, command.description, width = width);
    println!("  {:width$}    steps: {}", "", command.steps.join(" → "), width = width);
  }

  if !listing.cycles.is_empty() {
    println!("\n⚠️  Prerequisite cycles (these tasks cannot run):\n");
    for (i, cycle) in listing.cycles.iter().enumerate() {
      println!("  Cycle {}: {}", i + 1, cycle.join(" → "));
    }
  }

  Ok(())
}
