use crate::commands::describe_action;
use crate::core::context::ShipContext;
use crate::core::error::ShipResult;
use crate::release::ReleaseCommand;
use crate::tasks::{Task, TaskGraph};
use serde::Serialize;

/// One executor run and the tasks it would execute
#[derive(Debug, Serialize)]
pub struct PlannedRun<'g> {
  pub run: String,
  pub tasks: Vec<&'g Task>,
}

/// Expand a task or release command into executor runs
pub fn plan<'g>(graph: &'g TaskGraph, name: &str) -> ShipResult<Vec<PlannedRun<'g>>> {
  let runs = match ReleaseCommand::from_name(name) {
    Some(command) => command.steps(),
    None => vec![name.to_string()],
  };

  runs
    .into_iter()
    .map(|run| {
      let tasks = graph.resolve(&run)?;
      Ok(PlannedRun { run, tasks })
    })
    .collect()
}

/// Show what `name` would execute, without running anything
pub fn run_plan(ctx: &ShipContext, name: &str, json: bool) -> ShipResult<()> {
  let graph = ctx.task_graph()?;
  let runs = plan(&graph, name)?;

  if json {
    let output = serde_json::json!({
      "target": name,
      "runs": runs,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  println!("📋 Plan for '{}'\n", name);
  for planned in &runs {
    if runs.len() > 1 {
      println!("▶ {}", planned.run);
    }
    for (i, task) in planned.tasks.iter().enumerate() {
      println!("  {}. {}", i + 1, task.name);
      if let Some(guard) = &task.guard {
        println!("     guard: {}", guard);
      }
      println!("     action: {}", describe_action(&task.action));
    }
  }

  let total: usize = runs.iter().map(|r| r.tasks.len()).sum();
  println!("\n{} task run(s); nothing was executed", total);
  Ok(())
}
