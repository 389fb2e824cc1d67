use crate::commands::run_release;
use crate::core::context::ShipContext;
use crate::core::error::ShipResult;
use crate::release::ReleaseCommand;

/// Run `name` with its prerequisite closure
///
/// Release command names are routed to the orchestrator, so `cargo ship run
/// release` and `cargo ship release` are the same thing.
pub fn run_task(ctx: &ShipContext, name: &str) -> ShipResult<()> {
  if let Some(command) = ReleaseCommand::from_name(name) {
    return run_release(ctx, command);
  }

  let report = ctx.with_executor(|executor| executor.run(name))?;

  println!(
    "\n✅ {} complete ({} task{})",
    name,
    report.executed.len(),
    if report.executed.len() == 1 { "" } else { "s" }
  );
  Ok(())
}
