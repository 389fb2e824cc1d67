use crate::core::context::ShipContext;
use crate::core::error::ShipResult;
use crate::release::{ReleaseCommand, ReleaseOrchestrator};

/// Run one of the composite release commands
pub fn run_release(ctx: &ShipContext, command: ReleaseCommand) -> ShipResult<()> {
  let report = ctx.with_executor(|executor| ReleaseOrchestrator::new(executor).run(command))?;
  tracing::debug!("{} executed: {}", command, report.executed.join(", "));
  Ok(())
}
