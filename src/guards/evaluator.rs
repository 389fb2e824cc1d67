use super::{BranchSource, ChangelogSource, Guard};
use crate::core::error::{GuardError, ShipError, ShipResult};

/// Evaluates guards against injected observation ports
pub struct GuardEvaluator<'a> {
  branch: &'a dyn BranchSource,
  changelog: &'a dyn ChangelogSource,
}

impl<'a> GuardEvaluator<'a> {
  pub fn new(branch: &'a dyn BranchSource, changelog: &'a dyn ChangelogSource) -> Self {
    Self { branch, changelog }
  }

  /// Evaluate a guard, querying the ports fresh every time
  pub fn evaluate(&self, guard: &Guard) -> ShipResult<()> {
    match guard {
      Guard::Branch { expected } => {
        let actual = self.branch.current_branch()?;
        tracing::debug!("branch guard: on '{}', expecting '{}'", actual, expected);
        if &actual != expected {
          return Err(ShipError::Guard(GuardError::WrongBranch {
            actual,
            expected: expected.clone(),
          }));
        }
        Ok(())
      }
      Guard::Changelog { path, remote_ref } => {
        let changed = self.changelog.changelog_diff(path, remote_ref)?;
        tracing::debug!("changelog guard: {} differs by {} line(s)", path.display(), changed);
        if changed == 0 {
          return Err(ShipError::Guard(GuardError::MissingChangelog {
            path: path.clone(),
            remote_ref: remote_ref.clone(),
          }));
        }
        Ok(())
      }
      Guard::All { guards } => guards.iter().try_for_each(|g| self.evaluate(g)),
    }
  }
}
