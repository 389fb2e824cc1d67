//! Composite release commands
//!
//! ```text
//! release           = check-release → bump-release → publish → bump-patch
//! release-candidate = check-master → publish → bump-candidate
//! release-minor     = check-release → bump-minor → release
//! release-major     = check-release → bump-major → release
//! ```
//!
//! Every step is a separate executor run, so deduplication is per step and the
//! nested `release` evaluates its guards again. A failed step stops the
//! pipeline; whatever was already published stays published.

use super::bump::BumpKind;
use crate::core::error::ShipResult;
use crate::tasks::Executor;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseCommand {
  Release,
  ReleaseCandidate,
  ReleaseMinor,
  ReleaseMajor,
}

impl ReleaseCommand {
  pub const ALL: [ReleaseCommand; 4] = [
    ReleaseCommand::Release,
    ReleaseCommand::ReleaseCandidate,
    ReleaseCommand::ReleaseMinor,
    ReleaseCommand::ReleaseMajor,
  ];

  pub fn name(self) -> &'static str {
    match self {
      ReleaseCommand::Release => "release",
      ReleaseCommand::ReleaseCandidate => "release-candidate",
      ReleaseCommand::ReleaseMinor => "release-minor",
      ReleaseCommand::ReleaseMajor => "release-major",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|c| c.name() == name)
  }

  pub fn description(self) -> &'static str {
    match self {
      ReleaseCommand::Release => "Tag the current candidate as a release, publish it, open the next patch",
      ReleaseCommand::ReleaseCandidate => "Publish the next release candidate from trunk",
      ReleaseCommand::ReleaseMinor => "Bump the minor version, then release",
      ReleaseCommand::ReleaseMajor => "Bump the major version, then release",
    }
  }

  /// Task runs this command performs, nested `release` expanded
  pub fn steps(self) -> Vec<String> {
    match self {
      ReleaseCommand::Release => vec![
        "check-release".to_string(),
        BumpKind::Release.task_name(),
        "publish".to_string(),
        BumpKind::Patch.task_name(),
      ],
      ReleaseCommand::ReleaseCandidate => vec![
        "check-master".to_string(),
        "publish".to_string(),
        BumpKind::Candidate.task_name(),
      ],
      ReleaseCommand::ReleaseMinor | ReleaseCommand::ReleaseMajor => {
        let bump = if self == ReleaseCommand::ReleaseMinor {
          BumpKind::Minor
        } else {
          BumpKind::Major
        };
        let mut steps = vec!["check-release".to_string(), bump.task_name()];
        steps.extend(ReleaseCommand::Release.steps());
        steps
      }
    }
  }
}

impl fmt::Display for ReleaseCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// What a release command ran before it finished or failed
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReleaseReport {
  /// Executor runs, in order
  pub steps: Vec<String>,
  /// Every task executed across all steps
  pub executed: Vec<String>,
}

pub struct ReleaseOrchestrator<'e, 'a> {
  executor: &'e mut Executor<'a>,
  report: ReleaseReport,
}

impl<'e, 'a> ReleaseOrchestrator<'e, 'a> {
  pub fn new(executor: &'e mut Executor<'a>) -> Self {
    Self {
      executor,
      report: ReleaseReport::default(),
    }
  }

  pub fn run(mut self, command: ReleaseCommand) -> ShipResult<ReleaseReport> {
    println!("🚀 {}: {}", command, command.steps().join(" → "));

    match command {
      ReleaseCommand::Release => self.release()?,
      ReleaseCommand::ReleaseCandidate => self.release_candidate()?,
      ReleaseCommand::ReleaseMinor => self.bump_then_release(BumpKind::Minor)?,
      ReleaseCommand::ReleaseMajor => self.bump_then_release(BumpKind::Major)?,
    }

    println!("\n✅ {} complete", command);
    Ok(self.report)
  }

  fn release(&mut self) -> ShipResult<()> {
    self.step("check-release")?;
    self.step(&BumpKind::Release.task_name())?;
    self.step("publish")?;
    self.step(&BumpKind::Patch.task_name())
  }

  fn release_candidate(&mut self) -> ShipResult<()> {
    self.step("check-master")?;
    self.step("publish")?;
    self.step(&BumpKind::Candidate.task_name())
  }

  fn bump_then_release(&mut self, bump: BumpKind) -> ShipResult<()> {
    self.step("check-release")?;
    self.step(&bump.task_name())?;
    self.release()
  }

  fn step(&mut self, task: &str) -> ShipResult<()> {
    tracing::debug!("release step: {}", task);
    let run = self.executor.run(task)?;
    self.report.steps.push(task.to_string());
    self.report.executed.extend(run.executed);
    Ok(())
  }
}
