//! Version arithmetic used by the manifest bumper
//!
//! Versions are semver with an optional candidate pre-release written as
//! `<label>.<counter>` (e.g. `1.4.0-rc.2`). Patch, minor and major bumps open a
//! new candidate series at counter 0, so the next `release` bump always has a
//! pre-release to clear.

use super::bump::BumpKind;
use crate::core::error::{ShipError, ShipResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
  pub major: u64,
  pub minor: u64,
  pub patch: u64,
  /// Candidate counter; `None` for a final release
  pub candidate: Option<u64>,
  label: String,
}

impl ReleaseVersion {
  pub fn new(major: u64, minor: u64, patch: u64, candidate: Option<u64>, label: impl Into<String>) -> Self {
    Self {
      major,
      minor,
      patch,
      candidate,
      label: label.into(),
    }
  }

  /// Parse `text`, accepting only `<label>.<n>` pre-releases
  pub fn parse(text: &str, label: &str) -> ShipResult<Self> {
    let version = semver::Version::parse(text.trim())?;

    if !version.build.is_empty() {
      return Err(ShipError::message(format!(
        "Version '{}' carries build metadata, which cargo-ship does not manage",
        text
      )));
    }

    let candidate = if version.pre.is_empty() {
      None
    } else {
      let pre = version.pre.as_str();
      let counter = pre
        .split_once('.')
        .filter(|(l, _)| *l == label)
        .and_then(|(_, n)| n.parse::<u64>().ok())
        .ok_or_else(|| {
          ShipError::with_help(
            format!("Unsupported pre-release '{}' in version '{}'", pre, text),
            format!("Candidate versions must look like 1.2.3-{}.0", label),
          )
        })?;
      Some(counter)
    };

    Ok(Self::new(version.major, version.minor, version.patch, candidate, label))
  }

  pub fn is_candidate(&self) -> bool {
    self.candidate.is_some()
  }

  /// Apply one bump
  pub fn bumped(&self, kind: BumpKind) -> ShipResult<Self> {
    let next = match kind {
      BumpKind::Release => {
        if !self.is_candidate() {
          return Err(ShipError::with_help(
            format!("Version {} has no pre-release to clear", self),
            "Bump patch, minor or major first to open a candidate series",
          ));
        }
        Self::new(self.major, self.minor, self.patch, None, &self.label)
      }
      BumpKind::Patch => Self::new(
        self.major,
        self.minor,
        self.increment("patch", self.patch)?,
        Some(0),
        &self.label,
      ),
      BumpKind::Minor => Self::new(self.major, self.increment("minor", self.minor)?, 0, Some(0), &self.label),
      BumpKind::Major => Self::new(self.increment("major", self.major)?, 0, 0, Some(0), &self.label),
      BumpKind::Candidate => Self::new(
        self.major,
        self.minor,
        self.patch,
        Some(self.increment("candidate", self.candidate.unwrap_or(0))?),
        &self.label,
      ),
    };
    Ok(next)
  }

  fn increment(&self, field: &str, value: u64) -> ShipResult<u64> {
    value.checked_add(1).ok_or_else(|| {
      ShipError::with_help(
        format!("Cannot bump the {} number of {}: it is already at the maximum", field, self),
        format!("Set a smaller {} number in the manifest by hand", field),
      )
    })
  }
}

impl fmt::Display for ReleaseVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
    if let Some(counter) = self.candidate {
      write!(f, "-{}.{}", self.label, counter)?;
    }
    Ok(())
  }
}
