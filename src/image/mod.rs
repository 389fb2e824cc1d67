//! Runnable environment image lifecycle
//!
//! ```text
//! absent --build--> built --save--> archived --load--> built
//! built --run|start--> running --stop--> built
//! ```
//!
//! `push` needs at least `built`. The image itself lives in the container
//! engine; the manager observes it once per session and then tracks the
//! transitions it performs.

mod docker;
mod manager;

pub use docker::DockerCli;
pub use manager::ImageManager;

use crate::core::error::ShipResult;
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageState {
  Absent,
  /// A build of this tag is in progress
  Building,
  Built,
  Archived,
  Running,
}

impl ImageState {
  /// Built or any state reachable from built
  pub fn is_at_least_built(self) -> bool {
    matches!(self, ImageState::Built | ImageState::Archived | ImageState::Running)
  }
}

impl fmt::Display for ImageState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ImageState::Absent => "absent",
      ImageState::Building => "building",
      ImageState::Built => "built",
      ImageState::Archived => "archived",
      ImageState::Running => "running",
    };
    write!(f, "{}", s)
  }
}

/// Image operations exposed as `image-*` tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOp {
  Build,
  Save,
  Load,
  /// Foreground, interactive
  Run,
  /// Detached
  Start,
  Stop,
  Push,
}

impl ImageOp {
  pub const ALL: [ImageOp; 7] = [
    ImageOp::Build,
    ImageOp::Save,
    ImageOp::Load,
    ImageOp::Run,
    ImageOp::Start,
    ImageOp::Stop,
    ImageOp::Push,
  ];

  pub fn name(self) -> &'static str {
    match self {
      ImageOp::Build => "build",
      ImageOp::Save => "save",
      ImageOp::Load => "load",
      ImageOp::Run => "run",
      ImageOp::Start => "start",
      ImageOp::Stop => "stop",
      ImageOp::Push => "push",
    }
  }

  pub fn task_name(self) -> String {
    format!("image-{}", self.name())
  }
}

/// Container engine operations on the configured image
pub trait ImageRuntime {
  /// Current state of the image as the engine sees it
  fn observe(&self) -> ShipResult<ImageState>;

  /// Build the image; holds the build lock for the duration
  fn build(&self) -> ShipResult<()>;

  fn save(&self, archive: &Path) -> ShipResult<()>;

  fn load(&self, archive: &Path) -> ShipResult<()>;

  /// Start a container; `detach` picks daemon over foreground
  fn run(&self, detach: bool) -> ShipResult<()>;

  fn stop(&self) -> ShipResult<()>;

  fn push(&self, alias: &str) -> ShipResult<()>;
}
