use super::{ImageOp, ImageRuntime, ImageState};
use crate::core::config::ImageConfig;
use crate::core::error::{ShipError, ShipResult};
use std::path::PathBuf;

/// Enforces the image state machine over an [`ImageRuntime`]
pub struct ImageManager<'a> {
  runtime: &'a dyn ImageRuntime,
  tag: String,
  aliases: Vec<String>,
  archive: PathBuf,
  /// Observed lazily, then tracked
  state: Option<ImageState>,
}

impl<'a> ImageManager<'a> {
  pub fn new(runtime: &'a dyn ImageRuntime, config: &ImageConfig, root: &std::path::Path) -> Self {
    Self {
      runtime,
      tag: config.tag.clone(),
      aliases: config.aliases.clone(),
      archive: root.join(&config.archive),
      state: None,
    }
  }

  pub fn state(&mut self) -> ShipResult<ImageState> {
    match self.state {
      Some(state) => Ok(state),
      None => {
        let observed = self.runtime.observe()?;
        tracing::debug!("image {} observed as {}", self.tag, observed);
        self.state = Some(observed);
        Ok(observed)
      }
    }
  }

  pub fn perform(&mut self, op: ImageOp) -> ShipResult<()> {
    match op {
      ImageOp::Build => self.build(),
      ImageOp::Save => self.save(),
      ImageOp::Load => self.load(),
      ImageOp::Run => self.run(false),
      ImageOp::Start => self.run(true),
      ImageOp::Stop => self.stop(),
      ImageOp::Push => self.push(),
    }
  }

  /// Only an in-progress build of the same tag blocks a build
  pub fn build(&mut self) -> ShipResult<()> {
    let before = self.state()?;
    if before == ImageState::Building {
      return Err(ShipError::docker("build", before));
    }

    self.state = Some(ImageState::Building);
    match self.runtime.build() {
      Ok(()) => {
        // Rebuilding the image leaves a running container running
        let after = if before == ImageState::Running {
          ImageState::Running
        } else {
          ImageState::Built
        };
        self.state = Some(after);
        Ok(())
      }
      Err(err) => {
        self.state = Some(before);
        Err(err)
      }
    }
  }

  pub fn save(&mut self) -> ShipResult<()> {
    let state = self.require("save", ImageState::is_at_least_built)?;
    self.runtime.save(&self.archive)?;
    println!("   Saved {} to {}", self.tag, self.archive.display());
    if state != ImageState::Running {
      self.state = Some(ImageState::Archived);
    }
    Ok(())
  }

  pub fn load(&mut self) -> ShipResult<()> {
    self.require("load", |s| s == ImageState::Archived)?;
    self.runtime.load(&self.archive)?;
    self.state = Some(ImageState::Built);
    Ok(())
  }

  fn run(&mut self, detach: bool) -> ShipResult<()> {
    let operation = if detach { "start" } else { "run" };
    self.require(operation, |s| s == ImageState::Built)?;
    self.runtime.run(detach)?;
    // A foreground run has exited by the time the engine returns
    self.state = Some(if detach { ImageState::Running } else { ImageState::Built });
    Ok(())
  }

  pub fn stop(&mut self) -> ShipResult<()> {
    self.require("stop", |s| s == ImageState::Running)?;
    self.runtime.stop()?;
    self.state = Some(ImageState::Built);
    Ok(())
  }

  pub fn push(&mut self) -> ShipResult<()> {
    self.require("push", ImageState::is_at_least_built)?;
    if self.aliases.is_empty() {
      return Err(ShipError::with_help(
        format!("No registry aliases configured for {}", self.tag),
        "Add `aliases = [\"registry.example.com/name:tag\"]` under [image] in ship.toml",
      ));
    }
    for alias in &self.aliases {
      self.runtime.push(alias)?;
      println!("   Pushed {} as {}", self.tag, alias);
    }
    Ok(())
  }

  fn require(&mut self, operation: &str, allowed: impl Fn(ImageState) -> bool) -> ShipResult<ImageState> {
    let state = self.state()?;
    if !allowed(state) {
      return Err(ShipError::docker(operation, state));
    }
    Ok(state)
  }
}
