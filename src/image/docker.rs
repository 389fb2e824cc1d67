//! Container engine adapter driving the `docker` CLI (or a compatible engine
//! such as `podman`) through the tool runner.

use super::{ImageOp, ImageRuntime, ImageState};
use crate::core::config::ImageConfig;
use crate::core::error::{ResultExt, ShipError, ShipResult};
use crate::tasks::tools::{ToolCommand, ToolRunner};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub struct DockerCli<'a> {
  runner: &'a dyn ToolRunner,
  engine: String,
  tag: String,
  context: PathBuf,
  dockerfile: PathBuf,
  port: u16,
  container: String,
  archive: PathBuf,
  build_lock: PathBuf,
}

impl<'a> DockerCli<'a> {
  pub fn new(runner: &'a dyn ToolRunner, config: &ImageConfig, root: &Path) -> Self {
    Self {
      runner,
      engine: config.engine.clone(),
      tag: config.tag.clone(),
      context: config.context.clone(),
      dockerfile: config.dockerfile.clone(),
      port: config.port,
      container: config.container.clone(),
      archive: root.join(&config.archive),
      build_lock: root.join(&config.build_lock),
    }
  }

  fn engine(&self) -> ToolCommand {
    ToolCommand::new(self.engine.as_str())
  }

  /// Open (creating if needed) the build lock file
  fn open_lock(&self) -> ShipResult<File> {
    if let Some(parent) = self.build_lock.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    OpenOptions::new()
      .write(true)
      .create(true)
      .truncate(false)
      .open(&self.build_lock)
      .with_context(|| format!("Failed to open build lock: {}", self.build_lock.display()))
  }

  /// A held lock means another process is mid-build
  fn build_in_progress(&self) -> ShipResult<bool> {
    if !self.build_lock.exists() {
      return Ok(false);
    }
    let file = self.open_lock()?;
    match file.try_lock_exclusive() {
      Ok(()) => {
        FileExt::unlock(&file)?;
        Ok(false)
      }
      Err(_) => Ok(true),
    }
  }

  fn container_running(&self) -> ShipResult<bool> {
    let capture = self.runner.capture(&self.engine().args([
      "ps".to_string(),
      "-q".to_string(),
      "--filter".to_string(),
      format!("name=^/{}$", self.container),
    ]))?;
    Ok(capture.success && !capture.stdout.trim().is_empty())
  }

  fn image_exists(&self) -> ShipResult<bool> {
    let capture = self
      .runner
      .capture(&self.engine().args(["image", "inspect", self.tag.as_str()]))?;
    Ok(capture.success)
  }

  fn port_mapping(&self) -> String {
    format!("{}:{}", self.port, self.port)
  }
}

impl ImageRuntime for DockerCli<'_> {
  fn observe(&self) -> ShipResult<ImageState> {
    if self.build_in_progress()? {
      return Ok(ImageState::Building);
    }
    if self.container_running()? {
      return Ok(ImageState::Running);
    }
    if self.image_exists()? {
      return Ok(ImageState::Built);
    }
    if self.archive.exists() {
      return Ok(ImageState::Archived);
    }
    Ok(ImageState::Absent)
  }

  fn build(&self) -> ShipResult<()> {
    let lock = self.open_lock()?;
    if lock.try_lock_exclusive().is_err() {
      return Err(ShipError::docker("build", ImageState::Building));
    }

    println!("🔨 Building image {}...", self.tag);
    let command = self.engine().args([
      "build".to_string(),
      "-f".to_string(),
      self.dockerfile.display().to_string(),
      "-t".to_string(),
      self.tag.clone(),
      self.context.display().to_string(),
    ]);
    let result = self.runner.run(&ImageOp::Build.task_name(), &command);

    // Released on drop as well; unlocking explicitly keeps the window short
    FileExt::unlock(&lock)?;
    result?;

    println!("   ✅ Built {}", self.tag);
    Ok(())
  }

  fn save(&self, archive: &Path) -> ShipResult<()> {
    let command = self.engine().args([
      "save".to_string(),
      "-o".to_string(),
      archive.display().to_string(),
      self.tag.clone(),
    ]);
    self.runner.run(&ImageOp::Save.task_name(), &command)
  }

  fn load(&self, archive: &Path) -> ShipResult<()> {
    let command = self
      .engine()
      .args(["load".to_string(), "-i".to_string(), archive.display().to_string()]);
    self.runner.run(&ImageOp::Load.task_name(), &command)?;
    println!("   Loaded {} from {}", self.tag, archive.display());
    Ok(())
  }

  fn run(&self, detach: bool) -> ShipResult<()> {
    let (op, mode) = if detach {
      (ImageOp::Start, "-d")
    } else {
      (ImageOp::Run, "-it")
    };

    if detach {
      println!("🚀 Starting {} on port {}", self.container, self.port);
    }
    let command = self.engine().args([
      "run".to_string(),
      "--rm".to_string(),
      mode.to_string(),
      "-p".to_string(),
      self.port_mapping(),
      "--name".to_string(),
      self.container.clone(),
      self.tag.clone(),
    ]);
    self.runner.run(&op.task_name(), &command)
  }

  fn stop(&self) -> ShipResult<()> {
    self
      .runner
      .run(&ImageOp::Stop.task_name(), &self.engine().args(["stop", self.container.as_str()]))
  }

  fn push(&self, alias: &str) -> ShipResult<()> {
    let task = ImageOp::Push.task_name();
    self
      .runner
      .run(&task, &self.engine().args(["tag", self.tag.as_str(), alias]))?;
    self.runner.run(&task, &self.engine().args(["push", alias]))
  }
}
