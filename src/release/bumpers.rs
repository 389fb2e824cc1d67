//! Version bump collaborators
//!
//! - [`ManifestBumper`]: edits the Cargo manifest in place (lossless), commits
//!   the change and tags it with system git
//! - [`CommandBumper`]: hands the bump to an external tool such as bump2version

use super::bump::{BumpKind, VersionBumper};
use super::version::ReleaseVersion;
use crate::core::config::VersionConfig;
use crate::core::error::{ResultExt, ShipError, ShipResult};
use crate::core::vcs::SystemGit;
use crate::tasks::tools::{ToolCommand, ToolRunner};
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

/// Where the version lives in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VersionSlot {
  /// `[package] version = "..."`
  Package,
  /// `[workspace.package] version = "..."`
  Workspace,
}

/// Read the version string and where it was found
fn read_version(doc: &DocumentMut) -> Option<(VersionSlot, String)> {
  if let Some(version) = doc
    .get("package")
    .and_then(|p| p.get("version"))
    .and_then(|v| v.as_str())
  {
    return Some((VersionSlot::Package, version.to_string()));
  }

  doc
    .get("workspace")
    .and_then(|w| w.get("package"))
    .and_then(|p| p.get("version"))
    .and_then(|v| v.as_str())
    .map(|v| (VersionSlot::Workspace, v.to_string()))
}

/// Replace the version string, keeping any trailing comment on the line
fn write_version(doc: &mut DocumentMut, slot: VersionSlot, version: &str) {
  let item = match slot {
    VersionSlot::Package => &mut doc["package"]["version"],
    VersionSlot::Workspace => &mut doc["workspace"]["package"]["version"],
  };
  match item.as_value_mut() {
    Some(value) => {
      let decor = value.decor().clone();
      *value = toml_edit::Value::from(version);
      *value.decor_mut() = decor;
    }
    None => *item = toml_edit::value(version),
  }
}

/// Bumps `package.version` in a Cargo manifest
pub struct ManifestBumper<'a> {
  git: &'a SystemGit,
  /// Manifest path relative to the work tree
  manifest: PathBuf,
  tag_prefix: String,
  candidate_label: String,
}

impl<'a> ManifestBumper<'a> {
  pub fn new(git: &'a SystemGit, config: &VersionConfig) -> Self {
    Self {
      git,
      manifest: config.manifest.clone(),
      tag_prefix: config.tag_prefix.clone(),
      candidate_label: config.candidate_label.clone(),
    }
  }

  fn manifest_path(&self) -> PathBuf {
    self.git.work_tree().join(&self.manifest)
  }

  /// Current version as recorded in the manifest
  pub fn current_version(&self) -> ShipResult<ReleaseVersion> {
    let (_, doc) = self.load()?;
    let (_, text) = read_version(&doc).ok_or_else(|| self.no_version_error())?;
    ReleaseVersion::parse(&text, &self.candidate_label)
  }

  fn load(&self) -> ShipResult<(PathBuf, DocumentMut)> {
    let path = self.manifest_path();
    let content =
      std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc: DocumentMut = content.parse()?;
    Ok((path, doc))
  }

  fn no_version_error(&self) -> ShipError {
    ShipError::with_help(
      format!("No version found in {}", self.manifest.display()),
      "Set `[package] version` or `[workspace.package] version`",
    )
  }
}

impl VersionBumper for ManifestBumper<'_> {
  fn bump(&self, kind: BumpKind, tag: bool) -> ShipResult<()> {
    let (path, mut doc) = self.load()?;
    let (slot, text) = read_version(&doc).ok_or_else(|| self.no_version_error())?;

    let current = ReleaseVersion::parse(&text, &self.candidate_label)?;
    let next = current.bumped(kind)?;

    write_version(&mut doc, slot, &next.to_string());
    std::fs::write(&path, doc.to_string()).with_context(|| format!("Failed to write {}", path.display()))?;

    let manifest: &Path = &self.manifest;
    self
      .git
      .commit_paths(&[manifest], &format!("Bump version: {} → {}", current, next))?;
    println!("   Bumped version {} → {} ({})", current, next, kind);

    if tag {
      let tag_name = format!("{}{}", self.tag_prefix, next);
      self.git.create_annotated_tag(&tag_name, &format!("Release {}", next))?;
      println!("   Created tag: {}", tag_name);
    }

    Ok(())
  }
}

/// Delegates bumps to an external tool: `<command...> <part> <tag flag>`
pub struct CommandBumper<'a> {
  runner: &'a dyn ToolRunner,
  command: Vec<String>,
  tag_flag: String,
  no_tag_flag: String,
}

impl<'a> CommandBumper<'a> {
  pub fn new(runner: &'a dyn ToolRunner, config: &VersionConfig) -> Self {
    Self {
      runner,
      command: config.command.clone(),
      tag_flag: config.tag_flag.clone(),
      no_tag_flag: config.no_tag_flag.clone(),
    }
  }

  fn command_for(&self, kind: BumpKind, tag: bool) -> ShipResult<ToolCommand> {
    let flag = if tag { &self.tag_flag } else { &self.no_tag_flag };
    let command = ToolCommand::from_argv(&self.command)
      .ok_or_else(|| ShipError::message("version.command is empty"))?
      .arg(kind.part());

    if flag.is_empty() {
      Ok(command)
    } else {
      Ok(command.arg(flag.as_str()))
    }
  }
}

impl VersionBumper for CommandBumper<'_> {
  fn bump(&self, kind: BumpKind, tag: bool) -> ShipResult<()> {
    let command = self.command_for(kind, tag)?;
    self.runner.run(&kind.task_name(), &command)
  }
}
