use crate::core::error::{ConfigError, ResultExt, ShipError, ShipResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Configuration for cargo-ship
/// Searched in order: ship.toml, .ship.toml, .cargo/ship.toml, .config/ship.toml
///
/// Every section has defaults, so a project without a config file still gets the
/// full built-in task catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipConfig {
  #[serde(default)]
  pub vcs: VcsConfig,
  #[serde(default)]
  pub changelog: ChangelogConfig,
  #[serde(default)]
  pub version: VersionConfig,
  #[serde(default)]
  pub test: TestConfig,
  #[serde(default)]
  pub docs: DocsConfig,
  #[serde(default)]
  pub image: ImageConfig,
  /// Task overrides and additional command tasks, keyed by task name
  #[serde(default)]
  pub tasks: BTreeMap<String, TaskConfig>,
}

/// Branch layout and remote used by guards and bumps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
  /// Integration branch releases must start from (default: "master")
  #[serde(default = "default_trunk")]
  pub trunk: String,

  /// Dedicated branch that carries tagged releases (default: "release")
  #[serde(default = "default_release_branch")]
  pub release_branch: String,

  /// Remote name for pushes (default: "origin")
  #[serde(default = "default_remote")]
  pub remote: String,

  /// Push release branch, trunk and tags after bumping (default: false)
  #[serde(default)]
  pub push: bool,
}

fn default_trunk() -> String {
  "master".to_string()
}

fn default_release_branch() -> String {
  "release".to_string()
}

fn default_remote() -> String {
  "origin".to_string()
}

impl Default for VcsConfig {
  fn default() -> Self {
    Self {
      trunk: default_trunk(),
      release_branch: default_release_branch(),
      remote: default_remote(),
      push: false,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogConfig {
  /// Repository-relative path of the release notes file
  #[serde(default = "default_changelog_path")]
  pub path: PathBuf,

  /// Reference the changelog is diffed against (default: "origin/<trunk>")
  #[serde(default)]
  pub remote_ref: Option<String>,
}

fn default_changelog_path() -> PathBuf {
  PathBuf::from("CHANGELOG.md")
}

impl Default for ChangelogConfig {
  fn default() -> Self {
    Self {
      path: default_changelog_path(),
      remote_ref: None,
    }
  }
}

/// Which collaborator performs version bumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BumperKind {
  /// Edit the Cargo manifest, commit and tag with system git
  #[default]
  Manifest,
  /// Delegate to an external tool such as bump2version
  Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
  #[serde(default)]
  pub bumper: BumperKind,

  /// Manifest holding `package.version` (manifest bumper)
  #[serde(default = "default_manifest")]
  pub manifest: PathBuf,

  /// Prefix for release tags (manifest bumper)
  #[serde(default = "default_tag_prefix")]
  pub tag_prefix: String,

  /// Pre-release label for candidates, e.g. "rc" in 1.2.0-rc.3
  #[serde(default = "default_candidate_label")]
  pub candidate_label: String,

  /// External bump tool (command bumper), invoked as `<command...> <part> <flag>`
  #[serde(default = "default_bump_command")]
  pub command: Vec<String>,

  #[serde(default = "default_tag_flag")]
  pub tag_flag: String,

  #[serde(default = "default_no_tag_flag")]
  pub no_tag_flag: String,
}

fn default_manifest() -> PathBuf {
  PathBuf::from("Cargo.toml")
}

fn default_tag_prefix() -> String {
  "v".to_string()
}

fn default_candidate_label() -> String {
  "rc".to_string()
}

fn default_bump_command() -> Vec<String> {
  vec!["bump2version".to_string()]
}

fn default_tag_flag() -> String {
  "--tag".to_string()
}

fn default_no_tag_flag() -> String {
  "--no-tag".to_string()
}

impl Default for VersionConfig {
  fn default() -> Self {
    Self {
      bumper: BumperKind::default(),
      manifest: default_manifest(),
      tag_prefix: default_tag_prefix(),
      candidate_label: default_candidate_label(),
      command: default_bump_command(),
      tag_flag: default_tag_flag(),
      no_tag_flag: default_no_tag_flag(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
  /// Variable that tells the test runner where its sandbox lives
  #[serde(default = "default_sandbox_env")]
  pub sandbox_env: String,

  /// Sandbox directory, removed by `clean-test`
  #[serde(default = "default_sandbox_dir")]
  pub sandbox_dir: PathBuf,
}

fn default_sandbox_env() -> String {
  "SHIP_TEST_SANDBOX".to_string()
}

fn default_sandbox_dir() -> PathBuf {
  PathBuf::from("target/test-sandbox")
}

impl Default for TestConfig {
  fn default() -> Self {
    Self {
      sandbox_env: default_sandbox_env(),
      sandbox_dir: default_sandbox_dir(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
  /// Generated documentation, wiped before every `docs` run
  #[serde(default = "default_docs_output")]
  pub output_dir: PathBuf,

  #[serde(default = "default_docs_command")]
  pub command: Vec<String>,
}

fn default_docs_output() -> PathBuf {
  PathBuf::from("target/doc")
}

fn default_docs_command() -> Vec<String> {
  vec!["cargo".to_string(), "doc".to_string(), "--no-deps".to_string()]
}

impl Default for DocsConfig {
  fn default() -> Self {
    Self {
      output_dir: default_docs_output(),
      command: default_docs_command(),
    }
  }
}

/// Identity of the runnable environment image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
  /// Container engine binary (docker, podman)
  #[serde(default = "default_engine")]
  pub engine: String,

  /// Local image tag
  #[serde(default = "default_image_tag")]
  pub tag: String,

  /// Remote registry aliases the image is pushed under
  #[serde(default)]
  pub aliases: Vec<String>,

  /// Build context directory
  #[serde(default = "default_context")]
  pub context: PathBuf,

  #[serde(default = "default_dockerfile")]
  pub dockerfile: PathBuf,

  /// Port of the interactive service inside the image
  #[serde(default = "default_port")]
  pub port: u16,

  /// Archive written by `image-save` and read by `image-load`
  #[serde(default = "default_archive")]
  pub archive: PathBuf,

  /// Container name used by run/start/stop
  #[serde(default = "default_container")]
  pub container: String,

  /// Lock file held for the duration of a build
  #[serde(default = "default_build_lock")]
  pub build_lock: PathBuf,
}

fn default_engine() -> String {
  "docker".to_string()
}

fn default_image_tag() -> String {
  "cargo-ship-env:latest".to_string()
}

fn default_context() -> PathBuf {
  PathBuf::from(".")
}

fn default_dockerfile() -> PathBuf {
  PathBuf::from("Dockerfile")
}

fn default_port() -> u16 {
  8888
}

fn default_archive() -> PathBuf {
  PathBuf::from("image.tar")
}

fn default_container() -> String {
  "cargo-ship-env".to_string()
}

fn default_build_lock() -> PathBuf {
  PathBuf::from("target/.ship-image-build.lock")
}

impl Default for ImageConfig {
  fn default() -> Self {
    Self {
      engine: default_engine(),
      tag: default_image_tag(),
      aliases: Vec::new(),
      context: default_context(),
      dockerfile: default_dockerfile(),
      port: default_port(),
      archive: default_archive(),
      container: default_container(),
      build_lock: default_build_lock(),
    }
  }
}

/// `[tasks.<name>]` entry
///
/// For built-in tasks, set fields replace the built-in definition's fields. Any
/// other name defines a new command task.
///
/// ```toml
/// [tasks.lint]
/// run = ["cargo", "clippy", "--workspace", "--", "-D", "warnings"]
///
/// [tasks.coverage]
/// run = ["cargo", "llvm-cov"]
/// prerequisites = ["clean-test"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskConfig {
  #[serde(default)]
  pub run: Option<Vec<String>>,

  #[serde(default)]
  pub prerequisites: Option<Vec<String>>,

  /// Extra environment variables for the command
  #[serde(default)]
  pub env: BTreeMap<String, String>,

  #[serde(default)]
  pub description: Option<String>,
}

impl VersionConfig {
  /// Validate version configuration
  pub fn validate(&self) -> ShipResult<()> {
    if self.bumper == BumperKind::Command && self.command.is_empty() {
      return Err(ShipError::Config(ConfigError::InvalidField {
        field: "version.command".to_string(),
        reason: "must name the bump tool when bumper = \"command\"".to_string(),
      }));
    }

    let label_ok = !self.candidate_label.is_empty()
      && self
        .candidate_label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !label_ok {
      return Err(ShipError::Config(ConfigError::InvalidField {
        field: "version.candidate_label".to_string(),
        reason: format!("'{}' is not a valid semver pre-release identifier", self.candidate_label),
      }));
    }

    Ok(())
  }
}

/// Paths that tasks delete must stay strictly inside the project root
fn validate_removable(field: &str, path: &Path) -> ShipResult<()> {
  let reason = if path.as_os_str().is_empty() {
    Some("must not be empty")
  } else if path.is_absolute() || path.has_root() {
    Some("must be relative to the project root")
  } else if path.components().any(|c| matches!(c, Component::ParentDir)) {
    Some("must not contain `..`")
  } else if !path.components().any(|c| matches!(c, Component::Normal(_))) {
    Some("must name a directory below the project root")
  } else {
    None
  };

  match reason {
    Some(reason) => Err(ShipError::Config(ConfigError::InvalidField {
      field: field.to_string(),
      reason: format!("'{}' {}", path.display(), reason),
    })),
    None => Ok(()),
  }
}

impl ShipConfig {
  /// Find config file in search order: ship.toml, .ship.toml, .cargo/ship.toml, .config/ship.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("ship.toml"),
      path.join(".ship.toml"),
      path.join(".cargo").join("ship.toml"),
      path.join(".config").join("ship.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the workspace, falling back to defaults when no file exists
  pub fn discover(root: &Path) -> ShipResult<Self> {
    match Self::find_config_path(root) {
      Some(path) => Self::load_file(&path),
      None => {
        tracing::debug!("no ship.toml under {}, using defaults", root.display());
        Ok(Self::default())
      }
    }
  }

  /// Load config from an explicit file
  pub fn load_file(config_path: &Path) -> ShipResult<Self> {
    if !config_path.exists() {
      return Err(ShipError::Config(ConfigError::NotFound {
        path: config_path.to_path_buf(),
      }));
    }

    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;

    tracing::debug!("loaded config from {}", config_path.display());
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> ShipResult<Self> {
    let config: ShipConfig = toml_edit::de::from_str(content)?;
    config.version.validate()?;
    validate_removable("test.sandbox_dir", &config.test.sandbox_dir)?;
    validate_removable("docs.output_dir", &config.docs.output_dir)?;
    Ok(config)
  }

  /// Reference the changelog guard compares against
  pub fn changelog_remote_ref(&self) -> String {
    self
      .changelog
      .remote_ref
      .clone()
      .unwrap_or_else(|| format!("{}/{}", self.vcs.remote, self.vcs.trunk))
  }
}
