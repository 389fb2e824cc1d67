mod commands;
mod core;
mod guards;
mod image;
mod release;
mod tasks;

use clap::{ArgAction, Parser, Subcommand};
use core::context::ShipContext;
use core::error::{ShipError, ShipResult, print_error};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Guarded release pipelines, version bumps and environment images
#[derive(Parser)]
#[command(name = "cargo")]
#[command(bin_name = "cargo")]
#[command(styles = get_styles())]
enum CargoCli {
  Ship(ShipCli),
}

#[derive(Parser)]
#[command(name = "ship")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct ShipCli {
  /// More diagnostic logging (-v debug, -vv trace); RUST_LOG overrides
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  /// Use this config file instead of searching for ship.toml
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  #[command(flatten)]
  Task(TaskCommand),

  // ============================================================================
  // Tasks & Inspection
  // ============================================================================
  /// Run any task by name, including tasks defined in ship.toml
  Run {
    /// Task or release command name
    task: String,
  },

  /// List tasks, release commands and prerequisite cycles
  List {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show what a task or release command would execute
  Plan {
    /// Task or release command name
    task: String,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show the manifest version and what each bump would produce
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Tasks defined in ship.toml, e.g. `cargo ship coverage`
  #[command(external_subcommand)]
  External(Vec<String>),
}

/// One subcommand per built-in task and release command
#[derive(Subcommand)]
enum TaskCommand {
  // ============================================================================
  // Build & Quality
  // ============================================================================
  /// Remove build artifacts and the test sandbox
  Clean,
  /// Remove build artifacts
  CleanBuild,
  /// Remove the test sandbox
  CleanTest,
  /// Install the binary from a clean tree
  Install,
  /// Run the linter
  Lint,
  /// Run the test suite
  Test,
  /// Regenerate documentation from scratch
  Docs,
  /// Build and upload the package
  Publish,

  // ============================================================================
  // Guards
  // ============================================================================
  /// Fail unless the trunk branch is checked out
  CheckMaster,
  /// Fail unless the changelog differs from the remote copy
  CheckHistory,
  /// check-master and check-history, in that order
  CheckRelease,

  // ============================================================================
  // Releases
  // ============================================================================
  /// check-release → bump-release → publish → bump-patch
  Release,
  /// check-master → publish → bump-candidate
  ReleaseCandidate,
  /// check-release → bump-minor → release
  ReleaseMinor,
  /// check-release → bump-major → release
  ReleaseMajor,

  // ============================================================================
  // Version Bumps
  // ============================================================================
  /// Finalize the candidate on the release branch and tag it
  BumpRelease,
  /// Merge the release back to trunk and open the next patch
  BumpPatch,
  /// Bump the minor version on trunk
  BumpMinor,
  /// Bump the major version on trunk
  BumpMajor,
  /// Bump the candidate counter on the current branch
  BumpCandidate,

  // ============================================================================
  // Environment Image
  // ============================================================================
  /// Build the environment image
  ImageBuild,
  /// Save the image to its archive
  ImageSave,
  /// Load the image from its archive
  ImageLoad,
  /// Run the image in the foreground
  ImageRun,
  /// Start the image in the background
  ImageStart,
  /// Stop the running container
  ImageStop,
  /// Push the image under every registry alias
  ImagePush,
}

impl TaskCommand {
  fn task_name(&self) -> &'static str {
    match self {
      TaskCommand::Clean => "clean",
      TaskCommand::CleanBuild => "clean-build",
      TaskCommand::CleanTest => "clean-test",
      TaskCommand::Install => "install",
      TaskCommand::Lint => "lint",
      TaskCommand::Test => "test",
      TaskCommand::Docs => "docs",
      TaskCommand::Publish => "publish",
      TaskCommand::CheckMaster => "check-master",
      TaskCommand::CheckHistory => "check-history",
      TaskCommand::CheckRelease => "check-release",
      TaskCommand::Release => "release",
      TaskCommand::ReleaseCandidate => "release-candidate",
      TaskCommand::ReleaseMinor => "release-minor",
      TaskCommand::ReleaseMajor => "release-major",
      TaskCommand::BumpRelease => "bump-release",
      TaskCommand::BumpPatch => "bump-patch",
      TaskCommand::BumpMinor => "bump-minor",
      TaskCommand::BumpMajor => "bump-major",
      TaskCommand::BumpCandidate => "bump-candidate",
      TaskCommand::ImageBuild => "image-build",
      TaskCommand::ImageSave => "image-save",
      TaskCommand::ImageLoad => "image-load",
      TaskCommand::ImageRun => "image-run",
      TaskCommand::ImageStart => "image-start",
      TaskCommand::ImageStop => "image-stop",
      TaskCommand::ImagePush => "image-push",
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);
  let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
  let red = anstyle::Color::Ansi(anstyle::AnsiColor::Red);

  clap::builder::Styles::styled()
    .usage(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .header(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .literal(anstyle::Style::new().fg_color(Some(green)))
    .invalid(anstyle::Style::new().bold().fg_color(Some(red)))
    .error(anstyle::Style::new().bold().fg_color(Some(red)))
    .valid(anstyle::Style::new().bold().underline().fg_color(Some(green)))
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Diagnostics go to stderr so stdout stays clean for `--json`
fn init_tracing(verbose: u8) {
  let default = match verbose {
    0 => "warn",
    1 => "cargo_ship=debug",
    _ => "cargo_ship=trace",
  };

  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
    .with(
      tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr),
    )
    .init();
}

fn dispatch(ctx: &ShipContext, command: Commands) -> ShipResult<()> {
  match command {
    Commands::Task(task) => commands::run_task(ctx, task.task_name()),
    Commands::Run { task } => commands::run_task(ctx, &task),
    Commands::List { json } => commands::run_list(ctx, json),
    Commands::Plan { task, json } => commands::run_plan(ctx, &task, json),
    Commands::Version { json } => commands::run_version(ctx, json),
    Commands::External(args) => match args.as_slice() {
      [task] => commands::run_task(ctx, task),
      [task, extra @ ..] => Err(ShipError::with_help(
        format!("Task '{}' takes no arguments (got: {})", task, extra.join(" ")),
        "Put the arguments in the task's `run` list in ship.toml",
      )),
      [] => Err(ShipError::message("No task given")),
    },
  }
}

fn main() {
  let CargoCli::Ship(cli) = CargoCli::parse();
  init_tracing(cli.verbose);

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let ctx = match ShipContext::build(&cwd, cli.config.as_deref()) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  if let Err(e) = dispatch(&ctx, cli.command) {
    handle_error(e);
  }
}

fn handle_error(error: ShipError) -> ! {
  print_error(&error);
  std::process::exit(error.exit_code().as_i32());
}
