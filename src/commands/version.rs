use crate::core::config::BumperKind;
use crate::core::context::ShipContext;
use crate::core::error::{ShipError, ShipResult};
use crate::release::{BumpKind, ManifestBumper};
use serde::Serialize;

#[derive(Serialize)]
struct NextVersion {
  bump: BumpKind,
  /// None when the bump does not apply to the current version
  version: Option<String>,
  tag: Option<String>,
}

/// Show the manifest version and the result of each bump
pub fn run_version(ctx: &ShipContext, json: bool) -> ShipResult<()> {
  if ctx.config.version.bumper != BumperKind::Manifest {
    return Err(ShipError::with_help(
      "Version preview needs the manifest bumper",
      "The external bump tool owns the version; ask it directly",
    ));
  }

  let bumper = ManifestBumper::new(&ctx.git, &ctx.config.version);
  let current = bumper.current_version()?;

  let next: Vec<NextVersion> = BumpKind::ALL
    .into_iter()
    .map(|bump| {
      let version = current.bumped(bump).ok().map(|v| v.to_string());
      let tag = version
        .as_ref()
        .filter(|_| bump.tags())
        .map(|v| format!("{}{}", ctx.config.version.tag_prefix, v));
      NextVersion { bump, version, tag }
    })
    .collect();

  if json {
    let output = serde_json::json!({
      "current": current.to_string(),
      "next": next,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  println!("📦 {} ({})\n", current, ctx.config.version.manifest.display());
  for entry in &next {
    match (&entry.version, &entry.tag) {
      (Some(version), Some(tag)) => println!("  bump-{:<10} → {} (tag {})", entry.bump.part(), version, tag),
      (Some(version), None) => println!("  bump-{:<10} → {}", entry.bump.part(), version),
      (None, _) => println!("  bump-{:<10}   n/a", entry.bump.part()),
    }
  }
  Ok(())
}
