//! Versioning and release orchestration
//!
//! - [`version`]: the semver-with-candidate version model
//! - [`bump`]: the bump controller and its collaborator ports
//! - [`bumpers`]: manifest-editing and command-delegating bumpers
//! - [`orchestrator`]: the four composite release commands

pub mod bump;
pub mod bumpers;
pub mod orchestrator;
pub mod version;

pub use bump::{BumpController, BumpKind, VersionBumper, VersionControl};
pub use bumpers::{CommandBumper, ManifestBumper};
pub use orchestrator::{ReleaseCommand, ReleaseOrchestrator};
