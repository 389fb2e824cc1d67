//! Core building blocks shared by every command
//!
//! - **config**: ship.toml parsing, defaults and validation
//! - **context**: project context built once in main and passed to commands
//! - **error**: error types with contextual help and exit codes
//! - **vcs**: git operations (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
