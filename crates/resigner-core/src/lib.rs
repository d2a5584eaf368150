//! Resigner Core - shared plumbing for the resigning pipelines
//!
//! This crate provides the non-format-specific machinery both resign
//! pipelines are built on:
//! - Per-operation working directories with guaranteed cleanup
//! - ZIP archive extraction and repackaging
//! - External tool invocation with merged output capture

pub mod archive;
pub mod error;
pub mod process;
pub mod workspace;

pub use error::{CoreError, Result};
pub use workspace::Workspace;
