//! # lifeline-core
//!
//! Core library for lifeline providing:
//! - Release versions with semver precedence and minor-line membership
//! - Release and end-of-life records
//! - Layered runtime configuration (embedded defaults, file, environment)
//! - The error type shared by every lifeline crate
//! - Source traits for the release catalog and registry tag listing

pub mod config;
pub mod error;
pub mod source;
pub mod time;
pub mod types;
pub mod utils;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use source::{ReleaseSource, TagSource};
pub use types::{EndOfLifeEntry, MinorLine, Release, ReleaseVersion, RuntimeConfig};
