//! Type definitions for releases, versions and runtime configuration

mod release;
mod runtime_config;
mod version;

pub use release::*;
pub use runtime_config::*;
pub use version::*;
