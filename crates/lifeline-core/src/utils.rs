//! Shared utility functions for lifeline crates

use crate::error::{Error, Result};
use camino::Utf8PathBuf;

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// scheduled jobs running with an overridden HOME pick up their own config.
pub fn get_home_dir() -> Result<Utf8PathBuf> {
    let home = match std::env::var("HOME") {
        Ok(home) => std::path::PathBuf::from(home),
        Err(_) => dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?,
    };

    Utf8PathBuf::from_path_buf(home)
        .map_err(|p| Error::invalid_config(format!("Home directory is not UTF-8: {}", p.display())))
}
