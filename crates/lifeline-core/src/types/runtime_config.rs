//! Runtime configuration types
//!
//! These types define where the release catalog and registry listing are
//! fetched from, which end-of-life table applies and how long a minor line
//! is supported at minimum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Release catalog feed
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Registry holding the mirror sources
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Support window policy
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Release catalog feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogConfig {
    /// URL of the YAML release catalog
    #[serde(default = "default_catalog_url")]
    pub url: String,

    /// Top-level key holding the release list
    #[serde(default = "default_releases_key")]
    pub releases_key: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            releases_key: default_releases_key(),
        }
    }
}

fn default_catalog_url() -> String {
    "https://updates.astronomer.io/astronomer-certified".to_string()
}
fn default_releases_key() -> String {
    "available_releases".to_string()
}

/// Shape of the registry's tag listing document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagListingFormat {
    /// A mapping of tag name to content hash
    #[default]
    KeyMap,
    /// OCI distribution `tags/list` responses, paginated via `Link`
    Distribution,
}

impl fmt::Display for TagListingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyMap => write!(f, "key-map"),
            Self::Distribution => write!(f, "distribution"),
        }
    }
}

impl FromStr for TagListingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "key-map" => Ok(Self::KeyMap),
            "distribution" => Ok(Self::Distribution),
            other => Err(format!(
                "unknown tag listing format '{}' (expected key-map or distribution)",
                other
            )),
        }
    }
}

/// Registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryConfig {
    /// URL of the tag listing
    #[serde(default = "default_tags_url")]
    pub tags_url: String,

    /// Shape of the tag listing document
    #[serde(default)]
    pub format: TagListingFormat,

    /// Bearer token for the tag listing, if the registry needs one
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Image emitted for each tag (`registry/namespace/repo`)
    #[serde(default = "default_image")]
    pub image: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            tags_url: default_tags_url(),
            format: TagListingFormat::default(),
            token: None,
            image: default_image(),
        }
    }
}

fn default_tags_url() -> String {
    "https://quay.io/v1/repositories/astronomer/ap-airflow/tags".to_string()
}
fn default_image() -> String {
    "quay.io/astronomer/ap-airflow".to_string()
}

/// Support window policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyConfig {
    /// Path of the JSON end-of-life table
    #[serde(default = "default_eol_table")]
    pub eol_table: String,

    /// Days a minor line stays supported after its first build, at minimum
    #[serde(default = "default_minimum_support_days")]
    pub minimum_support_days: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            eol_table: default_eol_table(),
            minimum_support_days: default_minimum_support_days(),
        }
    }
}

fn default_eol_table() -> String {
    "enterprise_support_data.json".to_string()
}
fn default_minimum_support_days() -> u32 {
    180
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// HTTP timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_http_timeout() -> u64 {
    60
}
fn default_user_agent() -> String {
    format!(
        "lifeline/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
