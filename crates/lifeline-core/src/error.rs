//! Error types for lifeline-core

use thiserror::Error;

/// Result type alias using lifeline-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for lifeline
#[derive(Error, Debug)]
pub enum Error {
    /// A catalog version string is not valid semver
    #[error("Malformed version '{version}': {reason}")]
    MalformedVersion { version: String, reason: String },

    /// A release or end-of-life date is not ISO-8601
    #[error("Invalid timestamp '{value}': expected ISO-8601 (RFC 3339, naive date-time or date)")]
    InvalidTimestamp { value: String },

    /// The release catalog or registry tag listing could not be fetched or parsed
    #[error("Source unavailable ({source_name}): {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A resolved tag is not hosted by the registry
    #[error("Tag not found in registry: {tag}")]
    TagNotFound { tag: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed version error
    pub fn malformed_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedVersion {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid timestamp error
    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
        }
    }

    /// Create a source unavailable error
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a tag not found error
    pub fn tag_not_found(tag: impl Into<String>) -> Self {
        Self::TagNotFound { tag: tag.into() }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error came from a remote source rather than local input
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}
