//! Release catalog document parsing
//!
//! The catalog is a YAML document whose release list sits under a
//! configurable top-level key (`available_releases` by default). Each entry
//! carries a `version`, a `release_date` and its `tags`; other keys are
//! ignored. A document that is itself a list is accepted as the release list.

use lifeline_core::{Error, Release, Result};
use serde::{Deserialize, Deserializer};
use serde_yaml_ng::Value;
use tracing::{debug, trace};

pub(crate) const SOURCE_NAME: &str = "release catalog";

/// One entry of the release list, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
    pub release_date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Accept an unquoted YAML number (`version: 2.3`) as its text
///
/// The text is validated later, so a numeric version surfaces as a
/// malformed version rather than a malformed document.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a version string, found {:?}",
            other
        ))),
    }
}

impl CatalogEntry {
    /// Validate the entry into a release
    ///
    /// A malformed version or date aborts the whole catalog rather than
    /// dropping the entry.
    pub fn into_release(self) -> Result<Release> {
        Release::parse(&self.version, &self.release_date, self.tags)
    }
}

/// Parse a catalog document into releases, floating releases included
pub fn parse_catalog(content: &str, releases_key: &str) -> Result<Vec<Release>> {
    let document: Value = serde_yaml_ng::from_str(content).map_err(|e| {
        Error::source_unavailable(SOURCE_NAME, format!("malformed catalog document: {}", e))
    })?;

    let list = match document {
        Value::Sequence(seq) => Value::Sequence(seq),
        Value::Mapping(mut mapping) => mapping.remove(releases_key).ok_or_else(|| {
            Error::source_unavailable(
                SOURCE_NAME,
                format!("catalog document has no '{}' key", releases_key),
            )
        })?,
        Value::Null => {
            return Err(Error::source_unavailable(
                SOURCE_NAME,
                "catalog document is empty",
            ))
        }
        _ => {
            return Err(Error::source_unavailable(
                SOURCE_NAME,
                "catalog document is neither a mapping nor a list",
            ))
        }
    };

    let entries: Vec<CatalogEntry> = match list {
        Value::Null => Vec::new(),
        other => serde_yaml_ng::from_value(other).map_err(|e| {
            Error::source_unavailable(SOURCE_NAME, format!("malformed release entry: {}", e))
        })?,
    };

    let releases = entries
        .into_iter()
        .map(|entry| {
            trace!("Catalog entry {} released {}", entry.version, entry.release_date);
            entry.into_release()
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Parsed {} releases from catalog", releases.len());
    Ok(releases)
}
