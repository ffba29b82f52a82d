//! Published releases and end-of-life policy records

use super::version::{MinorLine, ReleaseVersion};
use crate::error::Result;
use crate::time::{deserialize_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One published artifact revision from the release catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Parsed version
    pub version: ReleaseVersion,

    /// Publication date (UTC)
    pub release_date: DateTime<Utc>,

    /// Distribution tags pointing at this release
    pub tags: BTreeSet<String>,
}

impl Release {
    pub fn new<I, S>(version: ReleaseVersion, release_date: DateTime<Utc>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version,
            release_date,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a release from the raw strings of a catalog entry
    pub fn parse<I, S>(version: &str, release_date: &str, tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let version = ReleaseVersion::parse(version)?;
        let release_date = parse_timestamp(release_date)?;
        Ok(Self::new(version, release_date, tags))
    }

    pub fn line(&self) -> MinorLine {
        self.version.line()
    }

    /// Whether this release is an immutable build eligible for mirroring
    pub fn is_immutable(&self) -> bool {
        self.version.is_immutable()
    }

    /// Whether this release supersedes `other` within the same minor line
    pub fn obsoletes(&self, other: &Release) -> bool {
        self.version.obsoletes(&other.version)
    }
}

/// Published end-of-life date for a minor line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndOfLifeEntry {
    pub major: u64,
    pub minor: u64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub published_eol: DateTime<Utc>,
}

impl EndOfLifeEntry {
    pub fn new(major: u64, minor: u64, published_eol: DateTime<Utc>) -> Self {
        Self {
            major,
            minor,
            published_eol,
        }
    }

    pub fn line(&self) -> MinorLine {
        MinorLine::new(self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;

    #[test]
    fn test_parse_release() {
        let release = Release::parse("2.3.0-4", "2022-01-10", ["2.3.0-4", "2.3.0-4-onbuild"]).unwrap();
        assert_eq!(release.line(), MinorLine::new(2, 3));
        assert!(release.is_immutable());
        assert_eq!(
            release.release_date,
            Utc.with_ymd_and_hms(2022, 1, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(release.tags.len(), 2);
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let release = Release::parse("2.3.0-4", "2022-01-10", ["a", "a", "b"]).unwrap();
        assert_eq!(release.tags.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_release_propagates_bad_version() {
        let err = Release::parse("2.3", "2022-01-10", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::MalformedVersion { .. }));
    }

    #[test]
    fn test_parse_release_propagates_bad_date() {
        let err = Release::parse("2.3.0-1", "soon", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_eol_entry_deserializes_iso_dates() {
        let entry: EndOfLifeEntry =
            serde_json::from_str(r#"{"major": 2, "minor": 1, "published_eol": "2022-07-01"}"#)
                .unwrap();
        assert_eq!(entry.line(), MinorLine::new(2, 1));
        assert_eq!(
            entry.published_eol,
            Utc.with_ymd_and_hms(2022, 7, 1, 0, 0, 0).unwrap()
        );

        let bad = serde_json::from_str::<EndOfLifeEntry>(
            r#"{"major": 2, "minor": 1, "published_eol": "July"}"#,
        );
        assert!(bad.is_err());
    }
}
