//! Release versions, minor lines and semver precedence
//!
//! Release versions are semver-like: the published catalog (mis-)uses the
//! prerelease field as a build counter, so `2.3.0-4` is the fourth build of
//! `2.3.0`. A version without a prerelease label names a floating tag that
//! moves between builds and is never mirrored.

use crate::error::{Error, Result};
use semver::Version;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// The `(major, minor)` pair shared by every build of a release line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MinorLine {
    pub major: u64,
    pub minor: u64,
}

impl MinorLine {
    pub fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for MinorLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A parsed release version
///
/// Ordering and equality follow semver precedence: major, minor, patch, then
/// prerelease (a prerelease sorts before the plain version it qualifies).
/// Build metadata is ignored, so `1.2.0-1+a` and `1.2.0-1+b` are equal.
#[derive(Debug, Clone)]
pub struct ReleaseVersion(Version);

impl ReleaseVersion {
    /// Parse a `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` string
    pub fn parse(input: &str) -> Result<Self> {
        Version::parse(input)
            .map(Self)
            .map_err(|e| Error::malformed_version(input, e.to_string()))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Prerelease label, if any
    pub fn prerelease(&self) -> Option<&str> {
        (!self.0.pre.is_empty()).then(|| self.0.pre.as_str())
    }

    /// Build metadata, if any
    pub fn build(&self) -> Option<&str> {
        (!self.0.build.is_empty()).then(|| self.0.build.as_str())
    }

    /// Whether this version names an immutable build (carries a prerelease label)
    pub fn is_immutable(&self) -> bool {
        !self.0.pre.is_empty()
    }

    /// The minor line this version belongs to
    pub fn line(&self) -> MinorLine {
        MinorLine::new(self.0.major, self.0.minor)
    }

    /// Same major and minor
    pub fn same_line(&self, other: &Self) -> bool {
        self.line() == other.line()
    }

    /// Same major, minor and patch
    pub fn same_build(&self, other: &Self) -> bool {
        self.same_line(other) && self.0.patch == other.0.patch
    }

    /// Semver precedence comparison
    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Whether this version supersedes `other` within the same minor line
    pub fn obsoletes(&self, other: &Self) -> bool {
        self.same_line(other) && self > other
    }

    pub fn as_semver(&self) -> &Version {
        &self.0
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ReleaseVersion {}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0.major, self.0.minor, self.0.patch)
            .cmp(&(other.0.major, other.0.minor, other.0.patch))
            .then_with(|| self.0.pre.cmp(&other.0.pre))
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for ReleaseVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.major.hash(state);
        self.0.minor.hash(state);
        self.0.patch.hash(state);
        self.0.pre.hash(state);
    }
}

impl FromStr for ReleaseVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for ReleaseVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn v(s: &str) -> ReleaseVersion {
        ReleaseVersion::parse(s).unwrap()
    }

    #[test]
    fn test_parse_fields() {
        let version = v("2.3.4-7+abc.1");
        assert_eq!(version.major(), 2);
        assert_eq!(version.minor(), 3);
        assert_eq!(version.patch(), 4);
        assert_eq!(version.prerelease(), Some("7"));
        assert_eq!(version.build(), Some("abc.1"));
        assert!(version.is_immutable());
        assert_eq!(version.line(), MinorLine::new(2, 3));
    }

    #[test]
    fn test_plain_version_is_floating() {
        let version = v("2.3.4");
        assert_eq!(version.prerelease(), None);
        assert!(!version.is_immutable());
    }

    #[test]
    fn test_build_metadata_alone_is_floating() {
        assert!(!v("2.3.4+build.5").is_immutable());
    }

    #[test_case("" ; "empty")]
    #[test_case("1.2" ; "missing patch")]
    #[test_case("1.2.3.4" ; "four components")]
    #[test_case("v1.2.3" ; "leading v")]
    #[test_case("01.2.3" ; "leading zero")]
    #[test_case("1.2.x" ; "non numeric patch")]
    #[test_case("1.2.3-" ; "empty prerelease")]
    fn test_malformed_versions(input: &str) {
        let err = ReleaseVersion::parse(input).unwrap_err();
        match err {
            Error::MalformedVersion { version, .. } => assert_eq!(version, input),
            other => panic!("expected MalformedVersion, got {other:?}"),
        }
    }

    #[test_case("1.2.0-1", "1.2.0" ; "prerelease before release")]
    #[test_case("1.2.0-1", "1.2.0-2" ; "build counter")]
    #[test_case("1.2.0-9", "1.2.0-10" ; "numeric identifiers compare numerically")]
    #[test_case("1.2.0-10", "1.2.1-1" ; "patch dominates prerelease")]
    #[test_case("1.2.9-1", "1.3.0-1" ; "minor dominates patch")]
    #[test_case("1.9.0-1", "2.0.0-1" ; "major dominates minor")]
    #[test_case("1.2.0-1", "1.2.0-alpha" ; "numeric before alphanumeric")]
    fn test_precedence(lower: &str, higher: &str) {
        assert_eq!(v(lower).compare(&v(higher)), Ordering::Less);
        assert_eq!(v(higher).compare(&v(lower)), Ordering::Greater);
    }

    #[test]
    fn test_equal_versions_compare_equal() {
        assert_eq!(v("1.2.0-1").compare(&v("1.2.0-1")), Ordering::Equal);
    }

    #[test]
    fn test_build_metadata_is_ignored_by_precedence() {
        let a = v("1.2.0-1+a");
        let b = v("1.2.0-1+b");
        assert_eq!(a.compare(&b), Ordering::Equal);
        assert_eq!(a, b);
        assert!(!a.obsoletes(&b));
        assert!(!b.obsoletes(&a));
        assert_eq!(a.to_string(), "1.2.0-1+a");
    }

    #[test]
    fn test_equal_precedence_hashes_equal() {
        use std::collections::HashSet;
        let set: HashSet<ReleaseVersion> = [v("1.2.0-1+a"), v("1.2.0-1+b"), v("1.2.0-1")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_line_and_build() {
        assert!(v("1.2.0-1").same_line(&v("1.2.5-3")));
        assert!(!v("1.2.0-1").same_line(&v("1.3.0-1")));
        assert!(!v("1.2.0-1").same_line(&v("2.2.0-1")));
        assert!(v("1.2.0-1").same_build(&v("1.2.0-4")));
        assert!(!v("1.2.0-1").same_build(&v("1.2.1-1")));
    }

    #[test]
    fn test_obsoletes_stays_within_line() {
        assert!(v("1.2.0-2").obsoletes(&v("1.2.0-1")));
        assert!(!v("1.2.0-1").obsoletes(&v("1.2.0-2")));
        assert!(!v("1.3.0-1").obsoletes(&v("1.2.0-9")));
    }

    #[test]
    fn test_display_round_trips_input() {
        assert_eq!(v("2.3.4-7").to_string(), "2.3.4-7");
        assert_eq!(MinorLine::new(2, 3).to_string(), "2.3");
    }

    fn arb_version() -> impl Strategy<Value = ReleaseVersion> {
        (
            0u64..3,
            0u64..3,
            0u64..3,
            proptest::option::of(1u64..12),
            proptest::option::of("[a-c]"),
        )
            .prop_map(|(major, minor, patch, build, metadata)| {
                let mut text = match build {
                    Some(b) => format!("{major}.{minor}.{patch}-{b}"),
                    None => format!("{major}.{minor}.{patch}"),
                };
                if let Some(m) = metadata {
                    text.push('+');
                    text.push_str(&m);
                }
                ReleaseVersion::parse(&text).unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_obsoletes_follows_order_within_line(a in arb_version(), b in arb_version()) {
            if a.same_line(&b) && a > b {
                prop_assert!(a.obsoletes(&b));
                prop_assert!(!b.obsoletes(&a));
            }
            if !a.same_line(&b) {
                prop_assert!(!a.obsoletes(&b));
                prop_assert!(!b.obsoletes(&a));
            }
        }

        #[test]
        fn prop_never_obsoletes_itself(a in arb_version()) {
            prop_assert!(a.same_build(&a));
            prop_assert!(!a.obsoletes(&a));
        }

        #[test]
        fn prop_same_build_implies_same_line(a in arb_version(), b in arb_version()) {
            if a.same_build(&b) {
                prop_assert!(a.same_line(&b));
            }
        }

        #[test]
        fn prop_order_is_total(a in arb_version(), b in arb_version()) {
            let forward = a.compare(&b);
            let backward = b.compare(&a);
            prop_assert_eq!(forward, backward.reverse());
            prop_assert_eq!(forward == Ordering::Equal, a == b);
        }
    }
}
