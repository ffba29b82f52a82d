//! Release graph resolution
//!
//! Within a minor line, a newer build obsoletes every older one. The line's
//! latest build is the one nothing obsoletes; its initial build is the one
//! that obsoletes nothing. Support is decided per line from the initial
//! build's release date, and the tags of the latest build are what gets
//! mirrored.
//!
//! Releases are grouped by minor line and each group is reduced to its
//! minimum and maximum builds, which selects exactly the releases the
//! pairwise `obsoletes` definition would.

use chrono::{DateTime, Utc};
use lifeline_core::{MinorLine, Release, ReleaseVersion};
use lifeline_policy::{EolTable, SupportPolicy, SupportWindow};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace, warn};

/// The builds that bound one minor line
#[derive(Debug, Clone)]
pub struct LineBuilds {
    line: MinorLine,
    /// Every release sharing the line's lowest version
    initial: Vec<Release>,
    /// Every release sharing the line's highest version
    latest: Vec<Release>,
}

impl LineBuilds {
    pub fn line(&self) -> MinorLine {
        self.line
    }

    pub fn initial(&self) -> &[Release] {
        &self.initial
    }

    pub fn latest(&self) -> &[Release] {
        &self.latest
    }

    pub fn initial_version(&self) -> &ReleaseVersion {
        &self.initial[0].version
    }

    pub fn latest_version(&self) -> &ReleaseVersion {
        &self.latest[0].version
    }

    /// Union of the tags of every latest build
    pub fn latest_tags(&self) -> BTreeSet<String> {
        self.latest
            .iter()
            .flat_map(|release| release.tags.iter().cloned())
            .collect()
    }

    /// Support window of the line, measured from its initial build
    ///
    /// When several releases share the initial version the most generous
    /// window is used, so the line is supported if any of them is. `None`
    /// only for a line without builds.
    pub fn window(&self, policy: &SupportPolicy, eol_table: &EolTable) -> Option<SupportWindow> {
        self.initial
            .iter()
            .map(|release| policy.window(release, eol_table))
            .max_by_key(|window| window.effective_eol)
    }

    pub fn is_in_support(
        &self,
        policy: &SupportPolicy,
        eol_table: &EolTable,
        now: DateTime<Utc>,
    ) -> bool {
        self.initial
            .iter()
            .any(|release| policy.is_in_support(release, eol_table, now))
    }

    fn reduce(line: MinorLine, releases: Vec<Release>) -> Option<Self> {
        let min = releases.iter().map(|r| &r.version).min()?.clone();
        let max = releases.iter().map(|r| &r.version).max()?.clone();

        let initial: Vec<Release> = releases
            .iter()
            .filter(|r| r.version == min)
            .cloned()
            .collect();
        let latest: Vec<Release> = releases.into_iter().filter(|r| r.version == max).collect();

        if latest.len() > 1 {
            let distinct: BTreeSet<&BTreeSet<String>> = latest.iter().map(|r| &r.tags).collect();
            if distinct.len() > 1 {
                warn!(
                    "Catalog lists {} releases for {} with different tags; mirroring the union",
                    latest.len(),
                    max
                );
            }
        }

        Some(Self {
            line,
            initial,
            latest,
        })
    }
}

/// Per-line support summary
#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    pub line: MinorLine,
    pub initial_version: ReleaseVersion,
    pub latest_version: ReleaseVersion,
    pub initial_release_date: DateTime<Utc>,
    pub published_eol: Option<DateTime<Utc>>,
    pub effective_eol: DateTime<Utc>,
    pub in_support: bool,
    pub tags: Vec<String>,
}

/// Immutable releases grouped by minor line
#[derive(Debug, Clone, Default)]
pub struct ReleaseGraph {
    lines: BTreeMap<MinorLine, LineBuilds>,
    immutable_count: usize,
}

impl ReleaseGraph {
    /// Build the graph, dropping floating releases
    pub fn build<I>(releases: I) -> Self
    where
        I: IntoIterator<Item = Release>,
    {
        let mut grouped: BTreeMap<MinorLine, Vec<Release>> = BTreeMap::new();
        let mut immutable_count = 0;

        for release in releases {
            if !release.is_immutable() {
                trace!("Skipping floating release {}", release.version);
                continue;
            }
            immutable_count += 1;
            grouped.entry(release.line()).or_default().push(release);
        }

        let lines: BTreeMap<MinorLine, LineBuilds> = grouped
            .into_iter()
            .filter_map(|(line, releases)| LineBuilds::reduce(line, releases).map(|b| (line, b)))
            .collect();

        debug!(
            "Grouped {} immutable releases into {} minor lines",
            immutable_count,
            lines.len()
        );

        Self {
            lines,
            immutable_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of immutable releases the graph was built from
    pub fn immutable_count(&self) -> usize {
        self.immutable_count
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineBuilds> {
        self.lines.values()
    }

    pub fn line(&self, line: MinorLine) -> Option<&LineBuilds> {
        self.lines.get(&line)
    }

    /// Releases no other release obsoletes
    pub fn latest_builds(&self) -> Vec<&Release> {
        self.lines.values().flat_map(|b| b.latest.iter()).collect()
    }

    /// Releases that obsolete no other release
    pub fn initial_builds(&self) -> Vec<&Release> {
        self.lines.values().flat_map(|b| b.initial.iter()).collect()
    }

    /// Lines whose initial build is still within its support window
    pub fn supported_lines(
        &self,
        policy: &SupportPolicy,
        eol_table: &EolTable,
        now: DateTime<Utc>,
    ) -> Vec<MinorLine> {
        self.lines
            .values()
            .filter(|builds| builds.is_in_support(policy, eol_table, now))
            .map(|builds| builds.line)
            .collect()
    }

    /// Sorted, de-duplicated tags of the latest build of every supported line
    pub fn supported_tags(
        &self,
        policy: &SupportPolicy,
        eol_table: &EolTable,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let tags: BTreeSet<String> = self
            .lines
            .values()
            .filter(|builds| builds.is_in_support(policy, eol_table, now))
            .flat_map(|builds| builds.latest_tags())
            .collect();

        tags.into_iter().collect()
    }

    /// Support summary for every line, in line order
    pub fn report(
        &self,
        policy: &SupportPolicy,
        eol_table: &EolTable,
        now: DateTime<Utc>,
    ) -> Vec<LineReport> {
        self.lines
            .values()
            .filter_map(|builds| {
                let window = builds.window(policy, eol_table)?;
                Some(LineReport {
                    line: builds.line,
                    initial_version: builds.initial_version().clone(),
                    latest_version: builds.latest_version().clone(),
                    initial_release_date: window.starts,
                    published_eol: window.published_eol,
                    effective_eol: window.effective_eol,
                    in_support: window.is_open_at(now),
                    tags: builds.latest_tags().into_iter().collect(),
                })
            })
            .collect()
    }
}

/// Resolve the tags to mirror from a release catalog
pub fn resolve_tags<I>(
    releases: I,
    policy: &SupportPolicy,
    eol_table: &EolTable,
    now: DateTime<Utc>,
) -> Vec<String>
where
    I: IntoIterator<Item = Release>,
{
    ReleaseGraph::build(releases).supported_tags(policy, eol_table, now)
}
