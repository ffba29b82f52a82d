//! Support window evaluation
//!
//! A release stays in support until the later of two dates: its release
//! date plus the minimum support duration (the floor), and the published
//! end-of-life date for its minor line. A published date earlier than the
//! floor never shortens support.

use crate::eol::EolTable;
use chrono::{DateTime, Duration, Utc};
use lifeline_core::Release;
use serde::Serialize;
use tracing::trace;

/// Minimum support duration applied when no configuration overrides it
pub const DEFAULT_MINIMUM_SUPPORT_DAYS: u32 = 180;

/// Derived support window of a single release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportWindow {
    /// Release date the window is measured from
    pub starts: DateTime<Utc>,
    /// Release date plus the minimum support duration
    pub floor: DateTime<Utc>,
    /// Published end-of-life date for the line, if any
    pub published_eol: Option<DateTime<Utc>>,
    /// The date support actually ends
    pub effective_eol: DateTime<Utc>,
}

impl SupportWindow {
    /// Half-open: `now == effective_eol` is already out of support
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        now < self.effective_eol
    }

    /// Whether the published date extended support beyond the floor
    pub fn extended_by_published_eol(&self) -> bool {
        self.effective_eol > self.floor
    }
}

/// End-of-life policy: minimum support floor combined with published dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportPolicy {
    minimum_support: Duration,
}

impl SupportPolicy {
    pub fn new(minimum_support: Duration) -> Self {
        Self { minimum_support }
    }

    pub fn from_days(days: u32) -> Self {
        Self::new(Duration::days(i64::from(days)))
    }

    pub fn minimum_support(&self) -> Duration {
        self.minimum_support
    }

    /// Release date plus the minimum support duration
    pub fn support_floor(&self, release: &Release) -> DateTime<Utc> {
        release
            .release_date
            .checked_add_signed(self.minimum_support)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Compute the full support window of a release
    pub fn window(&self, release: &Release, eol_table: &EolTable) -> SupportWindow {
        let floor = self.support_floor(release);
        let published_eol = eol_table.published_eol(release.line());

        let effective_eol = match published_eol {
            Some(published) if published >= floor => published,
            _ => floor,
        };

        SupportWindow {
            starts: release.release_date,
            floor,
            published_eol,
            effective_eol,
        }
    }

    /// The date support for this release ends
    pub fn effective_eol(&self, release: &Release, eol_table: &EolTable) -> DateTime<Utc> {
        self.window(release, eol_table).effective_eol
    }

    /// Whether the release is still supported at `now`
    pub fn is_in_support(&self, release: &Release, eol_table: &EolTable, now: DateTime<Utc>) -> bool {
        let window = self.window(release, eol_table);
        let supported = window.is_open_at(now);
        trace!(
            "{} released {} supported until {}: {}",
            release.version,
            window.starts.to_rfc3339(),
            window.effective_eol.to_rfc3339(),
            if supported { "in support" } else { "expired" }
        );
        supported
    }
}

impl Default for SupportPolicy {
    fn default() -> Self {
        Self::from_days(DEFAULT_MINIMUM_SUPPORT_DAYS)
    }
}

/// Evaluate a release against the default policy
pub fn is_in_support(release: &Release, eol_table: &EolTable, now: DateTime<Utc>) -> bool {
    SupportPolicy::default().is_in_support(release, eol_table, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lifeline_core::{EndOfLifeEntry, ReleaseVersion};
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn release_at(version: &str, released: DateTime<Utc>) -> Release {
        Release::new(
            ReleaseVersion::parse(version).unwrap(),
            released,
            [version.to_string()],
        )
    }

    fn table_with(major: u64, minor: u64, eol: DateTime<Utc>) -> EolTable {
        EolTable::from_entries([EndOfLifeEntry::new(major, minor, eol)])
    }

    #[test_case(Duration::days(180), false ; "exactly on the floor")]
    #[test_case(Duration::days(180) - Duration::seconds(1), true ; "one second inside")]
    #[test_case(Duration::days(180) + Duration::seconds(1), false ; "one second past")]
    #[test_case(Duration::days(1), true ; "fresh release")]
    #[test_case(Duration::days(400), false ; "long expired")]
    fn test_floor_boundary_without_published_eol(age: Duration, expected: bool) {
        let release = release_at("2.3.0-1", now() - age);
        assert_eq!(is_in_support(&release, &EolTable::empty(), now()), expected);
    }

    #[test]
    fn test_published_eol_before_floor_is_ignored() {
        let release = release_at("2.3.0-1", now() - Duration::days(200));
        let table = table_with(2, 3, now() - Duration::days(190));

        let window = SupportPolicy::default().window(&release, &table);
        assert_eq!(window.effective_eol, release.release_date + Duration::days(180));
        assert_eq!(window.effective_eol, now() - Duration::days(20));
        assert!(!window.extended_by_published_eol());
        assert!(!is_in_support(&release, &table, now()));
    }

    #[test]
    fn test_floor_keeps_release_alive_past_early_published_eol() {
        let release = release_at("2.3.0-1", now() - Duration::days(100));
        let table = table_with(2, 3, now() - Duration::days(90));

        assert_eq!(
            SupportPolicy::default().effective_eol(&release, &table),
            now() + Duration::days(80)
        );
        assert!(is_in_support(&release, &table, now()));
    }

    #[test]
    fn test_published_eol_after_floor_extends_support() {
        let release = release_at("2.3.0-1", now() - Duration::days(400));
        let table = table_with(2, 3, now() + Duration::days(30));

        let window = SupportPolicy::default().window(&release, &table);
        assert_eq!(window.effective_eol, now() + Duration::days(30));
        assert!(window.extended_by_published_eol());
        assert!(is_in_support(&release, &table, now()));
    }

    #[test]
    fn test_published_eol_boundary_is_strict() {
        let release = release_at("2.3.0-1", now() - Duration::days(400));
        let table = table_with(2, 3, now());
        assert!(!is_in_support(&release, &table, now()));
    }

    #[test]
    fn test_published_eol_for_other_line_does_not_apply() {
        let release = release_at("2.3.0-1", now() - Duration::days(400));
        let table = table_with(2, 4, now() + Duration::days(30));
        assert!(!is_in_support(&release, &table, now()));
    }

    #[test]
    fn test_custom_minimum_support() {
        let policy = SupportPolicy::from_days(30);
        let release = release_at("2.3.0-1", now() - Duration::days(45));
        assert_eq!(policy.minimum_support(), Duration::days(30));
        assert!(!policy.is_in_support(&release, &EolTable::empty(), now()));
        assert!(SupportPolicy::from_days(60).is_in_support(&release, &EolTable::empty(), now()));
    }

    #[test]
    fn test_floor_saturates_instead_of_overflowing() {
        let release = release_at("2.3.0-1", DateTime::<Utc>::MAX_UTC - Duration::days(1));
        let policy = SupportPolicy::default();
        assert_eq!(policy.support_floor(&release), DateTime::<Utc>::MAX_UTC);
    }
}
