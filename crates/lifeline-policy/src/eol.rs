//! Published end-of-life table
//!
//! The table is a local JSON document, either a bare list of
//! `{major, minor, published_eol}` entries or an object holding that list
//! under `published_eol_dates`.

use camino::Utf8Path;
use chrono::{DateTime, Utc};
use lifeline_core::{EndOfLifeEntry, Error, MinorLine, Result};
use serde::Deserialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use tracing::{debug, warn};

#[derive(Deserialize)]
#[serde(untagged)]
enum EolDocument {
    Entries(Vec<EndOfLifeEntry>),
    Wrapped {
        #[serde(alias = "astronomer_airflow_published_eol_dates")]
        published_eol_dates: Vec<EndOfLifeEntry>,
    },
}

/// Read-only lookup of published end-of-life dates by minor line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EolTable {
    entries: BTreeMap<MinorLine, DateTime<Utc>>,
}

impl EolTable {
    /// A table with no published dates; every line falls back to the policy floor
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from entries; the first entry for a line wins
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = EndOfLifeEntry>,
    {
        let mut table = BTreeMap::new();
        for entry in entries {
            match table.entry(entry.line()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry.published_eol);
                }
                Entry::Occupied(existing) => {
                    warn!(
                        "Ignoring duplicate end-of-life entry for {} ({}); keeping {}",
                        existing.key(),
                        entry.published_eol.to_rfc3339(),
                        existing.get().to_rfc3339()
                    );
                }
            }
        }
        Self { entries: table }
    }

    /// Parse a JSON end-of-life document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: EolDocument = serde_json::from_str(content)
            .map_err(|e| Error::invalid_config(format!("Invalid end-of-life table: {}", e)))?;

        let entries = match document {
            EolDocument::Entries(entries) => entries,
            EolDocument::Wrapped {
                published_eol_dates,
            } => published_eol_dates,
        };

        Ok(Self::from_entries(entries))
    }

    /// Load the end-of-life table from a JSON file
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::config_not_found(path.as_str()));
        }

        let content = fs::read_to_string(path)?;
        let table = Self::from_json_str(&content)
            .map_err(|e| Error::invalid_config(format!("{}: {}", path, e)))?;

        debug!("Loaded {} end-of-life entries from {}", table.len(), path);
        Ok(table)
    }

    /// Published end-of-life date for a line, if one exists
    pub fn published_eol(&self, line: MinorLine) -> Option<DateTime<Utc>> {
        self.entries.get(&line).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MinorLine, DateTime<Utc>)> + '_ {
        self.entries.iter().map(|(line, eol)| (*line, *eol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_bare_list_document() {
        let table = EolTable::from_json_str(
            r#"[
                {"major": 2, "minor": 1, "published_eol": "2022-07-01"},
                {"major": 2, "minor": 2, "published_eol": "2023-03-01T00:00:00+00:00"}
            ]"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.published_eol(MinorLine::new(2, 1)),
            Some(date(2022, 7, 1))
        );
        assert_eq!(table.published_eol(MinorLine::new(2, 3)), None);
    }

    #[test]
    fn test_wrapped_document() {
        let table = EolTable::from_json_str(
            r#"{"published_eol_dates": [{"major": 1, "minor": 10, "published_eol": "2021-06-17"}]}"#,
        )
        .unwrap();
        assert_eq!(
            table.published_eol(MinorLine::new(1, 10)),
            Some(date(2021, 6, 17))
        );
    }

    #[test]
    fn test_legacy_wrapper_key() {
        let table = EolTable::from_json_str(
            r#"{"astronomer_airflow_published_eol_dates": [{"major": 1, "minor": 10, "published_eol": "2021-06-17"}]}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let table = EolTable::from_entries([
            EndOfLifeEntry::new(2, 1, date(2022, 7, 1)),
            EndOfLifeEntry::new(2, 1, date(2030, 1, 1)),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.published_eol(MinorLine::new(2, 1)),
            Some(date(2022, 7, 1))
        );
    }

    #[test]
    fn test_malformed_document_is_config_error() {
        for bad in [
            "{",
            r#"{"entries": []}"#,
            r#"[{"major": 2, "minor": 1, "published_eol": "next year"}]"#,
        ] {
            assert!(
                matches!(EolTable::from_json_str(bad), Err(Error::InvalidConfig { .. })),
                "should reject {bad}"
            );
        }
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(temp.path().join("eol.json")).unwrap();
        fs::write(
            &path,
            r#"[{"major": 2, "minor": 4, "published_eol": "2024-01-01"}]"#,
        )
        .unwrap();

        let table = EolTable::load(&path).unwrap();
        assert_eq!(table.iter().count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = EolTable::load(Utf8Path::new("/nonexistent/eol.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }
}
