//! `meridian-store` — durable store for named report configurations.
//!
//! Saved reports live in a single JSON document under the user config
//! directory. All mutation goes through a mutex-guarded in-memory copy that
//! is rewritten to disk on every change, so concurrent saves never lose
//! updates and content survives restarts.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use meridian_reporting::ReportConfiguration;

/// A persisted configuration plus its metadata. Never mutated after
/// creation; re-saving a name creates a separate entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedReport {
    pub id: String,
    pub name: String,
    pub configuration: ReportConfiguration,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum StoreError {
    /// File read/write failure.
    Io(String),
    /// Stored document is not valid JSON for the current schema.
    Parse(String),
    /// Lookup of an id that is not in the store.
    SavedReportNotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "saved reports IO error: {msg}"),
            Self::Parse(msg) => write!(f, "saved reports file is corrupt: {msg}"),
            Self::SavedReportNotFound(id) => write!(f, "no saved report with id '{id}'"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug)]
pub struct ReportStore {
    path: PathBuf,
    reports: Mutex<Vec<SavedReport>>,
}

impl ReportStore {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meridian")
            .join("saved_reports.json")
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(Self::default_path())
    }

    /// Open a store at an explicit path. A missing file is an empty store;
    /// a present-but-corrupt file is an error rather than silent data loss.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let reports = match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| StoreError::Parse(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };
        Ok(Self {
            path,
            reports: Mutex::new(reports),
        })
    }

    /// Append a new saved report with a fresh id. Always creates; a prior
    /// entry under the same name is left untouched.
    pub fn save(
        &self,
        name: &str,
        configuration: ReportConfiguration,
    ) -> Result<SavedReport, StoreError> {
        let report = SavedReport {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            configuration,
            created_at: Utc::now(),
        };
        let mut reports = self.reports.lock().unwrap();
        reports.push(report.clone());
        self.persist(&reports)?;
        Ok(report)
    }

    /// All saved reports, most recent first.
    pub fn list(&self) -> Vec<SavedReport> {
        let reports = self.reports.lock().unwrap();
        let mut out = reports.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    pub fn get(&self, id: &str) -> Result<SavedReport, StoreError> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::SavedReportNotFound(id.to_string()))
    }

    /// Remove by id. Deleting an id that is not present is a no-op, not an
    /// error.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut reports = self.reports.lock().unwrap();
        let before = reports.len();
        reports.retain(|r| r.id != id);
        if reports.len() != before {
            self.persist(&reports)?;
        }
        Ok(())
    }

    fn persist(&self, reports: &[SavedReport]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(reports).map_err(|e| StoreError::Parse(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| StoreError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use meridian_reporting::model::{ChartKind, DateRange, GroupBy};
    use meridian_reporting::ReportSubject;
    use tempfile::tempdir;

    fn config() -> ReportConfiguration {
        ReportConfiguration {
            subject: ReportSubject::Sales,
            date_range: DateRange {
                start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
            },
            group_by: GroupBy::Month,
            show_chart: true,
            chart_kind: ChartKind::Bar,
        }
    }

    #[test]
    fn save_then_list_and_get() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path().join("saved_reports.json")).unwrap();

        let saved = store.save("Q1 Sales", config()).unwrap();
        assert!(!saved.id.is_empty());

        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Q1 Sales");
        assert_eq!(listed[0].configuration, config());

        let fetched = store.get(&saved.id).unwrap();
        assert_eq!(fetched.name, "Q1 Sales");
    }

    #[test]
    fn same_name_saves_twice_as_distinct_entries() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path().join("saved_reports.json")).unwrap();

        let first = store.save("Weekly", config()).unwrap();
        let second = store.save("Weekly", config()).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn delete_unknown_id_is_a_no_op() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path().join("saved_reports.json")).unwrap();
        store.save("Keep me", config()).unwrap();

        store.delete("not-a-real-id").unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn delete_removes_only_the_target() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path().join("saved_reports.json")).unwrap();
        let first = store.save("First", config()).unwrap();
        store.save("Second", config()).unwrap();

        store.delete(&first.id).unwrap();
        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Second");
    }

    #[test]
    fn get_unknown_id_errors() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path().join("saved_reports.json")).unwrap();
        let err = store.get("ghost").unwrap_err();
        assert!(matches!(err, StoreError::SavedReportNotFound(_)));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn content_survives_reopening() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved_reports.json");

        let saved = {
            let store = ReportStore::open(&path).unwrap();
            store.save("Durable", config()).unwrap()
        };

        let reopened = ReportStore::open(&path).unwrap();
        let listed = reopened.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(listed[0].configuration, config());
    }

    #[test]
    fn corrupt_file_is_surfaced_not_swallowed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved_reports.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ReportStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.list().is_empty());
    }
}
