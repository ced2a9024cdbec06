//! `meridian-export` — report table serialization.
//!
//! Turns aggregate rows plus column metadata into a downloadable artifact:
//! an XLSX workbook with format-aware cell styling, or a CSV document.
//! Everything is serialized in memory; callers own writing bytes anywhere.

pub mod csv;
pub mod error;
pub mod xlsx;

use chrono::NaiveDate;

use meridian_reporting::model::{AggregateRow, ColumnDescriptor};
use meridian_reporting::subject_spec;
use meridian_reporting::ReportSubject;

pub use error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, ExportError> {
        match s {
            "excel" | "xlsx" => Ok(Self::Excel),
            "csv" => Ok(Self::Csv),
            other => Err(ExportError::Format(format!(
                "unknown export format '{other}' (expected excel or csv)"
            ))),
        }
    }
}

/// A fully serialized export: the payload bytes and the file name they
/// should be saved under.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Serialize a report table.
///
/// `file_name_base` falls back to `{subject}_report_{export_date}`; the
/// export date is passed in rather than read from the clock so callers and
/// tests control it. Bytes are only returned on full success.
pub fn export_table(
    subject: ReportSubject,
    rows: &[AggregateRow],
    columns: &[ColumnDescriptor],
    format: ExportFormat,
    file_name_base: Option<&str>,
    export_date: NaiveDate,
) -> Result<ExportArtifact, ExportError> {
    let base = match file_name_base {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default_file_name_base(subject, export_date),
    };

    match format {
        ExportFormat::Csv => Ok(ExportArtifact {
            bytes: csv::write_csv(rows, columns)?,
            file_name: format!("{base}.csv"),
        }),
        ExportFormat::Excel => Ok(ExportArtifact {
            bytes: xlsx::write_xlsx(subject_spec(subject).display_name, rows, columns)?,
            file_name: format!("{base}.xlsx"),
        }),
    }
}

pub fn default_file_name_base(subject: ReportSubject, export_date: NaiveDate) -> String {
    format!("{subject}_report_{}", export_date.format("%Y-%m-%d"))
}
