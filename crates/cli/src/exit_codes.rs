//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Range | Domain  | Description                              |
//! |-------|---------|------------------------------------------|
//! | 0     | -       | Success                                  |
//! | 1     | -       | General error (unspecified)              |
//! | 2     | -       | Usage error (bad args, missing file)     |
//! | 3-9   | report  | Configuration and data-source codes      |
//! | 10-19 | export  | Export serialization codes               |
//! | 20-29 | saved   | Saved-report store codes                 |

use meridian_export::ExportError;
use meridian_reporting::ReportError;
use meridian_store::StoreError;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE: u8 = 2;

/// Invalid report configuration (bad range, unknown subject, bad TOML).
pub const EXIT_REPORT_CONFIG: u8 = 3;

/// Record data could not be loaded or fetched.
pub const EXIT_REPORT_DATA: u8 = 4;

/// Export serialization failed.
pub const EXIT_EXPORT_FAILED: u8 = 10;

/// Saved-report store IO or parse failure.
pub const EXIT_STORE: u8 = 20;

/// Saved report id not found.
pub const EXIT_STORE_NOT_FOUND: u8 = 21;

pub fn report_exit_code(err: &ReportError) -> u8 {
    match err {
        ReportError::InvalidRange { .. }
        | ReportError::UnsupportedSubject(_)
        | ReportError::ConfigParse(_) => EXIT_REPORT_CONFIG,
        ReportError::Source(_)
        | ReportError::MissingColumn { .. }
        | ReportError::DateParse { .. }
        | ReportError::Io(_) => EXIT_REPORT_DATA,
    }
}

pub fn export_exit_code(err: &ExportError) -> u8 {
    match err {
        ExportError::Format(_) => EXIT_USAGE,
        ExportError::Workbook(_) | ExportError::Csv(_) => EXIT_EXPORT_FAILED,
    }
}

pub fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::SavedReportNotFound(_) => EXIT_STORE_NOT_FOUND,
        StoreError::Io(_) | StoreError::Parse(_) => EXIT_STORE,
    }
}
