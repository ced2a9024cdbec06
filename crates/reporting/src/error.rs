use std::fmt;

use chrono::NaiveDate;

#[derive(Debug)]
pub enum ReportError {
    /// End date precedes start date.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// Report subject name outside the closed subject set.
    UnsupportedSubject(String),
    /// TOML parse / deserialization error for a report configuration.
    ConfigParse(String),
    /// Record fetch failure from the backing data source.
    Source(String),
    /// Missing required column in input data.
    MissingColumn { column: String },
    /// Date parse error on an input record.
    DateParse { record: usize, value: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { start, end } => {
                write!(f, "end date {end} must not precede start date {start}")
            }
            Self::UnsupportedSubject(name) => {
                write!(
                    f,
                    "unsupported report subject '{name}' (expected sales, leads, opportunities, activities, or contacts)"
                )
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::Source(msg) => write!(f, "record fetch failed: {msg}"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::DateParse { record, value } => {
                write!(f, "record {record}: cannot parse date '{value}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReportError {}
