//! CSV-backed record source: maps delimited exports of the CRM data store
//! onto raw records the pipeline can aggregate.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::builder::RecordSource;
use crate::error::ReportError;
use crate::model::{DateRange, RawRecord, ReportSubject};

/// Column holding the record timestamp.
const DATE_COLUMN: &str = "date";

/// Parse CSV data into raw records. The `date` column is required and must
/// be `YYYY-MM-DD`; every other column lands in `values` when it parses as
/// a number and in `tags` otherwise. Empty cells are skipped.
pub fn load_csv_records(csv_data: &str) -> Result<Vec<RawRecord>, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReportError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or_else(|| ReportError::MissingColumn {
            column: DATE_COLUMN.into(),
        })?;

    let mut records = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReportError::Io(e.to_string()))?;

        let date_str = record.get(date_idx).unwrap_or("");
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
            ReportError::DateParse {
                record: line + 1,
                value: date_str.into(),
            }
        })?;

        let mut values = HashMap::new();
        let mut tags = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            if i == date_idx {
                continue;
            }
            let cell = record.get(i).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(n) => {
                    values.insert(header.clone(), n);
                }
                Err(_) => {
                    tags.insert(header.clone(), cell.to_string());
                }
            }
        }

        records.push(RawRecord { date, values, tags });
    }

    Ok(records)
}

/// In-memory source over per-subject CSV snapshots, the feed the CLI hands
/// to the report builder.
#[derive(Default)]
pub struct CsvRecordSource {
    records: HashMap<ReportSubject, Vec<RawRecord>>,
}

impl CsvRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register one subject's records.
    pub fn load_subject(&mut self, subject: ReportSubject, csv_data: &str) -> Result<(), ReportError> {
        let records = load_csv_records(csv_data)?;
        self.records.insert(subject, records);
        Ok(())
    }

    /// Load `<subject>.csv` for every subject file present in a directory.
    pub fn from_dir(dir: &Path) -> Result<Self, ReportError> {
        let mut source = Self::new();
        for subject in ReportSubject::ALL {
            let path = dir.join(format!("{}.csv", subject.key()));
            if !path.exists() {
                continue;
            }
            let csv_data = std::fs::read_to_string(&path)
                .map_err(|e| ReportError::Io(format!("cannot read {}: {e}", path.display())))?;
            source.load_subject(subject, &csv_data)?;
        }
        Ok(source)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for CsvRecordSource {
    fn fetch_records(
        &self,
        subject: ReportSubject,
        range: &DateRange,
    ) -> Result<Vec<RawRecord>, ReportError> {
        let records = self.records.get(&subject).ok_or_else(|| {
            ReportError::Source(format!("no records loaded for subject '{subject}'"))
        })?;
        Ok(records
            .iter()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn load_csv_splits_numeric_and_tag_columns() {
        let csv = "\
date,amount,conversion_rate,region
2023-01-15,8000,22,EMEA
2023-02-03,12500.50,25,NA
";
        let records = load_csv_records(csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, d("2023-01-15"));
        assert_eq!(records[0].value("amount"), Some(8000.0));
        assert_eq!(records[0].tag("region"), Some("EMEA"));
        assert_eq!(records[1].value("amount"), Some(12500.5));
    }

    #[test]
    fn load_csv_requires_date_column() {
        let csv = "amount,region\n8000,EMEA\n";
        let err = load_csv_records(csv).unwrap_err();
        match err {
            ReportError::MissingColumn { column } => assert_eq!(column, "date"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn load_csv_rejects_bad_dates() {
        let csv = "date,amount\n2023-01-15,100\n15/02/2023,200\n";
        let err = load_csv_records(csv).unwrap_err();
        match err {
            ReportError::DateParse { record, value } => {
                assert_eq!(record, 2);
                assert_eq!(value, "15/02/2023");
            }
            other => panic!("expected date parse error, got {other:?}"),
        }
    }

    #[test]
    fn fetch_filters_to_range() {
        let csv = "\
date,amount
2022-12-30,100
2023-01-10,200
2023-02-20,300
";
        let mut source = CsvRecordSource::new();
        source.load_subject(ReportSubject::Sales, csv).unwrap();

        let range = DateRange {
            start: d("2023-01-01"),
            end: d("2023-01-31"),
        };
        let records = source.fetch_records(ReportSubject::Sales, &range).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("amount"), Some(200.0));
    }

    #[test]
    fn fetch_unloaded_subject_is_a_source_error() {
        let source = CsvRecordSource::new();
        let range = DateRange {
            start: d("2023-01-01"),
            end: d("2023-01-31"),
        };
        let err = source.fetch_records(ReportSubject::Leads, &range).unwrap_err();
        assert!(matches!(err, ReportError::Source(_)));
    }
}
