// CSV export

use meridian_reporting::model::{AggregateRow, ColumnDescriptor, FieldValue};

use crate::error::ExportError;

/// Serialize rows to CSV: one header line of display names, one line per
/// row. Fields containing delimiters or quotes are quoted per RFC 4180 by
/// the writer.
pub fn write_csv(
    rows: &[AggregateRow],
    columns: &[ColumnDescriptor],
) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(|c| c.display_name))
        .map_err(|e| ExportError::Csv(e.to_string()))?;

    for row in rows {
        let record: Vec<String> = columns.iter().map(|c| cell_text(&row.field(c.key))).collect();
        writer
            .write_record(&record)
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

/// Raw cell text: numbers drop a trailing `.0`, text passes through.
fn cell_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        FieldValue::Text(s) => s.clone(),
    }
}
