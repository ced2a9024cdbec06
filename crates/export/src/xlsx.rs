// XLSX export via rust_xlsxwriter

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use meridian_reporting::model::{AggregateRow, ColumnDescriptor, FieldValue, ValueKind};

use crate::error::ExportError;

/// Header fill, the light blue the report screens use for table chrome.
const HEADER_FILL: u32 = 0xE0E6F1;

const CURRENCY_NUM_FORMAT: &str = "$#,##0.00";
const PERCENT_NUM_FORMAT: &str = "0.00%";

/// Serialize rows into a single-worksheet workbook.
///
/// The sheet is named after the report's display name; headers are bold on
/// a light fill; currency and percentage columns carry number formats; and
/// every populated cell gets a thin border. Returns the finished `.xlsx`
/// bytes, or nothing at all on failure.
pub fn write_xlsx(
    sheet_name: &str,
    rows: &[AggregateRow],
    columns: &[ColumnDescriptor],
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| ExportError::Workbook(format!("cannot create sheet '{sheet_name}': {e}")))?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new().set_border(FormatBorder::Thin);
    let currency_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_num_format(CURRENCY_NUM_FORMAT);
    let percent_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_num_format(PERCENT_NUM_FORMAT);

    for (c, column) in columns.iter().enumerate() {
        let c = c as u16;
        worksheet
            .write_string_with_format(0, c, column.display_name, &header_format)
            .map_err(|e| ExportError::Workbook(e.to_string()))?;
        worksheet
            .set_column_width(c, column_width(column))
            .map_err(|e| ExportError::Workbook(e.to_string()))?;
    }

    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, column) in columns.iter().enumerate() {
            let c = c as u16;
            match (column.value_kind, row.field(column.key)) {
                (ValueKind::Currency, value) => {
                    worksheet.write_number_with_format(r, c, value.as_number(), &currency_format)
                }
                // Scaled so Excel renders a stored 22 as 22.00%
                (ValueKind::Percentage, value) => worksheet.write_number_with_format(
                    r,
                    c,
                    value.as_number() / 100.0,
                    &percent_format,
                ),
                (ValueKind::Count, value) => {
                    worksheet.write_number_with_format(r, c, value.as_number(), &cell_format)
                }
                (ValueKind::Text, FieldValue::Text(s)) => {
                    worksheet.write_string_with_format(r, c, &s, &cell_format)
                }
                (ValueKind::Text, FieldValue::Number(n)) => {
                    worksheet.write_number_with_format(r, c, n, &cell_format)
                }
            }
            .map_err(|e| ExportError::Workbook(e.to_string()))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ExportError::Workbook(e.to_string()))
}

/// Fit the column to its header with breathing room, floor of 12.
fn column_width(column: &ColumnDescriptor) -> f64 {
    (column.display_name.len() + 5).max(12) as f64
}
