use crate::model::{AggregateRow, ChartData, ChartKind, ChartSeries, ReportSubject};
use crate::subjects::subject_spec;

/// Fixed series palette. Series take colors by position modulo the palette
/// length, so identical inputs always color identically.
pub const PALETTE: [&str; 6] = [
    "#4BC0C0", "#36A2EB", "#FFCE56", "#9966FF", "#FF9F40", "#FF6384",
];

/// Reshape aggregate rows into a chart payload.
///
/// Line and bar charts plot one series per subject chart field; a pie chart
/// slices the subject's primary field across periods in a single series.
/// Empty rows yield empty labels and empty-pointed series, never an error.
pub fn to_chart_data(subject: ReportSubject, rows: &[AggregateRow], kind: ChartKind) -> ChartData {
    let spec = subject_spec(subject);
    let labels: Vec<String> = rows.iter().map(|row| row.period.clone()).collect();

    let series = match kind {
        ChartKind::Line | ChartKind::Bar => spec
            .chart_fields
            .iter()
            .enumerate()
            .map(|(i, (key, label))| ChartSeries {
                label: (*label).to_string(),
                points: rows.iter().map(|row| row.number(key)).collect(),
                color: PALETTE[i % PALETTE.len()],
            })
            .collect(),
        ChartKind::Pie => {
            let label = spec
                .chart_fields
                .iter()
                .find(|(key, _)| *key == spec.primary_field)
                .map(|(_, label)| *label)
                .unwrap_or(spec.primary_field);
            vec![ChartSeries {
                label: label.to_string(),
                points: rows.iter().map(|row| row.number(spec.primary_field)).collect(),
                color: PALETTE[0],
            }]
        }
    };

    ChartData {
        kind,
        labels,
        series,
    }
}
