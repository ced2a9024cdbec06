use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use meridian_reporting::model::{ChartKind, DateRange, FieldValue, GroupBy};
use meridian_reporting::source::CsvRecordSource;
use meridian_reporting::{run, RawRecord, RecordSource, ReportConfiguration, ReportSubject};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

struct FixedSource(Vec<RawRecord>);

impl RecordSource for FixedSource {
    fn fetch_records(
        &self,
        _subject: ReportSubject,
        _range: &DateRange,
    ) -> Result<Vec<RawRecord>, meridian_reporting::ReportError> {
        Ok(self.0.clone())
    }
}

/// `deals` closed-deal records summing exactly to `revenue`, spread across
/// the month, each carrying the same conversion rate.
fn month_of_sales(year: i32, month: u32, deals: u32, revenue: f64, conversion: f64) -> Vec<RawRecord> {
    let base = (revenue / deals as f64).floor();
    (0..deals)
        .map(|i| {
            let amount = if i == deals - 1 {
                revenue - base * (deals - 1) as f64
            } else {
                base
            };
            RawRecord {
                date: NaiveDate::from_ymd_opt(year, month, 1 + (i % 28)).unwrap(),
                values: HashMap::from([
                    ("amount".into(), amount),
                    ("conversion_rate".into(), conversion),
                ]),
                tags: HashMap::new(),
            }
        })
        .collect()
}

#[test]
fn sales_quarter_end_to_end() {
    // Jan: 125,000 over 15 deals; Feb: 142,000 over 18; Mar: 168,000 over 22
    let mut records = month_of_sales(2023, 1, 15, 125000.0, 22.0);
    records.extend(month_of_sales(2023, 2, 18, 142000.0, 25.0));
    records.extend(month_of_sales(2023, 3, 22, 168000.0, 28.0));

    let config = ReportConfiguration {
        subject: ReportSubject::Sales,
        date_range: DateRange {
            start: d("2023-01-01"),
            end: d("2023-03-31"),
        },
        group_by: GroupBy::Month,
        show_chart: true,
        chart_kind: ChartKind::Line,
    };

    let output = run(&config, &FixedSource(records)).unwrap();

    assert_eq!(output.rows.len(), 3);
    let periods: Vec<&str> = output.rows.iter().map(|r| r.period.as_str()).collect();
    assert_eq!(periods, vec!["Jan 2023", "Feb 2023", "Mar 2023"]);
    assert_eq!(output.rows[0].number("revenue"), 125000.0);
    assert_eq!(output.rows[0].number("deals"), 15.0);
    assert_eq!(output.rows[1].number("revenue"), 142000.0);
    assert_eq!(output.rows[2].number("deals"), 22.0);

    assert_eq!(output.kpis.get("total_revenue"), Some(435000.0));
    assert_eq!(output.kpis.get("total_deals"), Some(55.0));
    assert_eq!(output.kpis.get("avg_deal_size"), Some(435000.0 / 55.0));
    assert_eq!(output.kpis.get("conversion_rate"), Some(25.0));

    let chart = output.chart.unwrap();
    assert_eq!(chart.labels.len(), 3);
    assert_eq!(chart.series[0].points, vec![125000.0, 142000.0, 168000.0]);
}

#[test]
fn csv_fixture_through_full_pipeline() {
    let source = CsvRecordSource::from_dir(&fixtures_dir()).unwrap();

    let config = ReportConfiguration {
        subject: ReportSubject::Sales,
        date_range: DateRange {
            start: d("2023-01-01"),
            end: d("2023-03-31"),
        },
        group_by: GroupBy::Month,
        show_chart: false,
        chart_kind: ChartKind::Line,
    };

    let output = run(&config, &source).unwrap();
    assert_eq!(output.rows.len(), 3);
    assert_eq!(output.rows[0].number("revenue"), 125000.0);
    assert_eq!(output.rows[1].number("revenue"), 142000.0);
    assert_eq!(output.rows[2].number("revenue"), 168000.0);
    assert_eq!(output.kpis.get("total_revenue"), Some(435000.0));
    assert_eq!(output.kpis.get("total_deals"), Some(9.0));
}

#[test]
fn contacts_fixture_source_breakdown() {
    let source = CsvRecordSource::from_dir(&fixtures_dir()).unwrap();

    let config = ReportConfiguration {
        subject: ReportSubject::Contacts,
        date_range: DateRange {
            start: d("2023-01-01"),
            end: d("2023-03-31"),
        },
        group_by: GroupBy::Quarter,
        show_chart: false,
        chart_kind: ChartKind::Line,
    };

    let output = run(&config, &source).unwrap();
    assert_eq!(output.rows.len(), 1);
    assert_eq!(output.rows[0].period, "Q1 2023");
    assert_eq!(output.rows[0].number("new"), 7.0);
    assert_eq!(output.rows[0].number("active"), 10.0);
    match output.rows[0].field("by_source") {
        FieldValue::Text(s) => assert_eq!(s, "Web (50%), Referral (30%)"),
        other => panic!("expected breakdown text, got {other:?}"),
    }
}

#[test]
fn narrower_range_excludes_out_of_range_records() {
    let source = CsvRecordSource::from_dir(&fixtures_dir()).unwrap();

    let config = ReportConfiguration {
        subject: ReportSubject::Sales,
        date_range: DateRange {
            start: d("2023-02-01"),
            end: d("2023-02-28"),
        },
        group_by: GroupBy::Month,
        show_chart: false,
        chart_kind: ChartKind::Line,
    };

    let output = run(&config, &source).unwrap();
    assert_eq!(output.rows.len(), 1);
    assert_eq!(output.rows[0].number("revenue"), 142000.0);
    assert_eq!(output.kpis.get("total_revenue"), Some(142000.0));
}
