use std::collections::HashMap;

use crate::bucket::PeriodBucket;
use crate::model::{AggregateRow, FieldValue, RawRecord, ReportSubject};
use crate::subjects::{subject_spec, Reducer};

/// Bucket raw records and apply the subject's reducer set.
///
/// Every bucket yields exactly one row, in bucket order; an empty bucket
/// produces zero-valued fields. Records dated outside every bucket are
/// ignored. Input records are never mutated.
pub fn aggregate(
    subject: ReportSubject,
    records: &[RawRecord],
    buckets: &[PeriodBucket],
) -> Vec<AggregateRow> {
    let spec = subject_spec(subject);

    buckets
        .iter()
        .map(|bucket| {
            let in_bucket: Vec<&RawRecord> =
                records.iter().filter(|r| bucket.contains(r.date)).collect();

            let mut values = HashMap::new();
            for (key, reducer) in spec.reducers {
                values.insert((*key).to_string(), apply_reducer(reducer, &in_bucket));
            }

            AggregateRow {
                period: bucket.label.clone(),
                values,
            }
        })
        .collect()
}

fn apply_reducer(reducer: &Reducer, records: &[&RawRecord]) -> FieldValue {
    let count = records.len() as f64;
    match reducer {
        Reducer::Count => FieldValue::Number(count),
        Reducer::Sum(field) => FieldValue::Number(sum(records, field)),
        Reducer::Mean(field) => {
            if records.is_empty() {
                FieldValue::Number(0.0)
            } else {
                FieldValue::Number(sum(records, field) / count)
            }
        }
        Reducer::PerRecord(field) => {
            if records.is_empty() {
                FieldValue::Number(0.0)
            } else {
                FieldValue::Number(sum(records, field) / count)
            }
        }
        Reducer::Percent { num, den } => {
            let denominator: f64 = den.iter().map(|field| sum(records, field)).sum();
            if denominator == 0.0 {
                FieldValue::Number(0.0)
            } else {
                FieldValue::Number(100.0 * sum(records, num) / denominator)
            }
        }
        Reducer::PercentOfCount(field) => {
            if records.is_empty() {
                FieldValue::Number(0.0)
            } else {
                FieldValue::Number(100.0 * sum(records, field) / count)
            }
        }
        Reducer::CountWhere { tag, value } => {
            let n = records.iter().filter(|r| r.tag(tag) == Some(*value)).count();
            FieldValue::Number(n as f64)
        }
        Reducer::TagBreakdown(tag) => FieldValue::Text(tag_breakdown(records, tag)),
    }
}

/// Records missing the field contribute nothing to the sum.
fn sum(records: &[&RawRecord], field: &str) -> f64 {
    records.iter().filter_map(|r| r.value(field)).sum()
}

/// Render the top two shares of a categorical tag, e.g.
/// `"Web (45%), Referral (30%)"`. Ties break alphabetically.
fn tag_breakdown(records: &[&RawRecord], tag: &str) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if let Some(value) = record.tag(tag) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return String::new();
    }

    let mut shares: Vec<(&str, usize)> = counts.into_iter().collect();
    shares.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    shares
        .iter()
        .take(2)
        .map(|(value, n)| {
            let pct = (100.0 * *n as f64 / total as f64).round();
            format!("{value} ({pct:.0}%)")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::build_buckets;
    use crate::model::{DateRange, GroupBy};
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sale(date: &str, amount: f64, conversion_rate: f64) -> RawRecord {
        RawRecord {
            date: d(date),
            values: HashMap::from([
                ("amount".into(), amount),
                ("conversion_rate".into(), conversion_rate),
            ]),
            tags: HashMap::new(),
        }
    }

    fn contact(date: &str, is_new: f64, source: &str) -> RawRecord {
        RawRecord {
            date: d(date),
            values: HashMap::from([("is_new".into(), is_new)]),
            tags: HashMap::from([("source".into(), source.into())]),
        }
    }

    fn month_buckets(start: &str, end: &str) -> Vec<PeriodBucket> {
        let range = DateRange {
            start: d(start),
            end: d(end),
        };
        build_buckets(&range, GroupBy::Month).unwrap()
    }

    #[test]
    fn sales_reducers_per_bucket() {
        let records = vec![
            sale("2023-01-05", 10000.0, 20.0),
            sale("2023-01-20", 6000.0, 30.0),
            sale("2023-02-10", 9000.0, 25.0),
        ];
        let buckets = month_buckets("2023-01-01", "2023-02-28");
        let rows = aggregate(ReportSubject::Sales, &records, &buckets);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "Jan 2023");
        assert_eq!(rows[0].number("revenue"), 16000.0);
        assert_eq!(rows[0].number("deals"), 2.0);
        assert_eq!(rows[0].number("avg_deal_size"), 8000.0);
        assert_eq!(rows[0].number("conversion_rate"), 25.0);
        assert_eq!(rows[1].number("revenue"), 9000.0);
        assert_eq!(rows[1].number("deals"), 1.0);
    }

    #[test]
    fn empty_bucket_still_yields_zero_row() {
        let records = vec![
            sale("2023-01-05", 10000.0, 20.0),
            sale("2023-03-10", 9000.0, 25.0),
        ];
        let buckets = month_buckets("2023-01-01", "2023-03-31");
        let rows = aggregate(ReportSubject::Sales, &records, &buckets);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].period, "Feb 2023");
        assert_eq!(rows[1].number("revenue"), 0.0);
        assert_eq!(rows[1].number("deals"), 0.0);
        assert_eq!(rows[1].number("avg_deal_size"), 0.0);
        assert_eq!(rows[1].number("conversion_rate"), 0.0);
    }

    #[test]
    fn records_outside_buckets_are_ignored() {
        let records = vec![
            sale("2022-12-31", 99999.0, 10.0),
            sale("2023-01-05", 10000.0, 20.0),
            sale("2023-04-01", 88888.0, 10.0),
        ];
        let buckets = month_buckets("2023-01-01", "2023-03-31");
        let rows = aggregate(ReportSubject::Sales, &records, &buckets);
        let total: f64 = rows.iter().map(|r| r.number("revenue")).sum();
        assert_eq!(total, 10000.0);
    }

    #[test]
    fn opportunity_win_rate_guards_no_decided_deals() {
        let record = RawRecord {
            date: d("2023-01-10"),
            values: HashMap::from([
                ("value".into(), 50000.0),
                ("won".into(), 0.0),
                ("lost".into(), 0.0),
            ]),
            tags: HashMap::new(),
        };
        let buckets = month_buckets("2023-01-01", "2023-01-31");
        let rows = aggregate(ReportSubject::Opportunities, &[record], &buckets);
        assert_eq!(rows[0].number("win_rate"), 0.0);
        assert_eq!(rows[0].number("value"), 50000.0);
    }

    #[test]
    fn activity_counts_split_by_kind() {
        let activity = |date: &str, kind: &str| RawRecord {
            date: d(date),
            values: HashMap::new(),
            tags: HashMap::from([("kind".into(), kind.into())]),
        };
        let records = vec![
            activity("2023-01-03", "call"),
            activity("2023-01-04", "call"),
            activity("2023-01-05", "meeting"),
            activity("2023-01-06", "email"),
            activity("2023-01-09", "task"),
        ];
        let buckets = month_buckets("2023-01-01", "2023-01-31");
        let rows = aggregate(ReportSubject::Activities, &records, &buckets);
        assert_eq!(rows[0].number("calls"), 2.0);
        assert_eq!(rows[0].number("meetings"), 1.0);
        assert_eq!(rows[0].number("emails"), 1.0);
        assert_eq!(rows[0].number("tasks"), 1.0);
    }

    #[test]
    fn contact_source_breakdown_top_two() {
        let records = vec![
            contact("2023-01-02", 1.0, "Web"),
            contact("2023-01-03", 1.0, "Web"),
            contact("2023-01-04", 0.0, "Web"),
            contact("2023-01-05", 1.0, "Referral"),
            contact("2023-01-06", 0.0, "Referral"),
            contact("2023-01-09", 1.0, "Event"),
        ];
        let buckets = month_buckets("2023-01-01", "2023-01-31");
        let rows = aggregate(ReportSubject::Contacts, &records, &buckets);

        assert_eq!(rows[0].number("new"), 4.0);
        assert_eq!(rows[0].number("active"), 6.0);
        match rows[0].field("by_source") {
            FieldValue::Text(s) => assert_eq!(s, "Web (50%), Referral (33%)"),
            other => panic!("expected text breakdown, got {other:?}"),
        }
    }

    #[test]
    fn breakdown_empty_bucket_is_empty_text() {
        let buckets = month_buckets("2023-01-01", "2023-01-31");
        let rows = aggregate(ReportSubject::Contacts, &[], &buckets);
        assert_eq!(rows[0].field("by_source"), FieldValue::Text(String::new()));
    }

    #[test]
    fn input_records_not_mutated() {
        let records = vec![sale("2023-01-05", 10000.0, 20.0)];
        let before = records.clone();
        let buckets = month_buckets("2023-01-01", "2023-01-31");
        let _ = aggregate(ReportSubject::Sales, &records, &buckets);
        assert_eq!(records, before);
    }
}
