use chrono::{Datelike, Duration, NaiveDate};

use crate::error::ReportError;
use crate::model::{DateRange, GroupBy};

/// One period bucket: `[start, end)` with a display label. Buckets tile the
/// report range with no gap or overlap; the first bucket may start
/// mid-period when the range does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBucket {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodBucket {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Partition a date range into calendar-aligned period buckets.
///
/// The first bucket starts at `range.start`; each subsequent bucket starts
/// on a granularity boundary; the last bucket's exclusive end falls at or
/// after `range.end`.
pub fn build_buckets(range: &DateRange, group_by: GroupBy) -> Result<Vec<PeriodBucket>, ReportError> {
    range.validate()?;

    let mut buckets = Vec::new();
    let mut cursor = range.start;
    while cursor <= range.end {
        let end = next_boundary(cursor, group_by);
        buckets.push(PeriodBucket {
            label: bucket_label(cursor, group_by),
            start: cursor,
            end,
        });
        cursor = end;
    }
    Ok(buckets)
}

fn next_boundary(date: NaiveDate, group_by: GroupBy) -> NaiveDate {
    match group_by {
        GroupBy::Day => date + Duration::days(1),
        GroupBy::Week => {
            let into_week = date.weekday().num_days_from_monday() as i64;
            date + Duration::days(7 - into_week)
        }
        GroupBy::Month => next_month_start(date),
        GroupBy::Quarter => {
            // Jump past the last month of this quarter
            let quarter_end_month = quarter_start(date).month() + 2;
            next_month_start(ymd(date.year(), quarter_end_month, 1))
        }
        GroupBy::Year => ymd(date.year() + 1, 1, 1),
    }
}

fn bucket_label(start: NaiveDate, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Day => start.format("%Y-%m-%d").to_string(),
        GroupBy::Week => {
            let week = start.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        GroupBy::Month => start.format("%b %Y").to_string(),
        GroupBy::Quarter => {
            format!("Q{} {}", (start.month0() / 3) + 1, start.year())
        }
        GroupBy::Year => start.format("%Y").to_string(),
    }
}

// Calendar helpers, shared with date-preset resolution. Constructions are
// infallible: months stay in 1..=12 and day 1 always exists.

pub(crate) fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    ymd(date.year(), date.month(), 1)
}

pub(crate) fn quarter_start(date: NaiveDate) -> NaiveDate {
    ymd(date.year(), (date.month0() / 3) * 3 + 1, 1)
}

pub(crate) fn year_start(date: NaiveDate) -> NaiveDate {
    ymd(date.year(), 1, 1)
}

fn next_month_start(date: NaiveDate) -> NaiveDate {
    if date.month() == 12 {
        ymd(date.year() + 1, 1, 1)
    } else {
        ymd(date.year(), date.month() + 1, 1)
    }
}
