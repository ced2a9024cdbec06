use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bucket;
use crate::error::ReportError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which record source and reducer set a report runs over. Closed set;
/// adding a subject means adding a descriptor in `subjects.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSubject {
    Sales,
    Leads,
    Opportunities,
    Activities,
    Contacts,
}

impl ReportSubject {
    pub const ALL: [ReportSubject; 5] = [
        Self::Sales,
        Self::Leads,
        Self::Opportunities,
        Self::Activities,
        Self::Contacts,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Leads => "leads",
            Self::Opportunities => "opportunities",
            Self::Activities => "activities",
            Self::Contacts => "contacts",
        }
    }
}

impl fmt::Display for ReportSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReportSubject {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, ReportError> {
        match s {
            "sales" => Ok(Self::Sales),
            "leads" => Ok(Self::Leads),
            "opportunities" => Ok(Self::Opportunities),
            "activities" => Ok(Self::Activities),
            "contacts" => Ok(Self::Contacts),
            other => Err(ReportError::UnsupportedSubject(other.to_string())),
        }
    }
}

/// Period bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl FromStr for GroupBy {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, ReportError> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(ReportError::ConfigParse(format!(
                "unknown group_by '{other}' (expected day, week, month, quarter, or year)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
}

impl FromStr for ChartKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, ReportError> {
        match s {
            "line" => Ok(Self::Line),
            "bar" => Ok(Self::Bar),
            "pie" => Ok(Self::Pie),
            other => Err(ReportError::ConfigParse(format!(
                "unknown chart kind '{other}' (expected line, bar, or pie)"
            ))),
        }
    }
}

/// Inclusive date range. `start <= end` is validated at the builder
/// boundary, not on construction, so deserialized configs surface the
/// violation as a report error rather than a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.start > self.end {
            return Err(ReportError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Named range presets offered by the report builder UI. Resolution takes
/// an explicit `today` so preset math stays deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    ThisMonth,
    LastMonth,
    ThisQuarter,
    LastQuarter,
    YearToDate,
    LastYear,
}

impl DatePreset {
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        match self {
            Self::ThisMonth => DateRange {
                start: bucket::month_start(today),
                end: today,
            },
            Self::LastMonth => {
                let end = bucket::month_start(today).pred_opt().unwrap_or(today);
                DateRange {
                    start: bucket::month_start(end),
                    end,
                }
            }
            Self::ThisQuarter => DateRange {
                start: bucket::quarter_start(today),
                end: today,
            },
            Self::LastQuarter => {
                let end = bucket::quarter_start(today).pred_opt().unwrap_or(today);
                DateRange {
                    start: bucket::quarter_start(end),
                    end,
                }
            }
            Self::YearToDate => DateRange {
                start: bucket::year_start(today),
                end: today,
            },
            Self::LastYear => {
                let end = bucket::year_start(today).pred_opt().unwrap_or(today);
                DateRange {
                    start: bucket::year_start(end),
                    end,
                }
            }
        }
    }
}

impl FromStr for DatePreset {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, ReportError> {
        match s {
            "this_month" => Ok(Self::ThisMonth),
            "last_month" => Ok(Self::LastMonth),
            "this_quarter" => Ok(Self::ThisQuarter),
            "last_quarter" => Ok(Self::LastQuarter),
            "year_to_date" => Ok(Self::YearToDate),
            "last_year" => Ok(Self::LastYear),
            other => Err(ReportError::ConfigParse(format!(
                "unknown date preset '{other}'"
            ))),
        }
    }
}

/// One report run's full configuration. Immutable once handed to the
/// builder; reconfiguring means constructing a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfiguration {
    pub subject: ReportSubject,
    pub date_range: DateRange,
    pub group_by: GroupBy,
    #[serde(default)]
    pub show_chart: bool,
    #[serde(default)]
    pub chart_kind: ChartKind,
}

impl ReportConfiguration {
    /// Parse from a TOML document. Dates are ISO strings:
    ///
    /// ```toml
    /// subject = "sales"
    /// group_by = "month"
    /// show_chart = true
    /// chart_kind = "line"
    ///
    /// [date_range]
    /// start = "2023-01-01"
    /// end = "2023-03-31"
    /// ```
    pub fn from_toml(s: &str) -> Result<Self, ReportError> {
        toml::from_str(s).map_err(|e| ReportError::ConfigParse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single raw business record pulled from the CRM data store. Numeric
/// fields live in `values`, categorical fields in `tags`; reducers read
/// whichever they need and ignore the rest.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub values: HashMap<String, f64>,
    pub tags: HashMap<String, String>,
}

impl RawRecord {
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    pub fn tag(&self, field: &str) -> Option<&str> {
        self.tags.get(field).map(|s| s.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A single cell value in an aggregate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(_) => 0.0,
        }
    }
}

/// One row per period bucket. Rows are ordered by period ascending with no
/// duplicates; a bucket with no matching records still yields a row with
/// zero-valued fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub period: String,
    pub values: HashMap<String, FieldValue>,
}

impl AggregateRow {
    /// Cell value under a column key. `period` reads the bucket label;
    /// unknown keys read as numeric zero.
    pub fn field(&self, key: &str) -> FieldValue {
        if key == "period" {
            return FieldValue::Text(self.period.clone());
        }
        self.values
            .get(key)
            .cloned()
            .unwrap_or(FieldValue::Number(0.0))
    }

    pub fn number(&self, key: &str) -> f64 {
        self.field(key).as_number()
    }
}

/// How a column's values render, both on screen and in exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Currency,
    Percentage,
    Count,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub key: &'static str,
    pub display_name: &'static str,
    pub value_kind: ValueKind,
}

/// One derived headline figure for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiValue {
    pub key: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub value_kind: ValueKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KpiSet {
    pub values: Vec<KpiValue>,
    /// Percent change of the subject's primary field between the last two
    /// periods. `None` with fewer than two periods or a zero prior value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_over_period: Option<f64>,
}

impl KpiSet {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.iter().find(|k| k.key == key).map(|k| k.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<f64>,
    pub color: &'static str,
}

/// Normalized chart payload: `labels.len() == points.len()` for every
/// series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Everything one report run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub subject: ReportSubject,
    pub rows: Vec<AggregateRow>,
    pub kpis: KpiSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartData>,
}
