//! Per-subject descriptor table: columns, reducers, KPI rules, and chart
//! fields for every report subject, consumed by the generic pipeline.

use crate::model::{ColumnDescriptor, ReportSubject, ValueKind};

/// A per-bucket aggregation over the bucket's filtered record set. Pure:
/// reducers never mutate records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reducer {
    /// Number of records in the bucket.
    Count,
    /// Sum of one numeric field.
    Sum(&'static str),
    /// Unweighted mean of one numeric field, 0 for an empty bucket.
    Mean(&'static str),
    /// Sum of one field divided by the record count, 0 for an empty bucket.
    PerRecord(&'static str),
    /// 100 * sum(num) / sum over the `den` fields, 0 when the denominator
    /// is 0.
    Percent {
        num: &'static str,
        den: &'static [&'static str],
    },
    /// 100 * sum(field) / record count, 0 for an empty bucket.
    PercentOfCount(&'static str),
    /// Records whose tag equals the given value.
    CountWhere {
        tag: &'static str,
        value: &'static str,
    },
    /// Top shares of a categorical tag, rendered like
    /// `"Web (45%), Referral (30%)"`.
    TagBreakdown(&'static str),
}

/// How one whole-run KPI is computed from the aggregate rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KpiRule {
    /// Sum of a row field across all periods.
    Total(&'static str),
    /// Ratio of summed row fields (ratio of sums, never a mean of
    /// per-period ratios), 0-guarded. `percent` scales by 100.
    RatioOfSums {
        num: &'static str,
        den: &'static [&'static str],
        percent: bool,
    },
    /// Unweighted mean of a per-period rate that has no additive total.
    MeanOfPeriods(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct KpiSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub value_kind: ValueKind,
    pub rule: KpiRule,
}

/// Everything the pipeline needs to know about one subject.
pub struct SubjectSpec {
    pub display_name: &'static str,
    /// Table columns in display order, `period` first.
    pub columns: &'static [ColumnDescriptor],
    /// (column key, reducer) pairs producing the non-period columns.
    pub reducers: &'static [(&'static str, Reducer)],
    pub kpis: &'static [KpiSpec],
    /// (column key, series label) pairs plotted for line/bar charts.
    pub chart_fields: &'static [(&'static str, &'static str)],
    /// Field a pie chart slices over, also the basis of the
    /// period-over-period delta.
    pub primary_field: &'static str,
}

const fn col(key: &'static str, display_name: &'static str, value_kind: ValueKind) -> ColumnDescriptor {
    ColumnDescriptor {
        key,
        display_name,
        value_kind,
    }
}

static SALES: SubjectSpec = SubjectSpec {
    display_name: "Sales Report",
    columns: &[
        col("period", "Period", ValueKind::Text),
        col("revenue", "Revenue", ValueKind::Currency),
        col("deals", "Deals Closed", ValueKind::Count),
        col("avg_deal_size", "Avg. Deal Size", ValueKind::Currency),
        col("conversion_rate", "Conversion Rate", ValueKind::Percentage),
    ],
    reducers: &[
        ("revenue", Reducer::Sum("amount")),
        ("deals", Reducer::Count),
        ("avg_deal_size", Reducer::PerRecord("amount")),
        ("conversion_rate", Reducer::Mean("conversion_rate")),
    ],
    kpis: &[
        KpiSpec {
            key: "total_revenue",
            label: "Total Revenue",
            value_kind: ValueKind::Currency,
            rule: KpiRule::Total("revenue"),
        },
        KpiSpec {
            key: "avg_deal_size",
            label: "Average Deal Size",
            value_kind: ValueKind::Currency,
            rule: KpiRule::RatioOfSums {
                num: "revenue",
                den: &["deals"],
                percent: false,
            },
        },
        KpiSpec {
            key: "total_deals",
            label: "Total Deals",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("deals"),
        },
        KpiSpec {
            key: "conversion_rate",
            label: "Conversion Rate",
            value_kind: ValueKind::Percentage,
            rule: KpiRule::MeanOfPeriods("conversion_rate"),
        },
    ],
    chart_fields: &[("revenue", "Revenue")],
    primary_field: "revenue",
};

static LEADS: SubjectSpec = SubjectSpec {
    display_name: "Leads Report",
    columns: &[
        col("period", "Period", ValueKind::Text),
        col("new", "New Leads", ValueKind::Count),
        col("qualified", "Qualified Leads", ValueKind::Count),
        col("converted", "Converted", ValueKind::Count),
        col("conversion_rate", "Conversion Rate", ValueKind::Percentage),
    ],
    reducers: &[
        ("new", Reducer::Count),
        ("qualified", Reducer::Sum("qualified")),
        ("converted", Reducer::Sum("converted")),
        ("conversion_rate", Reducer::PercentOfCount("converted")),
    ],
    kpis: &[
        KpiSpec {
            key: "total_new",
            label: "New Leads",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("new"),
        },
        KpiSpec {
            key: "total_qualified",
            label: "Qualified Leads",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("qualified"),
        },
        KpiSpec {
            key: "total_converted",
            label: "Converted Leads",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("converted"),
        },
        KpiSpec {
            key: "conversion_rate",
            label: "Avg. Conversion Rate",
            value_kind: ValueKind::Percentage,
            rule: KpiRule::MeanOfPeriods("conversion_rate"),
        },
    ],
    chart_fields: &[
        ("new", "New Leads"),
        ("qualified", "Qualified Leads"),
        ("converted", "Converted Leads"),
    ],
    primary_field: "new",
};

static OPPORTUNITIES: SubjectSpec = SubjectSpec {
    display_name: "Opportunities Report",
    columns: &[
        col("period", "Period", ValueKind::Text),
        col("new", "New Opportunities", ValueKind::Count),
        col("value", "Pipeline Value", ValueKind::Currency),
        col("won", "Won", ValueKind::Count),
        col("lost", "Lost", ValueKind::Count),
        col("win_rate", "Win Rate", ValueKind::Percentage),
    ],
    reducers: &[
        ("new", Reducer::Count),
        ("value", Reducer::Sum("value")),
        ("won", Reducer::Sum("won")),
        ("lost", Reducer::Sum("lost")),
        (
            "win_rate",
            Reducer::Percent {
                num: "won",
                den: &["won", "lost"],
            },
        ),
    ],
    kpis: &[
        KpiSpec {
            key: "total_new",
            label: "New Opportunities",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("new"),
        },
        KpiSpec {
            key: "total_value",
            label: "Pipeline Value",
            value_kind: ValueKind::Currency,
            rule: KpiRule::Total("value"),
        },
        KpiSpec {
            key: "total_won",
            label: "Won Opportunities",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("won"),
        },
        // Overall rate over the totals, not a mean of per-period rates:
        // small and large periods must not weigh equally.
        KpiSpec {
            key: "win_rate",
            label: "Overall Win Rate",
            value_kind: ValueKind::Percentage,
            rule: KpiRule::RatioOfSums {
                num: "won",
                den: &["won", "lost"],
                percent: true,
            },
        },
    ],
    chart_fields: &[
        ("value", "Pipeline Value"),
        ("won", "Won Opportunities"),
        ("lost", "Lost Opportunities"),
    ],
    primary_field: "value",
};

static ACTIVITIES: SubjectSpec = SubjectSpec {
    display_name: "Activities Report",
    columns: &[
        col("period", "Period", ValueKind::Text),
        col("calls", "Calls", ValueKind::Count),
        col("meetings", "Meetings", ValueKind::Count),
        col("emails", "Emails", ValueKind::Count),
        col("tasks", "Tasks Completed", ValueKind::Count),
    ],
    reducers: &[
        (
            "calls",
            Reducer::CountWhere {
                tag: "kind",
                value: "call",
            },
        ),
        (
            "meetings",
            Reducer::CountWhere {
                tag: "kind",
                value: "meeting",
            },
        ),
        (
            "emails",
            Reducer::CountWhere {
                tag: "kind",
                value: "email",
            },
        ),
        (
            "tasks",
            Reducer::CountWhere {
                tag: "kind",
                value: "task",
            },
        ),
    ],
    kpis: &[
        KpiSpec {
            key: "total_calls",
            label: "Calls",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("calls"),
        },
        KpiSpec {
            key: "total_meetings",
            label: "Meetings",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("meetings"),
        },
        KpiSpec {
            key: "total_emails",
            label: "Emails",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("emails"),
        },
        KpiSpec {
            key: "total_tasks",
            label: "Tasks Completed",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("tasks"),
        },
    ],
    chart_fields: &[
        ("calls", "Calls"),
        ("meetings", "Meetings"),
        ("emails", "Emails"),
    ],
    primary_field: "calls",
};

static CONTACTS: SubjectSpec = SubjectSpec {
    display_name: "Contacts Report",
    columns: &[
        col("period", "Period", ValueKind::Text),
        col("new", "New Contacts", ValueKind::Count),
        col("active", "Active Contacts", ValueKind::Count),
        col("by_source", "By Source", ValueKind::Text),
    ],
    reducers: &[
        ("new", Reducer::Sum("is_new")),
        ("active", Reducer::Count),
        ("by_source", Reducer::TagBreakdown("source")),
    ],
    kpis: &[
        KpiSpec {
            key: "total_new",
            label: "New Contacts",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("new"),
        },
        KpiSpec {
            key: "total_active",
            label: "Active Contacts",
            value_kind: ValueKind::Count,
            rule: KpiRule::Total("active"),
        },
    ],
    chart_fields: &[("new", "New Contacts"), ("active", "Active Contacts")],
    primary_field: "new",
};

pub fn subject_spec(subject: ReportSubject) -> &'static SubjectSpec {
    match subject {
        ReportSubject::Sales => &SALES,
        ReportSubject::Leads => &LEADS,
        ReportSubject::Opportunities => &OPPORTUNITIES,
        ReportSubject::Activities => &ACTIVITIES,
        ReportSubject::Contacts => &CONTACTS,
    }
}
