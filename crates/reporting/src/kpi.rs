use crate::model::{AggregateRow, KpiSet, KpiValue, ReportSubject};
use crate::subjects::{subject_spec, KpiRule};

/// Derive whole-run headline figures from the aggregate rows.
///
/// Each rule is either a sum across periods, a ratio computed once over the
/// totals, or an unweighted mean of a per-period rate; which one applies is
/// a per-KPI property of the subject, never a global policy. An empty row
/// set yields all zeros with no division.
pub fn derive_kpis(subject: ReportSubject, rows: &[AggregateRow]) -> KpiSet {
    let spec = subject_spec(subject);

    let values = spec
        .kpis
        .iter()
        .map(|kpi| KpiValue {
            key: kpi.key,
            label: kpi.label,
            value: apply_rule(&kpi.rule, rows),
            value_kind: kpi.value_kind,
        })
        .collect();

    KpiSet {
        values,
        period_over_period: period_over_period(rows, spec.primary_field),
    }
}

fn apply_rule(rule: &KpiRule, rows: &[AggregateRow]) -> f64 {
    match rule {
        KpiRule::Total(field) => total(rows, field),
        KpiRule::RatioOfSums { num, den, percent } => {
            let denominator: f64 = den.iter().map(|field| total(rows, field)).sum();
            if denominator == 0.0 {
                return 0.0;
            }
            let ratio = total(rows, num) / denominator;
            if *percent {
                100.0 * ratio
            } else {
                ratio
            }
        }
        KpiRule::MeanOfPeriods(field) => {
            if rows.is_empty() {
                0.0
            } else {
                total(rows, field) / rows.len() as f64
            }
        }
    }
}

fn total(rows: &[AggregateRow], field: &str) -> f64 {
    rows.iter().map(|row| row.number(field)).sum()
}

fn period_over_period(rows: &[AggregateRow], field: &str) -> Option<f64> {
    if rows.len() < 2 {
        return None;
    }
    let last = rows[rows.len() - 1].number(field);
    let prev = rows[rows.len() - 2].number(field);
    if prev == 0.0 {
        return None;
    }
    Some(100.0 * (last - prev) / prev)
}
