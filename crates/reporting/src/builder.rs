use crate::aggregate::aggregate;
use crate::bucket::build_buckets;
use crate::chart::to_chart_data;
use crate::error::ReportError;
use crate::kpi::derive_kpis;
use crate::model::{DateRange, RawRecord, ReportConfiguration, ReportOutput, ReportSubject};

/// Read-only record feed backing a report run. Implementations own their
/// retry and timeout policy; the pipeline treats a fetch as
/// deterministic-for-a-snapshot and propagates its errors unchanged.
pub trait RecordSource {
    fn fetch_records(
        &self,
        subject: ReportSubject,
        range: &DateRange,
    ) -> Result<Vec<RawRecord>, ReportError>;
}

/// Run the full pipeline for one configuration.
///
/// Validates the range before anything touches the source, then buckets,
/// aggregates, and derives KPIs. Chart data is computed only when the
/// configuration asks for it. No side effects beyond the source read, so
/// repeated runs over an unchanged source return identical output.
pub fn run(
    config: &ReportConfiguration,
    source: &dyn RecordSource,
) -> Result<ReportOutput, ReportError> {
    config.date_range.validate()?;

    let records = source.fetch_records(config.subject, &config.date_range)?;
    let buckets = build_buckets(&config.date_range, config.group_by)?;
    let rows = aggregate(config.subject, &records, &buckets);
    let kpis = derive_kpis(config.subject, &rows);
    let chart = config
        .show_chart
        .then(|| to_chart_data(config.subject, &rows, config.chart_kind));

    Ok(ReportOutput {
        subject: config.subject,
        rows,
        kpis,
        chart,
    })
}
