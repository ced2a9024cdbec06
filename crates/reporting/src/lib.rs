//! `meridian-reporting` — CRM report pipeline engine.
//!
//! Pure engine crate: receives a report configuration plus raw records,
//! returns aggregate rows, KPIs, and chart series. No UI or export
//! dependencies.

pub mod aggregate;
pub mod bucket;
pub mod builder;
pub mod chart;
pub mod error;
pub mod kpi;
pub mod model;
pub mod source;
pub mod subjects;

pub use builder::{run, RecordSource};
pub use error::ReportError;
pub use model::{
    AggregateRow, ChartData, ChartKind, DateRange, GroupBy, RawRecord, ReportConfiguration,
    ReportOutput, ReportSubject,
};
pub use subjects::subject_spec;
