//! `mcrm run` / `mcrm export` — drive the report pipeline from the shell.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::Args;

use meridian_export::{export_table, ExportFormat};
use meridian_reporting::model::{ChartKind, DatePreset, FieldValue, GroupBy, ValueKind};
use meridian_reporting::source::CsvRecordSource;
use meridian_reporting::{
    run, subject_spec, DateRange, ReportConfiguration, ReportOutput, ReportSubject,
};

use crate::exit_codes::EXIT_REPORT_DATA;
use crate::CliError;

/// Report configuration, either from a TOML file or assembled from flags.
#[derive(Args)]
pub struct ConfigArgs {
    /// Report config TOML file (overrides the individual flags)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report subject: sales, leads, opportunities, activities, contacts
    #[arg(long)]
    pub subject: Option<String>,

    /// Range start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Range end date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Named range preset: this_month, last_month, this_quarter,
    /// last_quarter, year_to_date, last_year
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub preset: Option<String>,

    /// Bucket granularity: day, week, month, quarter, year
    #[arg(long, default_value = "month")]
    pub group_by: String,

    /// Compute chart data of this kind: line, bar, pie
    #[arg(long)]
    pub chart: Option<String>,
}

pub fn resolve_config(args: &ConfigArgs) -> Result<ReportConfiguration, CliError> {
    if let Some(ref path) = args.config {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CliError::args(format!("cannot read {}: {e}", path.display())))?;
        return ReportConfiguration::from_toml(&contents).map_err(CliError::report);
    }

    let subject: ReportSubject = args
        .subject
        .as_deref()
        .ok_or_else(|| CliError::args("--subject is required without --config"))?
        .parse()
        .map_err(CliError::report)?;

    let date_range = resolve_range(args)?;
    let group_by: GroupBy = args.group_by.parse().map_err(CliError::report)?;

    let chart_kind = match args.chart.as_deref() {
        Some(kind) => kind.parse::<ChartKind>().map_err(CliError::report)?,
        None => ChartKind::default(),
    };

    Ok(ReportConfiguration {
        subject,
        date_range,
        group_by,
        show_chart: args.chart.is_some(),
        chart_kind,
    })
}

fn resolve_range(args: &ConfigArgs) -> Result<DateRange, CliError> {
    if let Some(ref preset) = args.preset {
        let preset: DatePreset = preset.parse().map_err(CliError::report)?;
        return Ok(preset.resolve(Utc::now().date_naive()));
    }

    let (from, to) = match (&args.from, &args.to) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            return Err(CliError::args(
                "--from and --to (or --preset) are required without --config",
            ))
        }
    };
    let start = parse_date(from)?;
    let end = parse_date(to)?;
    DateRange::new(start, end).map_err(CliError::report)
}

fn parse_date(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| CliError::args(format!("cannot parse date '{s}' (expected YYYY-MM-DD)")))
}

fn load_source(data_dir: &Path) -> Result<CsvRecordSource, CliError> {
    let source = CsvRecordSource::from_dir(data_dir).map_err(CliError::report)?;
    if source.is_empty() {
        return Err(CliError {
            code: EXIT_REPORT_DATA,
            message: format!("no <subject>.csv files found in {}", data_dir.display()),
            hint: Some("expected files like sales.csv or leads.csv".into()),
        });
    }
    Ok(source)
}

pub fn cmd_run(
    config_args: ConfigArgs,
    data_dir: PathBuf,
    json: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = resolve_config(&config_args)?;
    let source = load_source(&data_dir)?;
    let output = run(&config, &source).map_err(CliError::report)?;

    if json || output_file.is_some() {
        let json_str = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::error(format!("JSON serialization error: {e}")))?;
        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::error(format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }
        if json {
            println!("{json_str}");
        }
        return Ok(());
    }

    print_report(&config, &output);
    Ok(())
}

pub fn cmd_export(
    config_args: ConfigArgs,
    data_dir: PathBuf,
    format: String,
    file_name_base: Option<String>,
    out_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = resolve_config(&config_args)?;
    let format: ExportFormat = format.parse().map_err(CliError::export)?;
    let source = load_source(&data_dir)?;
    let output = run(&config, &source).map_err(CliError::report)?;

    let columns = subject_spec(config.subject).columns;
    let artifact = export_table(
        config.subject,
        &output.rows,
        columns,
        format,
        file_name_base.as_deref(),
        Utc::now().date_naive(),
    )
    .map_err(CliError::export)?;

    let path = out_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join(&artifact.file_name);
    std::fs::write(&path, &artifact.bytes)
        .map_err(|e| CliError::error(format!("cannot write {}: {e}", path.display())))?;
    println!("wrote {} ({} bytes)", path.display(), artifact.bytes.len());
    Ok(())
}

fn print_report(config: &ReportConfiguration, output: &ReportOutput) {
    let spec = subject_spec(output.subject);
    println!(
        "{}  {} to {}",
        spec.display_name, config.date_range.start, config.date_range.end
    );
    println!();

    for kpi in &output.kpis.values {
        println!("  {:<24} {}", kpi.label, format_number(kpi.value_kind, kpi.value));
    }
    if let Some(delta) = output.kpis.period_over_period {
        println!("  {:<24} {delta:+.1}% vs prior period", "Trend");
    }
    println!();

    print_table(output);

    if let Some(ref chart) = output.chart {
        println!();
        println!(
            "chart: {:?}, {} series over {} periods",
            chart.kind,
            chart.series.len(),
            chart.labels.len()
        );
    }
}

fn print_table(output: &ReportOutput) {
    let spec = subject_spec(output.subject);

    let mut widths: Vec<usize> = spec
        .columns
        .iter()
        .map(|c| c.display_name.len())
        .collect();
    let rendered: Vec<Vec<String>> = output
        .rows
        .iter()
        .map(|row| {
            spec.columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let text = format_cell(column.value_kind, &row.field(column.key));
                    widths[i] = widths[i].max(text.len());
                    text
                })
                .collect()
        })
        .collect();

    let header: Vec<String> = spec
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c.display_name, width = widths[i]))
        .collect();
    println!("  {}", header.join("  "));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("  {}", rule.join("  "));

    for cells in rendered {
        let line: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{:<width$}", text, width = widths[i]))
            .collect();
        println!("  {}", line.join("  "));
    }
}

fn format_cell(kind: ValueKind, value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Number(n) => format_number(kind, *n),
    }
}

fn format_number(kind: ValueKind, n: f64) -> String {
    match kind {
        ValueKind::Currency => format!("${n:.2}"),
        ValueKind::Percentage => format!("{n:.1}%"),
        ValueKind::Count => format!("{n:.0}"),
        ValueKind::Text => format!("{n}"),
    }
}
