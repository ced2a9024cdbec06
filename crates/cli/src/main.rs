// Meridian CRM CLI - headless reporting operations

mod exit_codes;
mod report;
mod saved;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{export_exit_code, report_exit_code, store_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "mcrm")]
#[command(about = "Meridian CRM reporting (CLI mode, headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a report and print rows and KPIs
    #[command(after_help = "\
Examples:
  mcrm run --subject sales --from 2023-01-01 --to 2023-03-31 --data ./snapshots
  mcrm run --config report.toml --data ./snapshots --json
  mcrm run --subject leads --preset last_quarter --group-by week --data ./snapshots")]
    Run {
        #[command(flatten)]
        config: report::ConfigArgs,

        /// Directory of <subject>.csv record snapshots
        #[arg(long)]
        data: PathBuf,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Run a report and export the table to a spreadsheet or CSV file
    #[command(after_help = "\
Examples:
  mcrm export --subject sales --from 2023-01-01 --to 2023-03-31 --data ./snapshots
  mcrm export --config report.toml --data ./snapshots -t csv
  mcrm export --subject opportunities --preset year_to_date --data ./snapshots --name pipeline_ytd")]
    Export {
        #[command(flatten)]
        config: report::ConfigArgs,

        /// Directory of <subject>.csv record snapshots
        #[arg(long)]
        data: PathBuf,

        /// Output format (excel or csv)
        #[arg(long, short = 't', default_value = "excel")]
        format: String,

        /// File name base, without extension
        #[arg(long)]
        name: Option<String>,

        /// Directory to write the artifact into (default: current directory)
        #[arg(long, short = 'o')]
        out_dir: Option<PathBuf>,
    },

    /// Manage saved report configurations
    Saved {
        #[command(subcommand)]
        command: saved::SavedCommands,

        /// Saved-report store file (default: user config directory)
        #[arg(long, env = "MERIDIAN_STORE_PATH")]
        store_path: Option<PathBuf>,
    },
}

/// Command failure carrying its exit code and an optional hint.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn report(err: meridian_reporting::ReportError) -> Self {
        Self {
            code: report_exit_code(&err),
            message: err.to_string(),
            hint: None,
        }
    }

    pub fn export(err: meridian_export::ExportError) -> Self {
        Self {
            code: export_exit_code(&err),
            message: err.to_string(),
            hint: None,
        }
    }

    pub fn store(err: meridian_store::StoreError) -> Self {
        Self {
            code: store_exit_code(&err),
            message: err.to_string(),
            hint: None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: mcrm <command> [options]");
            eprintln!("       mcrm --help for more information");
            Ok(())
        }
        Some(Commands::Run {
            config,
            data,
            json,
            output,
        }) => report::cmd_run(config, data, json, output),
        Some(Commands::Export {
            config,
            data,
            format,
            name,
            out_dir,
        }) => report::cmd_export(config, data, format, name, out_dir),
        Some(Commands::Saved {
            command,
            store_path,
        }) => saved::cmd_saved(command, store_path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}
