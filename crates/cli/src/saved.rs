//! `mcrm saved` — manage the durable saved-report store.

use std::path::PathBuf;

use clap::Subcommand;

use meridian_store::ReportStore;

use crate::report::{resolve_config, ConfigArgs};
use crate::CliError;

#[derive(Subcommand)]
pub enum SavedCommands {
    /// Save a report configuration under a name
    #[command(after_help = "\
Examples:
  mcrm saved save --name 'Q1 Sales' --subject sales --from 2023-01-01 --to 2023-03-31
  mcrm saved save --name Weekly --config report.toml")]
    Save {
        /// Display name for the saved report
        #[arg(long)]
        name: String,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List saved reports, most recent first
    List {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete a saved report by id (no-op when the id is unknown)
    Delete {
        /// Saved report id, as shown by `saved list`
        id: String,
    },
}

pub fn cmd_saved(cmd: SavedCommands, store_path: Option<PathBuf>) -> Result<(), CliError> {
    let store = match store_path {
        Some(path) => ReportStore::open(path),
        None => ReportStore::open_default(),
    }
    .map_err(CliError::store)?;

    match cmd {
        SavedCommands::Save { name, config } => {
            let configuration = resolve_config(&config)?;
            let saved = store.save(&name, configuration).map_err(CliError::store)?;
            println!("saved '{}' as {}", saved.name, saved.id);
            Ok(())
        }
        SavedCommands::List { json } => {
            let reports = store.list();
            if json {
                let json_str = serde_json::to_string_pretty(&reports)
                    .map_err(|e| CliError::error(format!("JSON serialization error: {e}")))?;
                println!("{json_str}");
                return Ok(());
            }
            if reports.is_empty() {
                println!("no saved reports");
                return Ok(());
            }
            for report in reports {
                let config = &report.configuration;
                println!(
                    "{}  {}  {} {} to {} by {:?}  saved {}",
                    report.id,
                    report.name,
                    config.subject,
                    config.date_range.start,
                    config.date_range.end,
                    config.group_by,
                    report.created_at.format("%Y-%m-%d %H:%M"),
                );
            }
            Ok(())
        }
        SavedCommands::Delete { id } => {
            store.delete(&id).map_err(CliError::store)?;
            println!("deleted {id}");
            Ok(())
        }
    }
}
