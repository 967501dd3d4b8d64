use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::run_http_server;
use crate::core::{IncomePlanner, IncomePlanningInputs};
use crate::error::WorkbookResult;
use crate::storage::FileSectionStore;

#[derive(Parser, Debug)]
#[command(
    name = "workbook",
    about = "Annual business-planning workbook: income planning engine and section storage"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "WORKBOOK_LOG",
        default_value = "info",
        help = "Log filter used when RUST_LOG is not set, e.g. debug or workbook=trace"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the workbook HTTP API
    Serve {
        #[arg(long, env = "WORKBOOK_PORT", default_value_t = 8080)]
        port: u16,
        #[arg(
            long,
            env = "WORKBOOK_DATA_DIR",
            default_value = "./workbook-data",
            help = "Directory holding saved plan sections"
        )]
        data_dir: PathBuf,
    },
    /// Derive income-planning metrics from an inputs JSON document
    Derive {
        #[arg(long, help = "Inputs file; reads stdin when omitted")]
        input: Option<PathBuf>,
    },
    /// Print a blank income-planning inputs document
    Blank,
}

pub async fn run(cli: Cli) -> WorkbookResult<()> {
    match cli.command {
        Command::Serve { port, data_dir } => {
            let store = Arc::new(FileSectionStore::new(data_dir));
            tracing::info!(data_dir = %store.root().display(), "using file section store");
            run_http_server(port, store).await?;
        }
        Command::Derive { input } => {
            let raw = read_input(input.as_ref())?;
            println!("{}", derive_report_json(&raw)?);
        }
        Command::Blank => {
            let blank = serde_json::to_string_pretty(&IncomePlanningInputs::default())?;
            println!("{blank}");
        }
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> WorkbookResult<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

fn derive_report_json(raw: &str) -> WorkbookResult<String> {
    let inputs: IncomePlanningInputs = serde_json::from_str(raw)?;
    let planner = IncomePlanner::new(inputs);
    Ok(serde_json::to_string_pretty(&planner.report())?)
}
