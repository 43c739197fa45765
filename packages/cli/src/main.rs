#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `prea`: extract PREA incident report tables into CSV.
//!
//! Each subcommand runs one pipeline over an input folder. With no
//! subcommand, an interactive menu asks which pipeline to run.
//!
//! Uses `indicatif-log-bridge` (via [`prea_cli_utils::init_logger`]) so
//! log lines and the per-file progress bar share the terminal.

mod interactive;
mod pipeline;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use prea_report_models::{PipelineKind, YearFallback};

use crate::pipeline::DirOverrides;

#[derive(Parser)]
#[command(name = "prea", about = "PREA incident report extraction toolchain")]
struct Cli {
    /// TOML configuration file. Sections it omits keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct RunArgs {
    /// Folder to read inputs from (overrides the config file)
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Folder to write CSVs to (overrides the config file)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the first worksheet of every spreadsheet to CSV
    Excel {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Save PDF tables whose first cell carries the report title
    Tables {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Save PDF tables found inside each year's known page window
    Windowed {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Rebuild report tables from PDF page text
    Text {
        #[command(flatten)]
        run: RunArgs,
        /// What to do when the title year names neither the report year
        /// nor the year before it (`skip` or `filename`)
        #[arg(long)]
        year_fallback: Option<YearFallback>,
    },
    /// Print the resolved configuration as TOML
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = prea_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = prea_batch::config::load_config(cli.config.as_deref())?;

    let Some(command) = cli.command else {
        println!("PREA Report Toolchain");
        println!();
        return interactive::run(config, &multi);
    };

    let (kind, run) = match command {
        Commands::Config => {
            print!("{}", prea_batch::config::to_toml(&config)?);
            return Ok(());
        }
        Commands::Excel { run } => (PipelineKind::Excel, run),
        Commands::Tables { run } => (PipelineKind::Tables, run),
        Commands::Windowed { run } => (PipelineKind::Windowed, run),
        Commands::Text { run, year_fallback } => {
            if let Some(fallback) = year_fallback {
                config.text.year_fallback = fallback;
            }
            (PipelineKind::Text, run)
        }
    };

    pipeline::apply_overrides(
        &mut config,
        kind,
        DirOverrides {
            input_dir: run.input_dir,
            output_dir: run.output_dir,
        },
    );

    let summary = pipeline::run(kind, &config, &multi)?;

    if run.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
