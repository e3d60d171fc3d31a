//! The command line interface for the tool.
use anyhow::Result;
use clap::{Parser, Subcommand};
use scuc::commands::handle_run_command;
use scuc::log as scuc_log;
use std::path::PathBuf;

/// The command line interface
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The available commands
#[derive(Subcommand)]
enum Commands {
    /// Build and solve the unit-commitment problem for a case
    Run {
        /// Path to the directory containing the case CSV files
        case_dir: PathBuf,
        /// Directory to write result CSV files to
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
        /// Wall-clock limit for the solver in seconds
        #[arg(long)]
        time_limit: Option<f64>,
        /// Relative MIP gap at which the solve terminates
        #[arg(long)]
        mip_gap: Option<f64>,
    },
}

fn main() -> Result<()> {
    scuc_log::init(None)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            case_dir,
            output_dir,
            time_limit,
            mip_gap,
        } => handle_run_command(&case_dir, &output_dir, time_limit, mip_gap),
    }
}
