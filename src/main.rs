use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use fxtrend::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxtrend::AppCommand {
    fn from(cmd: Commands) -> fxtrend::AppCommand {
        match cmd {
            Commands::Sync { start, end } => fxtrend::AppCommand::Sync { start, end },
            Commands::Compute { base_date } => fxtrend::AppCommand::Compute { base_date },
            Commands::Report {
                start,
                end,
                currencies,
            } => fxtrend::AppCommand::Report {
                start,
                end,
                currencies,
            },
            Commands::Currencies => fxtrend::AppCommand::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch rate and reference tables for a date window and store them
    Sync {
        /// First date of the window (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last date of the window (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
    },
    /// Recompute relative changes against a base date
    Compute {
        /// Base date; defaults to the stored parameter
        #[arg(long)]
        base_date: Option<NaiveDate>,
    },
    /// Display relative changes for a date range and currency set
    Report {
        /// First date of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last date of the range (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Currency codes, e.g. USD,EUR
        #[arg(long, required = true, value_delimiter = ',')]
        currencies: Vec<String>,
    },
    /// List currencies available for reporting
    Currencies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxtrend::cli::setup::setup(),
        Some(cmd) => fxtrend::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
