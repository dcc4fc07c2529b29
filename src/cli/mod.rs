//! derivar CLI - Drift and Data-Quality Scoring
//!
//! Command-line interface for derivar operations. Reports go to stdout,
//! logs go to stderr.

use std::{path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod basic;
mod drift;

pub use drift::ReportArgs;

/// Exit status when the overall risk reaches `--fail-on`.
const RISK_EXIT_CODE: u8 = 2;

/// derivar - Drift and Data-Quality Scoring in Pure Rust
#[derive(Parser)]
#[command(name = "derivar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score drift between a baseline and a current dataset
    Report(ReportArgs),
    /// Display dataset schema with inferred feature kinds
    Schema {
        /// Path to dataset file
        path: PathBuf,
    },
}

/// Outcome of a successful command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunStatus {
    /// Nothing to flag.
    Ok,
    /// The report's overall risk reached the `--fail-on` level.
    RiskThresholdReached,
}

/// Run the derivar CLI.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Report(args) => drift::cmd_report(&args),
        Commands::Schema { path } => basic::cmd_schema(&path).map(|()| RunStatus::Ok),
    };

    match result {
        Ok(RunStatus::Ok) => ExitCode::SUCCESS,
        Ok(RunStatus::RiskThresholdReached) => ExitCode::from(RISK_EXIT_CODE),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Default log directive for a verbosity setting.
fn log_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `-v` / `-q`.
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(verbose, quiet)));

    // a subscriber may already be installed (tests)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
