pub mod audit;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs_port;
pub mod keys;
pub mod license;
pub mod matching;
pub mod ports;
pub mod report;
pub mod roster;
pub mod sanitize;

pub use engine::{CancelReason, DistributionEngine, Preview, RunOutcome};
pub use error::DistributionError;
pub use fs_port::{FileSystemPort, LocalFileSystem};
pub use ports::{AutoApprove, ConfirmationPort, NullSink, ReportSink};
pub use report::{OperationKind, OperationReport};
pub use roster::{RosterRow, RosterTable};

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Binary entry point: parse arguments, install logging, run one command
pub fn run() -> ExitCode {
    let cli = cli::Cli::parse();

    // Default: warn for dependencies, info for this crate (run summaries visible).
    // RUST_LOG takes precedence; -v raises this crate to debug.
    let default_filter = if cli.verbose {
        "warn,roster_dist=debug"
    } else {
        "warn,roster_dist=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code(), "{}", e);
            eprintln!("error [{}]: {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}
