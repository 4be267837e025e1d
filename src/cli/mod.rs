//! The `munge-report` command-line interface.
//!
//! Parses arguments, sets up logging, and hands the resulting configuration
//! to [`run_report`]. Fatal errors are printed as miette diagnostics.

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ReportArgs;
use crate::pager::sink_for;
use crate::report::run_report;

pub mod args;

/// The main entry point for the CLI.
pub fn run() {
    let args = ReportArgs::parse();
    init_logging(args.verbose);

    let config = args.into_config();
    let mut sink = sink_for(config.pager.as_deref());
    if let Err(e) = run_report(&config, sink.as_mut()) {
        eprintln!("{:?}", miette::Report::new(e));
        process::exit(1);
    }
}

/// Logs go to stderr so they never mix with the report. `RUST_LOG` overrides
/// the level picked by `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "munge_report=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}
