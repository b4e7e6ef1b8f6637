use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use mock_ledger::bin_utils::{ReplayError, Service};
use tracing_subscriber::EnvFilter;

/// Replays ledger operations from a CSV file and prints the final balances.
#[derive(Parser, Debug)]
#[command(name = "mock-ledger", version, long_about = None)]
struct Args {
    /// CSV file with one ledger operation per row
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Log filter directives, written to stderr
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log: String,

    /// Only report malformed rows, not rejected ledger operations
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log)
        .with_context(|| format!("Invalid log filter `{}`", args.log))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open `{}`", args.input.display()))?;

    let quiet = args.quiet;
    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        error_printer: Box::new(move |line, err| {
            // ledger rejections are business outcomes, not broken input
            if quiet && matches!(err, ReplayError::Ledger(_)) {
                return;
            }
            eprintln!("Error at line {line}: {err}")
        }),
    };
    service.run()
}
