// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Build the link prober (one HTTP client for the whole process)
// 4. Dispatch to the subcommand: one pass (check) or passes forever (watch)
// 5. Exit with proper code (0 = all links good, 1 = some bad, 2 = fatal error)
// =============================================================================

mod batch; // src/batch/ - one pass over the input file
mod checker; // src/checker/ - probing a URL and limiting concurrency
mod cli; // src/cli.rs - command-line parsing
mod logging; // src/logging.rs - tracing setup
mod schedule; // src/schedule.rs - repeating passes on an interval
#[cfg(test)]
mod testutil;

use anyhow::Result;
use batch::BatchRunner;
use checker::LinkProber;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every URL was reachable (check only)
//   Ok(1) = at least one URL landed in the bad file (check only)
//   Err   = fatal: input unreadable, output not creatable, no HTTP client
// `watch` never returns Ok; it runs until the process is killed.
async fn run(cli: Cli) -> Result<i32> {
    let prober = Arc::new(LinkProber::new()?);
    let runner = BatchRunner::new(prober);

    match cli.command {
        Commands::Check { files, json } => {
            let summary = schedule::run_once(&runner, &files.to_paths(), json).await?;
            Ok(if summary.all_valid() { 0 } else { 1 })
        }
        Commands::Watch {
            files,
            interval_secs,
            json,
        } => {
            let every = Duration::from_secs(interval_secs);
            schedule::run_forever(&runner, &files.to_paths(), every, json).await?;
            Ok(0)
        }
    }
}
