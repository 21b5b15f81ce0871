// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands share the same file arguments:
// - watch: run a pass now, then again every --interval-secs, forever
// - check: run a single pass and exit (0 = all good, 1 = some bad)
//
// Every path can also come from an environment variable, which is handy when
// the tool runs as a service.
// =============================================================================

use crate::batch::PassPaths;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default time between two scheduled passes: one hour
pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

#[derive(Parser, Debug)]
#[command(
    name = "link-triage",
    version,
    about = "Sort a list of URLs into reachable and unreachable files",
    long_about = "link-triage reads one URL per line, checks each one with a single HTTP GET \
                  (at most 10 at a time, 6 second timeout) and writes it to the good file if it \
                  answered 200 OK, or to the bad file otherwise. In watch mode the whole pass \
                  repeats on a fixed interval."
)]
pub struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a pass immediately, then again every interval until stopped
    ///
    /// Example: link-triage watch --input urls.txt --interval-secs 600
    Watch {
        #[command(flatten)]
        files: FileArgs,

        /// Seconds between the start of two passes
        #[arg(
            long,
            default_value_t = DEFAULT_INTERVAL_SECS,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        interval_secs: u64,

        /// Print each pass summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one pass and exit
    ///
    /// Exit code 0 when every URL was reachable, 1 otherwise
    Check {
        #[command(flatten)]
        files: FileArgs,

        /// Print the pass summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// File with one URL per line
    #[arg(long, env = "LINK_TRIAGE_INPUT", default_value = "data.csv")]
    pub input: PathBuf,

    /// Where reachable URLs are written (truncated every pass)
    #[arg(long, env = "LINK_TRIAGE_GOOD", default_value = "good.csv")]
    pub good: PathBuf,

    /// Where unreachable URLs are written (truncated every pass)
    #[arg(long, env = "LINK_TRIAGE_BAD", default_value = "bad.csv")]
    pub bad: PathBuf,
}

impl FileArgs {
    pub fn to_paths(&self) -> PassPaths {
        PassPaths {
            input: self.input.clone(),
            good: self.good.clone(),
            bad: self.bad.clone(),
        }
    }
}
