// src/batch/mod.rs
// =============================================================================
// One "pass" over the input file: read every URL, probe it, and sort it into
// the good or bad output file.
//
// Submodules:
// - runner: the orchestrator that drives a pass from start to finish
// - tracker: waits until every spawned task has finished
// - sink: the two output files
// - progress: the once-a-second "processed/total" line
//
// Everything a pass needs to share between its tasks lives in a PassContext
// that is created fresh for each pass. Nothing is global.
// =============================================================================

mod progress;
mod runner;
mod sink;
mod tracker;

pub use runner::BatchRunner;

use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Where a pass reads from and writes to
#[derive(Debug, Clone)]
pub struct PassPaths {
    pub input: PathBuf,
    pub good: PathBuf,
    pub bad: PathBuf,
}

/// One line of the input, trimmed
///
/// The URL is what gets probed. The bytes are what gets written back, so a
/// line that isn't valid UTF-8 lands in the output exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    url: String,
    raw: Option<Vec<u8>>,
}

impl UrlEntry {
    pub fn from_line(line: &[u8]) -> Self {
        match std::str::from_utf8(line) {
            Ok(text) => Self {
                url: text.trim().to_string(),
                raw: None,
            },
            Err(_) => {
                let trimmed = line.trim_ascii();
                Self {
                    url: String::from_utf8_lossy(trimmed).into_owned(),
                    raw: Some(trimmed.to_vec()),
                }
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_deref().unwrap_or(self.url.as_bytes())
    }
}

/// Shared state of one running pass
#[derive(Debug)]
pub struct PassContext {
    total_lines: usize,
    processed: AtomicUsize,
    started: Instant,
}

impl PassContext {
    pub fn new(total_lines: usize, started: Instant) -> Self {
        Self {
            total_lines,
            processed: AtomicUsize::new(0),
            started,
        }
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Approximate; only feeds the progress display
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn mark_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// What a finished pass reports back to its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub total_lines: usize,
    pub dispatched: usize,
    pub good: usize,
    pub bad: usize,
    pub write_failures: usize,
    pub elapsed_ms: u64,
}

impl PassSummary {
    /// True when every dispatched URL ended up in the good file
    pub fn all_valid(&self) -> bool {
        self.bad == 0 && self.write_failures == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_trims_text_lines() {
        let entry = UrlEntry::from_line(b"  http://a.test \r\n");
        assert_eq!(entry.url(), "http://a.test");
        assert_eq!(entry.as_bytes(), b"http://a.test");

        assert_eq!(UrlEntry::from_line(b"   \n").url(), "");
    }

    #[test]
    fn test_entry_keeps_raw_bytes() {
        let entry = UrlEntry::from_line(b" http://caf\xe9.test\n");
        assert_eq!(entry.url(), "http://caf\u{FFFD}.test");
        assert_eq!(entry.as_bytes(), b"http://caf\xe9.test");
    }

    #[test]
    fn test_context_counts() {
        let ctx = PassContext::new(3, Instant::now());
        assert_eq!(ctx.total_lines(), 3);
        assert_eq!(ctx.processed(), 0);

        ctx.mark_processed();
        ctx.mark_processed();
        assert_eq!(ctx.processed(), 2);
    }

    #[test]
    fn test_summary_json() {
        let summary = PassSummary {
            total_lines: 3,
            dispatched: 3,
            good: 1,
            bad: 2,
            write_failures: 0,
            elapsed_ms: 1500,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["good"], 1);
        assert_eq!(json["bad"], 2);
        assert_eq!(json["elapsed_ms"], 1500);
        assert!(!summary.all_valid());
    }
}
