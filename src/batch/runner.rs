// src/batch/runner.rs
// =============================================================================
// The batch orchestrator. A pass goes through these steps:
//
// 1. Open the input file and create both output files (failure = fatal)
// 2. Count the lines of the input, then rewind it
// 3. Read the input again and spawn one task per line; each task does
//    acquire slot -> probe -> write -> signal done -> release slot
// 4. Wait until every spawned task has signalled
// 5. Stop the progress line, flush the outputs, report the totals
//
// Spawning never waits: the limiter inside each task is what keeps the number
// of live HTTP requests bounded, not the loop that spawns them.
// =============================================================================

use super::progress::{format_progress, ProgressReporter, PROGRESS_INTERVAL};
use super::sink::ResultSink;
use super::tracker::{Completion, CompletionTracker};
use super::{PassContext, PassPaths, PassSummary, UrlEntry};
use crate::checker::{Limiter, Probe, Verdict, MAX_CONCURRENT_PROBES};
use anyhow::{Context, Result};
use std::io::SeekFrom;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncSeekExt, BufReader};
use tracing::{debug, error, info, warn};

pub struct BatchRunner {
    prober: Arc<dyn Probe>,
    concurrency: usize,
    progress_every: Duration,
}

impl BatchRunner {
    /// A runner with the standard limits: 10 probes in flight, progress every second
    pub fn new(prober: Arc<dyn Probe>) -> Self {
        Self {
            prober,
            concurrency: MAX_CONCURRENT_PROBES,
            progress_every: PROGRESS_INTERVAL,
        }
    }

    #[cfg(test)]
    fn with_progress_every(mut self, every: Duration) -> Self {
        self.progress_every = every;
        self
    }

    /// Runs one full pass over `paths.input`.
    ///
    /// Only an unopenable input or an uncreatable output file is an error;
    /// failed probes and failed writes are logged and end up in the summary.
    pub async fn run_pass(&self, paths: &PassPaths) -> Result<PassSummary> {
        let started = Instant::now();
        let input = File::open(&paths.input)
            .await
            .with_context(|| format!("cannot open input file '{}'", paths.input.display()))?;
        let sink = Arc::new(ResultSink::create(&paths.good, &paths.bad).await?);

        let mut reader = BufReader::new(input);
        let total_lines = count_lines(&mut reader)
            .await
            .with_context(|| format!("cannot read input file '{}'", paths.input.display()))?;
        reader
            .seek(SeekFrom::Start(0))
            .await
            .with_context(|| format!("cannot rewind input file '{}'", paths.input.display()))?;

        info!(input = %paths.input.display(), total_lines, "pass started");

        let ctx = Arc::new(PassContext::new(total_lines, started));
        let reporter = ProgressReporter::start(ctx.clone(), self.progress_every);
        let limiter = Limiter::new(self.concurrency);
        let tracker = CompletionTracker::new();

        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    // Whatever was already spawned still runs to completion
                    error!(input = %paths.input.display(), error = %e, "stopped reading input");
                    break;
                }
            }

            tokio::spawn(check_and_record(
                UrlEntry::from_line(&line),
                self.prober.clone(),
                limiter.clone(),
                sink.clone(),
                ctx.clone(),
                tracker.start(),
            ));
        }

        let dispatched = tracker.started();
        if dispatched != total_lines {
            warn!(total_lines, dispatched, "input changed between counting and dispatch");
        }

        tracker.wait_for(dispatched).await;
        reporter.stop().await;

        let totals = sink.finish().await;
        let elapsed = ctx.elapsed();

        println!("\rProgress: {}", format_progress(ctx.processed(), total_lines));
        println!("Pass finished: {} lines in {:.2?}", total_lines, elapsed);
        info!(
            total_lines,
            good = totals.good,
            bad = totals.bad,
            write_failures = totals.write_failures,
            elapsed_ms = elapsed.as_millis() as u64,
            "pass finished"
        );

        Ok(PassSummary {
            total_lines,
            dispatched,
            good: totals.good,
            bad: totals.bad,
            write_failures: totals.write_failures,
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }
}

// One unit of work: everything that happens to a single URL
//
// The order matters: the slot is held for the probe AND the write, the
// completion signal goes out after the write, and the slot is returned last.
async fn check_and_record(
    entry: UrlEntry,
    prober: Arc<dyn Probe>,
    limiter: Limiter,
    sink: Arc<ResultSink>,
    ctx: Arc<PassContext>,
    done: Completion,
) {
    let slot = limiter.acquire().await;
    let url = entry.url();

    let verdict = match &slot {
        Ok(_) => {
            debug!(url, in_flight = limiter.in_use(), "probing");
            prober.probe(url).await
        }
        Err(e) => {
            error!(url, error = %e, "limiter closed, link not probed");
            Verdict::Invalid
        }
    };

    sink.record(verdict, &entry).await;
    ctx.mark_processed();

    drop(done);
    drop(slot);
}

async fn count_lines<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<usize> {
    let mut count = 0;
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(count);
        }
        count += 1;
    }
}
