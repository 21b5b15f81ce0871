// src/schedule.rs
// =============================================================================
// Drives passes over time.
//
// `run_once` is one announced pass. `run_forever` runs one right away, then
// one at every tick of a fixed interval. If a pass overruns the interval the
// missed ticks are skipped, so passes never pile up and never overlap: the
// next one can't start until run_pass has returned, and run_pass only returns
// once every task of its pass is done.
// =============================================================================

use crate::batch::{BatchRunner, PassPaths, PassSummary};
use anyhow::Result;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Runs one pass, printing the start line and (optionally) the JSON summary.
pub async fn run_once(runner: &BatchRunner, paths: &PassPaths, json: bool) -> Result<PassSummary> {
    println!("Starting pass over {}...", paths.input.display());

    let summary = runner.run_pass(paths).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(summary)
}

/// Runs a pass every `every`, starting now. Only returns on a fatal error.
pub async fn run_forever(
    runner: &BatchRunner,
    paths: &PassPaths,
    every: Duration,
    json: bool,
) -> Result<()> {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        // The first tick completes immediately
        ticker.tick().await;
        run_once(runner, paths, json).await?;
        info!(interval_secs = every.as_secs(), "waiting for the next pass");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeProber;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn paths_in(dir: &std::path::Path) -> PassPaths {
        PassPaths {
            input: dir.join("data.csv"),
            good: dir.join("good.csv"),
            bad: dir.join("bad.csv"),
        }
    }

    #[tokio::test]
    async fn test_run_once_returns_summary() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(dir.path());
        std::fs::write(&paths.input, "http://good.test\nhttp://bad.test\n").unwrap();

        let runner = BatchRunner::new(Arc::new(FakeProber::new(Duration::ZERO)));
        let summary = run_once(&runner, &paths, true).await.unwrap();

        assert_eq!(summary.good, 1);
        assert_eq!(summary.bad, 1);
    }

    #[tokio::test]
    async fn test_repeats_passes() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(dir.path());
        std::fs::write(&paths.input, "http://good.test\n").unwrap();

        let prober = Arc::new(FakeProber::new(Duration::ZERO));
        let runner = BatchRunner::new(prober.clone());

        // Three ticks fit comfortably: at 0ms, 100ms and 200ms
        let _ = tokio::time::timeout(
            Duration::from_millis(280),
            run_forever(&runner, &paths, Duration::from_millis(100), false),
        )
        .await;

        assert!(prober.calls() >= 2, "only {} passes ran", prober.calls());
    }

    #[tokio::test]
    async fn test_fatal_error_stops_the_loop() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(dir.path());

        let runner = BatchRunner::new(Arc::new(FakeProber::new(Duration::ZERO)));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_forever(&runner, &paths, Duration::from_millis(10), false),
        )
        .await
        .expect("a missing input ends the loop");

        assert!(result.is_err());
    }
}
