// src/batch/progress.rs
// =============================================================================
// Prints "processed/total" once a second while a pass is running.
//
// The reporter reads the pass's processed counter with a relaxed load and
// never coordinates with the tasks that bump it, so the number it prints can
// lag by a few lines. It's a progress display, not an accounting tool.
// =============================================================================

use super::PassContext;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// How often the progress line is refreshed
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// A running reporter. Call `stop` to end it; no tick fires after `stop` returns.
#[derive(Debug)]
pub struct ProgressReporter {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    pub fn start(ctx: Arc<PassContext>, every: Duration) -> Self {
        let (shutdown, mut stop_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the first
            // line shows up one interval into the pass
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => print_progress(&ctx),
                }
            }
        });

        Self { shutdown, handle }
    }

    pub async fn stop(self) {
        // If the task already ended, the receiver is gone and that's fine
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

fn print_progress(ctx: &PassContext) {
    print!("\rProgress: {}", format_progress(ctx.processed(), ctx.total_lines()));
    // Without a newline stdout won't flush on its own
    let _ = std::io::stdout().flush();
}

pub fn format_progress(processed: usize, total: usize) -> String {
    format!("{}/{}", processed, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_progress() {
        assert_eq!(format_progress(0, 0), "0/0");
        assert_eq!(format_progress(7, 12), "7/12");
    }

    #[tokio::test]
    async fn test_stop_ends_the_task() {
        let ctx = Arc::new(PassContext::new(3, std::time::Instant::now()));
        let reporter = ProgressReporter::start(ctx, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(35)).await;

        tokio::time::timeout(Duration::from_millis(500), reporter.stop())
            .await
            .expect("reporter stops promptly");
    }
}
