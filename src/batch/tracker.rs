// src/batch/tracker.rs
// =============================================================================
// Lets the orchestrator wait until every task it spawned has finished.
//
// Each dispatched task holds a `Completion` guard. When the task is done
// (after its write, success or failure) the guard is dropped and the tracker
// counts it. The orchestrator then waits for the count to reach the number of
// tasks it dispatched.
//
// Because the signal lives in Drop, a task can't forget to signal, and it
// can't signal twice.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    started: AtomicUsize,
    finished: AtomicUsize,
    notify: Notify,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    inner: Arc<Inner>,
}

/// Held by one task; dropping it signals that the task is done.
#[derive(Debug)]
pub struct Completion {
    inner: Arc<Inner>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more unit of work and hands back its guard.
    pub fn start(&self) -> Completion {
        self.inner.started.fetch_add(1, Ordering::SeqCst);
        Completion {
            inner: self.inner.clone(),
        }
    }

    pub fn started(&self) -> usize {
        self.inner.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.inner.finished.load(Ordering::SeqCst)
    }

    /// Waits until `expected` units of work have signalled.
    ///
    /// Returns immediately when `expected` is zero.
    pub async fn wait_for(&self, expected: usize) {
        loop {
            // Create the Notified future before checking the counter so a
            // signal landing in between is not lost
            let notified = self.inner.notify.notified();
            if self.finished() >= expected {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.inner.finished.fetch_add(1, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }
}
