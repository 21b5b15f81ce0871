// src/checker/limiter.rs
// =============================================================================
// The admission gate that caps how many probes run at the same time.
//
// Dispatch is unbounded: one task is spawned per input line. Every task then
// waits here for a slot before it is allowed to touch the network, so at most
// `capacity` requests are ever in flight.
//
// Rust concepts:
// - tokio::sync::Semaphore: an async counting semaphore
// - RAII guards: the slot is released when the permit is dropped, on every
//   code path (early return, error, panic)
// =============================================================================

use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Maximum number of probes allowed in flight at once
pub const MAX_CONCURRENT_PROBES: usize = 10;

#[derive(Debug, Clone)]
pub struct Limiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

/// One held slot. Dropping it returns the slot to the limiter.
#[derive(Debug)]
pub struct ProbeSlot {
    _permit: OwnedSemaphorePermit,
}

impl Limiter {
    pub fn new(capacity: usize) -> Self {
        // A zero-capacity gate would park every task forever
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits until a slot is free and takes it.
    ///
    /// Only fails if the semaphore was closed, which this type never does.
    pub async fn acquire(&self) -> Result<ProbeSlot, AcquireError> {
        let permit = self.permits.clone().acquire_owned().await?;
        Ok(ProbeSlot { _permit: permit })
    }

    #[cfg(test)]
    fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held
    pub fn in_use(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }
}
