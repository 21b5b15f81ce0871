// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - probe: Makes one HTTP GET per URL and reduces it to a Verdict
// - limiter: Caps how many probes may be in flight at the same time
//
// This file (mod.rs) is the module root - it re-exports the public API so the
// rest of the application can write `checker::LinkProber` instead of
// `checker::probe::LinkProber`.
// =============================================================================

mod limiter;
mod probe;

pub use limiter::{Limiter, MAX_CONCURRENT_PROBES};
pub use probe::{LinkProber, Probe, Verdict};
#[cfg(test)]
pub use probe::PROBE_TIMEOUT;
