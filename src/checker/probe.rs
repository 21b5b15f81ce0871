// src/checker/probe.rs
// =============================================================================
// This module decides whether a single URL is reachable.
//
// Key functionality:
// - Makes exactly one HTTP GET per URL (no retries, no HEAD fallback)
// - A fixed 6 second timeout bounds every request
// - Only "200 OK" counts as valid; everything else is invalid
// - Failures are logged and turned into a Verdict, never returned as errors
//
// Rust concepts:
// - Traits: `Probe` lets the batch runner work with a real or a fake prober
// - BoxFuture: how a trait method can return an async result
// - Enums: `Verdict` and `ProbeFailure` describe outcomes without strings
// =============================================================================

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-request budget for a probe. Not configurable.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(6);

/// The outcome of probing one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Answered "200 OK" within the timeout
    Valid,
    /// Anything else
    Invalid,
}

// Why a probe came back invalid. Only used for the log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    Timeout,
    DnsError,
    ConnectFailed,
    Status(u16),
    Request(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Timeout => write!(f, "request timed out"),
            ProbeFailure::DnsError => write!(f, "could not resolve hostname"),
            ProbeFailure::ConnectFailed => write!(f, "connection failed"),
            ProbeFailure::Status(code) => write!(f, "HTTP {}", code),
            ProbeFailure::Request(msg) => write!(f, "{}", msg),
        }
    }
}

/// Anything that can turn a URL into a Verdict.
///
/// The batch runner only talks to this trait, so tests can swap in a prober
/// that never touches the network.
pub trait Probe: Send + Sync {
    fn probe<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Verdict>;
}

// The real prober, backed by one shared reqwest client
//
// reqwest::Client is cheap to clone (it's an Arc internally) and pools
// connections, so one LinkProber serves every task of every pass.
#[derive(Debug, Clone)]
pub struct LinkProber {
    client: Client,
}

impl LinkProber {
    /// Builds a prober with the standard 6 second timeout
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    // Tests talk to 127.0.0.1; a proxy from the environment must not get in the way
    #[cfg(test)]
    pub(crate) fn without_proxy(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap();
        Self { client }
    }

    // Sends the GET and classifies the result
    //
    // Returns Ok(()) for a 200 response, Err(reason) for everything else.
    async fn check(&self, url: &str) -> Result<(), ProbeFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();

        // Dropping the response hands the connection back to the pool
        // before we return, whatever the status was
        drop(response);

        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(ProbeFailure::Status(status.as_u16()))
        }
    }
}

impl Probe for LinkProber {
    fn probe<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Verdict> {
        Box::pin(async move {
            match self.check(url).await {
                Ok(()) => {
                    debug!(url, "link ok");
                    Verdict::Valid
                }
                Err(failure) => {
                    warn!(url, error = %failure, "link check failed");
                    Verdict::Invalid
                }
            }
        })
    }
}

// Maps a reqwest error onto the failure we log
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - Connection refused / reset
// - A URL that can't even be turned into a request (e.g. an empty line)
fn categorize_error(error: reqwest::Error) -> ProbeFailure {
    let error_string = error.to_string();

    if error.is_timeout() {
        ProbeFailure::Timeout
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") || format!("{:?}", error).contains("dns") {
            ProbeFailure::DnsError
        } else {
            ProbeFailure::ConnectFailed
        }
    } else {
        ProbeFailure::Request(error_string)
    }
}
