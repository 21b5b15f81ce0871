// src/testutil.rs
// =============================================================================
// Helpers shared by the unit tests (compiled only for `cargo test`).
//
// - spawn_http_server: a throwaway HTTP/1.1 server on 127.0.0.1 with a few
//   fixed routes, so probes can be tested without the internet
// - FakeProber: a Probe that never touches the network and records how many
//   probes were running at the same time
// =============================================================================

use crate::checker::{Probe, Verdict};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Starts the server and returns its base URL, e.g. "http://127.0.0.1:40123".
///
/// Routes:
///   /ok      200 with a small body
///   /missing 404
///   /empty   204
///   /broken  500
///   /slow    200, but only after 2 seconds
pub async fn spawn_http_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(handle_connection(stream));
        }
    });

    format!("http://{}", addr)
}

async fn handle_connection(mut stream: TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];

    // Read until the end of the request headers
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/");

    let (status, body) = match path {
        "/ok" => ("200 OK", "ok"),
        "/missing" => ("404 Not Found", "missing"),
        "/empty" => ("204 No Content", ""),
        "/broken" => ("500 Internal Server Error", "broken"),
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            ("200 OK", "slow")
        }
        _ => ("404 Not Found", ""),
    };

    let response = if body.is_empty() {
        format!("HTTP/1.1 {}\r\nConnection: close\r\n\r\n", status)
    } else {
        format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    };

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Says Valid for any URL containing "good", Invalid for everything else.
#[derive(Debug, Default)]
pub struct FakeProber {
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeProber {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Probe for FakeProber {
    fn probe<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Verdict> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if url.contains("good") {
                Verdict::Valid
            } else {
                Verdict::Invalid
            }
        })
    }
}
