// src/batch/sink.rs
// =============================================================================
// The two output files of a pass: "good" (reachable) and "bad" (unreachable).
//
// - Both files are created fresh (truncated) when the pass starts
// - Every finished probe appends exactly one line to exactly one of them
// - Many tasks write at once, so each file sits behind its own async Mutex;
//   a whole line is written while the lock is held, so lines never interleave
// - Every line is flushed before it counts as written, so a failed write is
//   reported against the URL that caused it
// - A failed write is logged and counted, it never stops the pass
// =============================================================================

use super::UrlEntry;
use crate::checker::Verdict;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::error;

#[derive(Debug)]
struct OutputFile {
    path: PathBuf,
    file: Mutex<File>,
    lines: AtomicUsize,
}

impl OutputFile {
    async fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .await
            .with_context(|| format!("cannot create output file '{}'", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            lines: AtomicUsize::new(0),
        })
    }

    async fn append_line(&self, line: &[u8]) -> std::io::Result<()> {
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line);
        record.push(b'\n');

        let mut file = self.file.lock().await;
        // tokio's write_all only fills an in-memory buffer; the disk write
        // (and its error) happens on flush
        file.write_all(&record).await?;
        file.flush().await?;
        self.lines.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn flush(&self) -> std::io::Result<()> {
        self.file.lock().await.flush().await
    }
}

/// Line counts of a finished sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkTotals {
    pub good: usize,
    pub bad: usize,
    pub write_failures: usize,
}

#[derive(Debug)]
pub struct ResultSink {
    good: OutputFile,
    bad: OutputFile,
    write_failures: AtomicUsize,
}

impl ResultSink {
    /// Creates (or truncates) both output files.
    ///
    /// Failing to create either one is fatal for the pass.
    pub async fn create(good: &Path, bad: &Path) -> Result<Self> {
        Ok(Self {
            good: OutputFile::create(good).await?,
            bad: OutputFile::create(bad).await?,
            write_failures: AtomicUsize::new(0),
        })
    }

    fn output(&self, verdict: Verdict) -> &OutputFile {
        match verdict {
            Verdict::Valid => &self.good,
            Verdict::Invalid => &self.bad,
        }
    }

    /// Appends `line` to the file matching `verdict`.
    pub async fn write(&self, verdict: Verdict, line: &[u8]) -> std::io::Result<()> {
        self.output(verdict).append_line(line).await
    }

    /// Like `write`, but a failure is logged and counted instead of returned.
    pub async fn record(&self, verdict: Verdict, entry: &UrlEntry) {
        if let Err(e) = self.write(verdict, entry.as_bytes()).await {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
            let path = &self.output(verdict).path;
            error!(url = entry.url(), path = %path.display(), error = %e, "failed to write result");
        }
    }

    /// Flushes both files and returns the line counts.
    ///
    /// The files themselves close when the sink is dropped.
    pub async fn finish(&self) -> SinkTotals {
        for output in [&self.good, &self.bad] {
            if let Err(e) = output.flush().await {
                self.write_failures.fetch_add(1, Ordering::Relaxed);
                error!(path = %output.path.display(), error = %e, "failed to flush output file");
            }
        }

        SinkTotals {
            good: self.good.lines.load(Ordering::Relaxed),
            bad: self.bad.lines.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}
