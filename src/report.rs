use std::io;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::types::{ProbeResult, ScanSummary};

const PROGRESS_TEMPLATE: &str = "[*] Scanning {prefix}: {pos}/{len} {msg}";

/// Progress line for one host; hidden in debug mode, where each probe is logged instead.
pub fn progress_bar(host: &str, total: u64, debug: bool) -> ProgressBar {
    if debug {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr())
        .with_style(style)
        .with_prefix(host.to_string())
}

/// Single consumer of a host's probe results.
///
/// Writes each found server to the sink as `host:port - <json>` and keeps the
/// progress counters.
pub struct Collector<'a, W> {
    host: &'a str,
    total: u64,
    debug: bool,
    sink: &'a mut W,
    progress: ProgressBar,
    scanned: u64,
    found: u64,
    started: Instant,
    write_error: Option<io::Error>,
}

impl<'a, W> Collector<'a, W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(host: &'a str, total: u64, debug: bool, sink: &'a mut W, progress: ProgressBar) -> Self {
        Self {
            host,
            total,
            debug,
            sink,
            progress,
            scanned: 0,
            found: 0,
            started: Instant::now(),
            write_error: None,
        }
    }

    /// Drain `results` until every sender is gone, then flush the sink.
    ///
    /// A failed write does not stop the draining, so workers never block on a
    /// full result channel; the first write error is returned at the end.
    pub async fn run(mut self, mut results: mpsc::Receiver<ProbeResult>) -> io::Result<ScanSummary> {
        while let Some(result) = results.recv().await {
            self.record(result).await;
        }
        self.progress.finish();

        if let Err(e) = self.sink.flush().await {
            self.write_error.get_or_insert(e);
        }
        if let Some(e) = self.write_error {
            error!("Failed writing results for {}: {e}", self.host);
            return Err(e);
        }
        Ok(ScanSummary {
            host: self.host.to_string(),
            scanned: self.scanned,
            found: self.found,
            elapsed: self.started.elapsed(),
        })
    }

    async fn record(&mut self, result: ProbeResult) {
        self.scanned += 1;
        let address = format!("{}:{}", self.host, result.port);

        match &result.outcome {
            Ok(doc) => {
                self.found += 1;
                if self.debug {
                    info!("{address} -> Server found!");
                }
                let line = format!("{address} - {doc}\n");
                if self.write_error.is_none() {
                    if let Err(e) = self.sink.write_all(line.as_bytes()).await {
                        self.write_error = Some(e);
                    }
                }
            }
            Err(e) => {
                if self.debug {
                    debug!("{address} -> No server found: {e}");
                }
            }
        }

        if !self.debug {
            self.render();
        }
    }

    fn render(&self) {
        let percentage = if self.total == 0 {
            100.0
        } else {
            self.scanned as f64 / self.total as f64 * 100.0
        };
        self.progress.set_position(self.scanned);
        self.progress.set_message(format!(
            "({percentage:.2}%) | Time: {:.1}s | Found: {}",
            self.started.elapsed().as_secs_f64(),
            self.found
        ));
    }
}
