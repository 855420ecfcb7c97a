use crate::config::ScanConfig;
use crate::ratelimit::RateLimiter;
use crate::report::{progress_bar, Collector};
use crate::status::Prober;
use crate::types::{ProbeResult, RunSummary, ScanSummary};
use anyhow::{Context, Result};
use std::future::{pending, Future};
use std::io;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Scan every port of `config` on one host and write found servers to `sink`.
///
/// - Ports are fed through a bounded queue shared by `config.workers` workers.
/// - Every probe start waits for a token from one shared [`RateLimiter`].
/// - A single [`Collector`] drains the results, so `sink` has one writer.
///
/// Each port yields exactly one result. Probe failures are counted, never
/// propagated; only an invalid config or a failing sink makes this return `Err`.
pub async fn scan_host<W>(
    config: &ScanConfig,
    host: &str,
    prober: Arc<dyn Prober>,
    sink: &mut W,
) -> Result<ScanSummary>
where
    W: AsyncWrite + Unpin + Send,
{
    config.validate().context("invalid scan configuration")?;
    info!(
        "Starting host scan: {host} (from port {} to {})",
        config.start_port, config.end_port
    );
    if config.debug {
        warn!("DEBUG MODE IS ENABLED.");
    } else {
        info!("Using {} concurrent scan workers.", config.workers);
    }

    let limiter = Arc::new(RateLimiter::new(config.rate)?);
    let (port_tx, port_rx) = async_channel::bounded::<u16>(config.workers);
    let (result_tx, result_rx) = mpsc::channel::<ProbeResult>(config.workers);

    let total = config.port_count();
    let collector = Collector::new(
        host,
        total,
        config.debug,
        sink,
        progress_bar(host, total, config.debug),
    );

    let host: Arc<str> = Arc::from(host);
    let mut workers = JoinSet::new();
    for worker_id in 0..config.workers {
        workers.spawn(worker_loop(
            worker_id,
            host.clone(),
            port_rx.clone(),
            result_tx.clone(),
            limiter.clone(),
            prober.clone(),
        ));
    }
    // Workers now hold the only receivers and senders: the port queue closes
    // when `port_tx` drops below, the result stream when the last worker exits.
    drop(port_rx);
    drop(result_tx);

    let ports = config.ports();
    let drive = async move {
        for port in ports {
            if port_tx.send(port).await.is_err() {
                break;
            }
        }
        drop(port_tx);
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("scan worker failed: {e}");
            }
        }
    };

    let ((), collected) = tokio::join!(drive, collector.run(result_rx));
    let summary = collected.with_context(|| format!("failed writing results for {host}"))?;
    info!(
        "Finished {host}: {} ports scanned, {} found in {:.2}s",
        summary.scanned,
        summary.found,
        summary.elapsed.as_secs_f64()
    );
    Ok(summary)
}

/// Scan each host in turn. A failing host is logged and the run moves on.
///
/// `cancel` is only checked between hosts; a host scan that has started always
/// runs its full port range.
pub async fn scan_hosts<W>(
    config: &ScanConfig,
    hosts: &[String],
    prober: Arc<dyn Prober>,
    sink: &mut W,
    cancel: CancellationToken,
) -> Result<RunSummary>
where
    W: AsyncWrite + Unpin + Send,
{
    config.validate().context("invalid scan configuration")?;
    let started = Instant::now();
    let mut run = RunSummary::default();

    for (idx, host) in hosts.iter().enumerate() {
        if cancel.is_cancelled() {
            run.skipped = hosts.len() - idx;
            warn!("Scan cancelled; skipping {} remaining host(s)", run.skipped);
            break;
        }
        info!("--- Scanning host {}/{}: {host} ---", idx + 1, hosts.len());
        match scan_host(config, host, prober.clone(), &mut *sink).await {
            Ok(summary) => run.scans.push(summary),
            Err(e) => {
                error!("Error scanning host {host}: {e:#}");
                run.failed += 1;
            }
        }
    }

    run.elapsed = started.elapsed();
    info!(
        "ENTIRE SCAN PROCESS COMPLETE! (Total time: {:.2}s)",
        run.elapsed.as_secs_f64()
    );
    Ok(run)
}

/// Turn interrupts into cancellation: the first one stops the run before the
/// next host, the second one resolves this future so the caller can abort the
/// host in progress.
///
/// `interrupt` is called once per signal wanted, e.g. `tokio::signal::ctrl_c`.
/// If listening fails the future never resolves.
pub async fn wait_for_abort<S, F>(mut interrupt: S, cancel: CancellationToken)
where
    S: FnMut() -> F,
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = interrupt().await {
        warn!("cannot listen for interrupts: {e}");
        return pending().await;
    }
    warn!("Interrupt received; finishing the current host (interrupt again to abort)");
    cancel.cancel();

    if let Err(e) = interrupt().await {
        warn!("cannot listen for interrupts: {e}");
        return pending().await;
    }
    warn!("Second interrupt received; aborting scan");
}

async fn worker_loop(
    worker_id: usize,
    host: Arc<str>,
    ports: async_channel::Receiver<u16>,
    results: mpsc::Sender<ProbeResult>,
    limiter: Arc<RateLimiter>,
    prober: Arc<dyn Prober>,
) {
    while let Ok(port) = ports.recv().await {
        limiter.acquire().await;
        let outcome = prober.probe(&host, port).await;
        if results.send(ProbeResult { port, outcome }).await.is_err() {
            debug!(worker_id, "result stream closed, worker exiting");
            break;
        }
    }
}
