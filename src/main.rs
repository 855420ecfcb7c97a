use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mc_scan_rs::config::ScanConfig;
use mc_scan_rs::status::StatusClient;
use mc_scan_rs::{hosts, logging, scanner};

/// mc-scan-rs — fast, concurrent Minecraft server port scanner.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mc-scan-rs",
    version,
    about = "A fast, concurrent Minecraft server port scanner.",
    long_about = None,
    disable_help_flag = true
)]
struct Cli {
    /// A single domain or a path to a .txt file with hosts.
    #[arg(short = 'h', long)]
    host: String,

    /// Path to save the results (default: <host>_results.txt).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of concurrent scan workers.
    #[arg(short, long, default_value_t = 150)]
    workers: usize,

    /// Max scans per second.
    #[arg(short, long, default_value_t = 200)]
    rate: u32,

    /// Connection timeout in seconds.
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,

    /// Port to start scanning from.
    #[arg(short, long = "start-port", default_value_t = 25000)]
    start_port: u16,

    /// Port to end scanning at.
    #[arg(short, long = "end-port", default_value_t = 30000)]
    end_port: u16,

    /// Enable detailed debug logging.
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Show this help message.
    #[arg(short = '?', long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            workers: self.workers,
            rate: self.rate,
            timeout: Duration::from_secs(self.timeout),
            start_port: self.start_port,
            end_port: self.end_port,
            debug: self.debug,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug)?;

    let config = cli.scan_config();
    config.validate().context("invalid scan configuration")?;

    let output = match &cli.output {
        Some(path) => path.clone(),
        None => {
            let path = hosts::default_output_path(&cli.host);
            println!("[*] No output file specified. Defaulting to: {}", path.display());
            path
        }
    };

    let targets = hosts::resolve_hosts(&cli.host).context("error resolving hosts")?;
    let file = File::create(&output)
        .await
        .with_context(|| format!("error creating output file: {}", output.display()))?;
    let mut sink = BufWriter::new(file);

    // First Ctrl-C stops the run before the next host starts, a second one aborts.
    let cancel = CancellationToken::new();

    info!(
        "Starting scan for {} host(s). Results will be saved to {}",
        targets.len(),
        output.display()
    );
    let prober = Arc::new(StatusClient::new(config.timeout));
    let finished = tokio::select! {
        run = scanner::scan_hosts(&config, &targets, prober, &mut sink, cancel.clone()) => Some(run?),
        () = scanner::wait_for_abort(tokio::signal::ctrl_c, cancel) => None,
    };
    sink.flush().await.context("error flushing output file")?;

    let Some(run) = finished else {
        warn!("Partial results saved to file: {}", output.display());
        std::process::exit(130);
    };

    info!(
        "{} server(s) found on {} host(s); {} host(s) failed",
        run.total_found(),
        run.scans.len(),
        run.failed
    );
    info!("All found servers saved to file: {}", output.display());
    Ok(())
}
