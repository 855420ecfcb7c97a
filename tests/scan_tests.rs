mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{spawn_server, Reply};
use mc_scan_rs::config::ScanConfig;
use mc_scan_rs::hosts;
use mc_scan_rs::scanner::{scan_host, scan_hosts};
use mc_scan_rs::status::StatusClient;
use tokio_util::sync::CancellationToken;

const STATUS_JSON: &str = r#"{"version":{"name":"1.20.4","protocol":765},"players":{"max":20,"online":1},"description":"hi","favicon":"data:image/png;base64,AAAA"}"#;

fn range_around(port: u16) -> (u16, u16) {
    let start = port.saturating_sub(5).max(1);
    let end = port.saturating_add(5);
    (start, end)
}

#[tokio::test]
async fn finds_the_single_status_server_in_range() {
    let (addr, _seen) = spawn_server(Reply::Status(STATUS_JSON.into())).await;
    let (start, end) = range_around(addr.port());
    let config = ScanConfig {
        workers: 4,
        rate: 1000,
        timeout: Duration::from_secs(5),
        start_port: start,
        end_port: end,
        debug: false,
    };
    let prober = Arc::new(StatusClient::new(config.timeout));
    let mut sink: Vec<u8> = Vec::new();

    let summary = scan_host(&config, "127.0.0.1", prober, &mut sink).await.unwrap();

    assert_eq!(summary.scanned, config.port_count());
    assert_eq!(summary.found, 1);
    let text = String::from_utf8(sink).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0],
        format!(
            "127.0.0.1:{} - {}",
            addr.port(),
            r#"{"version":{"name":"1.20.4","protocol":765},"players":{"max":20,"online":1},"description":"hi"}"#
        )
    );
}

#[tokio::test]
async fn comment_only_host_file_scans_nothing() {
    let resolved = hosts::parse_hosts_str("# staging servers\n\n   \n# play.example.net\n");
    assert!(resolved.is_empty());

    let config = ScanConfig::default();
    let prober = Arc::new(StatusClient::new(config.timeout));
    let mut sink: Vec<u8> = Vec::new();
    let run = scan_hosts(&config, &resolved, prober, &mut sink, CancellationToken::new())
        .await
        .unwrap();

    assert!(run.scans.is_empty());
    assert_eq!(run.failed, 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn invalid_config_is_rejected_up_front() {
    let config = ScanConfig {
        start_port: 200,
        end_port: 100,
        ..ScanConfig::default()
    };
    let prober = Arc::new(StatusClient::new(config.timeout));
    let mut sink: Vec<u8> = Vec::new();
    let err = scan_hosts(
        &config,
        &["127.0.0.1".to_string()],
        prober,
        &mut sink,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(format!("{err:#}").contains("invalid port range 200-100"));
}
