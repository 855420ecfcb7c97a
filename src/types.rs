use std::time::Duration;

use crate::error::ProbeError;
use crate::status::StatusDocument;

/// Outcome of probing one port. Exactly one is produced per port per scan.
#[derive(Debug)]
pub struct ProbeResult {
    pub port: u16,
    pub outcome: Result<StatusDocument, ProbeError>,
}

/// Counters for one host once its scan has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub host: String,
    pub scanned: u64,
    pub found: u64,
    pub elapsed: Duration,
}

/// Totals across all hosts of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub scans: Vec<ScanSummary>,
    /// Hosts whose scan ended in an error.
    pub failed: usize,
    /// Hosts skipped because the run was cancelled.
    pub skipped: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total_found(&self) -> u64 {
        self.scans.iter().map(|s| s.found).sum()
    }
}
