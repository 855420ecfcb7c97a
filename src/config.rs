use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::ConfigError;

/// Settings for one scan run. Read-only once scanning starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Number of parallel probe workers.
    pub workers: usize,
    /// Maximum probe starts per second across all workers.
    pub rate: u32,
    /// Connect timeout, and separately the budget for the exchange after connecting.
    pub timeout: Duration,
    pub start_port: u16,
    pub end_port: u16,
    /// Log every probe instead of drawing the progress line.
    pub debug: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 150,
            rate: 200,
            timeout: Duration::from_secs(5),
            start_port: 25000,
            end_port: 30000,
            debug: false,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.rate == 0 {
            return Err(ConfigError::ZeroRate);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.start_port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.start_port > self.end_port {
            return Err(ConfigError::InvalidRange {
                start: self.start_port,
                end: self.end_port,
            });
        }
        Ok(())
    }

    pub fn ports(&self) -> RangeInclusive<u16> {
        self.start_port..=self.end_port
    }

    /// Ports in the range; zero if the range is inverted.
    pub fn port_count(&self) -> u64 {
        if self.start_port > self.end_port {
            return 0;
        }
        u64::from(self.end_port - self.start_port) + 1
    }
}
