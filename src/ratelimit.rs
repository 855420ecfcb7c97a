use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::error::ConfigError;

/// Global cap on how often probes may start, shared by every worker.
///
/// One tick of a shared interval is one token. Callers queue on the mutex and
/// each takes the next tick, so starts are spaced at least one period apart no
/// matter how many workers there are. Missed ticks are not saved up.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Mutex<Interval>,
    period: Duration,
}

impl RateLimiter {
    /// Limiter handing out `rate` tokens per second. Must be called inside a runtime.
    pub fn new(rate: u32) -> Result<Self, ConfigError> {
        if rate == 0 {
            return Err(ConfigError::ZeroRate);
        }
        let period = (Duration::from_secs(1) / rate).max(Duration::from_nanos(1));
        let mut interval = time::interval_at(Instant::now(), period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Ok(Self {
            interval: Mutex::new(interval),
            period,
        })
    }

    /// Wait for the next token.
    pub async fn acquire(&self) {
        let mut interval = self.interval.lock().await;
        interval.tick().await;
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
