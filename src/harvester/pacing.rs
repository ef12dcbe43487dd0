//! Randomized delay between page requests
//!
//! The pause is awaited inline by the pagination loop, so exactly one page is
//! in flight at a time and requests leave in strict page order.

use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;

/// Draws delays uniformly from a closed millisecond window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl Pacer {
    /// Creates a pacer for `[min_delay_ms, max_delay_ms]`
    ///
    /// The bounds are swapped if given in the wrong order.
    pub fn new(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            min_delay_ms: min_delay_ms.min(max_delay_ms),
            max_delay_ms: max_delay_ms.max(min_delay_ms),
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(config.min_delay_ms, config.max_delay_ms)
    }

    /// Samples the next delay
    pub fn next_delay(&self) -> Duration {
        if self.min_delay_ms == self.max_delay_ms {
            return Duration::from_millis(self.min_delay_ms);
        }

        let millis = rand::thread_rng().gen_range(self.min_delay_ms..=self.max_delay_ms);
        Duration::from_millis(millis)
    }

    /// Sleeps for a freshly sampled delay and returns how long it was
    pub async fn pause(&self) -> Duration {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
