//! Minimum-delay throttle between provider calls.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Tracks the time of the last external call. The first call never waits.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: None,
        }
    }

    /// Time still to wait before the next call may start.
    pub fn remaining(&self) -> Duration {
        match self.last_call {
            Some(last) => self.delay.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Sleeps until `delay` has passed since the previous call, then records this call.
    pub async fn acquire(&mut self) {
        let wait = self.remaining();
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "rate limit delay");
            tokio::time::sleep(wait).await;
        }
        self.last_call = Some(Instant::now());
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
