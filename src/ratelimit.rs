use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::ratelimit_info;

/// Enforces a minimum spacing between upstream-bound calls across the whole process.
///
/// The lock is held while sleeping, so concurrent callers are released one at a
/// time, each at least `min_delay` after the previous one.
#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Wait until the caller may proceed, then record the call.
    /// Returns how long the caller was held back.
    pub async fn wait(&self) -> Duration {
        let mut last_call = self.last_call.lock().await;

        let wait_time = match *last_call {
            Some(previous) => self.min_delay.saturating_sub(previous.elapsed()),
            None => Duration::ZERO,
        };

        if !wait_time.is_zero() {
            ratelimit_info!(
                "Waiting {:.2}s due to rate limiting...",
                wait_time.as_secs_f64()
            );
            sleep(wait_time).await;
        }

        *last_call = Some(Instant::now());
        wait_time
    }
}
