use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Process-wide spacing of outbound model calls.
///
/// Every caller goes through one gate: the check against the previous
/// dispatch, the wait and the timestamp update all happen while the lock is
/// held, so no two dispatches can start less than `interval` apart. Build it
/// once and share it with `Arc` across all workers and temperatures.
#[derive(Debug)]
pub struct RateLimiter {
    last_dispatch: Mutex<Option<Instant>>,
    interval: Duration,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            last_dispatch: Mutex::new(None),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for the next dispatch slot and claims it.
    ///
    /// Returns the instant recorded as this caller's dispatch time.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_dispatch.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }
}
