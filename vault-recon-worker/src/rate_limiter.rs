use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Single-slot gate enforcing a minimum interval between provider calls
/// (§5 "Per-chain rate limit"). One instance is shared by every job in a
/// worker process; it does not distinguish chains, matching the spec's
/// "single-slot gate per worker process".
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(tokens_per_interval: u32) -> Self {
        let tokens_per_interval = tokens_per_interval.max(1);
        Self {
            min_interval: Duration::from_millis(1000 / u64::from(tokens_per_interval)),
            last_call: Mutex::new(None),
        }
    }

    /// Blocks the caller until at least `min_interval` has elapsed since the
    /// previous call returned, then reserves the slot for itself.
    pub async fn acquire(&self) {
        let wait = {
            let mut guard = self
                .last_call
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let now = Instant::now();
            let wait = guard
                .map(|last| self.min_interval.saturating_sub(now.duration_since(last)))
                .unwrap_or_default();
            *guard = Some(now + wait);
            wait
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_acquire_waits_out_the_interval() {
        let limiter = RateLimiter::new(5); // 200ms slot
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(Instant::now().duration_since(start) >= Duration::from_millis(200));
    }
}
