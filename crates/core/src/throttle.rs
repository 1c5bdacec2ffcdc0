//! Minimum spacing between model calls.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Keeps consecutive model calls at least `min_interval` apart.
///
/// The time of the last call lives in this value, so whoever owns the
/// throttle decides which calls share a budget. The agent keeps one for
/// its whole lifetime.
#[derive(Clone, Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl Throttle {
    /// Creates a throttle that has not seen any call yet.
    #[inline]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Waits until a call is allowed and records it.
    pub async fn wait(&mut self) {
        if let Some(last_call) = self.last_call {
            // An interval too large to represent blocks for the rest of
            // the run.
            let ready_at = last_call
                .checked_add(self.min_interval)
                .unwrap_or_else(far_future);
            if ready_at > Instant::now() {
                trace!("throttled until {ready_at:?}");
                sleep_until(ready_at).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

fn far_future() -> Instant {
    // Roughly 30 years, the same horizon tokio uses for its own timers.
    Instant::now() + Duration::from_secs(86400 * 365 * 30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_immediate() {
        let mut throttle = Throttle::new(Duration::from_secs(1));
        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(throttle.last_call, Some(start));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let mut throttle = Throttle::new(Duration::from_secs(1));
        let start = Instant::now();
        throttle.wait().await;
        throttle.wait().await;
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_time_counts() {
        let mut throttle = Throttle::new(Duration::from_secs(1));
        throttle.wait().await;
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let before = Instant::now();
        throttle.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval() {
        let mut throttle = Throttle::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            throttle.wait().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_does_not_overflow() {
        let mut throttle = Throttle::new(Duration::MAX);
        throttle.wait().await;
        let second =
            tokio::time::timeout(Duration::from_secs(60), throttle.wait()).await;
        assert!(second.is_err());
    }
}
