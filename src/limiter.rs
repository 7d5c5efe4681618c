//! Fixed-interval rate window for tool-augmented calls.
//!
//! The upstream tool server tolerates roughly one session invocation per
//! fifteen seconds, so the agent path funnels every topic through one shared
//! `RateWindow`.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// A gate permitting one acquisition per fixed time window.
///
/// Shared across the whole run via `Arc`. Uses tokio's clock, so tests can
/// run under a paused runtime with simulated time.
#[derive(Debug)]
pub struct RateWindow {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateWindow {
    /// Create a window allowing one acquisition per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Acquire the next slot, suspending until the window opens.
    ///
    /// Holding the internal lock across the wait serializes callers, which
    /// matches the strictly sequential batch loop.
    pub async fn acquire(&self) {
        let mut next_slot = self.next_slot.lock().await;
        if let Some(at) = *next_slot {
            let now = Instant::now();
            if at > now {
                debug!("rate window closed, waiting {:?}", at - now);
                tokio::time::sleep_until(at).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let window = RateWindow::new(Duration::from_secs(15));
        let start = Instant::now();
        window.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquisitions_spaced_by_interval() {
        let window = RateWindow::new(Duration::from_secs(15));
        let start = Instant::now();

        window.acquire().await;
        window.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(15));

        window.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_not_owed_after_idle_period() {
        let window = RateWindow::new(Duration::from_secs(15));
        window.acquire().await;

        tokio::time::sleep(Duration::from_secs(20)).await;

        let before = Instant::now();
        window.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
