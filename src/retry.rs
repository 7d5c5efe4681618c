//! Backoff retry for transient provider overload.
//!
//! Only `RedpulseError::Overloaded` is retried; every other error propagates
//! on the first attempt.

use crate::config::RetrySettings;
use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// First backoff wait.
    pub base_delay: Duration,
    /// Cap on any single backoff wait.
    pub max_delay: Duration,
    /// Multiplier applied per attempt.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(15),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: Duration::from_secs(settings.base_delay_secs),
            max_delay: Duration::from_secs(settings.max_delay_secs),
            multiplier: settings.multiplier,
        }
    }
}

/// Calculate the backoff delay before retry number `attempt` (zero-based).
pub fn backoff_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let multiplier = config.multiplier.powi(attempt as i32);
    let delay_ms = (config.base_delay.as_millis() as f64 * multiplier) as u64;
    Duration::from_millis(delay_ms).min(config.max_delay)
}

/// Run `operation`, retrying with exponential backoff while it fails with an
/// overload error. The last error is re-raised once attempts are exhausted.
pub async fn retry_overloaded<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    info!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(err) if err.is_overloaded() && attempt + 1 < config.max_attempts => {
                let delay = backoff_delay(attempt, config);
                warn!(
                    "{} overloaded (attempt {}/{}), retrying in {:?}",
                    operation_name,
                    attempt + 1,
                    config.max_attempts,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                debug!("{} failed without retry: {}", operation_name, err);
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RedpulseError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[test]
    fn test_backoff_delays() {
        let config = RetryConfig::default();
        assert_eq!(backoff_delay(0, &config), Duration::from_secs(15));
        assert_eq!(backoff_delay(1, &config), Duration::from_secs(30));
        // Capped by max_delay.
        assert_eq!(backoff_delay(2, &config), Duration::from_secs(60));
        assert_eq!(backoff_delay(5, &config), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overload_retried_until_success() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let start = Instant::now();

        let result = retry_overloaded(&config, "test_op", move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(RedpulseError::Overloaded("at capacity".to_string()))
                } else {
                    Ok("summary text".to_string())
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "summary text");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // Two backoff waits: 15s + 30s.
        assert!(start.elapsed() >= Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overload_reraised_after_exhaustion() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<String> = retry_overloaded(&config, "test_op", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RedpulseError::Overloaded("at capacity".to_string()))
            }
        })
        .await;

        assert!(result.unwrap_err().is_overloaded());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<String> = retry_overloaded(&config, "test_op", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RedpulseError::Agent("malformed tool call".to_string()))
            }
        })
        .await;

        assert!(matches!(result.unwrap_err(), RedpulseError::Agent(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
