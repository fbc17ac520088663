//! Bounded retry with exponential backoff on rate limiting.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use scholia_core::config::RetryConfig;

/// Why a single bibliographic request did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// HTTP 429. The only retryable failure.
    RateLimited,
    Status(u16),
    Transport(String),
    Decode(String),
}

impl RequestFailure {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RequestFailure::RateLimited)
    }
}

impl std::fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestFailure::RateLimited => write!(f, "rate limited (HTTP 429)"),
            RequestFailure::Status(code) => write!(f, "HTTP {code}"),
            RequestFailure::Transport(msg) => write!(f, "transport error: {msg}"),
            RequestFailure::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

/// Waits between attempts. Swapped for a recorder in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_secs(config.base_delay_secs))
    }

    /// Delay after the zero-based `attempt`: `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. Failure of any kind is `None`; nothing is raised.
    ///
    /// No delay follows the final attempt.
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, label: &str, mut op: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RequestFailure>>,
    {
        for attempt in 0..self.max_attempts {
            match op().await {
                Ok(value) => return Some(value),
                Err(failure) if failure.is_retryable() => {
                    if attempt + 1 == self.max_attempts {
                        break;
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        label,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_secs = delay.as_secs_f64(),
                        "Rate limited, backing off"
                    );
                    sleeper.sleep(delay).await;
                }
                Err(failure) => {
                    warn!(label, error = %failure, "Request failed, not retrying");
                    return None;
                }
            }
        }
        warn!(label, attempts = self.max_attempts, "Giving up after repeated rate limiting");
        debug!(label, "Returning empty result");
        None
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingSleeper(Mutex<Vec<Duration>>);

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    #[test]
    fn delay_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_secs(5));
        assert_eq!(policy.delay_for(0), Duration::from_secs(5));
        assert_eq!(policy.delay_for(1), Duration::from_secs(10));
        assert_eq!(policy.delay_for(2), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn recovers_after_rate_limiting() {
        let policy = RetryPolicy::new(3, Duration::from_secs(5));
        let sleeper = RecordingSleeper::default();
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let out = policy
            .run(&sleeper, "test", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(RequestFailure::RateLimited)
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(out, Some(7));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(
            *sleeper.0.lock().unwrap(),
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn exhausted_attempts_yield_none() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let sleeper = RecordingSleeper::default();
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let out: Option<()> = policy
            .run(&sleeper, "test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RequestFailure::RateLimited)
            })
            .await;

        assert!(out.is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        let delays = sleeper.0.lock().unwrap().clone();
        assert_eq!(delays.len(), 2);
        assert!(delays[1] > delays[0]);
    }

    #[tokio::test]
    async fn other_failures_abort_immediately() {
        let policy = RetryPolicy::default();
        let sleeper = RecordingSleeper::default();
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let out: Option<()> = policy
            .run(&sleeper, "test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RequestFailure::Status(500))
            })
            .await;

        assert!(out.is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(sleeper.0.lock().unwrap().is_empty());
    }
}
