//! Retry of chain requests with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FeeResult;

/// Delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Cap on the delay between retries.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Attempts before the last error is returned.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Delay growth per attempt.
pub const BACKOFF_MULTIPLIER: f64 = 1.5;

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// At least one attempt is always made.
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BackoffPolicy {
    /// Delay after failed attempt number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = BACKOFF_MULTIPLIER.powi(attempt.saturating_sub(1) as i32);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        Duration::from_millis(millis as u64).min(self.max_delay)
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` attempts failed.
///
/// `tag` names the request in logs. `is_live` is checked before every
/// attempt and once more after a failure; when it turns false the request is
/// abandoned with `Ok(None)`, whatever the outcome of the attempt in flight.
pub async fn backoff<T, F, Fut, L>(tag: &str, policy: &BackoffPolicy, is_live: L, mut op: F) -> FeeResult<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FeeResult<T>>,
    L: Fn() -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        if !is_live() {
            debug!(tag, attempt, "request abandoned");
            return Ok(None);
        }
        match op().await {
            Ok(value) => return Ok(Some(value)),
            Err(err) if !is_live() => {
                debug!(tag, attempt, %err, "request abandoned after failure");
                return Ok(None);
            }
            Err(err) if attempt >= max_attempts => {
                warn!(tag, attempt, %err, "giving up");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay(attempt);
                warn!(tag, attempt, %err, delay_ms = delay.as_millis() as u64, "request failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeeError;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    fn instant(max_attempts: u32) -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_attempts,
        }
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = BackoffPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(200),
            max_attempts: 10,
        };
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(150));
        assert_eq!(policy.delay(3), Duration::from_millis(200));
        assert_eq!(policy.delay(9), Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = &AtomicU32::new(0);
        let value = backoff("test", &instant(5), || true, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(FeeError::Client("unavailable".into()))
            } else {
                Ok(7)
            }
        })
        .await
        .unwrap();
        assert_eq!(value, Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error() {
        let calls = &AtomicU32::new(0);
        let result: FeeResult<Option<()>> = backoff("test", &instant(3), || true, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FeeError::Client("down".into()))
        })
        .await;
        assert!(matches!(result, Err(FeeError::Client(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let calls = &AtomicU32::new(0);
        let _ = backoff("test", &instant(0), || true, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(FeeError::Client("down".into()))
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dead_request_is_never_sent() {
        let calls = &AtomicU32::new(0);
        let result = backoff("test", &instant(3), || false, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        })
        .await
        .unwrap();
        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_retrying_once_abandoned() {
        let calls = &AtomicU32::new(0);
        let live = &AtomicBool::new(true);
        let started = tokio::time::Instant::now();
        let result: FeeResult<Option<()>> = backoff(
            "test",
            &BackoffPolicy::default(),
            move || live.load(Ordering::SeqCst),
            move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 1 {
                    live.store(false, Ordering::SeqCst);
                }
                Err(FeeError::Client("down".into()))
            },
        )
        .await;
        assert!(matches!(result, Ok(None)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let elapsed = started.elapsed();
        assert!(elapsed >= DEFAULT_INITIAL_DELAY && elapsed < DEFAULT_INITIAL_DELAY * 2);
    }
}
