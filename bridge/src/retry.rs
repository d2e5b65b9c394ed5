//! Bounded retry with a fixed delay between attempts

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// How many times to try an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

impl From<&DatabaseConfig> for RetryPolicy {
    fn from(config: &DatabaseConfig) -> Self {
        Self::new(config.connect_attempts, config.retry_delay())
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up
///
/// The operation always runs at least once. Each failure except the last is
/// logged at `warn` and followed by `policy.delay`; the last is logged at
/// `error` and returned.
pub async fn retry_with_delay<T, E, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                tracing::error!("{} failed after {} attempts: {}", what, attempts, e);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    what,
                    attempt,
                    attempts,
                    policy.delay,
                    e
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
