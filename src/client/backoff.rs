//! Linear backoff retry for the pipeline-file probe.
//!
//! The pipeline probe targets transient provider flakiness (a freshly
//! enabled repo whose contents are not yet visible, a blip on the contents
//! API), so the policy is a configurable value rather than a fixed rule:
//! attempt count and base delay are both adjustable. The delay blocks the
//! calling task, so this must not run where multi-second stalls are
//! unacceptable.

use std::future::Future;
use std::time::Duration;

/// A linear retry policy: attempt `n` is followed by a sleep of
/// `n × base_delay` until `max_attempts` have been made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Total number of attempts, including the first. Treated as at least 1.
    pub max_attempts: u32,

    /// Delay unit; the sleep after attempt `n` is `n × base_delay`.
    pub base_delay: Duration,
}

impl Backoff {
    /// Policy for the pipeline-file probe: 5 attempts with 1s, 2s, 3s, 4s
    /// sleeps between them.
    pub const PIPELINE: Self = Backoff {
        max_attempts: 5,
        base_delay: Duration::from_secs(1),
    };

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Backoff {
            max_attempts,
            base_delay,
        }
    }

    /// The sleep that follows the given attempt (1-indexed).
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// All sleeps the policy can incur, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts.max(1)).map(|attempt| self.delay_after_attempt(attempt))
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn total_max_wait(&self) -> Duration {
        self.delays().sum()
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::PIPELINE
    }
}

/// Runs `operation` under the given policy, short-circuiting on the first
/// success and returning the last error once attempts are exhausted.
///
/// Every failure is retried; this policy guards a probe whose failures are
/// expected to be transient, so no transient/permanent split applies here.
pub async fn retry_with_backoff<T, E, F, Fut>(backoff: Backoff, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = backoff.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= max_attempts {
                    return Err(e);
                }
                tokio::time::sleep(backoff.delay_after_attempt(attempt)).await;
                attempt += 1;
            }
        }
    }
}
