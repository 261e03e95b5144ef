use crate::IngestError;
use std::future::Future;
use std::time::Duration;

/// Fixed-delay retry policy for binary downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Pause after each failed attempt except the last
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Runs `attempt` until it succeeds or the attempts are used up
    ///
    /// Each failure is described by a string (network error or non-success
    /// status). Exhaustion yields [`IngestError::Download`] carrying the last
    /// failure.
    pub async fn download<F, Fut>(&self, url: &str, mut attempt: F) -> crate::Result<Vec<u8>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, String>>,
    {
        let mut last_error = String::new();

        for n in 1..=self.attempts {
            match attempt().await {
                Ok(bytes) => return Ok(bytes),
                Err(reason) => {
                    tracing::warn!(
                        "Download attempt {}/{} for {} failed: {}",
                        n,
                        self.attempts,
                        url,
                        reason
                    );
                    last_error = reason;
                }
            }

            if n < self.attempts && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        Err(IngestError::Download {
            url: url.to_string(),
            attempts: self.attempts,
            reason: last_error,
        })
    }
}
