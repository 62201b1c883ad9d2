use crate::config::RetrySettings;
use crate::domain::model::HttpReply;
use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff around a single API exchange.
///
/// Transport timeouts, connection failures and 5xx replies are retried; 4xx
/// replies and every other error are returned on the first attempt. When the
/// attempts run out on a 5xx, that last reply is handed back unchanged so the
/// caller reports it like any other status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// One attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before the `retry`-th retry (1-based): `base * 2^(retry-1)`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn execute<F, Fut>(&self, label: &str, mut operation: F) -> Result<HttpReply>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<HttpReply>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let outcome = operation().await;
            let retryable = match &outcome {
                Ok(reply) => reply.is_server_error(),
                Err(e) => e.is_retryable(),
            };

            if !retryable || attempt >= max_attempts {
                if retryable {
                    tracing::error!(label, attempt, "Giving up after {} attempts", attempt);
                }
                return outcome;
            }

            let delay = self.delay_for(attempt);
            match &outcome {
                Ok(reply) => tracing::warn!(
                    label,
                    attempt,
                    status = reply.status,
                    ?delay,
                    "Server error, retrying"
                ),
                Err(e) => tracing::warn!(label, attempt, error = %e, ?delay, "Request failed, retrying"),
            }

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
