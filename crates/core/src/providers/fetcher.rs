use std::sync::Arc;
use std::time::Duration;

use super::transport::{HttpTransport, TransportError};
use crate::errors::CoreError;

/// Retry configuration for the fetcher. Attempt count and delay are
/// parameters rather than constants so tests can run with zero delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: u32,

    /// Fixed pause between attempts (not exponential).
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Policy without any pause between attempts.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            delay: Duration::ZERO,
        }
    }
}

/// Wraps a single outbound call with failure classification and bounded
/// retries at a fixed delay.
///
/// Classification:
/// - HTTP 429 fails with [`CoreError::RateLimited`] at once — the upstream
///   will keep rejecting within the same window, so no retry is attempted.
/// - A connectivity fault is collapsed into the same `RateLimited`
///   condition and is also not retried.
/// - Any other non-success status or transport failure is retried up to the
///   bound, then surfaced as [`CoreError::Http`] / [`CoreError::Network`].
///
/// Retries for one logical call are strictly sequential.
pub struct ResilientFetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Issue the call, returning the raw body for the caller to deserialize.
    pub async fn request(&self, url: &str) -> Result<String, CoreError> {
        let attempts = self.policy.attempts.max(1);
        let mut last_error = CoreError::Network("no attempt was made".into());

        for attempt in 1..=attempts {
            match self.transport.get(url).await {
                Ok(response) if response.status == 429 => {
                    tracing::debug!(url, "upstream returned 429");
                    return Err(CoreError::RateLimited);
                }
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => {
                    tracing::debug!(url, status = response.status, attempt, "request failed");
                    last_error = CoreError::Http {
                        status: response.status,
                    };
                }
                Err(TransportError::Connect(reason)) => {
                    tracing::debug!(url, %reason, "connectivity fault");
                    return Err(CoreError::RateLimited);
                }
                Err(TransportError::Other(reason)) => {
                    tracing::debug!(url, %reason, attempt, "transport error");
                    last_error = CoreError::Network(reason);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        Err(last_error)
    }
}
