//! Back-off policy for transient Anthropic failures.

use std::future::Future;
use std::time::Duration;

use crate::error::LlmError;

const MAX_DELAY: Duration = Duration::from_secs(60);
/// Jitter spans ±25 % of the nominal delay.
const JITTER_SPAN: f64 = 0.5;

/// How many extra attempts to make and how long to wait between them.
///
/// The nominal delay before retry `n` (1-based) is `base × 2^(n-1)`, capped
/// at 60 s, then scaled by a random factor in `[0.75, 1.25)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            base: Duration::from_millis(backoff_base_ms),
        }
    }

    /// Delay before retry `retry` given a jitter sample in `[0, 1)`.
    #[must_use]
    pub fn delay(&self, retry: u32, jitter: f64) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let nominal = self.base.saturating_mul(1 << exponent).min(MAX_DELAY);
        nominal.mul_f64(1.0 - JITTER_SPAN / 2.0 + jitter.clamp(0.0, 1.0) * JITTER_SPAN)
    }

    /// Runs `operation`, retrying transient failures until it succeeds, fails
    /// permanently, or the retry budget is spent.
    pub(crate) async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut retry = 0;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if retry >= self.max_retries || !is_transient(&err) {
                return Err(err);
            }

            retry += 1;
            let delay = self.delay(retry, rand::random::<f64>());
            tracing::warn!(
                retry,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "transient Anthropic failure; backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Timeouts, dropped connections, 429 and any 5xx (529 included).
pub(crate) fn is_transient(err: &LlmError) -> bool {
    match err {
        LlmError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        LlmError::Api { status, .. } => *status == 429 || (500..600).contains(status),
        LlmError::MissingApiKey
        | LlmError::Deserialize { .. }
        | LlmError::EmptyResponse
        | LlmError::InvalidBaseUrl(_) => false,
    }
}
