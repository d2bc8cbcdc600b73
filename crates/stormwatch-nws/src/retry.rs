//! Retry with exponential back-off and jitter for the NWS client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Everything else is
//! returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::NwsError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** 404, other 4xx, undecodable bodies, bad zone
/// references and bad URLs. Retrying would return the same result.
pub(crate) fn is_retriable(err: &NwsError) -> bool {
    match err {
        NwsError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        NwsError::RateLimited { .. } => true,
        NwsError::UnexpectedStatus { status, .. } => *status >= 500,
        NwsError::NotFound { .. }
        | NwsError::Deserialize { .. }
        | NwsError::InvalidZoneRef(_)
        | NwsError::InvalidUrl(_) => false,
    }
}

/// Upper bound on a single back-off sleep.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Sleep before retry number `attempt` (1-based): `base × 2^(attempt-1)`,
/// capped at [`MAX_DELAY`], then scaled by `jitter` (expected in `0.75..1.25`).
fn backoff_delay(attempt: u32, backoff_base_ms: u64, jitter: f64) -> Duration {
    let exp = attempt.saturating_sub(1).min(10);
    let nominal = Duration::from_millis(backoff_base_ms.saturating_mul(1 << exp)).min(MAX_DELAY);
    nominal.mul_f64(jitter)
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, NwsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NwsError>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_retries || !is_retriable(&err) => return Err(err),
            Err(err) => err,
        };
        attempt += 1;
        let delay = backoff_delay(attempt, backoff_base_ms, 0.75 + rand::random::<f64>() * 0.5);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient NWS failure; backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
