//! Retry with exponential back-off and jitter for the summarizer client.
//!
//! [`retry_with_backoff`] wraps one outbound call and retries transient
//! failures (network errors, 5xx) within a fixed attempt budget. Permanent
//! errors — 4xx rejections, malformed payloads, unsupported kinds — are
//! returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::SummarizerError;

/// Cap on the sleep between attempts, per the upstream contract.
const MAX_DELAY_MS: u64 = 5_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 5xx responses: transient server/infrastructure errors.
///
/// **Not retriable (hard stop):**
/// - [`SummarizerError::UpstreamRejected`] — a 4xx is a caller problem;
///   retrying won't fix it and would waste the upstream LLM budget.
/// - [`SummarizerError::Deserialize`] / [`SummarizerError::InvalidEnvelope`]
///   — malformed response; retrying won't fix it.
/// - [`SummarizerError::UnsupportedKind`] — caller error, no request made.
pub(crate) fn is_retriable(err: &SummarizerError) -> bool {
    match err {
        SummarizerError::Http(e) => e.is_timeout() || e.is_connect(),
        SummarizerError::UpstreamUnavailable { .. } => true,
        SummarizerError::UpstreamRejected { .. }
        | SummarizerError::Deserialize { .. }
        | SummarizerError::InvalidEnvelope(_)
        | SummarizerError::UnsupportedKind(_) => false,
    }
}

/// Runs `operation` up to `max_attempts` times, retrying transient errors.
///
/// Back-off before attempt *n+1* is `backoff_base_ms × 2ⁿ⁻¹ ± 25% jitter`,
/// capped at [`MAX_DELAY_MS`]. Retries are local to this invocation; there is
/// no separate retry queue.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SummarizerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SummarizerError>>,
{
    let budget = max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= budget {
                    return Err(err);
                }
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    budget,
                    delay_ms,
                    error = %err,
                    "summarizer transient error, retrying after back-off"
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
