//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::control::AbortToken;
use crate::transport::TransportError;

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
/// Gives up with [`TransportError::Aborted`] once `abort` is set.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    abort: &AbortToken,
    mut f: F,
) -> Result<T, TransportError>
where
    F: FnMut(u32) -> Result<T, TransportError>,
{
    let mut attempt = 1u32;
    loop {
        if abort.is_aborted() {
            return Err(TransportError::Aborted);
        }
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(
                            attempt,
                            ?kind,
                            "transient failure: {}; retrying in {:?}",
                            e,
                            d
                        );
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
