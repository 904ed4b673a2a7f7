//! Retry and backoff for transient network failures.
//!
//! Timeouts, throttling, connection failures and 5xx responses are retried
//! with exponential backoff. Everything else, including integrity failures
//! which never reach this module, fails on the first attempt.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
