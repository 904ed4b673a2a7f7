//! Transport error type for retry classification.

use thiserror::Error;

/// Error returned by a single download attempt. Kept separate from
/// [`crate::FetchError`] so the retry policy can classify it first.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the part file failed (disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Io(#[from] std::io::Error),
    /// The batch was aborted while this transfer was running.
    #[error("transfer aborted")]
    Aborted,
}
