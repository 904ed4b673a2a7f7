//! Fatal fetch errors.
//!
//! Every variant halts the batch. Callers map them to a process exit or to
//! an aborted build step; [`FetchError::kind`] tells them which class of
//! failure it was.

use std::path::PathBuf;

use thiserror::Error;

use crate::checksum::{DigestAlgorithm, DigestMismatch};
use crate::transport::TransportError;

/// Printed with every integrity failure.
pub const REMEDIATION_HINT: &str = "Downloaded file's signature is invalid. \
Please verify the signature(s) in the build manifest and the authenticity of the given link.";

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalKind {
    /// The artifact does not match its declared digests.
    Integrity,
    /// The URL scheme has no transport.
    UnsupportedTransport,
    /// Network failure that survived the retry policy.
    Network,
    /// The request itself is malformed (URL, digest, file name).
    Manifest,
    /// Local filesystem problem (download dir, lock file).
    Io,
    /// Stopped because another request in the batch failed.
    Aborted,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unknown protocol to download file from url {url} (scheme `{scheme}`)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("invalid {algorithm} digest `{value}`: expected {} hex characters", .algorithm.hex_len())]
    InvalidDigest {
        algorithm: DigestAlgorithm,
        value: String,
    },

    #[error("no digest supplied for {url} and unverified files are not trusted")]
    DigestRequired { url: String },

    #[error("cannot derive a file name from URL {url}")]
    NoFileName { url: String },

    #[error("download directory {} does not exist", .0.display())]
    DownloadDirMissing(PathBuf),

    #[error("failed to lock {}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("{} ({url} -> {}: {})", REMEDIATION_HINT, .path.display(), format_mismatches(.mismatches))]
    Integrity {
        url: String,
        path: PathBuf,
        mismatches: Vec<DigestMismatch>,
    },

    #[error("fetch of {url} aborted after an earlier failure")]
    Aborted { url: String },
}

fn format_mismatches(mismatches: &[DigestMismatch]) -> String {
    if mismatches.is_empty() {
        return "file missing after download".to_string();
    }
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FetchError {
    pub fn kind(&self) -> FatalKind {
        match self {
            FetchError::Integrity { .. } => FatalKind::Integrity,
            FetchError::UnsupportedScheme { .. } => FatalKind::UnsupportedTransport,
            FetchError::Transport {
                source: TransportError::Aborted,
                ..
            }
            | FetchError::Aborted { .. } => FatalKind::Aborted,
            FetchError::Transport {
                source: TransportError::Io(_),
                ..
            } => FatalKind::Io,
            FetchError::Transport { .. } => FatalKind::Network,
            FetchError::InvalidUrl { .. }
            | FetchError::InvalidDigest { .. }
            | FetchError::DigestRequired { .. }
            | FetchError::NoFileName { .. } => FatalKind::Manifest,
            FetchError::DownloadDirMissing(_) | FetchError::Lock { .. } => FatalKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_message_carries_hint_and_digests() {
        let err = FetchError::Integrity {
            url: "http://example.test/a.tar.gz".into(),
            path: PathBuf::from("/tmp/dl/a.tar.gz"),
            mismatches: vec![DigestMismatch {
                algorithm: DigestAlgorithm::Sha256,
                expected: "00".repeat(32),
                actual: Some("11".repeat(32)),
            }],
        };
        let msg = err.to_string();
        assert!(msg.starts_with(REMEDIATION_HINT));
        assert!(msg.contains("sha256: expected 0000"));
        assert_eq!(err.kind(), FatalKind::Integrity);
    }

    #[test]
    fn kinds() {
        let e = FetchError::UnsupportedScheme {
            url: "gopher://example.test/x".into(),
            scheme: "gopher".into(),
        };
        assert_eq!(e.kind(), FatalKind::UnsupportedTransport);
        let e = FetchError::Transport {
            url: "http://example.test/a".into(),
            source: TransportError::Http(404),
        };
        assert_eq!(e.kind(), FatalKind::Network);
        let e = FetchError::NoFileName {
            url: "http://example.test/".into(),
        };
        assert_eq!(e.kind(), FatalKind::Manifest);
        let e = FetchError::DigestRequired {
            url: "http://example.test/a.tar.gz".into(),
        };
        assert_eq!(e.kind(), FatalKind::Manifest);
        assert!(!e.to_string().contains(REMEDIATION_HINT));
    }
}
