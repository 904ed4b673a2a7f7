//! Cache probing: does the file already at a destination satisfy a request?

use std::path::Path;

use crate::checksum::{self, DigestMismatch, ExpectedDigest};

/// Outcome of probing a destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// Nothing at the path.
    Missing,
    /// The file matches every supplied digest.
    Verified,
    /// The file exists, no digest was supplied and presence is trusted.
    TrustedUnverified,
    /// The file fails at least one digest. An empty list means no digest was
    /// supplied and presence alone is not trusted.
    Mismatch(Vec<DigestMismatch>),
}

impl CacheStatus {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, CacheStatus::Verified | CacheStatus::TrustedUnverified)
    }
}

/// Probe `path` against `expected` (AND across every supplied digest).
///
/// With no digests, an existing file is accepted only when `trust_unverified`
/// is set. That trust-on-presence rule lets manifests omit digests for
/// non-reproducible upstream artifacts. Callers decide how to surface it.
pub fn probe(path: &Path, expected: &[ExpectedDigest], trust_unverified: bool) -> CacheStatus {
    if !path.is_file() {
        return CacheStatus::Missing;
    }
    if expected.is_empty() {
        if trust_unverified {
            return CacheStatus::TrustedUnverified;
        }
        return CacheStatus::Mismatch(Vec::new());
    }
    let failed = checksum::mismatches(path, expected);
    if failed.is_empty() {
        CacheStatus::Verified
    } else {
        CacheStatus::Mismatch(failed)
    }
}

pub fn is_satisfied(path: &Path, expected: &[ExpectedDigest], trust_unverified: bool) -> bool {
    probe(path, expected, trust_unverified).is_satisfied()
}
