//! Digest verification for fetched artifacts.
//!
//! Digests are computed on demand by streaming the file through the hasher,
//! never inline with the transfer, so arbitrarily large sources stay within a
//! fixed memory budget.

use anyhow::{Context, Result};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::FetchError;

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithms a download request may pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// Every algorithm, in the order they are checked.
    pub const ALL: [DigestAlgorithm; 3] = [Self::Md5, Self::Sha1, Self::Sha256];

    /// Length of the lowercase hex encoding.
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(format!("unknown digest algorithm: {other}")),
        }
    }
}

/// A digest a fetched file must match. The value is always lowercase hex of
/// the algorithm's length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedDigest {
    algorithm: DigestAlgorithm,
    value: String,
}

impl ExpectedDigest {
    /// Validates `hex` (length and charset) and lower-cases it.
    pub fn new(algorithm: DigestAlgorithm, hex: &str) -> Result<Self, FetchError> {
        let value = hex.trim().to_ascii_lowercase();
        if value.len() != algorithm.hex_len() || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FetchError::InvalidDigest {
                algorithm,
                value: hex.to_string(),
            });
        }
        Ok(Self { algorithm, value })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ExpectedDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.value)
    }
}

/// One supplied digest that the file on disk did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestMismatch {
    pub algorithm: DigestAlgorithm,
    pub expected: String,
    /// `None` when the file could not be read at all.
    pub actual: Option<String>,
}

impl fmt::Display for DigestMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{}: expected {}, got {}",
                self.algorithm, self.expected, actual
            ),
            None => write!(f, "{}: expected {}, file unreadable", self.algorithm, self.expected),
        }
    }
}

fn hash_reader<D: Digest>(mut reader: impl Read, path: &Path) -> Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the digest of a file and return it as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large files.
pub fn compute_digest(path: &Path, algorithm: DigestAlgorithm) -> Result<String> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    match algorithm {
        DigestAlgorithm::Md5 => hash_reader::<Md5>(f, path),
        DigestAlgorithm::Sha1 => hash_reader::<Sha1>(f, path),
        DigestAlgorithm::Sha256 => hash_reader::<Sha256>(f, path),
    }
}

/// True only if the file exists, is readable and matches `expected`.
/// A missing file is the normal state before a download, so it is not an error.
pub fn verify(path: &Path, expected: &ExpectedDigest) -> bool {
    match compute_digest(path, expected.algorithm) {
        Ok(actual) => actual.eq_ignore_ascii_case(&expected.value),
        Err(e) => {
            tracing::debug!(path = %path.display(), "digest not computed: {:#}", e);
            false
        }
    }
}

/// Check every supplied digest and report the ones that fail.
pub fn mismatches(path: &Path, expected: &[ExpectedDigest]) -> Vec<DigestMismatch> {
    expected
        .iter()
        .filter_map(|want| {
            let actual = compute_digest(path, want.algorithm).ok();
            match &actual {
                Some(a) if a.eq_ignore_ascii_case(&want.value) => None,
                _ => Some(DigestMismatch {
                    algorithm: want.algorithm,
                    expected: want.value.clone(),
                    actual,
                }),
            }
        })
        .collect()
}
