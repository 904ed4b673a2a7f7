//! Fetch orchestrator.
//!
//! For each request: parse the URL and pick its transport (unknown schemes
//! fail here, before any disk or network access), validate the digests,
//! resolve the destination, lock it, probe the cache, download on a miss and
//! verify the result. The first fatal error ends the batch.

mod pool;

use std::path::{Path, PathBuf};

use crate::cache::{self, CacheStatus};
use crate::checksum::DigestMismatch;
use crate::config::FetchConfig;
use crate::control::AbortToken;
use crate::error::{FetchError, REMEDIATION_HINT};
use crate::lock::DestinationLock;
use crate::request::DownloadRequest;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::transport::{Scheme, TransportError, TransportRegistry};
use crate::url_model;

/// Knobs for a [`Fetcher`].
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Concurrent downloads per batch; 1 keeps the batch strictly sequential.
    pub jobs: usize,
    /// Accept an existing file for a request that supplies no digest.
    pub trust_unverified: bool,
    /// Backoff for transient network failures.
    pub retry: RetryPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            trust_unverified: true,
            retry: RetryPolicy::default(),
        }
    }
}

/// Where a fetched file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
}

/// A request that ended with a usable file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub url: String,
    pub path: PathBuf,
    pub source: FetchSource,
    /// False when no digest was supplied and the file was accepted as is.
    pub verified: bool,
}

/// Fetches requests into one package download directory.
pub struct Fetcher {
    download_dir: PathBuf,
    transports: TransportRegistry,
    options: FetchOptions,
}

impl Fetcher {
    pub fn new(
        download_dir: impl Into<PathBuf>,
        transports: TransportRegistry,
        options: FetchOptions,
    ) -> Self {
        Self {
            download_dir: download_dir.into(),
            transports,
            options,
        }
    }

    /// libcurl transports and options taken from `cfg`.
    pub fn from_config(download_dir: impl Into<PathBuf>, cfg: &FetchConfig) -> Self {
        Self::new(
            download_dir,
            TransportRegistry::curl(&cfg.curl_options()),
            cfg.fetch_options(),
        )
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch every request, in order, halting at the first fatal error.
    ///
    /// With `jobs > 1` requests run on a bounded worker pool; results are
    /// still returned in request order.
    pub fn fetch_all(&self, requests: &[DownloadRequest]) -> Result<Vec<Fetched>, FetchError> {
        self.check_download_dir()?;
        if self.options.jobs <= 1 || requests.len() <= 1 {
            let abort = AbortToken::new();
            return requests
                .iter()
                .map(|request| self.fetch_with_token(request, &abort))
                .collect();
        }
        pool::fetch_parallel(self, requests, self.options.jobs)
    }

    /// Fetch a single request.
    pub fn fetch_one(&self, request: &DownloadRequest) -> Result<Fetched, FetchError> {
        self.check_download_dir()?;
        self.fetch_with_token(request, &AbortToken::new())
    }

    fn check_download_dir(&self) -> Result<(), FetchError> {
        if self.download_dir.is_dir() {
            Ok(())
        } else {
            Err(FetchError::DownloadDirMissing(self.download_dir.clone()))
        }
    }

    fn fetch_with_token(
        &self,
        request: &DownloadRequest,
        abort: &AbortToken,
    ) -> Result<Fetched, FetchError> {
        let url = url_model::parse_url(&request.url)?;
        let scheme = Scheme::of(&url)?;
        let expected = request.expected_digests()?;
        if expected.is_empty() && !self.options.trust_unverified {
            return Err(FetchError::DigestRequired {
                url: url.to_string(),
            });
        }
        let path = url_model::destination_path(&self.download_dir, &url)?;

        if request.lacks_sha256() {
            tracing::warn!("No sha256 to ensure the integrity of {}", url);
        }

        let _lock = DestinationLock::acquire(&path)?;

        match cache::probe(&path, &expected, self.options.trust_unverified) {
            CacheStatus::Verified => {
                tracing::info!(path = %path.display(), "using cache");
                return Ok(Fetched {
                    url: url.to_string(),
                    path,
                    source: FetchSource::Cache,
                    verified: true,
                });
            }
            CacheStatus::TrustedUnverified => {
                tracing::warn!(
                    path = %path.display(),
                    "no digest to check; trusting existing file on presence alone"
                );
                return Ok(Fetched {
                    url: url.to_string(),
                    path,
                    source: FetchSource::Cache,
                    verified: false,
                });
            }
            CacheStatus::Missing | CacheStatus::Mismatch(_) => {}
        }

        if abort.is_aborted() {
            return Err(FetchError::Aborted {
                url: url.to_string(),
            });
        }

        tracing::info!(%scheme, "fetching {}", url);
        let transport = self.transports.for_scheme(scheme);
        let bytes = run_with_retry(&self.options.retry, abort, |attempt| {
            if attempt > 1 {
                tracing::debug!(attempt, "retrying {}", url);
            }
            transport.download(&url, &path, abort)
        })
        .map_err(|source| match source {
            TransportError::Aborted => FetchError::Aborted {
                url: url.to_string(),
            },
            source => FetchError::Transport {
                url: url.to_string(),
                source,
            },
        })?;
        tracing::info!(bytes, "fetch done, stored at {}", path.display());

        let mismatches: Vec<DigestMismatch> =
            match cache::probe(&path, &expected, self.options.trust_unverified) {
                status @ (CacheStatus::Verified | CacheStatus::TrustedUnverified) => {
                    return Ok(Fetched {
                        url: url.to_string(),
                        path,
                        source: FetchSource::Network,
                        verified: status == CacheStatus::Verified,
                    });
                }
                CacheStatus::Mismatch(m) => m,
                // The transport reported success but left nothing behind.
                CacheStatus::Missing => expected
                    .iter()
                    .map(|want| DigestMismatch {
                        algorithm: want.algorithm(),
                        expected: want.value().to_string(),
                        actual: None,
                    })
                    .collect(),
            };

        tracing::error!(path = %path.display(), "{}", REMEDIATION_HINT);
        Err(FetchError::Integrity {
            url: url.to_string(),
            path,
            mismatches,
        })
    }
}
