//! Download requests as the manifest layer hands them over.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checksum::{DigestAlgorithm, ExpectedDigest};
use crate::error::FetchError;
use crate::url_model;

/// One artifact to fetch: a URL plus any digests pinning its content.
///
/// All supplied digests must match. Build manifests spell the keys
/// `md5sum`/`sha1sum`/`sha256sum`; both spellings deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    #[serde(default, alias = "md5sum", skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, alias = "sha1sum", skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, alias = "sha256sum", skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn md5(mut self, hex: impl Into<String>) -> Self {
        self.md5 = Some(hex.into());
        self
    }

    pub fn sha1(mut self, hex: impl Into<String>) -> Self {
        self.sha1 = Some(hex.into());
        self
    }

    pub fn sha256(mut self, hex: impl Into<String>) -> Self {
        self.sha256 = Some(hex.into());
        self
    }

    fn supplied(&self, algorithm: DigestAlgorithm) -> Option<&str> {
        match algorithm {
            DigestAlgorithm::Md5 => self.md5.as_deref(),
            DigestAlgorithm::Sha1 => self.sha1.as_deref(),
            DigestAlgorithm::Sha256 => self.sha256.as_deref(),
        }
        .filter(|s| !s.trim().is_empty())
    }

    /// True when the request carries no sha256, the only digest we consider strong.
    pub fn lacks_sha256(&self) -> bool {
        self.supplied(DigestAlgorithm::Sha256).is_none()
    }

    /// Validated digests, in md5, sha1, sha256 order. Empty strings count as absent.
    pub fn expected_digests(&self) -> Result<Vec<ExpectedDigest>, FetchError> {
        DigestAlgorithm::ALL
            .iter()
            .filter_map(|&algo| self.supplied(algo).map(|hex| ExpectedDigest::new(algo, hex)))
            .collect()
    }

    /// Where this request lands inside `download_dir`.
    pub fn destination(&self, download_dir: &Path) -> Result<PathBuf, FetchError> {
        let url = url_model::parse_url(&self.url)?;
        url_model::destination_path(download_dir, &url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_key_aliases() {
        let req: DownloadRequest = toml::from_str(
            r#"
            url = "http://ftp.gnu.org/gnu/coreutils/coreutils-8.29.tar.xz"
            md5sum = "960cfe75a42c9907c71439f8eb436303"
            "#,
        )
        .unwrap();
        assert_eq!(req.md5.as_deref(), Some("960cfe75a42c9907c71439f8eb436303"));
        assert!(req.lacks_sha256());
    }

    #[test]
    fn expected_digests_in_fixed_order() {
        let req = DownloadRequest::new("http://example.test/a.tar.gz")
            .sha256("AB".repeat(32))
            .md5("cd".repeat(16));
        let digests = req.expected_digests().unwrap();
        let algos: Vec<_> = digests.iter().map(|d| d.algorithm()).collect();
        assert_eq!(algos, vec![DigestAlgorithm::Md5, DigestAlgorithm::Sha256]);
        assert_eq!(digests[1].value(), "ab".repeat(32));
        assert!(!req.lacks_sha256());
    }

    #[test]
    fn empty_digest_counts_as_absent() {
        let req = DownloadRequest::new("http://example.test/a.tar.gz").sha256("");
        assert!(req.expected_digests().unwrap().is_empty());
        assert!(req.lacks_sha256());
    }

    #[test]
    fn destination_is_url_basename() {
        let req = DownloadRequest::new(
            "http://www.linuxfromscratch.org/patches/lfs/8.2/coreutils-8.29-i18n-1.patch?x=1",
        );
        let dir = Path::new("/var/cache/nbuild/coreutils");
        assert_eq!(
            req.destination(dir).unwrap(),
            dir.join("coreutils-8.29-i18n-1.patch")
        );
        assert_eq!(req.destination(dir).unwrap(), req.clone().destination(dir).unwrap());
    }

    #[test]
    fn malformed_digest_is_rejected() {
        let req = DownloadRequest::new("http://example.test/a.tar.gz").sha1("1234");
        assert!(matches!(
            req.expected_digests(),
            Err(FetchError::InvalidDigest {
                algorithm: DigestAlgorithm::Sha1,
                ..
            })
        ));
    }
}
