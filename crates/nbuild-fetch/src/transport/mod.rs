//! Transport layer: "retrieve the bytes behind a URL into a local file".
//!
//! Dispatch is by URL scheme. `http`/`https` and `ftp` each have a
//! [`Transport`]; every other scheme is rejected with
//! [`FetchError::UnsupportedScheme`] before any I/O happens.

mod error;
mod ftp;
mod handle;
mod http;

use std::fmt;
use std::path::Path;

use url::Url;

use crate::control::AbortToken;
use crate::error::FetchError;

pub use error::TransportError;
pub use ftp::FtpTransport;
pub use handle::CurlOptions;
pub use http::HttpTransport;

/// Schemes with a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    Ftp,
}

impl Scheme {
    pub fn of(url: &Url) -> Result<Scheme, FetchError> {
        match url.scheme() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            "ftp" => Ok(Scheme::Ftp),
            other => Err(FetchError::UnsupportedScheme {
                url: url.to_string(),
                scheme: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ftp => "ftp",
        })
    }
}

/// Retrieves `url` into `dest`, creating or replacing it.
///
/// Implementations must not create intermediate directories and must not
/// leave a partial file at `dest` when they fail. Returns the byte count.
pub trait Transport: Send + Sync {
    fn download(&self, url: &Url, dest: &Path, abort: &AbortToken) -> Result<u64, TransportError>;
}

/// One transport per supported scheme family.
pub struct TransportRegistry {
    http: Box<dyn Transport>,
    ftp: Box<dyn Transport>,
}

impl TransportRegistry {
    pub fn new(http: Box<dyn Transport>, ftp: Box<dyn Transport>) -> Self {
        Self { http, ftp }
    }

    /// libcurl-backed transports sharing `opts`.
    pub fn curl(opts: &CurlOptions) -> Self {
        Self::new(
            Box::new(HttpTransport::new(opts.clone())),
            Box::new(FtpTransport::new(opts.clone())),
        )
    }

    pub fn for_scheme(&self, scheme: Scheme) -> &dyn Transport {
        match scheme {
            Scheme::Http | Scheme::Https => self.http.as_ref(),
            Scheme::Ftp => self.ftp.as_ref(),
        }
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::curl(&CurlOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme(s: &str) -> Result<Scheme, FetchError> {
        Scheme::of(&Url::parse(s).unwrap())
    }

    #[test]
    fn known_schemes() {
        assert_eq!(scheme("http://example.test/a.tar.gz").unwrap(), Scheme::Http);
        assert_eq!(scheme("HTTPS://example.test/a.tar.gz").unwrap(), Scheme::Https);
        assert_eq!(scheme("ftp://ftp.gnu.org/gnu/a.tar.xz").unwrap(), Scheme::Ftp);
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        match scheme("gopher://example.test/x") {
            Err(FetchError::UnsupportedScheme { scheme, .. }) => assert_eq!(scheme, "gopher"),
            other => panic!("expected UnsupportedScheme, got {:?}", other),
        }
        assert!(scheme("file:///etc/passwd").is_err());
    }
}
