//! FTP transport.
//!
//! libcurl negotiates passive mode (EPSV, then PASV) unless an active port
//! is configured, which we never do. The body is streamed like HTTP rather
//! than buffered, so large FTP artifacts are fine.

use std::path::Path;

use url::Url;

use super::handle::{transfer_to_file, CurlOptions};
use super::{Transport, TransportError};
use crate::control::AbortToken;

#[derive(Debug, Clone, Default)]
pub struct FtpTransport {
    opts: CurlOptions,
}

impl FtpTransport {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }
}

impl Transport for FtpTransport {
    fn download(&self, url: &Url, dest: &Path, abort: &AbortToken) -> Result<u64, TransportError> {
        let mut easy = self.opts.easy(url)?;
        // FTP reply codes are checked by libcurl itself.
        transfer_to_file(&mut easy, dest, abort, false)
    }
}
