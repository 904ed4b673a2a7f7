//! HTTP(S) transport: single streamed GET.

use std::path::Path;

use url::Url;

use super::handle::{transfer_to_file, CurlOptions};
use super::{Transport, TransportError};
use crate::control::AbortToken;

const MAX_REDIRECTS: u32 = 10;

/// Streams the response body to disk chunk by chunk as it arrives.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    opts: CurlOptions,
}

impl HttpTransport {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }
}

impl Transport for HttpTransport {
    fn download(&self, url: &Url, dest: &Path, abort: &AbortToken) -> Result<u64, TransportError> {
        let mut easy = self.opts.easy(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        transfer_to_file(&mut easy, dest, abort, true)
    }
}
