//! libcurl plumbing shared by the HTTP and FTP transports.

use std::io;
use std::path::Path;
use std::time::Duration;

use curl::easy::Easy;
use url::Url;

use super::TransportError;
use crate::control::AbortToken;
use crate::storage::PartFile;

/// Per-transfer libcurl settings.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    /// Hard cap on a whole transfer; `None` = unlimited.
    pub max_time: Option<Duration>,
    pub buffer_size: Option<usize>,
    pub user_agent: String,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            max_time: None,
            buffer_size: None,
            user_agent: format!("nbuild-fetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CurlOptions {
    /// A fresh handle for `url` with timeouts applied.
    pub(super) fn easy(&self, url: &Url) -> Result<Easy, curl::Error> {
        let mut easy = Easy::new();
        easy.url(url.as_str())?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        if let Some(max) = self.max_time {
            easy.timeout(max)?;
        }
        if let Some(sz) = self.buffer_size {
            easy.buffer_size(sz)?;
        }
        Ok(easy)
    }
}

/// Runs the transfer on `easy`, streaming the body into `<dest>.part` and
/// renaming it onto `dest` on success. Returns the number of bytes written.
///
/// With `check_http_status`, a non-2xx response is an error and its body is
/// discarded.
pub(super) fn transfer_to_file(
    easy: &mut Easy,
    dest: &Path,
    abort: &AbortToken,
    check_http_status: bool,
) -> Result<u64, TransportError> {
    let mut part = PartFile::create(dest)?;
    let mut write_err: Option<io::Error> = None;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if abort.is_aborted() {
                return Ok(0); // abort transfer
            }
            match part.write_chunk(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    tracing::warn!("write to {} failed: {}", dest.display(), e);
                    write_err = Some(e);
                    Ok(0)
                }
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if abort.is_aborted() {
            return Err(TransportError::Aborted);
        }
        if let Some(io_err) = write_err {
            return Err(TransportError::Io(io_err));
        }
        return Err(TransportError::Curl(e));
    }

    if check_http_status {
        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransportError::Http(code));
        }
    }

    Ok(part.finalize()?)
}
