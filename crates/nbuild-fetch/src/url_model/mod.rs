//! URL modeling: parsing and destination path derivation.
//!
//! The destination of a request is `<download_dir>/<basename of URL path>`.
//! The mapping is pure, so the same URL always lands on the same file and a
//! later run finds it in the cache.

mod path;
mod sanitize;

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::FetchError;
use crate::lock::LOCK_DIR;

pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename_for_linux;

/// Parse an absolute, scheme-qualified URL.
pub fn parse_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url.trim()).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// File name a URL is stored under. The lock directory name is reserved.
pub fn destination_file_name(url: &Url) -> Result<String, FetchError> {
    filename_from_url_path(url)
        .map(|raw| sanitize_filename_for_linux(&raw))
        .filter(|name| !name.is_empty() && name != LOCK_DIR)
        .ok_or_else(|| FetchError::NoFileName {
            url: url.to_string(),
        })
}

/// Full destination path for `url` inside `download_dir`.
pub fn destination_path(download_dir: &Path, url: &Url) -> Result<PathBuf, FetchError> {
    Ok(download_dir.join(destination_file_name(url)?))
}
