//! Batch files: the download list of one package, as TOML or JSON.
//!
//! ```toml
//! package = "coreutils"
//!
//! [[download]]
//! url = "http://ftp.gnu.org/gnu/coreutils/coreutils-8.29.tar.xz"
//! md5sum = "960cfe75a42c9907c71439f8eb436303"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::request::DownloadRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchManifest {
    /// Package the downloads belong to; selects `<download_root>/<package>`.
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub download: Vec<DownloadRequest>,
}

impl FetchManifest {
    /// `.json` files are parsed as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&data).with_context(|| format!("parse {}", path.display()))
        } else {
            Self::from_toml(&data).with_context(|| format!("parse {}", path.display()))
        }
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}
