//! CLI command handlers. Each command is in its own file.

mod checksum;
mod fetch;
mod get;

pub use checksum::run_checksum;
pub use fetch::run_fetch;
pub use get::run_get;

use anyhow::{Context, Result};
use nbuild_fetch::config::FetchConfig;
use nbuild_fetch::{FetchSource, Fetched, Fetcher};
use std::path::{Path, PathBuf};

/// Command-line settings that take precedence over the config file.
#[derive(Debug, Default)]
pub struct FetchOverrides<'a> {
    pub download_dir: Option<&'a Path>,
    pub jobs: Option<usize>,
    pub strict: bool,
}

/// Explicit dir, else `<download_root>/<package>`, else the current directory.
/// The directory is created here; the fetcher itself expects it to exist.
pub(crate) fn resolve_download_dir(
    cfg: &FetchConfig,
    explicit: Option<&Path>,
    package: Option<&str>,
) -> Result<PathBuf> {
    let from_root = match (explicit, package) {
        (None, Some(package)) => cfg.package_download_dir(package)?,
        _ => None,
    };
    let dir = match (explicit, from_root) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(dir)) => dir,
        (None, None) => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create download directory {}", dir.display()))?;
    Ok(dir)
}

pub(crate) fn build_fetcher(
    cfg: &FetchConfig,
    dir: &Path,
    overrides: &FetchOverrides<'_>,
) -> Fetcher {
    let mut cfg = cfg.clone();
    if let Some(jobs) = overrides.jobs {
        cfg.jobs = jobs;
    }
    if overrides.strict {
        cfg.trust_unverified_cache = false;
    }
    Fetcher::from_config(dir, &cfg)
}

/// Unverified results (no digest supplied) are marked so the operator sees them.
pub(crate) fn status_label(fetched: &Fetched) -> &'static str {
    match (fetched.source, fetched.verified) {
        (FetchSource::Cache, true) => "cached",
        (FetchSource::Cache, false) => "cached (unverified)",
        (FetchSource::Network, true) => "fetched",
        (FetchSource::Network, false) => "fetched (unverified)",
    }
}

pub(crate) fn print_fetched(fetched: &[Fetched]) {
    for f in fetched {
        println!("{:<20} {}", status_label(f), f.path.display());
    }
}
