//! `nbuild-fetch get <url>` – fetch one URL.

use anyhow::Result;
use nbuild_fetch::config::FetchConfig;
use nbuild_fetch::DownloadRequest;

use super::{build_fetcher, print_fetched, resolve_download_dir, FetchOverrides};

pub fn run_get(
    cfg: &FetchConfig,
    request: &DownloadRequest,
    overrides: &FetchOverrides<'_>,
) -> Result<()> {
    let dir = resolve_download_dir(cfg, overrides.download_dir, None)?;
    let fetched = build_fetcher(cfg, &dir, overrides).fetch_one(request)?;
    print_fetched(std::slice::from_ref(&fetched));
    Ok(())
}
