//! `nbuild-fetch fetch <manifest>` – fetch a whole batch.

use anyhow::Result;
use nbuild_fetch::config::FetchConfig;
use nbuild_fetch::FetchManifest;
use std::path::Path;

use super::{build_fetcher, print_fetched, resolve_download_dir, FetchOverrides};

pub fn run_fetch(
    cfg: &FetchConfig,
    manifest: &Path,
    overrides: &FetchOverrides<'_>,
) -> Result<()> {
    let batch = FetchManifest::load(manifest)?;
    let dir = resolve_download_dir(cfg, overrides.download_dir, batch.package.as_deref())?;
    tracing::info!(
        requests = batch.download.len(),
        dir = %dir.display(),
        "fetching batch {}",
        manifest.display()
    );
    let fetched = build_fetcher(cfg, &dir, overrides).fetch_all(&batch.download)?;
    print_fetched(&fetched);
    Ok(())
}
