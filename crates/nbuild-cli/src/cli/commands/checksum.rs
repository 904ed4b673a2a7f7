//! Checksum command: compute a digest of a file.

use anyhow::Result;
use nbuild_fetch::checksum;
use nbuild_fetch::DigestAlgorithm;
use std::path::Path;

/// Compute and print the digest of the given file, `sha256sum` style.
pub fn run_checksum(path: &Path, algorithm: DigestAlgorithm) -> Result<()> {
    let digest = checksum::compute_digest(path, algorithm)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
