//! Per-destination exclusive locks.
//!
//! Held from cache probe to final verification so two workers (or two
//! processes sharing a download directory) never write the same destination
//! at once. Uses `flock(LOCK_EX)` on `<download_dir>/.locks/<name>.lock`;
//! each acquisition opens its own file description, so threads of one process
//! exclude each other as well. Lock files live outside the artifact namespace
//! so they can never be mistaken for a cached download.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::FetchError;

pub const LOCK_SUFFIX: &str = ".lock";

/// Subdirectory of the download directory that holds lock files. Reserved:
/// no URL may map onto it.
pub const LOCK_DIR: &str = ".locks";

pub fn lock_path(destination: &Path) -> PathBuf {
    let dir = destination.parent().unwrap_or_else(|| Path::new(""));
    let mut name = destination
        .file_name()
        .map(|n| n.to_owned())
        .unwrap_or_default();
    name.push(LOCK_SUFFIX);
    dir.join(LOCK_DIR).join(name)
}

/// Create the lock directory, but never the download directory above it.
fn ensure_lock_dir(lock_file: &Path) -> io::Result<()> {
    match lock_file.parent() {
        Some(dir) => match fs::create_dir(dir) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
            other => other,
        },
        None => Ok(()),
    }
}

/// Released on drop. The lock file itself is left in place.
pub struct DestinationLock {
    file: File,
    path: PathBuf,
}

impl DestinationLock {
    /// Block until the lock for `destination` is ours.
    pub fn acquire(destination: &Path) -> Result<Self, FetchError> {
        let path = lock_path(destination);
        ensure_lock_dir(&path).map_err(|source| FetchError::Lock {
            path: path.clone(),
            source,
        })?;
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| FetchError::Lock {
                path: path.clone(),
                source,
            })?;
        FileExt::lock_exclusive(&file).map_err(|source| FetchError::Lock {
            path: path.clone(),
            source,
        })?;
        tracing::trace!(path = %path.display(), "acquired destination lock");
        Ok(Self { file, path })
    }
}

impl Drop for DestinationLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!(path = %self.path.display(), "unlock failed: {}", e);
        }
    }
}
