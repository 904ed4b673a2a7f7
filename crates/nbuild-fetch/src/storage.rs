//! Disk side of a transfer.
//!
//! Bytes land in `<destination>.part` and are renamed onto the destination
//! only after a complete transfer, so the cache never holds a truncated file
//! under its final name.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

const WRITE_BUF_SIZE: usize = 64 * 1024;

/// Path for the temp file: appends `.part` to the final path (e.g. `file.tar.xz` → `file.tar.xz.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for one in-flight download.
///
/// Dropping a `PartFile` that was never finalized removes the temp file.
pub struct PartFile {
    writer: Option<BufWriter<File>>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create (or truncate) `<final_path>.part`. The parent directory must exist.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(PartFile {
            writer: Some(BufWriter::with_capacity(WRITE_BUF_SIZE, file)),
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "part file already closed"))?;
        writer.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Flush, fsync and rename onto the final path. Returns the byte count.
    pub fn finalize(mut self) -> io::Result<u64> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "part file already closed"))?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&self.temp_path, &self.final_path)?;
        Ok(self.written)
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                tracing::debug!(
                    path = %self.temp_path.display(),
                    "could not remove part file: {}",
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("file.tar.xz"));
        assert_eq!(p.to_string_lossy(), "file.tar.xz.part");
        let p2 = temp_path(Path::new("/tmp/archive.zip"));
        assert_eq!(p2.to_string_lossy(), "/tmp/archive.zip.part");
    }

    #[test]
    fn write_and_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("out.bin");
        let mut part = PartFile::create(&final_path).unwrap();
        part.write_chunk(b"hello ").unwrap();
        part.write_chunk(b"world").unwrap();
        let tp = temp_path(&final_path);
        assert!(tp.exists());
        assert_eq!(part.finalize().unwrap(), 11);
        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"hello world");
    }

    #[test]
    fn drop_without_finalize_removes_temp_and_keeps_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("out.bin");
        std::fs::write(&final_path, b"previous").unwrap();
        {
            let mut part = PartFile::create(&final_path).unwrap();
            part.write_chunk(b"trunc").unwrap();
        }
        assert!(!temp_path(&final_path).exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"previous");
    }

    #[test]
    fn create_fails_without_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("missing").join("out.bin");
        assert!(PartFile::create(&final_path).is_err());
    }
}
