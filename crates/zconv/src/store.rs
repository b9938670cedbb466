//! File access used by the [`Converter`](crate::Converter) facade
//!
//! The codecs never touch the filesystem; loading and saving goes through a
//! [`FileStore`] so callers can swap in their own storage.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Byte-level file collaborator
pub trait FileStore {
    /// Read the whole file at `path`
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace the file at `path` with `content`
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;
}

/// [`FileStore`] on top of `std::fs`
#[derive(Clone, Copy, Debug, Default)]
pub struct FsStore;

impl FileStore for FsStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let bytes = fs::read(path)
            .map_err(|err| Error::io(format!("cannot read {}: {err}", path.display())))?;
        debug!(path = %path.display(), bytes = bytes.len(), "read file");
        Ok(bytes)
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        fs::write(path, content)
            .map_err(|err| Error::io(format!("cannot write {}: {err}", path.display())))?;
        debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(())
    }
}
