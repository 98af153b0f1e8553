//! Container storage abstraction.
//!
//! Defines the [`ContainerStorage`] trait through which documents reach
//! durable storage, a filesystem implementation ([`FsStorage`]) and an
//! in-process map ([`MemoryStorage`]).

mod memory;

pub use memory::{MemoryStorage, MemoryStorageBuilder};

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Minimal byte-level I/O a document application needs.
///
/// `write_bytes` must replace the container at `path` as a whole: readers
/// observe either the previous bytes or the new ones, never a mix.
pub trait ContainerStorage: Send + Sync {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, CoreError>;

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), CoreError>;
}

// ==============================================================================
// Filesystem
// ==============================================================================

/// Stores containers as files. Relative paths resolve against an optional
/// base directory.
#[derive(Debug, Clone, Default)]
pub struct FsStorage {
    base_dir: Option<PathBuf>,
}

impl FsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ContainerStorage for FsStorage {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, CoreError> {
        Ok(std::fs::read(self.resolve(path))?)
    }

    /// Writes into a temp file beside the target, syncs it, then renames it
    /// over the target.
    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
        let path = self.resolve(path);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| CoreError::Io(e.error))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "container written");
        Ok(())
    }
}
