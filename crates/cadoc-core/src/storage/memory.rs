use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::CoreError;

use super::ContainerStorage;

/// Containers held in memory, keyed by path. Useful for tests and for
/// embedding documents without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    containers: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MemoryStorageBuilder {
        MemoryStorageBuilder {
            containers: BTreeMap::new(),
        }
    }

    /// Copy of the bytes stored at `path`, if any.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.as_ref())
            .cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

pub struct MemoryStorageBuilder {
    containers: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryStorageBuilder {
    pub fn with_container(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.containers.insert(path.into(), bytes.into());
        self
    }

    pub fn build(self) -> MemoryStorage {
        MemoryStorage {
            containers: RwLock::new(self.containers),
        }
    }
}

impl ContainerStorage for MemoryStorage {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, CoreError> {
        self.get(path).ok_or_else(|| {
            CoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("container not found: {}", path.display()),
            ))
        })
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
        self.containers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
