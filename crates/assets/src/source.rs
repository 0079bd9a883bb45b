use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::AssetError;

/// Supplies raw encoded bytes for an asset key.
pub trait AssetSource {
    fn read(&self, key: &str) -> Result<Vec<u8>, AssetError>;
}

/// Reads keys as paths relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl AssetSource for FsSource {
    fn read(&self, key: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.resolve(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory source, used by tests and by hosts that embed their assets.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(key.into(), bytes.into());
    }

    pub fn with(mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(key, bytes);
        self
    }
}

impl AssetSource for MemorySource {
    fn read(&self, key: &str) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(key)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(key.to_string()))
    }
}

impl<S: AssetSource + ?Sized> AssetSource for &S {
    fn read(&self, key: &str) -> Result<Vec<u8>, AssetError> {
        (**self).read(key)
    }
}
