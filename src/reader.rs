use std::collections::HashMap;
use std::path::{Path, PathBuf};

/**
 * A method of receiving bytes from paths, so hosts can put archives or
 * in-memory documents under the loader.
 */
pub trait FileReader {
    /**
     * Retrieves raw bytes from the path specified.
     */
    fn read(&self, path: &Path) -> anyhow::Result<Vec<u8>>;
}

/**
 * An implementation of [`FileReader`] that fetches bytes from the file system.
 */
#[derive(Copy, Clone, Debug)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        if !path.is_file() {
            anyhow::bail!("not a regular file");
        }
        Ok(std::fs::read(path)?)
    }
}

/**
 * An implementation of [`FileReader`] that serves bytes from an in-memory
 * table. Useful for testing purposes.
 */
#[derive(Clone, Default, Debug)]
pub struct MemoryReader(HashMap<PathBuf, Vec<u8>>);

impl MemoryReader {
    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.0.insert(path.into(), bytes.into());
    }
}

impl FileReader for MemoryReader {
    fn read(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no entry for {:?}", path))
    }
}
