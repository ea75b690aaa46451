//! # Image locks
//!
//! Readers/writer locks per image file, for callers that hide and unveil concurrently on
//! the same files from several threads of one process.
//! Paths are made absolute before lookup, `./a.png` and `a.png` share one lock.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::SteganoError;
use crate::result::Result;

#[derive(Debug, Default)]
pub struct ImageLocks {
    locks: Mutex<HashMap<PathBuf, Arc<RwLock<()>>>>,
}

impl ImageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// runs `f` while holding the read lock of one image
    pub fn with_read<T>(&self, path: &Path, f: impl FnOnce() -> T) -> Result<T> {
        let lock = self.lock_for(&normalize(path)?);
        let _guard = lock.read();

        Ok(f())
    }

    /// runs `f` while holding the read locks of all given images
    pub fn with_read_all<P: AsRef<Path>, T>(&self, paths: &[P], f: impl FnOnce() -> T) -> Result<T> {
        let locks = self.locks_for(paths)?;
        let _guards: Vec<_> = locks.iter().map(|lock| lock.read()).collect();

        Ok(f())
    }

    /// runs `f` while holding the write locks of all given images
    pub fn with_write_all<P: AsRef<Path>, T>(
        &self,
        paths: &[P],
        f: impl FnOnce() -> T,
    ) -> Result<T> {
        let locks = self.locks_for(paths)?;
        let _guards: Vec<_> = locks.iter().map(|lock| lock.write()).collect();

        Ok(f())
    }

    /// number of distinct images a lock was handed out for
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_for(&self, path: &Path) -> Arc<RwLock<()>> {
        self.locks
            .lock()
            .entry(path.to_path_buf())
            .or_default()
            .clone()
    }

    /// locks in path order, so that two callers never wait on each other crosswise
    fn locks_for<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Arc<RwLock<()>>>> {
        let mut normalized = paths
            .iter()
            .map(|p| normalize(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        normalized.sort();
        normalized.dedup();

        Ok(normalized.iter().map(|p| self.lock_for(p)).collect())
    }
}

fn normalize(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| SteganoError::ReadError { source })
}
