//! The durable key-value slot that transaction data survives restarts in.
//!
//! The store only ever reads and writes one text value under one well-known
//! key, so the storage interface is a small trait with swappable backends:
//! a file-per-key directory for real use and an in-memory map for tests.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::Error;

/// A durable, text-valued key-value slot.
///
/// Implementations must overwrite any prior value on write and report an
/// absent key as `Ok(None)` rather than an error.
pub trait StorageSlot {
    /// Read the value stored under `key`, or `None` if the key has never
    /// been written.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the backing storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write `value` under `key`, replacing any prior value.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the backing storage cannot be written.
    fn write(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

/// A [StorageSlot] backed by one file per key inside a data directory.
///
/// The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileSlot {
    data_dir: PathBuf,
}

impl FileSlot {
    /// Create a slot storing its files under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl StorageSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path_for(key);

        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(storage_error(&path, error)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|error| storage_error(&self.data_dir, error))?;

        let path = self.path_for(key);
        fs::write(&path, value).map_err(|error| storage_error(&path, error))
    }
}

fn storage_error(path: &Path, error: io::Error) -> Error {
    Error::Storage(format!("{}: {error}", path.display()))
}

/// A [StorageSlot] held entirely in memory.
///
/// Used in tests and wherever durability is not wanted.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    entries: HashMap<String, String>,
}

impl MemorySlot {
    /// Create an empty in-memory slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-seeded with `value` under `key`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut slot = Self::new();
        slot.entries.insert(key.to_owned(), value.to_owned());
        slot
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
