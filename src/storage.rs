use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Pluggable snapshot persistence for a state store.
///
/// `load` hydrates the starting value once at construction; `save` writes the
/// whole current value on every mutation. A missing, unreadable, or corrupted
/// snapshot is a cold start: `load` returns the default value and never fails.
pub trait SnapshotStore<T: Serialize + DeserializeOwned + Default> {
    fn load(&self) -> T;
    fn save(&self, snapshot: &T) -> io::Result<()>;
}

/// Whole-value JSON file persistence, one file per store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned + Default> SnapshotStore<T> for JsonFileStore {
    fn load(&self) -> T {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(value) = serde_json::from_slice::<T>(&bytes) {
                return value;
            }
        }
        T::default()
    }

    fn save(&self, snapshot: &T) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(snapshot).map_err(io::Error::other)?;
        fs::write(&self.path, data)
    }
}

/// In-memory snapshot store for tests and for running without a home
/// directory; `save` round-trips through JSON so serialization bugs still
/// surface.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Serialize + DeserializeOwned + Default> SnapshotStore<T> for MemoryStore {
    fn load(&self) -> T {
        self.snapshot
            .borrow()
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()
    }

    fn save(&self, snapshot: &T) -> io::Result<()> {
        let data = serde_json::to_string(snapshot).map_err(io::Error::other)?;
        *self.snapshot.borrow_mut() = Some(data);
        Ok(())
    }
}

/// A store whose writes always fail; lets tests exercise the fail-soft path.
#[cfg(test)]
pub struct BrokenStore;

#[cfg(test)]
impl<T: Serialize + DeserializeOwned + Default> SnapshotStore<T> for BrokenStore {
    fn load(&self) -> T {
        T::default()
    }

    fn save(&self, _snapshot: &T) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}
