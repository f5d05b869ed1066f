//! Atomic JSON file operations.
//!
//! Provides a thin layer for safe access to the JSON files the store keeps:
//! all-or-nothing writes via tmp file + atomic rename, and file-locked
//! read-modify-write updates.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use kurso_core::error::Result;

/// A handle to one JSON-serialized entity on disk.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new handle for the given path. No IO happens here.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    /// The file path this handle addresses.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file and deserializes it.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = serde_json::from_str(&content)?;
        Ok(Some(data))
    }

    /// Saves data to the file atomically.
    ///
    /// Writes to a temporary file in the same directory, fsyncs it, then
    /// renames it over the target, so a crash never leaves a half-written
    /// entity behind.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path();
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Removes the file if it exists.
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Performs a read-modify-write update under an exclusive file lock.
    ///
    /// The update function receives the current data, or `default_value`
    /// when the file is absent. A file that fails to parse is also replaced
    /// by `default_value` rather than aborting the update, matching the
    /// store's degrade-to-defaults policy for reads.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = match self.load() {
            Ok(Some(data)) => data,
            Ok(None) => default_value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable file replaced by default");
                default_value
            }
        };

        f(&mut data);
        self.save(&data)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "entity".to_string());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Acquires an exclusive lock next to the given path.
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()?;
        }

        // On non-Unix systems there is no advisory locking; acceptable for
        // a single-user desktop tool.

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped.
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestEntity {
        name: String,
        count: u32,
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<TestEntity>::new(temp_dir.path().join("entity.json"));

        let entity = TestEntity {
            name: "test".to_string(),
            count: 42,
        };
        file.save(&entity).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded, entity);
    }

    #[test]
    fn load_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<TestEntity>::new(temp_dir.path().join("missing.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn load_corrupt_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let file = AtomicJsonFile::<TestEntity>::new(path);
        assert!(file.load().is_err());
    }

    #[test]
    fn update_creates_from_default_and_accumulates() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<TestEntity>::new(temp_dir.path().join("entity.json"));
        let default = TestEntity {
            name: "default".to_string(),
            count: 0,
        };

        file.update(default.clone(), |entity| entity.count += 10).unwrap();
        file.update(default, |entity| entity.count += 5).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.count, 15);
    }

    #[test]
    fn update_replaces_corrupt_file_with_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "]]]").unwrap();

        let file = AtomicJsonFile::<TestEntity>::new(path);
        let default = TestEntity {
            name: "fresh".to_string(),
            count: 1,
        };
        file.update(default, |entity| entity.count += 1).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.name, "fresh");
        assert_eq!(loaded.count, 2);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entity.json");
        let file = AtomicJsonFile::<TestEntity>::new(path.clone());

        file.save(&TestEntity {
            name: "test".to_string(),
            count: 1,
        })
        .unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join(".entity.json.tmp").exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<TestEntity>::new(temp_dir.path().join("entity.json"));

        file.save(&TestEntity {
            name: "x".to_string(),
            count: 0,
        })
        .unwrap();
        file.remove().unwrap();
        file.remove().unwrap();
        assert!(file.load().unwrap().is_none());
    }
}
