//! JSON file backend for the preference store

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{MemoryStore, PrefKey, PrefsStore};
use crate::error::StoreError;

/// Preferences kept in memory and written to a JSON document on [`save`](Self::save).
///
/// Writes go through a temp file that is renamed over the target.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: MemoryStore,
    dirty: bool,
}

impl JsonFileStore {
    /// Open a store at `path`; a missing file starts empty
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let table = match fs::read_to_string(&path) {
            Ok(json) => {
                let table: MemoryStore = serde_json::from_str(&json)?;
                log::info!("Loaded {} preferences from {}", table.len(), path.display());
                table
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No preferences at {}, starting fresh", path.display());
                MemoryStore::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            table,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when there are writes not yet saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write all preferences to disk
    pub fn save(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.table)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        log::debug!("Preferences saved to {}", self.path.display());
        Ok(())
    }

    /// Save only if something changed since the last save
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if self.dirty { self.save() } else { Ok(()) }
    }
}

impl PrefsStore for JsonFileStore {
    fn get_int(&self, key: &PrefKey, default: i32) -> i32 {
        self.table.get_int(key, default)
    }

    fn set_int(&mut self, key: &PrefKey, value: i32) {
        self.table.set_int(key, value);
        self.dirty = true;
    }

    fn get_float(&self, key: &PrefKey, default: f32) -> f32 {
        self.table.get_float(key, default)
    }

    fn set_float(&mut self, key: &PrefKey, value: f32) {
        self.table.set_float(key, value);
        self.dirty = true;
    }

    fn has_key(&self, key: &PrefKey) -> bool {
        self.table.has_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("endless_chase_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);
        let store = JsonFileStore::open(&path).unwrap();
        assert!(!store.is_dirty());
        assert_eq!(store.get_int(&PrefKey::Money("Money".into()), 3), 3);
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path("reopen");
        let money = PrefKey::Money("Money".into());
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.set_int(&money, 1200);
            store.set_float(&PrefKey::MusicVolume, 0.0);
            assert!(store.is_dirty());
            store.flush().unwrap();
            assert!(!store.is_dirty());
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_int(&money, 0), 1200);
        assert_eq!(store.get_float(&PrefKey::MusicVolume, 1.0), 0.0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
        let _ = fs::remove_file(&path);
    }
}
