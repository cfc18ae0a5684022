//! Persistent key-value preferences
//!
//! Every cross-session value (money, high scores, lock states, selection, audio levels)
//! goes through the [`PrefsStore`] port with a typed [`PrefKey`]. Writes are
//! last-writer-wins; only one session is ever active.

pub mod file;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use file::JsonFileStore;

/// Typed preference keys, rendered to the legacy string layout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrefKey {
    /// `<level>HighScore`
    HighScore(String),
    /// Cumulative currency (configurable name, usually `Money`)
    Money(String),
    /// Active catalog index (configurable name, usually `CurrentCar`)
    CurrentSelection(String),
    /// Per-entry lock state, keyed by the bare entry identifier
    LockState(String),
    MusicVolume,
    SoundVolume,
}

impl PrefKey {
    pub fn high_score(level: &str) -> Self {
        PrefKey::HighScore(level.to_string())
    }

    pub fn lock_state(entry_id: &str) -> Self {
        PrefKey::LockState(entry_id.to_string())
    }

    /// The raw string key used by the backing store
    pub fn as_key(&self) -> String {
        match self {
            PrefKey::HighScore(level) => format!("{level}HighScore"),
            PrefKey::Money(name) | PrefKey::CurrentSelection(name) | PrefKey::LockState(name) => {
                name.clone()
            }
            PrefKey::MusicVolume => "MusicVolume".to_string(),
            PrefKey::SoundVolume => "SoundVolume".to_string(),
        }
    }
}

impl fmt::Display for PrefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

/// A stored preference value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Int(i32),
    Float(f32),
}

/// Persistence port consumed by the simulation core.
///
/// Reading a key of the wrong type yields the default, like a missing key.
pub trait PrefsStore {
    fn get_int(&self, key: &PrefKey, default: i32) -> i32;
    fn set_int(&mut self, key: &PrefKey, value: i32);
    fn get_float(&self, key: &PrefKey, default: f32) -> f32;
    fn set_float(&mut self, key: &PrefKey, value: f32);
    fn has_key(&self, key: &PrefKey) -> bool;
}

/// In-memory store; also the table behind [`JsonFileStore`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    values: BTreeMap<String, PrefValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PrefsStore for MemoryStore {
    fn get_int(&self, key: &PrefKey, default: i32) -> i32 {
        match self.values.get(&key.as_key()) {
            Some(PrefValue::Int(v)) => *v,
            _ => default,
        }
    }

    fn set_int(&mut self, key: &PrefKey, value: i32) {
        self.values.insert(key.as_key(), PrefValue::Int(value));
    }

    fn get_float(&self, key: &PrefKey, default: f32) -> f32 {
        match self.values.get(&key.as_key()) {
            Some(PrefValue::Float(v)) => *v,
            _ => default,
        }
    }

    fn set_float(&mut self, key: &PrefKey, value: f32) {
        self.values.insert(key.as_key(), PrefValue::Float(value));
    }

    fn has_key(&self, key: &PrefKey) -> bool {
        self.values.contains_key(&key.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(PrefKey::high_score("Track1").as_key(), "Track1HighScore");
        assert_eq!(PrefKey::Money("Money".into()).as_key(), "Money");
        assert_eq!(PrefKey::CurrentSelection("CurrentCar".into()).as_key(), "CurrentCar");
        assert_eq!(PrefKey::lock_state("Buggy").as_key(), "Buggy");
        assert_eq!(PrefKey::MusicVolume.to_string(), "MusicVolume");
    }

    #[test]
    fn test_memory_store_defaults() {
        let store = MemoryStore::new();
        assert_eq!(store.get_int(&PrefKey::Money("Money".into()), 42), 42);
        assert_eq!(store.get_float(&PrefKey::SoundVolume, 0.5), 0.5);
        assert!(!store.has_key(&PrefKey::SoundVolume));
    }

    #[test]
    fn test_memory_store_last_writer_wins() {
        let mut store = MemoryStore::new();
        let key = PrefKey::Money("Money".into());
        store.set_int(&key, 10);
        store.set_int(&key, 25);
        assert_eq!(store.get_int(&key, 0), 25);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_type_mismatch_reads_default() {
        let mut store = MemoryStore::new();
        store.set_float(&PrefKey::MusicVolume, 0.0);
        assert_eq!(store.get_int(&PrefKey::MusicVolume, 7), 7);
        assert!(store.has_key(&PrefKey::MusicVolume));
    }
}
