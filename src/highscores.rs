//! Per-level best score
//!
//! Persisted under `<level>HighScore` in the preference store.

use serde::{Deserialize, Serialize};

use crate::persistence::{PrefKey, PrefsStore};

/// Best score recorded for one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub level: String,
    pub best: i32,
}

impl HighScore {
    /// Empty record for a level
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            best: 0,
        }
    }

    fn key(&self) -> PrefKey {
        PrefKey::high_score(&self.level)
    }

    /// Load the record for `level`, 0 when none was saved
    pub fn load(store: &dyn PrefsStore, level: &str) -> Self {
        let mut record = Self::new(level);
        record.best = store.get_int(&record.key(), 0);
        log::info!("High score for {}: {}", level, record.best);
        record
    }

    /// A score must strictly beat the current best
    pub fn qualifies(&self, score: i32) -> bool {
        score > self.best
    }

    /// Record `score` if it beats the best; returns true on a new record
    pub fn submit(&mut self, score: i32, store: &mut dyn PrefsStore) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        store.set_int(&self.key(), score);
        log::info!("New high score for {}: {}", self.level, score);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_load_missing_is_zero() {
        let store = MemoryStore::new();
        let record = HighScore::load(&store, "Track1");
        assert_eq!(record.best, 0);
        assert!(!record.qualifies(0));
    }

    #[test]
    fn test_submit_only_beats() {
        let mut store = MemoryStore::new();
        store.set_int(&PrefKey::high_score("Track1"), 300);
        let mut record = HighScore::load(&store, "Track1");

        assert!(!record.submit(300, &mut store));
        assert!(!record.submit(120, &mut store));
        assert!(record.submit(350, &mut store));
        assert_eq!(record.best, 350);
        assert_eq!(store.get_int(&PrefKey::high_score("Track1"), 0), 350);
    }

    #[test]
    fn test_levels_are_separate() {
        let mut store = MemoryStore::new();
        let mut a = HighScore::load(&store, "Desert");
        a.submit(10, &mut store);
        let b = HighScore::load(&store, "Snow");
        assert_eq!(b.best, 0);
    }
}
