//! Audio preferences
//!
//! Music and sound levels are simple on/off toggles persisted as floats under
//! `MusicVolume` and `SoundVolume`. Playback itself belongs to the host.

use serde::{Deserialize, Serialize};

use crate::persistence::{PrefKey, PrefsStore};

/// Audio levels (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    pub music_volume: f32,
    pub sound_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            music_volume: 1.0,
            sound_volume: 1.0,
        }
    }
}

/// Full volume turns off; anything else turns back on
fn toggled(volume: f32) -> f32 {
    if volume == 1.0 { 0.0 } else { 1.0 }
}

impl AudioSettings {
    pub fn music_on(&self) -> bool {
        self.music_volume > 0.0
    }

    pub fn sound_on(&self) -> bool {
        self.sound_volume > 0.0
    }

    /// Flip music and persist; returns the new level
    pub fn toggle_music(&mut self, store: &mut dyn PrefsStore) -> f32 {
        self.music_volume = toggled(self.music_volume);
        store.set_float(&PrefKey::MusicVolume, self.music_volume);
        log::info!("Music {}", if self.music_on() { "on" } else { "off" });
        self.music_volume
    }

    /// Flip sound effects and persist; returns the new level
    pub fn toggle_sound(&mut self, store: &mut dyn PrefsStore) -> f32 {
        self.sound_volume = toggled(self.sound_volume);
        store.set_float(&PrefKey::SoundVolume, self.sound_volume);
        log::info!("Sound {}", if self.sound_on() { "on" } else { "off" });
        self.sound_volume
    }

    /// Load levels from the store, defaulting to full volume
    pub fn load(store: &dyn PrefsStore) -> Self {
        let defaults = Self::default();
        Self {
            music_volume: store.get_float(&PrefKey::MusicVolume, defaults.music_volume),
            sound_volume: store.get_float(&PrefKey::SoundVolume, defaults.sound_volume),
        }
    }

    pub fn save(&self, store: &mut dyn PrefsStore) {
        store.set_float(&PrefKey::MusicVolume, self.music_volume);
        store.set_float(&PrefKey::SoundVolume, self.sound_volume);
    }
}
