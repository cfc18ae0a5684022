//! Endless Chase - simulation core for an endless car-chase arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, ground snapping, progression, contacts)
//! - `shop`: Unlock catalog with persisted lock states and wallet
//! - `persistence`: Key-value preference store port and backends
//! - `clock`: Scaled and real per-tick time
//! - `config`: Data-driven game configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod shop;
pub mod sim;

pub use clock::Clock;
pub use config::GameConfig;
pub use error::{ConfigError, GroundNotFound, ShopError, StoreError, TransitionError};
pub use highscores::HighScore;
pub use persistence::{MemoryStore, PrefKey, PrefsStore};
pub use settings::AudioSettings;
pub use shop::UnlockCatalog;

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Default pre-game "Ready? GO!" delay in seconds
    pub const DEFAULT_START_DELAY: f32 = 1.0;
    /// Default points awarded per simulated second
    pub const DEFAULT_SCORE_PER_SECOND: i32 = 1;
    /// Default real-time wait between game over and the results screen
    pub const DEFAULT_DEATH_DELAY: f32 = 1.0;

    /// Default spawn cadence (seconds)
    pub const DEFAULT_SPAWN_INTERVAL: f32 = 5.0;
    /// Default spawn distance band from the anchor
    pub const DEFAULT_SPAWN_MIN_DISTANCE: f32 = 10.0;
    pub const DEFAULT_SPAWN_MAX_DISTANCE: f32 = 20.0;

    /// Ground probe starts this far above the candidate position
    pub const GROUND_PROBE_HEIGHT: f32 = 5.0;
    /// Maximum downward length of the ground probe
    pub const GROUND_PROBE_LENGTH: f32 = 100.0;

    /// Default unlock price for a catalog entry
    pub const DEFAULT_UNLOCK_PRICE: i32 = 1000;
}

/// Normalize a heading in degrees to [0, 360)
#[inline]
pub fn normalize_heading(heading: f32) -> f32 {
    let h = heading.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if h >= 360.0 { 0.0 } else { h }
}

/// Unit forward vector on the ground plane for a yaw heading in degrees.
///
/// Heading 0 faces +Z, heading 90 faces +X (clockwise seen from above).
#[inline]
pub fn heading_to_direction(heading: f32) -> Vec2 {
    let rad = heading.to_radians();
    Vec2::new(rad.sin(), rad.cos())
}

/// Horizontal (x, z) part of a world position
#[inline]
pub fn horizontal(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.z)
}

/// Lift a horizontal (x, z) position to 3D at the given height
#[inline]
pub fn with_height(pos: Vec2, y: f32) -> Vec3 {
    Vec3::new(pos.x, y, pos.y)
}
