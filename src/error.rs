//! Error types
//!
//! - **ConfigError**: rejected configuration, fatal before the first tick
//! - **TransitionError**: state-machine move from an incompatible phase
//! - **ShopError**: navigation/purchase failures in the unlock catalog
//! - **GroundNotFound**: ground probe miss (absorbed by the spawner)
//! - **StoreError**: file-backed preference store failures

use thiserror::Error;

use crate::sim::Phase;

/// Configuration rejected at load time
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("spawn group {group}: interval must be a positive number of seconds, got {interval}")]
    SpawnInterval { group: usize, interval: f32 },

    #[error("spawn group {group}: distance band ({min}, {max}) must satisfy 0 <= min <= max")]
    SpawnBand { group: usize, min: f32, max: f32 },

    #[error("catalog entry '{id}': price must be >= 0, got {price}")]
    NegativePrice { id: String, price: i32 },

    #[error("catalog entry '{id}': stats must be finite and >= 0")]
    InvalidStats { id: String },

    #[error("catalog entry '{0}' is listed more than once")]
    DuplicateEntry(String),

    #[error("catalog entry identifier must not be empty")]
    EmptyEntryId,

    #[error("{field} must be finite and >= 0, got {value}")]
    InvalidTuning { field: &'static str, value: f32 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A progression action was requested from a phase that does not allow it.
///
/// The state is left untouched when this is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {action} while {phase:?}")]
    InvalidTransition { action: &'static str, phase: Phase },
}

/// Unlock catalog failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("catalog has no entries")]
    EmptyCatalog,

    #[error("insufficient funds: price {price}, balance {balance}")]
    InsufficientFunds { price: i32, balance: i32 },

    #[error("entry is already unlocked")]
    AlreadyUnlocked,

    #[error("entry is locked")]
    Locked,
}

/// Downward ground probe found no surface within its range
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("no ground below ({x}, {z})")]
pub struct GroundNotFound {
    pub x: f32,
    pub z: f32,
}

/// File-backed preference store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
