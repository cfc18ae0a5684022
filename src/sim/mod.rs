//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only
//! - Stable iteration order (spawn groups in configuration order)
//! - No rendering, audio or scene dependencies; those are collaborators

pub mod contact;
pub mod ground;
pub mod progression;
pub mod spawn;

pub use contact::{Contact, ContactOutcome, Item, Obstacle, TouchEffect, Vehicle};
pub use ground::{FlatGround, GroundConfig, GroundProjector, GroundQuery, HeightFn, NoGround};
pub use progression::{
    ControlInput, ControllerConfig, GameEvent, Phase, ProgressionController, ProgressionState,
    TickContext, TickReport,
};
pub use spawn::{
    EntityHandle, RecordingSink, SpawnGroup, SpawnGroupConfig, SpawnRecord, SpawnRegistry,
    SpawnTransform, WorldSink,
};
