//! Periodic spawning around a moving anchor
//!
//! Each group counts down its own interval and, when it fires, emits its current
//! round-robin template at a random heading and distance from the anchor. The
//! spawned entity is handed to a [`WorldSink`] and not tracked afterwards.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ground::{GroundProjector, GroundQuery};
use crate::consts::{DEFAULT_SPAWN_INTERVAL, DEFAULT_SPAWN_MAX_DISTANCE, DEFAULT_SPAWN_MIN_DISTANCE};
use crate::error::ConfigError;
use crate::{heading_to_direction, horizontal, normalize_heading, with_height};

/// Opaque handle returned by the world for a spawned entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

/// Placement of a freshly spawned entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTransform {
    pub position: Vec3,
    /// Yaw in degrees, [0, 360); faces back toward the anchor
    pub heading: f32,
}

/// Receives spawned entities
pub trait WorldSink {
    fn spawn(&mut self, template: &str, transform: SpawnTransform) -> EntityHandle;
}

/// Sink that records every spawn, handy for hosts without a scene graph
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub spawned: Vec<(String, SpawnTransform)>,
}

impl WorldSink for RecordingSink {
    fn spawn(&mut self, template: &str, transform: SpawnTransform) -> EntityHandle {
        self.spawned.push((template.to_string(), transform));
        EntityHandle(self.spawned.len() as u64)
    }
}

/// Load-time description of a spawn group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnGroupConfig {
    /// Templates emitted in round-robin order
    pub templates: Vec<String>,
    /// Seconds between spawns
    pub interval: f32,
    /// Distance band (min, max) from the anchor
    pub distance: (f32, f32),
}

impl Default for SpawnGroupConfig {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            interval: DEFAULT_SPAWN_INTERVAL,
            distance: (DEFAULT_SPAWN_MIN_DISTANCE, DEFAULT_SPAWN_MAX_DISTANCE),
        }
    }
}

impl SpawnGroupConfig {
    pub fn new(templates: &[&str], interval: f32, distance: (f32, f32)) -> Self {
        Self {
            templates: templates.iter().map(|t| t.to_string()).collect(),
            interval,
            distance,
        }
    }

    /// Check interval and distance band; `index` is only used in the error
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return Err(ConfigError::SpawnInterval {
                group: index,
                interval: self.interval,
            });
        }
        let (min, max) = self.distance;
        if !(min.is_finite() && max.is_finite() && min >= 0.0 && min <= max) {
            return Err(ConfigError::SpawnBand {
                group: index,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// Runtime state of one group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnGroup {
    pub templates: Vec<String>,
    pub interval: f32,
    /// Seconds until the next spawn
    pub countdown: f32,
    /// Next template to emit
    pub index: usize,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl SpawnGroup {
    fn from_config(config: &SpawnGroupConfig) -> Self {
        Self {
            templates: config.templates.clone(),
            interval: config.interval,
            countdown: config.interval,
            index: 0,
            min_distance: config.distance.0,
            max_distance: config.distance.1,
        }
    }

    /// Advance the countdown; returns the template to emit if it fired
    fn advance(&mut self, dt: f32) -> Option<usize> {
        if self.templates.is_empty() {
            return None;
        }
        self.countdown -= dt;
        if self.countdown > 0.0 {
            return None;
        }
        let fired = self.index;
        self.index = (self.index + 1) % self.templates.len();
        // Overshoot is discarded
        self.countdown = self.interval;
        Some(fired)
    }
}

/// One emitted entity, as reported back from [`SpawnRegistry::tick`]
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRecord {
    pub group: usize,
    pub template: String,
    pub transform: SpawnTransform,
    pub handle: EntityHandle,
    /// False when the ground probe missed and the fallback height was used
    pub grounded: bool,
}

/// All spawn groups plus the seeded RNG used for placement
#[derive(Debug, Clone)]
pub struct SpawnRegistry {
    groups: Vec<SpawnGroup>,
    rng: Pcg32,
    enabled: bool,
}

impl SpawnRegistry {
    /// Validate and build the registry. Spawning starts disabled.
    pub fn configure(configs: &[SpawnGroupConfig], seed: u64) -> Result<Self, ConfigError> {
        for (i, config) in configs.iter().enumerate() {
            config.validate(i)?;
            if config.templates.is_empty() {
                log::debug!("Spawn group {} has no templates and will never fire", i);
            }
        }
        Ok(Self {
            groups: configs.iter().map(SpawnGroup::from_config).collect(),
            rng: Pcg32::seed_from_u64(seed),
            enabled: false,
        })
    }

    pub fn groups(&self) -> &[SpawnGroup] {
        &self.groups
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Advance every group by `dt` and spawn around `anchor`.
    ///
    /// Groups are visited in configuration order. A disabled registry does nothing.
    pub fn tick<G: GroundQuery>(
        &mut self,
        dt: f32,
        anchor: Vec3,
        projector: &GroundProjector<G>,
        sink: &mut dyn WorldSink,
    ) -> Vec<SpawnRecord> {
        let mut spawned = Vec::new();
        if !self.enabled {
            return spawned;
        }

        for group_idx in 0..self.groups.len() {
            let Some(template_idx) = self.groups[group_idx].advance(dt) else {
                continue;
            };
            let group = &self.groups[group_idx];
            let template = group.templates[template_idx].clone();
            let (min, max) = (group.min_distance, group.max_distance);

            let (transform, grounded) = self.place(anchor, min, max, projector);
            let handle = sink.spawn(&template, transform);
            log::debug!(
                "Spawned '{}' (group {}) at {:?} heading {:.1}",
                template,
                group_idx,
                transform.position,
                transform.heading
            );
            spawned.push(SpawnRecord {
                group: group_idx,
                template,
                transform,
                handle,
                grounded,
            });
        }

        spawned
    }

    /// Random heading, random distance in [min, max], then turn to face the anchor
    fn place<G: GroundQuery>(
        &mut self,
        anchor: Vec3,
        min: f32,
        max: f32,
        projector: &GroundProjector<G>,
    ) -> (SpawnTransform, bool) {
        let heading: f32 = self.rng.random_range(0.0..360.0);
        let distance: f32 = self.rng.random_range(min..=max);
        let flat: Vec2 = horizontal(anchor) + heading_to_direction(heading) * distance;

        let (y, grounded) = match projector.project(flat, anchor.y) {
            Ok(y) => (y, true),
            Err(miss) => {
                log::warn!("{}, spawning at anchor height {}", miss, anchor.y);
                (anchor.y, false)
            }
        };

        let transform = SpawnTransform {
            position: with_height(flat, y),
            heading: normalize_heading(heading + 180.0),
        };
        (transform, grounded)
    }
}
