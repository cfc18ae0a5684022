//! Ground snapping for spawned entities
//!
//! A single bounded downward probe resolves the height under a horizontal
//! position. The projector never mutates the world.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{GROUND_PROBE_HEIGHT, GROUND_PROBE_LENGTH};
use crate::error::GroundNotFound;
use crate::with_height;

/// Height query against the designated ground layer
pub trait GroundQuery {
    /// Cast straight down from `origin`; return the height of the first ground
    /// surface hit within `max_distance`.
    fn probe_ground(&self, origin: Vec3, max_distance: f32) -> Option<f32>;
}

impl<G: GroundQuery + ?Sized> GroundQuery for &G {
    fn probe_ground(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        (**self).probe_ground(origin, max_distance)
    }
}

/// Infinite horizontal plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatGround {
    pub height: f32,
}

impl GroundQuery for FlatGround {
    fn probe_ground(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        surface_in_range(origin.y, self.height, max_distance)
    }
}

/// Ground described by a height function over (x, z); `None` means a hole
pub struct HeightFn<F>(pub F);

impl<F> GroundQuery for HeightFn<F>
where
    F: Fn(Vec2) -> Option<f32>,
{
    fn probe_ground(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        let surface = (self.0)(Vec2::new(origin.x, origin.z))?;
        surface_in_range(origin.y, surface, max_distance)
    }
}

/// No ground anywhere
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGround;

impl GroundQuery for NoGround {
    fn probe_ground(&self, _origin: Vec3, _max_distance: f32) -> Option<f32> {
        None
    }
}

fn surface_in_range(origin_y: f32, surface: f32, max_distance: f32) -> Option<f32> {
    let drop = origin_y - surface;
    (drop >= 0.0 && drop <= max_distance).then_some(surface)
}

/// Probe geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Probe origin offset above the candidate position
    pub probe_height: f32,
    /// Maximum downward probe length
    pub probe_length: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            probe_height: GROUND_PROBE_HEIGHT,
            probe_length: GROUND_PROBE_LENGTH,
        }
    }
}

/// Resolves vertical placement through a [`GroundQuery`]
#[derive(Debug, Clone)]
pub struct GroundProjector<G> {
    query: G,
    config: GroundConfig,
}

impl<G: GroundQuery> GroundProjector<G> {
    pub fn new(query: G, config: GroundConfig) -> Self {
        Self { query, config }
    }

    /// Height of the ground under `horizontal`, probing from `probe_height`
    /// above `reference_y`.
    pub fn project(&self, horizontal: Vec2, reference_y: f32) -> Result<f32, GroundNotFound> {
        let origin = with_height(horizontal, reference_y + self.config.probe_height);
        self.query
            .probe_ground(origin, self.config.probe_length)
            .ok_or(GroundNotFound {
                x: horizontal.x,
                z: horizontal.y,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_ground_hit() {
        let projector = GroundProjector::new(FlatGround { height: -2.0 }, GroundConfig::default());
        assert_eq!(projector.project(Vec2::new(3.0, 4.0), 0.0), Ok(-2.0));
    }

    #[test]
    fn test_probe_is_bounded() {
        let config = GroundConfig {
            probe_height: 5.0,
            probe_length: 100.0,
        };
        let deep = GroundProjector::new(FlatGround { height: -96.0 }, config);
        assert!(deep.project(Vec2::ZERO, 0.0).is_err());

        let edge = GroundProjector::new(FlatGround { height: -95.0 }, config);
        assert_eq!(edge.project(Vec2::ZERO, 0.0), Ok(-95.0));

        // Surface above the probe origin is not seen
        let high = GroundProjector::new(FlatGround { height: 6.0 }, config);
        assert!(high.project(Vec2::ZERO, 0.0).is_err());
    }

    #[test]
    fn test_height_fn_holes() {
        let ground = HeightFn(|p: Vec2| if p.x > 0.0 { Some(1.0_f32) } else { None });
        let projector = GroundProjector::new(ground, GroundConfig::default());
        assert_eq!(projector.project(Vec2::new(1.0, 0.0), 0.0), Ok(1.0));
        let miss = projector.project(Vec2::new(-1.0, 7.0), 0.0).unwrap_err();
        assert_eq!(miss, GroundNotFound { x: -1.0, z: 7.0 });
    }

    #[test]
    fn test_projection_is_deterministic() {
        let projector = GroundProjector::new(FlatGround { height: 0.5 }, GroundConfig::default());
        let p = Vec2::new(12.0, -8.0);
        assert_eq!(projector.project(p, 0.0), projector.project(p, 0.0));
        assert!(
            GroundProjector::new(NoGround, GroundConfig::default())
                .project(p, 0.0)
                .is_err()
        );
    }
}
