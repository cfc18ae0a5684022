//! Player contacts with pickups and obstacles
//!
//! Resolution is pure: it reports what the touch does and the progression
//! controller applies it.

use serde::{Deserialize, Serialize};

/// What a pickup does when the player touches it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TouchEffect {
    AddScore(i32),
    AddHealth(f32),
    SetMultiplier(i32),
    Nothing,
}

/// A collectible item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub effect: TouchEffect,
    /// Whether a pickup effect should be shown where the item was
    pub pickup_effect: bool,
}

/// Something that damages the player's vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub damage: f32,
    /// Whether the obstacle shows its own hit effect
    pub hit_effect: bool,
    pub remove_on_hit: bool,
}

impl Default for Obstacle {
    fn default() -> Self {
        Self {
            damage: 1.0,
            hit_effect: false,
            remove_on_hit: false,
        }
    }
}

/// The player touched something
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Contact {
    Item(Item),
    Obstacle(Obstacle),
}

/// The player's active vehicle for this session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Catalog identifier the vehicle was selected from
    pub id: String,
    pub health: f32,
    /// Whether the vehicle has a hit effect to show when damaged
    pub hit_effect: bool,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, health: f32) -> Self {
        Self {
            id: id.into(),
            health,
            hit_effect: true,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// Effects of one contact
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactOutcome {
    pub score_delta: i32,
    pub health_delta: f32,
    /// New score multiplier, if the touch sets one
    pub multiplier: Option<i32>,
    /// Host should remove the touched entity
    pub remove_other: bool,
    /// Show the vehicle's hit effect at the contact
    pub vehicle_hit_effect: bool,
    /// Show the touched entity's own effect (pickup or obstacle hit)
    pub other_effect: bool,
}

/// Work out what touching `contact` does to `vehicle`.
pub fn resolve(contact: &Contact, vehicle: Option<&Vehicle>) -> ContactOutcome {
    match contact {
        Contact::Item(item) => {
            let (score_delta, health_delta, multiplier) = match item.effect {
                TouchEffect::AddScore(points) => (points, 0.0, None),
                TouchEffect::AddHealth(amount) => (0, amount, None),
                TouchEffect::SetMultiplier(m) => (0, 0.0, Some(m)),
                TouchEffect::Nothing => (0, 0.0, None),
            };
            ContactOutcome {
                score_delta,
                health_delta,
                multiplier,
                remove_other: true,
                vehicle_hit_effect: false,
                other_effect: item.pickup_effect,
            }
        }
        Contact::Obstacle(obstacle) => {
            // The check runs on post-damage health and subtracts damage again, so the
            // killing blow and the hit before it show no vehicle effect.
            let vehicle_hit_effect = vehicle.is_some_and(|v| {
                let after = v.health - obstacle.damage;
                v.hit_effect && after - obstacle.damage > 0.0
            });
            ContactOutcome {
                score_delta: 0,
                health_delta: -obstacle.damage,
                multiplier: None,
                remove_other: obstacle.remove_on_hit,
                vehicle_hit_effect,
                other_effect: obstacle.hit_effect,
            }
        }
    }
}
