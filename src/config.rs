//! Data-driven game configuration
//!
//! Loaded from JSON; every field has a default so partial files work.
//! Validation runs once, before the first tick.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::shop::{EntryConfig, LockState, ShopConfig, StatVector};
use crate::sim::{ControllerConfig, GroundConfig, SpawnGroupConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for spawn placement
    pub seed: u64,
    pub controller: ControllerConfig,
    pub shop: ShopConfig,
    pub spawn_groups: Vec<SpawnGroupConfig>,
    pub ground: GroundConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        let car = |id: &str, price: i32, speed: f32, turn_rate: f32, health: f32, damage: f32| {
            EntryConfig {
                id: id.to_string(),
                price,
                lock_state: if price == 0 {
                    LockState::Unlocked
                } else {
                    LockState::Locked
                },
                stats: StatVector {
                    speed,
                    turn_rate,
                    health,
                    damage_power: damage,
                },
            }
        };

        Self {
            seed: 0,
            controller: ControllerConfig::default(),
            shop: ShopConfig {
                entries: vec![
                    car("Sedan", 0, 10.0, 150.0, 3.0, 1.0),
                    car("Pickup", 1000, 11.0, 140.0, 5.0, 2.0),
                    car("Sports", 2500, 15.0, 200.0, 2.0, 1.0),
                    car("Truck", 5000, 9.0, 110.0, 8.0, 3.0),
                ],
                ..Default::default()
            },
            spawn_groups: vec![
                SpawnGroupConfig::new(&["Coin", "Coin", "Health"], 2.0, (10.0, 20.0)),
                SpawnGroupConfig::new(&["Rock", "Barrier"], 3.0, (15.0, 25.0)),
                SpawnGroupConfig::new(&["PoliceCar"], 5.0, (20.0, 30.0)),
            ],
            ground: GroundConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject anything that would misbehave at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controller.validate()?;
        self.shop.validate()?;
        for (i, group) in self.spawn_groups.iter().enumerate() {
            group.validate(i)?;
        }
        for (field, value) in [
            ("ground.probe_height", self.ground.probe_height),
            ("ground.probe_length", self.ground.probe_length),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidTuning { field, value });
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.controller.start_delay, 1.0);
        assert_eq!(config.controller.money_key, "Money");
        assert_eq!(config.shop.current_key, "CurrentCar");
        assert_eq!(config.ground.probe_length, 100.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(
            r#"{
                "controller": { "level_name": "Track1", "score_per_second": 5 },
                "spawn_groups": [ { "templates": ["Rock"] } ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.controller.level_name, "Track1");
        assert_eq!(config.controller.score_per_second, 5);
        assert_eq!(config.controller.start_delay, 1.0);
        assert_eq!(config.spawn_groups[0].interval, 5.0);
        assert_eq!(config.spawn_groups[0].distance, (10.0, 20.0));
    }

    #[test]
    fn test_rejects_bad_group() {
        let err = GameConfig::from_json_str(
            r#"{ "spawn_groups": [ { "templates": ["Rock"], "interval": -1.0 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SpawnInterval { group: 0, .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            GameConfig::from_json_str("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(GameConfig::from_json_str(&json).unwrap(), config);
    }
}
