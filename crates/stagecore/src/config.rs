use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Size, Vec2};
use crate::level::EntityKind;

/// Constants supplied by whoever hosts the core. Nothing in the grid, level,
/// or runtime algorithms hard-codes these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub cell_size: f32,
    pub tile_width: f32,
    pub tile_height: f32,
    pub default_gravity: Vec2,
    /// Replaces legacy "normalized" gravity (y <= 10) during conversion.
    pub legacy_gravity_y: f32,
    pub default_tint: u32,
    pub grid_columns: i32,
    pub grid_rows: i32,
    pub kind_sizes: BTreeMap<EntityKind, Size>,
    pub history_capacity: usize,
    pub spring_cooldown_seconds: f32,
    pub spring_squash_scale_y: f32,
    pub damage_flash_seconds: f32,
    pub damage_flash_tint: u32,
    pub collect_pulse_scale: f32,
    pub coin_removal_delay_seconds: f32,
    pub player_invulnerability_seconds: f32,
    pub player_max_health: u32,
    pub enemy_max_health: u32,
    pub contact_damage: u32,
    pub stomp_damage: u32,
    pub coin_value: u32,
    /// Patrol half-range for enemies without `properties.patrolDistance`.
    pub default_patrol_distance: f32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let kind_sizes = BTreeMap::from([
            (EntityKind::Player, Size::new(28.0, 30.0)),
            (EntityKind::Enemy, Size::new(28.0, 28.0)),
            (EntityKind::Platform, Size::new(32.0, 32.0)),
            (EntityKind::Coin, Size::new(16.0, 16.0)),
            (EntityKind::Door, Size::new(32.0, 48.0)),
            (EntityKind::Spring, Size::new(32.0, 16.0)),
            (EntityKind::Spike, Size::new(32.0, 16.0)),
        ]);
        Self {
            cell_size: 32.0,
            tile_width: 32.0,
            tile_height: 32.0,
            default_gravity: Vec2 { x: 0.0, y: 800.0 },
            legacy_gravity_y: 800.0,
            default_tint: 0xFFFFFF,
            grid_columns: 50,
            grid_rows: 20,
            kind_sizes,
            history_capacity: 64,
            spring_cooldown_seconds: 0.5,
            spring_squash_scale_y: 0.6,
            damage_flash_seconds: 0.15,
            damage_flash_tint: 0xFF4444,
            collect_pulse_scale: 1.4,
            coin_removal_delay_seconds: 0.3,
            player_invulnerability_seconds: 1.0,
            player_max_health: 100,
            enemy_max_health: 30,
            contact_damage: 25,
            stomp_damage: 30,
            coin_value: 1,
            default_patrol_distance: 64.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl CoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: CoreConfig = serde_path_to_error::deserialize(&mut deserializer).map_err(
            |error| {
                let path = error.path().to_string();
                ConfigError::Parse {
                    path,
                    source: error.into_inner(),
                }
            },
        )?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("cell_size", self.cell_size),
            ("tile_width", self.tile_width),
            ("tile_height", self.tile_height),
            ("spring_cooldown_seconds", self.spring_cooldown_seconds),
            ("damage_flash_seconds", self.damage_flash_seconds),
            ("coin_removal_delay_seconds", self.coin_removal_delay_seconds),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    message: format!("expected positive number, got {value}"),
                });
            }
        }
        let invulnerability = self.player_invulnerability_seconds;
        if !(invulnerability.is_finite() && invulnerability >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "player_invulnerability_seconds",
                message: format!("expected non-negative number, got {invulnerability}"),
            });
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "history_capacity",
                message: "must be at least 1".to_string(),
            });
        }
        if let Some((kind, size)) = self.kind_sizes.iter().find(|(_, size)| !size.is_positive()) {
            return Err(ConfigError::Invalid {
                field: "kind_sizes",
                message: format!("size for {} must be positive, got {size:?}", kind.as_str()),
            });
        }
        Ok(())
    }

    /// Default AABB size for a kind; kinds without an entry occupy one cell.
    pub fn size_for(&self, kind: EntityKind) -> Size {
        self.kind_sizes
            .get(&kind)
            .copied()
            .unwrap_or(Size::new(self.cell_size, self.cell_size))
    }

    pub fn world_height(&self) -> f32 {
        self.grid_rows.max(0) as f32 * self.cell_size
    }

    pub fn world_width(&self) -> f32 {
        self.grid_columns.max(0) as f32 * self.cell_size
    }
}
