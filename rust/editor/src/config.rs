// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editor configuration loaded from environment variables or JSON.

use envbuilder_geometry::RoomBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Point-light fixture defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub color: u32,
    pub intensity: f64,
    pub distance: f64,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: 0xffee88,
            intensity: 1.0,
            distance: 10.0,
        }
    }
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snapping step for room corners and door positions.
    pub grid_step: f64,
    /// Height of the plane drags are projected onto.
    pub ground_height: f64,
    pub wall_height: f64,
    pub wall_thickness: f64,
    pub floor_thickness: f64,
    /// Subtracted from dragged room width and depth.
    pub room_gap: f64,
    pub door_width: f64,
    pub door_height: f64,
    pub door_asset: String,
    pub box_size: [f64; 3],
    pub light: LightConfig,
    /// Initial texture tiling (u, v).
    pub texture_repeat: [f64; 2],
    /// Maximum undo entries kept; 0 keeps everything.
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_step: 2.0,
            ground_height: 0.0,
            wall_height: 3.0,
            wall_thickness: 0.1,
            floor_thickness: 0.05,
            room_gap: 0.1,
            door_width: 1.2,
            door_height: 2.5,
            door_asset: "/models/Door.glb".into(),
            box_size: [2.0, 5.0, 2.0],
            light: LightConfig::default(),
            texture_repeat: [1.0, 1.0],
            history_limit: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses "0xRRGGBB", "#RRGGBB" or decimal.
fn env_color(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| {
            let v = v.trim();
            match v.strip_prefix("0x").or_else(|| v.strip_prefix('#')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => v.parse().ok(),
            }
        })
        .unwrap_or(default)
}

impl EditorConfig {
    /// Load configuration from `ENVBUILDER_*` environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            grid_step: env_or("ENVBUILDER_GRID_STEP", d.grid_step),
            ground_height: env_or("ENVBUILDER_GROUND_HEIGHT", d.ground_height),
            wall_height: env_or("ENVBUILDER_WALL_HEIGHT", d.wall_height),
            wall_thickness: env_or("ENVBUILDER_WALL_THICKNESS", d.wall_thickness),
            floor_thickness: env_or("ENVBUILDER_FLOOR_THICKNESS", d.floor_thickness),
            room_gap: env_or("ENVBUILDER_ROOM_GAP", d.room_gap),
            door_width: env_or("ENVBUILDER_DOOR_WIDTH", d.door_width),
            door_height: env_or("ENVBUILDER_DOOR_HEIGHT", d.door_height),
            door_asset: std::env::var("ENVBUILDER_DOOR_ASSET").unwrap_or(d.door_asset),
            box_size: [
                env_or("ENVBUILDER_BOX_WIDTH", d.box_size[0]),
                env_or("ENVBUILDER_BOX_HEIGHT", d.box_size[1]),
                env_or("ENVBUILDER_BOX_DEPTH", d.box_size[2]),
            ],
            light: LightConfig {
                color: env_color("ENVBUILDER_LIGHT_COLOR", d.light.color),
                intensity: env_or("ENVBUILDER_LIGHT_INTENSITY", d.light.intensity),
                distance: env_or("ENVBUILDER_LIGHT_DISTANCE", d.light.distance),
            },
            texture_repeat: [
                env_or("ENVBUILDER_TEXTURE_REPEAT_U", d.texture_repeat[0]),
                env_or("ENVBUILDER_TEXTURE_REPEAT_V", d.texture_repeat[1]),
            ],
            history_limit: env_or("ENVBUILDER_HISTORY_LIMIT", d.history_limit),
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject non-positive sizes.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("grid_step", self.grid_step),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("floor_thickness", self.floor_thickness),
            ("door_width", self.door_width),
            ("door_height", self.door_height),
            ("box_size[0]", self.box_size[0]),
            ("box_size[1]", self.box_size[1]),
            ("box_size[2]", self.box_size[2]),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if self.room_gap < 0.0 {
            return Err(Error::Config(format!(
                "room_gap must not be negative, got {}",
                self.room_gap
            )));
        }
        Ok(())
    }

    /// Room builder using these dimensions.
    pub fn room_builder(&self) -> RoomBuilder {
        RoomBuilder {
            wall_height: self.wall_height,
            wall_thickness: self.wall_thickness,
            floor_thickness: self.floor_thickness,
            gap: self.room_gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_step, 2.0);
        assert_eq!(config.light.color, 0xffee88);
        assert_eq!(config.room_builder(), RoomBuilder::default());
    }

    #[test]
    fn json_partial_override() {
        let config = EditorConfig::from_json(r#"{"wall_height": 4.0, "history_limit": 5}"#).unwrap();
        assert_eq!(config.wall_height, 4.0);
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.door_width, 1.2);
    }

    #[test]
    fn json_rejects_bad_values() {
        assert!(matches!(
            EditorConfig::from_json(r#"{"grid_step": 0}"#),
            Err(Error::Config(_))
        ));
        assert!(EditorConfig::from_json("not json").is_err());
    }

    #[test]
    fn env_overrides() {
        std::env::set_var("ENVBUILDER_DOOR_WIDTH", "0.9");
        std::env::set_var("ENVBUILDER_LIGHT_COLOR", "0x112233");
        std::env::set_var("ENVBUILDER_WALL_THICKNESS", "thick");
        let config = EditorConfig::from_env();
        std::env::remove_var("ENVBUILDER_DOOR_WIDTH");
        std::env::remove_var("ENVBUILDER_LIGHT_COLOR");
        std::env::remove_var("ENVBUILDER_WALL_THICKNESS");

        assert_eq!(config.door_width, 0.9);
        assert_eq!(config.light.color, 0x112233);
        assert_eq!(config.wall_thickness, 0.1);
    }
}
