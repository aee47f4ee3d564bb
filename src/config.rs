//! Engine settings, loadable from TOML.
//!
//! Every field has a default, so an empty file (or no file) gives the
//! stock behavior:
//!
//! ```toml
//! clearance_margin = 0.05
//! default_color = "#ffffff"
//! clamp_after_resolve = true
//!
//! [room]
//! width = 10.0
//! length = 10.0
//! floor_color = "#e0e0e0"
//! wall_color = "#f5f5f5"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resolve::CLEARANCE_MARGIN;
use crate::types::{Color, Room, DEFAULT_FLOOR_COLOR, DEFAULT_WALL_COLOR};

fn default_clearance_margin() -> f64 {
    CLEARANCE_MARGIN
}

fn default_true() -> bool {
    true
}

fn default_room_width() -> f64 {
    10.0
}

fn default_room_length() -> f64 {
    10.0
}

fn default_floor_color() -> Color {
    Color::new(DEFAULT_FLOOR_COLOR)
}

fn default_wall_color() -> Color {
    Color::new(DEFAULT_WALL_COLOR)
}

/// Room a fresh controller starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    #[serde(default = "default_room_width")]
    pub width: f64,
    #[serde(default = "default_room_length")]
    pub length: f64,
    #[serde(default = "default_floor_color")]
    pub floor_color: Color,
    #[serde(default = "default_wall_color")]
    pub wall_color: Color,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: default_room_width(),
            length: default_room_length(),
            floor_color: default_floor_color(),
            wall_color: default_wall_color(),
        }
    }
}

impl RoomConfig {
    pub fn to_room(&self) -> Result<Room> {
        Room::new(
            self.width,
            self.length,
            self.floor_color.clone(),
            self.wall_color.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Gap left beyond a neighbor's edge when an overlap is corrected.
    #[serde(default = "default_clearance_margin")]
    pub clearance_margin: f64,
    /// Color for stored furniture that has none.
    #[serde(default)]
    pub default_color: Color,
    /// Clamp corrected positions back inside the room. Walls win over
    /// clearance when both cannot be satisfied.
    #[serde(default = "default_true")]
    pub clamp_after_resolve: bool,
    #[serde(default)]
    pub room: RoomConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clearance_margin: default_clearance_margin(),
            default_color: Color::default(),
            clamp_after_resolve: true,
            room: RoomConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate. The default room must be a valid room.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.room.to_room()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
