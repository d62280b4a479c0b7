//! Game configuration
//!
//! Every field has a default matching the shipped game, so a partial JSON
//! document is enough to override one knob.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Largest supported board side
pub const MAX_BOARD_SIDE: u32 = 64;

/// Rejected configuration, reported before any session state is built
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Board must be between 1x1 and {max}x{max}, got {width}x{height}", max = MAX_BOARD_SIDE)]
    BoardSize { width: u32, height: u32 },
    #[error("{0} must be at least one tick")]
    ZeroDuration(&'static str),
    #[error("Obstacle interval min {min} exceeds max {max}")]
    ObstacleInterval { min: u32, max: u32 },
    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_width: u32,
    pub board_height: u32,
    /// Number of AI cubes
    pub enemy_count: usize,
    /// Upper bound on numbered targets (values 1..=6)
    pub max_targets: usize,
    /// Obstacles placed per regeneration
    pub max_obstacles: usize,
    /// Accepted moves between obstacle regenerations, drawn from [min, max]
    pub obstacle_interval_min: u32,
    pub obstacle_interval_max: u32,
    /// Ticks for one 90 degree roll
    pub rotation_ticks: u32,
    /// Ticks for lift-off, flight and landing
    pub teleport_ticks: u32,
    /// Initial camera yaw in degrees
    pub camera_yaw: f32,
    /// Camera quarter-turn speed, degrees per tick
    pub camera_turn_speed: f32,
    /// Seed for the built-in PCG generator
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: DEFAULT_BOARD_SIDE,
            board_height: DEFAULT_BOARD_SIDE,
            enemy_count: DEFAULT_ENEMY_COUNT,
            max_targets: MAX_TARGETS,
            max_obstacles: MAX_OBSTACLES,
            obstacle_interval_min: OBSTACLE_INTERVAL_MIN,
            obstacle_interval_max: OBSTACLE_INTERVAL_MAX,
            rotation_ticks: ROTATION_TICKS,
            teleport_ticks: TELEPORT_TICKS,
            camera_yaw: DEFAULT_CAMERA_YAW,
            camera_turn_speed: CAMERA_TURN_SPEED,
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Default config on a custom board
    pub fn with_board(width: u32, height: u32) -> Self {
        Self {
            board_width: width,
            board_height: height,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let side_ok = |s: u32| (1..=MAX_BOARD_SIDE).contains(&s);
        if !side_ok(self.board_width) || !side_ok(self.board_height) {
            return Err(ConfigError::BoardSize {
                width: self.board_width,
                height: self.board_height,
            });
        }
        if self.rotation_ticks == 0 {
            return Err(ConfigError::ZeroDuration("rotation_ticks"));
        }
        if self.teleport_ticks == 0 {
            return Err(ConfigError::ZeroDuration("teleport_ticks"));
        }
        if self.obstacle_interval_min > self.obstacle_interval_max {
            return Err(ConfigError::ObstacleInterval {
                min: self.obstacle_interval_min,
                max: self.obstacle_interval_max,
            });
        }
        Ok(())
    }
}
