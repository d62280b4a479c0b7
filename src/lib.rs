//! Rolling Cube - a die-rolling grid puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (cubes, board, AI, battles, turns)
//! - `config`: Data-driven game setup

pub mod config;
pub mod sim;

pub use config::{ConfigError, GameConfig};

use glam::Vec3;

use sim::board::{Board, Position};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Board defaults
    pub const DEFAULT_BOARD_SIDE: u32 = 10;
    pub const DEFAULT_ENEMY_COUNT: usize = 3;
    /// Target values run 1..=6, one per die face
    pub const MAX_TARGETS: usize = 6;
    pub const MAX_OBSTACLES: usize = 5;
    /// Accepted moves between obstacle reshuffles, inclusive range
    pub const OBSTACLE_INTERVAL_MIN: u32 = 15;
    pub const OBSTACLE_INTERVAL_MAX: u32 = 20;

    /// Cube motion
    pub const ROLL_ANGLE_DEG: f32 = 90.0;
    pub const ROTATION_TICKS: u32 = 18; // 5 degrees per tick
    pub const TELEPORT_TICKS: u32 = 60;
    pub const TELEPORT_HEIGHT: f32 = 10.0;

    /// Camera
    pub const CAMERA_TURN_SPEED: f32 = 5.0; // degrees per tick
    pub const DEFAULT_CAMERA_YAW: f32 = 225.0;
}

/// World-space centre of a resting cube on `pos`.
///
/// The board is centred on the origin in the XZ plane with unit cells; grid
/// y maps to world z.
#[inline]
pub fn grid_to_world(pos: Position, board: &Board) -> Vec3 {
    let (w, h) = board.size();
    Vec3::new(
        pos.x as f32 - w as f32 / 2.0 + 0.5,
        0.5,
        pos.y as f32 - h as f32 / 2.0 + 0.5,
    )
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_to_world_centres_board() {
        let board = Board::with_layout(5, 5, &[], &[], 5);
        let centre = grid_to_world(Position::new(2, 2), &board);
        assert_eq!(centre, Vec3::new(0.0, 0.5, 0.0));

        let corner = grid_to_world(Position::ORIGIN, &board);
        assert_eq!(corner, Vec3::new(-2.0, 0.5, -2.0));

        let even = Board::with_layout(4, 2, &[], &[], 5);
        assert_eq!(grid_to_world(Position::new(3, 1), &even), Vec3::new(1.5, 0.5, 0.5));
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(manhattan(Position::new(1, 1), Position::new(1, 1)), 0);
        assert_eq!(manhattan(Position::new(0, 0), Position::new(3, -2)), 5);
    }
}
