//! The rolling die
//!
//! A cube rolls one cell at a time over the edge it is moving toward. Face
//! values are permuted only when a roll completes, so every rule reads the
//! settled orientation.

use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{Board, Position};
use crate::consts::{ROLL_ANGLE_DEG, TELEPORT_HEIGHT};
use crate::grid_to_world;

/// Grid-absolute cardinal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Canonical enumeration and tie-break order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit grid offset (up is +y)
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn step(self, from: Position) -> Position {
        let (dx, dy) = self.offset();
        from.offset(dx, dy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Input that names no direction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown direction {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    /// Accepts "up", "down", "left", "right" or their initials, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Values on the six faces of the die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceValues {
    pub top: u8,
    pub bottom: u8,
    pub left: u8,
    pub right: u8,
    pub front: u8,
    pub back: u8,
}

impl FaceValues {
    /// Layout every cube starts with and returns to after a teleport
    pub const IDENTITY: FaceValues = FaceValues {
        top: 1,
        bottom: 6,
        left: 3,
        right: 4,
        front: 2,
        back: 5,
    };

    /// Faces after rolling one cell in `direction`.
    ///
    /// Each roll is a 4-cycle of the faces not on the rotation axis.
    pub fn rolled(self, direction: Direction) -> Self {
        let FaceValues {
            top,
            bottom,
            left,
            right,
            front,
            back,
        } = self;
        match direction {
            Direction::Up => FaceValues {
                top: back,
                back: bottom,
                bottom: front,
                front: top,
                left,
                right,
            },
            Direction::Down => FaceValues {
                top: front,
                front: bottom,
                bottom: back,
                back: top,
                left,
                right,
            },
            Direction::Left => FaceValues {
                top: right,
                right: bottom,
                bottom: left,
                left: top,
                front,
                back,
            },
            Direction::Right => FaceValues {
                top: left,
                left: bottom,
                bottom: right,
                right: top,
                front,
                back,
            },
        }
    }
}

impl Default for FaceValues {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Exactly one holds at any time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionState {
    Idle,
    /// Rolling over an edge; `elapsed` ticks out of the cube's rotation duration
    Rotating { direction: Direction, elapsed: u32 },
    /// Lifting off, flying to `target`, landing; logical position stays put until settle
    Teleporting { target: Position, elapsed: u32 },
}

/// Emitted by [`Cube::advance`] on the tick a motion completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Rolled(Direction),
    Teleported(Position),
}

/// A die on the board (player and enemies share this type)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cube {
    pub position: Position,
    pub faces: FaceValues,
    pub motion: MotionState,
    rotation_ticks: u32,
    teleport_ticks: u32,
}

impl Cube {
    /// Create an idle cube with the identity layout.
    ///
    /// Durations are in ticks and are clamped to at least one.
    pub fn new(position: Position, rotation_ticks: u32, teleport_ticks: u32) -> Self {
        Self {
            position,
            faces: FaceValues::IDENTITY,
            motion: MotionState::Idle,
            rotation_ticks: rotation_ticks.max(1),
            teleport_ticks: teleport_ticks.max(1),
        }
    }

    pub fn top_value(&self) -> u8 {
        self.faces.top
    }

    pub fn bottom_value(&self) -> u8 {
        self.faces.bottom
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.motion, MotionState::Idle)
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self.motion, MotionState::Rotating { .. })
    }

    pub fn is_teleporting(&self) -> bool {
        matches!(self.motion, MotionState::Teleporting { .. })
    }

    /// Whether rolling in `direction` stays on the board and off obstacles.
    ///
    /// Pure; ignores the cube's own motion state.
    pub fn can_move(&self, direction: Direction, board: &Board) -> bool {
        let next = direction.step(self.position);
        board.in_bounds(next) && !board.is_obstacle(next)
    }

    /// Start a roll. Returns false without changing anything if the cube is
    /// busy or the move is blocked.
    pub fn begin_rotation(&mut self, direction: Direction, board: &Board) -> bool {
        if !self.is_idle() || !self.can_move(direction, board) {
            return false;
        }
        self.motion = MotionState::Rotating {
            direction,
            elapsed: 0,
        };
        true
    }

    /// Start a teleport to `target`. Fails while a teleport is already running.
    pub fn begin_teleport(&mut self, target: Position) -> bool {
        if self.is_teleporting() {
            return false;
        }
        self.motion = MotionState::Teleporting { target, elapsed: 0 };
        true
    }

    /// Cell the cube will occupy once its current motion settles
    pub fn destination(&self) -> Position {
        match self.motion {
            MotionState::Idle => self.position,
            MotionState::Rotating { direction, .. } => direction.step(self.position),
            MotionState::Teleporting { target, .. } => target,
        }
    }

    /// Advance the current motion by one tick
    pub fn advance(&mut self) -> Option<Settle> {
        match self.motion {
            MotionState::Idle => None,
            MotionState::Rotating { direction, elapsed } => {
                let elapsed = elapsed + 1;
                if elapsed >= self.rotation_ticks {
                    self.faces = self.faces.rolled(direction);
                    self.position = direction.step(self.position);
                    self.motion = MotionState::Idle;
                    Some(Settle::Rolled(direction))
                } else {
                    self.motion = MotionState::Rotating { direction, elapsed };
                    None
                }
            }
            MotionState::Teleporting { target, elapsed } => {
                let elapsed = elapsed + 1;
                if elapsed >= self.teleport_ticks {
                    self.reset(target);
                    Some(Settle::Teleported(target))
                } else {
                    self.motion = MotionState::Teleporting { target, elapsed };
                    None
                }
            }
        }
    }

    /// Place the cube idle at `position` with the identity layout
    pub fn reset(&mut self, position: Position) {
        self.position = position;
        self.faces = FaceValues::IDENTITY;
        self.motion = MotionState::Idle;
    }

    /// Current roll angle in degrees (0 when not rolling)
    pub fn rotation_angle_deg(&self) -> f32 {
        match self.motion {
            MotionState::Rotating { elapsed, .. } => {
                ROLL_ANGLE_DEG * elapsed as f32 / self.rotation_ticks as f32
            }
            _ => 0.0,
        }
    }

    /// Centre of the cube in world space for the current animation frame
    pub fn world_position(&self, board: &Board) -> Vec3 {
        let rest = grid_to_world(self.position, board);
        match self.motion {
            MotionState::Idle => rest,
            MotionState::Rotating { direction, .. } => {
                // The centre swings around the leading bottom edge
                let (dx, dy) = direction.offset();
                let along = Vec3::new(dx as f32, 0.0, dy as f32);
                let theta = self.rotation_angle_deg().to_radians();
                let pivot = Vec3::new(rest.x, 0.0, rest.z) + along * 0.5;
                let u = -0.5 * theta.cos() + 0.5 * theta.sin();
                let h = 0.5 * theta.cos() + 0.5 * theta.sin();
                pivot + along * u + Vec3::Y * h
            }
            MotionState::Teleporting { target, elapsed } => {
                let progress = elapsed as f32 / self.teleport_ticks as f32;
                let to = grid_to_world(target, board);
                if progress < 0.5 {
                    let up = progress * 2.0;
                    let lift = (up * std::f32::consts::FRAC_PI_2).sin();
                    Vec3::new(rest.x, rest.y + TELEPORT_HEIGHT * lift, rest.z)
                } else {
                    let down = (progress - 0.5) * 2.0;
                    let lift = (down * std::f32::consts::FRAC_PI_2).cos();
                    let flat = rest.lerp(to, down);
                    Vec3::new(flat.x, rest.y + TELEPORT_HEIGHT * lift, flat.z)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_board() -> Board {
        Board::with_layout(5, 5, &[], &[], 5)
    }

    fn roll_to_completion(cube: &mut Cube) -> Option<Settle> {
        for _ in 0..1000 {
            if let Some(settle) = cube.advance() {
                return Some(settle);
            }
        }
        None
    }

    #[test]
    fn test_roll_up_from_identity() {
        let faces = FaceValues::IDENTITY.rolled(Direction::Up);
        assert_eq!(faces.top, 5);
        assert_eq!(faces.bottom, 2);
        assert_eq!(faces.front, 1);
        assert_eq!(faces.back, 6);
        assert_eq!(faces.left, 3);
        assert_eq!(faces.right, 4);
    }

    #[test]
    fn test_roll_left_right_from_identity() {
        let left = FaceValues::IDENTITY.rolled(Direction::Left);
        assert_eq!((left.top, left.right, left.bottom, left.left), (4, 6, 3, 1));
        let right = FaceValues::IDENTITY.rolled(Direction::Right);
        assert_eq!((right.top, right.left, right.bottom, right.right), (3, 6, 4, 1));
        assert_eq!((right.front, right.back), (2, 5));
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("up".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("L".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("Right".parse::<Direction>(), Ok(Direction::Right));
        assert_eq!(
            "north".parse::<Direction>(),
            Err(ParseDirectionError("north".to_string()))
        );
        for d in Direction::ALL {
            assert_eq!(d.as_str().parse::<Direction>(), Ok(d));
        }
    }

    #[test]
    fn test_can_move_bounds_and_obstacles() {
        let board = Board::with_layout(3, 3, &[], &[Position::new(2, 1)], 5);
        let cube = Cube::new(Position::new(1, 1), 18, 60);
        assert!(cube.can_move(Direction::Up, &board));
        assert!(cube.can_move(Direction::Down, &board));
        assert!(cube.can_move(Direction::Left, &board));
        assert!(!cube.can_move(Direction::Right, &board));

        let corner = Cube::new(Position::new(0, 0), 18, 60);
        assert!(!corner.can_move(Direction::Down, &board));
        assert!(!corner.can_move(Direction::Left, &board));
    }

    #[test]
    fn test_rotation_completes_once() {
        let board = open_board();
        let mut cube = Cube::new(Position::new(2, 2), 18, 60);
        assert!(cube.begin_rotation(Direction::Right, &board));
        assert!(cube.is_rotating());

        let mut settles = 0;
        for tick in 1..=40 {
            if let Some(settle) = cube.advance() {
                settles += 1;
                assert_eq!(tick, 18);
                assert_eq!(settle, Settle::Rolled(Direction::Right));
            }
        }
        assert_eq!(settles, 1);
        assert_eq!(cube.position, Position::new(3, 2));
        assert!(cube.is_idle());
    }

    #[test]
    fn test_begin_rotation_rejected_while_busy() {
        let board = open_board();
        let mut cube = Cube::new(Position::new(2, 2), 4, 4);
        assert!(cube.begin_rotation(Direction::Up, &board));
        assert!(!cube.begin_rotation(Direction::Left, &board));
        assert_eq!(
            cube.motion,
            MotionState::Rotating {
                direction: Direction::Up,
                elapsed: 0
            }
        );

        roll_to_completion(&mut cube);
        assert!(cube.begin_teleport(Position::new(0, 0)));
        assert!(!cube.begin_rotation(Direction::Left, &board));
        assert!(!cube.begin_teleport(Position::new(1, 1)));
    }

    #[test]
    fn test_begin_rotation_rejected_when_blocked() {
        let board = open_board();
        let mut cube = Cube::new(Position::new(0, 4), 4, 4);
        assert!(!cube.begin_rotation(Direction::Up, &board));
        assert!(cube.is_idle());
        assert_eq!(cube.position, Position::new(0, 4));
    }

    #[test]
    fn test_teleport_resets_faces() {
        let board = open_board();
        let mut cube = Cube::new(Position::new(2, 2), 2, 3);
        cube.begin_rotation(Direction::Up, &board);
        roll_to_completion(&mut cube);
        assert_ne!(cube.faces, FaceValues::IDENTITY);

        cube.begin_teleport(Position::new(4, 0));
        assert_eq!(cube.destination(), Position::new(4, 0));
        assert_eq!(cube.advance(), None);
        // Logical position holds until the landing tick
        assert_eq!(cube.position, Position::new(2, 3));
        assert_eq!(cube.advance(), None);
        assert_eq!(cube.advance(), Some(Settle::Teleported(Position::new(4, 0))));
        assert_eq!(cube.position, Position::new(4, 0));
        assert_eq!(cube.faces, FaceValues::IDENTITY);
        assert!(cube.is_idle());
    }

    #[test]
    fn test_world_position_follows_roll() {
        let board = open_board();
        let mut cube = Cube::new(Position::new(2, 2), 2, 2);
        let rest = cube.world_position(&board);
        assert!((rest - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-5);

        cube.begin_rotation(Direction::Right, &board);
        cube.advance();
        // Halfway over the edge the centre sits right above the pivot
        let mid = cube.world_position(&board);
        assert!((mid.x - 0.5).abs() < 1e-5);
        assert!((mid.y - 0.5 * std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_world_position_during_teleport_peaks_midway() {
        let board = open_board();
        let mut cube = Cube::new(Position::new(0, 0), 2, 4);
        cube.begin_teleport(Position::new(4, 4));
        cube.advance();
        cube.advance();
        let apex = cube.world_position(&board);
        assert!((apex.y - (0.5 + TELEPORT_HEIGHT)).abs() < 1e-4);
        assert!((apex.x - (-2.0)).abs() < 1e-5);
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_roll_then_opposite_is_identity(
            path in proptest::collection::vec(any_direction(), 0..12),
            d in any_direction(),
        ) {
            let start = path.iter().fold(FaceValues::IDENTITY, |f, &dir| f.rolled(dir));
            prop_assert_eq!(start.rolled(d).rolled(d.opposite()), start);
        }

        #[test]
        fn prop_four_rolls_is_identity(
            path in proptest::collection::vec(any_direction(), 0..12),
            d in any_direction(),
        ) {
            let start = path.iter().fold(FaceValues::IDENTITY, |f, &dir| f.rolled(dir));
            let spun = (0..4).fold(start, |f, _| f.rolled(d));
            prop_assert_eq!(spun, start);
        }

        #[test]
        fn prop_opposite_faces_sum_to_seven(
            path in proptest::collection::vec(any_direction(), 0..24),
        ) {
            let f = path.iter().fold(FaceValues::IDENTITY, |f, &dir| f.rolled(dir));
            prop_assert_eq!(f.top + f.bottom, 7);
            prop_assert_eq!(f.left + f.right, 7);
            prop_assert_eq!(f.front + f.back, 7);
        }

        #[test]
        fn prop_can_move_matches_bounds_and_obstacles(
            x in 1i32..4,
            y in 1i32..4,
            obstacles in proptest::collection::vec((0i32..5, 0i32..5), 0..5),
            d in any_direction(),
        ) {
            let obstacles: Vec<Position> =
                obstacles.into_iter().map(|(x, y)| Position::new(x, y)).collect();
            let board = Board::with_layout(5, 5, &[], &obstacles, 5);
            let cube = Cube::new(Position::new(x, y), 18, 60);
            let target = d.step(cube.position);
            let expected = board.in_bounds(target) && !board.is_obstacle(target);
            prop_assert_eq!(cube.can_move(d, &board), expected);
        }
    }
}
