//! Enemy cube decision policy
//!
//! Evaluated once per accepted player move, for each enemy in list order,
//! against the positions as they were before anything started rolling.
//!
//! Directions are enumerated view-relative in [`Direction::ALL`] order and
//! returned view-relative; the orchestrator applies the camera transform
//! exactly as it does for player input. Scan order is the tie-break.

use super::board::{Board, Position};
use super::camera::Camera;
use super::cube::{Cube, Direction};
use super::random::{RandomSource, pick};
use crate::manhattan;

/// Row/column gap at which an enemy starts reacting to the player
pub const PROXIMITY_RANGE: i32 = 2;

/// What the enemy is trying to do this turn (diagnostic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Wander,
    Attack,
    Flee,
    Avoid,
}

/// A legal option: the view-relative input and the cell it leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub direction: Direction,
    pub destination: Position,
}

/// Moves the enemy could make, in enumeration order.
///
/// Filters out blocked rolls and cells held by other enemies. Landing on the
/// player is allowed; that is how battles start.
pub fn possible_moves(
    enemy: &Cube,
    other_enemies: &[Position],
    board: &Board,
    camera: &Camera,
) -> Vec<Candidate> {
    Direction::ALL
        .iter()
        .filter_map(|&direction| {
            let grid = camera.transform(direction);
            if !enemy.can_move(grid, board) {
                return None;
            }
            let destination = grid.step(enemy.position);
            if other_enemies.contains(&destination) {
                return None;
            }
            Some(Candidate {
                direction,
                destination,
            })
        })
        .collect()
}

/// Same row or column with a gap of at most [`PROXIMITY_RANGE`]
pub fn is_near(a: Position, b: Position) -> bool {
    (a.y == b.y && (a.x - b.x).abs() <= PROXIMITY_RANGE)
        || (a.x == b.x && (a.y - b.y).abs() <= PROXIMITY_RANGE)
}

/// Pick this turn's view-relative direction for `enemy`, or `None` to stay put
pub fn choose_direction(
    enemy: &Cube,
    player: &Cube,
    other_enemies: &[Position],
    board: &Board,
    camera: &Camera,
    rng: &mut impl RandomSource,
) -> Option<Direction> {
    let moves = possible_moves(enemy, other_enemies, board, camera);
    if moves.is_empty() {
        return None;
    }

    let here = enemy.position;
    let target = player.position;

    let (intent, chosen) = if !is_near(here, target) {
        (Intent::Wander, None)
    } else {
        let ours = enemy.top_value();
        let theirs = player.top_value();
        if ours > theirs {
            let attack = moves
                .iter()
                .find(|c| manhattan(c.destination, target) <= 1)
                .copied();
            (Intent::Attack, attack)
        } else if ours < theirs {
            let current = manhattan(here, target);
            let escape = moves
                .iter()
                .find(|c| c.destination != target && manhattan(c.destination, target) > current)
                .copied();
            (Intent::Flee, escape)
        } else {
            let safe: Vec<Candidate> = moves
                .iter()
                .filter(|c| c.destination != target)
                .copied()
                .collect();
            (Intent::Avoid, pick(&safe, rng))
        }
    };

    let candidate = match chosen {
        Some(c) => c,
        None => pick(&moves, rng)?,
    };
    log::debug!(
        "Enemy at ({}, {}) {:?}: {}",
        here.x,
        here.y,
        intent,
        candidate.direction.as_str()
    );
    Some(candidate.direction)
}
