//! Cube contact detection and battle resolution
//!
//! Runs once per turn on settled logical positions. Pairs are scanned
//! player-vs-enemy first (enemy list order), then enemy-vs-enemy in index
//! order. The first pair in contact fights; nothing else is resolved that
//! pass. Cubes already teleporting are skipped.

use serde::{Deserialize, Serialize};

use super::board::{Board, Position};
use super::cube::Cube;
use super::random::RandomSource;
use crate::manhattan;

/// Identifies a cube inside a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeId {
    Player,
    Enemy(usize),
}

/// How two cubes touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    SameCell,
    Adjacent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The loser has started teleporting to `destination`
    Win {
        winner: CubeId,
        loser: CubeId,
        destination: Position,
    },
    /// Equal top values next to each other: nobody moves
    Standoff,
    /// Equal top values on one cell: both teleport
    Scatter { first: Position, second: Position },
}

/// One resolved battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub a: CubeId,
    pub b: CubeId,
    pub a_top: u8,
    pub b_top: u8,
    pub contact: Contact,
    pub outcome: Outcome,
}

/// Contact kind between two cells, if any
pub fn contact_between(a: Position, b: Position) -> Option<Contact> {
    match manhattan(a, b) {
        0 => Some(Contact::SameCell),
        1 => Some(Contact::Adjacent),
        _ => None,
    }
}

fn cube<'a>(player: &'a Cube, enemies: &'a [Cube], id: CubeId) -> Option<&'a Cube> {
    match id {
        CubeId::Player => Some(player),
        CubeId::Enemy(i) => enemies.get(i),
    }
}

fn cube_mut<'a>(player: &'a mut Cube, enemies: &'a mut [Cube], id: CubeId) -> Option<&'a mut Cube> {
    match id {
        CubeId::Player => Some(player),
        CubeId::Enemy(i) => enemies.get_mut(i),
    }
}

/// Every cell a cube holds now or is about to land on
fn claimed_cells(player: &Cube, enemies: &[Cube]) -> Vec<Position> {
    std::iter::once(player)
        .chain(enemies.iter())
        .flat_map(|c| [c.position, c.destination()])
        .collect()
}

/// Stable pair order: player first, then enemy pairs by index
fn pair_order(enemy_count: usize) -> impl Iterator<Item = (CubeId, CubeId)> {
    let with_player = (0..enemy_count).map(|i| (CubeId::Player, CubeId::Enemy(i)));
    let among_enemies = (0..enemy_count)
        .flat_map(move |i| ((i + 1)..enemy_count).map(move |j| (CubeId::Enemy(i), CubeId::Enemy(j))));
    with_player.chain(among_enemies)
}

/// First eligible pair in contact, if any
pub fn find_contact(player: &Cube, enemies: &[Cube]) -> Option<(CubeId, CubeId, Contact)> {
    pair_order(enemies.len()).find_map(|(a, b)| {
        let ca = cube(player, enemies, a)?;
        let cb = cube(player, enemies, b)?;
        if ca.is_teleporting() || cb.is_teleporting() {
            return None;
        }
        contact_between(ca.position, cb.position).map(|contact| (a, b, contact))
    })
}

/// Teleport `id` to a random free cell nobody holds or is headed for
fn send_away(
    player: &mut Cube,
    enemies: &mut [Cube],
    id: CubeId,
    board: &Board,
    rng: &mut impl RandomSource,
) -> Position {
    let exclude = claimed_cells(player, enemies);
    let destination = board.random_free_cell(&exclude, rng);
    if let Some(c) = cube_mut(player, enemies, id) {
        c.begin_teleport(destination);
    }
    destination
}

/// Resolve at most one battle among the cubes
pub fn resolve_battles(
    player: &mut Cube,
    enemies: &mut [Cube],
    board: &Board,
    rng: &mut impl RandomSource,
) -> Option<BattleReport> {
    let (a, b, contact) = find_contact(player, enemies)?;
    let a_top = cube(player, enemies, a)?.top_value();
    let b_top = cube(player, enemies, b)?.top_value();

    let outcome = if a_top != b_top {
        let (winner, loser) = if a_top > b_top { (a, b) } else { (b, a) };
        let destination = send_away(player, enemies, loser, board, rng);
        log::info!(
            "Battle {:?} ({}) vs {:?} ({}): {:?} wins, loser teleports to ({}, {})",
            a,
            a_top,
            b,
            b_top,
            winner,
            destination.x,
            destination.y
        );
        Outcome::Win {
            winner,
            loser,
            destination,
        }
    } else if contact == Contact::SameCell {
        let first = send_away(player, enemies, a, board, rng);
        let second = send_away(player, enemies, b, board, rng);
        log::info!(
            "Battle {:?} vs {:?}: draw on one cell, scattering to ({}, {}) and ({}, {})",
            a,
            b,
            first.x,
            first.y,
            second.x,
            second.y
        );
        Outcome::Scatter { first, second }
    } else {
        log::info!("Battle {:?} vs {:?}: draw at {}, no effect", a, b, a_top);
        Outcome::Standoff
    };

    Some(BattleReport {
        a,
        b,
        a_top,
        b_top,
        contact,
        outcome,
    })
}
