//! Grid board: extents, numbered target cells, and regenerating obstacles

use serde::{Deserialize, Serialize};

use super::random::{RandomSource, pick, shuffle};

/// Grid coordinate, 0-indexed from the board's lower-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// What occupies a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Empty,
    /// Must be landed on with this bottom face value
    Target(u8),
    Obstacle,
}

/// A numbered target cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCell {
    pub pos: Position,
    pub value: u8,
}

/// The playing field
///
/// Targets are fixed at creation time. Obstacles are replaced wholesale by
/// [`Board::regenerate_obstacles`]. The start cell never holds either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    width: i32,
    height: i32,
    /// Row-major, `y * width + x`
    cells: Vec<CellKind>,
    /// In creation order
    targets: Vec<TargetCell>,
    obstacles: Vec<Position>,
    max_obstacles: usize,
}

impl Board {
    /// Create a board with shuffled targets and an initial obstacle set.
    ///
    /// Target values are a shuffled prefix of 1..=6 placed on shuffled cells
    /// other than the start cell. Callers validate that both extents are
    /// positive.
    pub fn new(
        width: u32,
        height: u32,
        max_targets: usize,
        max_obstacles: usize,
        rng: &mut impl RandomSource,
    ) -> Self {
        let mut board = Self::empty(width, height, max_obstacles);
        let start = board.start_position();

        let mut values: Vec<u8> = (1..=6).collect();
        shuffle(&mut values, rng);

        let mut candidates: Vec<Position> = board.all_positions().filter(|&p| p != start).collect();
        shuffle(&mut candidates, rng);

        let count = max_targets.min(6).min(candidates.len());
        for (&pos, &value) in candidates.iter().zip(values.iter()).take(count) {
            board.set_cell(pos, CellKind::Target(value));
            board.targets.push(TargetCell { pos, value });
        }

        board.regenerate_obstacles(&[], rng);
        log::debug!(
            "Board {}x{}: {} targets, {} obstacles",
            board.width,
            board.height,
            board.targets.len(),
            board.obstacles.len()
        );
        board
    }

    /// Build a board from an explicit layout.
    ///
    /// Entries that fall outside the grid, on the start cell, or on an
    /// already-used cell are skipped.
    pub fn with_layout(
        width: u32,
        height: u32,
        targets: &[(Position, u8)],
        obstacles: &[Position],
        max_obstacles: usize,
    ) -> Self {
        let mut board = Self::empty(width, height, max_obstacles);
        let start = board.start_position();
        for &(pos, value) in targets {
            if board.in_bounds(pos) && pos != start && board.cell(pos) == Some(CellKind::Empty) {
                board.set_cell(pos, CellKind::Target(value));
                board.targets.push(TargetCell { pos, value });
            } else {
                log::warn!("Skipping target {} at ({}, {})", value, pos.x, pos.y);
            }
        }
        for &pos in obstacles {
            if board.in_bounds(pos) && pos != start && board.cell(pos) == Some(CellKind::Empty) {
                board.set_cell(pos, CellKind::Obstacle);
                board.obstacles.push(pos);
            } else {
                log::warn!("Skipping obstacle at ({}, {})", pos.x, pos.y);
            }
        }
        board
    }

    fn empty(width: u32, height: u32, max_obstacles: usize) -> Self {
        let width = width as i32;
        let height = height as i32;
        Self {
            width,
            height,
            cells: vec![CellKind::Empty; (width * height).max(0) as usize],
            targets: Vec::new(),
            obstacles: Vec::new(),
            max_obstacles,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// (width, height)
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// The centre cell, where the player starts
    pub fn start_position(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn cell(&self, pos: Position) -> Option<CellKind> {
        self.index(pos).map(|i| self.cells[i])
    }

    fn set_cell(&mut self, pos: Position, kind: CellKind) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = kind;
        }
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.cell(pos) == Some(CellKind::Obstacle)
    }

    /// True iff `pos` is a target whose assigned value equals `value`
    pub fn check_target(&self, pos: Position, value: u8) -> bool {
        self.cell(pos) == Some(CellKind::Target(value))
    }

    pub fn target_value(&self, pos: Position) -> Option<u8> {
        match self.cell(pos) {
            Some(CellKind::Target(v)) => Some(v),
            _ => None,
        }
    }

    pub fn targets(&self) -> &[TargetCell] {
        &self.targets
    }

    pub fn target_cell_count(&self) -> usize {
        self.targets.len()
    }

    pub fn obstacles(&self) -> &[Position] {
        &self.obstacles
    }

    /// Every cell, row by row from y = 0
    pub fn all_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Replace all obstacles with up to `max_obstacles` fresh ones.
    ///
    /// Candidates exclude the start cell, every target cell and `exclude`.
    /// Uses as many cells as are available when fewer remain.
    pub fn regenerate_obstacles(&mut self, exclude: &[Position], rng: &mut impl RandomSource) {
        for pos in std::mem::take(&mut self.obstacles) {
            self.set_cell(pos, CellKind::Empty);
        }

        let start = self.start_position();
        let mut candidates: Vec<Position> = self
            .all_positions()
            .filter(|&p| p != start && self.cell(p) == Some(CellKind::Empty) && !exclude.contains(&p))
            .collect();
        shuffle(&mut candidates, rng);
        candidates.truncate(self.max_obstacles);

        for &pos in &candidates {
            self.set_cell(pos, CellKind::Obstacle);
        }
        self.obstacles = candidates;
    }

    /// Pick a uniformly random obstacle-free cell not listed in `exclude`.
    ///
    /// A saturated board falls back to the origin even if it is occupied.
    pub fn random_free_cell(&self, exclude: &[Position], rng: &mut impl RandomSource) -> Position {
        let free: Vec<Position> = self
            .all_positions()
            .filter(|&p| !self.is_obstacle(p) && !exclude.contains(&p))
            .collect();
        match pick(&free, rng) {
            Some(pos) => pos,
            None => {
                log::warn!("No free cell left, falling back to origin");
                Position::ORIGIN
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::ScriptedRandom;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_new_board_targets() {
        let mut rng = Pcg32::seed_from_u64(42);
        let board = Board::new(10, 10, 6, 5, &mut rng);
        assert_eq!(board.target_cell_count(), 6);

        let mut values: Vec<u8> = board.targets().iter().map(|t| t.value).collect();
        values.sort();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);

        let start = board.start_position();
        assert_eq!(start, Position::new(5, 5));
        assert_eq!(board.cell(start), Some(CellKind::Empty));
        assert_eq!(board.obstacles().len(), 5);
    }

    #[test]
    fn test_tiny_board_has_fewer_targets() {
        let board = Board::new(2, 2, 6, 5, &mut ScriptedRandom::zeros());
        // 4 cells minus the start cell
        assert_eq!(board.target_cell_count(), 3);
        // Everything but the start cell is a target
        assert!(board.obstacles().is_empty());
    }

    #[test]
    fn test_check_target() {
        let board = Board::with_layout(5, 5, &[(Position::new(0, 0), 3)], &[], 5);
        assert!(board.check_target(Position::new(0, 0), 3));
        assert!(!board.check_target(Position::new(0, 0), 4));
        assert!(!board.check_target(Position::new(1, 0), 3));
        assert!(!board.check_target(Position::new(-1, 0), 3));
    }

    #[test]
    fn test_with_layout_skips_conflicts() {
        let start = Position::new(2, 2);
        let board = Board::with_layout(
            5,
            5,
            &[(Position::new(1, 1), 1), (start, 2), (Position::new(9, 9), 3)],
            &[Position::new(1, 1), Position::new(3, 3)],
            5,
        );
        assert_eq!(board.target_cell_count(), 1);
        assert_eq!(board.obstacles(), &[Position::new(3, 3)]);
    }

    #[test]
    fn test_regenerate_uses_available_cells() {
        // 3x1: start is (1, 0), target on (0, 0), one free cell left
        let mut board = Board::with_layout(3, 1, &[(Position::new(0, 0), 1)], &[], 5);
        board.regenerate_obstacles(&[], &mut ScriptedRandom::zeros());
        assert_eq!(board.obstacles(), &[Position::new(2, 0)]);

        board.regenerate_obstacles(&[Position::new(2, 0)], &mut ScriptedRandom::zeros());
        assert!(board.obstacles().is_empty());
        assert!(!board.is_obstacle(Position::new(2, 0)));
    }

    #[test]
    fn test_random_free_cell_fallback() {
        let board = Board::with_layout(1, 1, &[], &[], 5);
        let start = board.start_position();
        let pos = board.random_free_cell(&[start], &mut ScriptedRandom::zeros());
        assert_eq!(pos, Position::ORIGIN);
    }

    #[test]
    fn test_random_free_cell_skips_obstacles() {
        let board = Board::with_layout(3, 1, &[], &[Position::new(0, 0)], 5);
        let pos = board.random_free_cell(&[Position::new(1, 0)], &mut ScriptedRandom::zeros());
        assert_eq!(pos, Position::new(2, 0));
    }

    proptest! {
        #[test]
        fn prop_obstacles_avoid_reserved_cells(
            seed in any::<u64>(),
            w in 1u32..12,
            h in 1u32..12,
            ex in proptest::collection::vec((0i32..12, 0i32..12), 0..6),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut board = Board::new(w, h, 6, 5, &mut rng);
            let exclude: Vec<Position> = ex.into_iter().map(|(x, y)| Position::new(x, y)).collect();
            board.regenerate_obstacles(&exclude, &mut rng);

            prop_assert!(board.obstacles().len() <= 5);
            for &obstacle in board.obstacles() {
                prop_assert!(obstacle != board.start_position());
                prop_assert!(board.target_value(obstacle).is_none());
                prop_assert!(!exclude.contains(&obstacle));
                prop_assert!(board.is_obstacle(obstacle));
            }
            let marked = board.all_positions().filter(|&p| board.is_obstacle(p)).count();
            prop_assert_eq!(marked, board.obstacles().len());
        }
    }
}
