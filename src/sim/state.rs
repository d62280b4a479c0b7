//! Session state and events
//!
//! A [`Session`] owns everything one game needs: board, cubes, camera,
//! counters and the random source. Subsystems borrow what they need from it
//! for the duration of a call.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::{Board, Position};
use super::camera::Camera;
use super::collision::{BattleReport, CubeId};
use super::cube::{Cube, Direction};
use super::random::RandomSource;
use super::tick;
use crate::config::{ConfigError, GameConfig};

/// Turn pipeline position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for a move request
    Idle,
    /// Rolls started by the last accepted move are in flight
    Resolving { player_settled: bool },
}

/// Something the host may want to react to, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MoveAccepted { direction: Direction },
    ObstaclesRegenerated { obstacles: Vec<Position> },
    Battle(BattleReport),
    Teleported { cube: CubeId, to: Position },
    CollectedCountChanged(u32),
    GameCompleted,
    TurnCompleted,
}

/// Host-side hooks fed by [`Session::dispatch`]
pub trait GameObserver {
    fn on_turn_completed(&mut self) {}
    fn on_collected_count_changed(&mut self, _count: u32) {}
    fn on_game_completed(&mut self) {}
    fn on_battle(&mut self, _report: &BattleReport) {}
}

/// Counters that make up one playthrough
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Moves are accepted only while true
    pub active: bool,
    /// Collected target values, always 1, 2, 3, ... in order
    pub collected: Vec<u8>,
    /// Accepted moves since the last obstacle regeneration
    pub move_count: u32,
    /// Regenerate once `move_count` reaches this
    pub next_obstacle_change: u32,
    /// Decisive player-vs-enemy battles
    pub player_wins: u32,
    pub enemy_wins: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    pub fn collected_count(&self) -> usize {
        self.collected.len()
    }

    /// The value that must be collected next
    pub fn next_number(&self) -> u8 {
        self.collected.len() as u8 + 1
    }
}

/// One game session
pub struct Session<R = Pcg32> {
    pub config: GameConfig,
    pub board: Board,
    pub player: Cube,
    pub enemies: Vec<Cube>,
    pub camera: Camera,
    pub state: GameState,
    pub phase: TurnPhase,
    pub(crate) rng: R,
    pub(crate) events: Vec<GameEvent>,
    /// Unsimulated frame time, seconds
    pub(crate) accumulator: f32,
}

impl Session<Pcg32> {
    /// Session on the built-in PCG generator seeded from `config.seed`
    pub fn from_config(config: GameConfig) -> Result<Self, ConfigError> {
        let rng = Pcg32::seed_from_u64(config.seed);
        Self::new(config, rng)
    }
}

impl<R: RandomSource> Session<R> {
    /// Build a random board and place the cubes. The session starts inactive.
    pub fn new(config: GameConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(
            config.board_width,
            config.board_height,
            config.max_targets,
            config.max_obstacles,
            &mut rng,
        );
        Self::with_board(config, board, rng)
    }

    /// Build a session around a prepared board.
    ///
    /// The board's extents take precedence over the config's.
    pub fn with_board(mut config: GameConfig, board: Board, rng: R) -> Result<Self, ConfigError> {
        config.board_width = board.width() as u32;
        config.board_height = board.height() as u32;
        config.validate()?;

        let start = board.start_position();
        let new_cube = |pos| Cube::new(pos, config.rotation_ticks, config.teleport_ticks);
        let player = new_cube(start);
        let enemies = (0..config.enemy_count).map(|_| new_cube(start)).collect();
        let camera = Camera::new(config.camera_yaw, config.camera_turn_speed);

        let mut session = Self {
            config,
            board,
            player,
            enemies,
            camera,
            state: GameState::default(),
            phase: TurnPhase::Idle,
            rng,
            events: Vec::new(),
            accumulator: 0.0,
        };
        session.restart();
        Ok(session)
    }

    /// Reset and begin accepting moves.
    ///
    /// A board without targets is complete as soon as it starts.
    pub fn start(&mut self) {
        self.restart();
        self.state.active = true;
        log::info!(
            "Game started on {}x{} with {} enemies, {} targets",
            self.board.width(),
            self.board.height(),
            self.enemies.len(),
            self.board.target_cell_count()
        );
        if self.board.target_cell_count() == 0 {
            log::warn!("Board has no targets, nothing to collect");
            self.state.active = false;
            self.emit(GameEvent::GameCompleted);
        }
    }

    /// Clear progress and put every cube back on a fresh cell.
    ///
    /// Targets are kept; the activity flag is left as it is.
    pub fn restart(&mut self) {
        let active = self.state.active;
        self.state = GameState {
            active,
            ..GameState::default()
        };
        self.state.next_obstacle_change = self.draw_obstacle_interval();
        self.phase = TurnPhase::Idle;
        self.accumulator = 0.0;

        let start = self.board.start_position();
        self.player.reset(start);

        let mut occupied = vec![start];
        for i in 0..self.enemies.len() {
            let pos = self.board.random_free_cell(&occupied, &mut self.rng);
            self.enemies[i].reset(pos);
            occupied.push(pos);
        }
    }

    pub(crate) fn draw_obstacle_interval(&mut self) -> u32 {
        let min = self.config.obstacle_interval_min;
        let span = self.config.obstacle_interval_max.saturating_sub(min) as usize + 1;
        min + self.rng.next_index(span) as u32
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// True while any cube is rolling or teleporting
    pub fn is_busy(&self) -> bool {
        std::iter::once(&self.player)
            .chain(self.enemies.iter())
            .any(|c| !c.is_idle())
    }

    pub fn collected_count(&self) -> usize {
        self.state.collected_count()
    }

    pub fn cube(&self, id: CubeId) -> Option<&Cube> {
        match id {
            CubeId::Player => Some(&self.player),
            CubeId::Enemy(i) => self.enemies.get(i),
        }
    }

    /// Cells every cube holds or is headed for
    pub fn claimed_cells(&self) -> Vec<Position> {
        std::iter::once(&self.player)
            .chain(self.enemies.iter())
            .flat_map(|c| [c.position, c.destination()])
            .collect()
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Submit a view-relative move. See [`tick::request_move`].
    pub fn request_move(&mut self, direction: Direction) -> bool {
        tick::request_move(self, direction)
    }

    /// Advance one fixed step
    pub fn tick(&mut self) {
        tick::tick(self);
    }

    /// Feed elapsed frame time; returns the number of steps run
    pub fn update(&mut self, dt: f32) -> u32 {
        tick::update(self, dt)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain pending events into `observer`
    pub fn dispatch(&mut self, observer: &mut impl GameObserver) {
        for event in self.drain_events() {
            match event {
                GameEvent::TurnCompleted => observer.on_turn_completed(),
                GameEvent::CollectedCountChanged(count) => observer.on_collected_count_changed(count),
                GameEvent::GameCompleted => observer.on_game_completed(),
                GameEvent::Battle(report) => observer.on_battle(&report),
                _ => {}
            }
        }
    }
}
