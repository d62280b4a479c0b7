//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected random source only
//! - Stable iteration order (player first, then enemies by index)
//! - No rendering or platform dependencies

pub mod ai;
pub mod board;
pub mod camera;
pub mod collision;
pub mod cube;
pub mod random;
pub mod state;
pub mod tick;

pub use ai::choose_direction;
pub use board::{Board, CellKind, Position, TargetCell};
pub use camera::Camera;
pub use collision::{BattleReport, Contact, CubeId, Outcome, resolve_battles};
pub use cube::{Cube, Direction, FaceValues, MotionState, ParseDirectionError, Settle};
pub use random::{RandomSource, ScriptedRandom};
pub use state::{GameEvent, GameObserver, GameState, Session, TurnPhase};
pub use tick::{request_move, tick, update};
