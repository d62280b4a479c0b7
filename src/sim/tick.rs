//! Turn orchestration and the fixed timestep tick
//!
//! A turn starts with an accepted [`request_move`]: the player and every
//! enemy with a legal plan begin rolling together. [`tick`] advances all
//! motion; once the player has settled and nothing is moving, the turn is
//! resolved (target check, then battles, then the completion event).

use super::ai;
use super::board::Position;
use super::collision::{self, CubeId, Outcome};
use super::cube::{Direction, Settle};
use super::random::RandomSource;
use super::state::{GameEvent, Session, TurnPhase};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Submit a view-relative move for the player.
///
/// Returns false with nothing changed when the game is inactive, any cube is
/// still moving, or the transformed roll is blocked.
pub fn request_move<R: RandomSource>(session: &mut Session<R>, direction: Direction) -> bool {
    if !session.state.active {
        log::debug!("Move {} ignored: game inactive", direction.as_str());
        return false;
    }
    if session.is_busy() {
        log::debug!("Move {} ignored: cubes still moving", direction.as_str());
        return false;
    }

    let grid = session.camera.transform(direction);
    if !session.player.can_move(grid, &session.board) {
        log::debug!(
            "Move {} (grid {}) blocked at ({}, {})",
            direction.as_str(),
            grid.as_str(),
            session.player.position.x,
            session.player.position.y
        );
        return false;
    }

    // Plans read the board before anything starts rolling
    let plans = plan_enemy_moves(session);

    session.player.begin_rotation(grid, &session.board);
    for (index, enemy_dir) in plans {
        if let Some(enemy) = session.enemies.get_mut(index) {
            enemy.begin_rotation(enemy_dir, &session.board);
        }
    }
    session.phase = TurnPhase::Resolving {
        player_settled: false,
    };
    session.emit(GameEvent::MoveAccepted { direction });
    log::debug!(
        "Move {} accepted (grid {}), move {}",
        direction.as_str(),
        grid.as_str(),
        session.state.move_count + 1
    );

    session.state.move_count += 1;
    if session.state.move_count >= session.state.next_obstacle_change {
        regenerate_obstacles(session);
    }
    true
}

/// Grid directions for every enemy that will roll this turn, by enemy index.
///
/// Each enemy decides against the pre-move snapshot, so two enemies may pick
/// the same empty cell; the battle resolver sorts that out once they land.
fn plan_enemy_moves<R: RandomSource>(session: &mut Session<R>) -> Vec<(usize, Direction)> {
    let snapshot: Vec<Position> = session.enemies.iter().map(|e| e.position).collect();

    let mut planned = Vec::new();
    for (i, enemy) in session.enemies.iter().enumerate() {
        let others: Vec<Position> = snapshot
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &p)| p)
            .collect();
        let Some(view) = ai::choose_direction(
            enemy,
            &session.player,
            &others,
            &session.board,
            &session.camera,
            &mut session.rng,
        ) else {
            continue;
        };
        let grid = session.camera.transform(view);
        if enemy.can_move(grid, &session.board) {
            planned.push((i, grid));
        }
    }
    planned
}

fn regenerate_obstacles<R: RandomSource>(session: &mut Session<R>) {
    let exclude = session.claimed_cells();
    session.board.regenerate_obstacles(&exclude, &mut session.rng);
    session.state.move_count = 0;
    session.state.next_obstacle_change = session.draw_obstacle_interval();
    log::info!(
        "Obstacles regenerated: {} placed, next change in {} moves",
        session.board.obstacles().len(),
        session.state.next_obstacle_change
    );
    let obstacles = session.board.obstacles().to_vec();
    session.emit(GameEvent::ObstaclesRegenerated { obstacles });
}

/// Advance the session by one fixed step
pub fn tick<R: RandomSource>(session: &mut Session<R>) {
    session.state.time_ticks += 1;
    session.camera.animate();

    match session.player.advance() {
        Some(Settle::Rolled(_)) => {
            if let TurnPhase::Resolving { .. } = session.phase {
                session.phase = TurnPhase::Resolving {
                    player_settled: true,
                };
            }
        }
        Some(Settle::Teleported(to)) => landed(session, CubeId::Player, to),
        None => {}
    }
    for i in 0..session.enemies.len() {
        if let Some(Settle::Teleported(to)) = session.enemies[i].advance() {
            landed(session, CubeId::Enemy(i), to);
        }
    }

    if session.phase == (TurnPhase::Resolving { player_settled: true }) && !session.is_busy() {
        settle_turn(session);
    }
}

fn landed<R: RandomSource>(session: &mut Session<R>, cube: CubeId, to: Position) {
    log::debug!("{:?} landed at ({}, {})", cube, to.x, to.y);
    session.emit(GameEvent::Teleported { cube, to });
}

fn settle_turn<R: RandomSource>(session: &mut Session<R>) {
    session.phase = TurnPhase::Idle;
    check_target(session);

    if let Some(report) = collision::resolve_battles(
        &mut session.player,
        &mut session.enemies,
        &session.board,
        &mut session.rng,
    ) {
        if let Outcome::Win { winner, loser, .. } = report.outcome {
            match (winner, loser) {
                (CubeId::Player, CubeId::Enemy(_)) => session.state.player_wins += 1,
                (CubeId::Enemy(_), CubeId::Player) => session.state.enemy_wins += 1,
                _ => {}
            }
        }
        session.emit(GameEvent::Battle(report));
    }

    session.emit(GameEvent::TurnCompleted);
}

/// Collect the cell under the player if it is the next number in sequence
fn check_target<R: RandomSource>(session: &mut Session<R>) {
    let pos = session.player.position;
    let bottom = session.player.bottom_value();
    let next = session.state.next_number();
    if bottom != next || !session.board.check_target(pos, next) {
        return;
    }

    session.state.collected.push(next);
    let count = session.state.collected_count();
    log::info!("Collected {} at ({}, {})", next, pos.x, pos.y);
    session.emit(GameEvent::CollectedCountChanged(count as u32));

    if count == session.board.target_cell_count() {
        session.state.active = false;
        log::info!(
            "All {} targets collected in {} ticks",
            count,
            session.state.time_ticks
        );
        session.emit(GameEvent::GameCompleted);
    }
}

/// Run whole fixed steps for `dt` seconds of frame time.
///
/// Frame time is capped at 0.1 s and at most [`MAX_SUBSTEPS`] steps run per
/// call. Returns the number of steps taken.
pub fn update<R: RandomSource>(session: &mut Session<R>, dt: f32) -> u32 {
    session.accumulator += dt.clamp(0.0, 0.1);

    let mut substeps = 0;
    while session.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        tick(session);
        session.accumulator -= SIM_DT;
        substeps += 1;
    }
    substeps
}
