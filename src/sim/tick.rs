//! Frame tick - the game loop orchestrator
//!
//! One call per display frame. Input is interpreted according to the current
//! phase; only `Running` advances the world.

use super::physics::{advance_books, advance_obstacles, frame_multiplier, integrate_actor};
use super::collision::actor_out_of_bounds;
use super::spawner::{try_spawn_book, try_spawn_obstacle};
use super::state::{GameEvent, GamePhase, GameState};

/// Input gathered since the previous frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// The single logical action (tap / click / key)
    pub trigger: bool,
    /// Highlight a prompt option (index into the offered choices)
    pub choice: Option<usize>,
}

/// Advance the game by one display frame at host time `now_ms`
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64) {
    match &mut state.phase {
        GamePhase::NotStarted => {
            if input.trigger {
                state.start_run(now_ms);
                state.jump_queued = true;
            }
        }

        GamePhase::Running => {
            if input.trigger {
                state.jump_queued = true;
            }
            run_frame(state, now_ms);
        }

        GamePhase::PowerSelection {
            choices,
            highlighted,
        } => {
            if let Some(choice) = input.choice.filter(|&c| c < choices.len()) {
                *highlighted = choice;
            }
            if input.trigger {
                let def = choices[*highlighted];
                state.powers.activate(def, now_ms);
                state.cadence.reset(&mut state.rng);
                state.events.push(GameEvent::PowerActivated { name: def.name });
                state.phase = GamePhase::WaitingForContinue;
                log::info!("Power selected: {}", def.name);
            }
        }

        GamePhase::WaitingForContinue => {
            if input.trigger {
                resume(state, now_ms);
            }
        }

        GamePhase::GameOver => {
            if input.trigger && now_ms - state.game_over_ms >= state.tuning.restart_delay_ms {
                state.reset_run();
            }
        }
    }
}

/// Leave the prompt with a forced hop and a short grace window
fn resume(state: &mut GameState, now_ms: f64) {
    state.phase = GamePhase::Running;
    state.jump_queued = true;
    state.invulnerable_until_ms = now_ms + state.tuning.continue_grace_ms;
    state.spawn_suppressed_until_ms = now_ms + state.tuning.spawn_grace_ms;
    // Time spent on the prompt is not simulated
    state.last_frame_ms = Some(now_ms);
}

/// One `Running` frame: jump, integrate, terminate, spawn, collide, score
fn run_frame(state: &mut GameState, now_ms: f64) {
    let mult = frame_multiplier(state, now_ms);
    let jump = std::mem::take(&mut state.jump_queued);
    let (gravity, jump_velocity) = (state.tuning.gravity, state.tuning.jump_velocity);
    integrate_actor(&mut state.actor, jump, gravity, jump_velocity, mult);

    if actor_out_of_bounds(&state.actor, state.tuning.canvas_height) {
        end_run(state, now_ms);
        return;
    }

    let modifiers = state.powers.compute_modifiers(now_ms);
    try_spawn_obstacle(state, &modifiers, now_ms);
    try_spawn_book(state, now_ms);

    if advance_obstacles(state, &modifiers, mult, now_ms) {
        end_run(state, now_ms);
        return;
    }
    advance_books(state, &modifiers, mult, now_ms);

    if std::mem::take(&mut state.prompt_pending) {
        state.open_power_prompt();
    }
}

fn end_run(state: &mut GameState, now_ms: f64) {
    state.phase = GamePhase::GameOver;
    state.game_over_ms = now_ms;
    state.jump_queued = false;
    state.prompt_pending = false;
    state.best_score = state.best_score.max(state.score);
    state.events.push(GameEvent::RunEnded { score: state.score });
    log::info!("Run over - score {}", state.score);
}
