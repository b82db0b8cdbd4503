//! Idle/demo mode - a simple bot that plays the game
//!
//! Flaps whenever the actor sinks below the middle of the next gap and picks
//! the first beneficial power when a prompt opens.

use super::state::{GamePhase, GameState};
use super::tick::TickInput;

/// How far below the gap centre the actor may sink before flapping
const FLAP_SLACK: f32 = 12.0;
/// Further below than this, flap again before reaching the apex
const CLIMB_DISTANCE: f32 = 60.0;
/// Upward velocity at which a climbing bot flaps again
const CLIMB_REFLAP_VELOCITY: f32 = -2.0;

/// Input the bot would produce for the current state
pub fn autopilot_input(state: &GameState) -> TickInput {
    match &state.phase {
        GamePhase::NotStarted | GamePhase::WaitingForContinue => TickInput {
            trigger: true,
            choice: None,
        },
        GamePhase::Running => TickInput {
            trigger: wants_flap(state),
            choice: None,
        },
        GamePhase::PowerSelection { choices, .. } => TickInput {
            trigger: true,
            choice: Some(choices.iter().position(|c| c.beneficial).unwrap_or(0)),
        },
        // Demo runs stop at the first game over
        GamePhase::GameOver => TickInput::default(),
    }
}

fn wants_flap(state: &GameState) -> bool {
    let actor = &state.actor;
    let target_y = state
        .obstacles
        .iter()
        .filter(|p| !p.pending_removal && p.right() >= actor.pos.x)
        .min_by(|a, b| a.x.total_cmp(&b.x))
        .map(|p| p.gap_top + p.gap_size / 2.0)
        .unwrap_or(state.tuning.canvas_height / 2.0);

    let below = actor.center().y - target_y;
    if below > CLIMB_DISTANCE {
        actor.vel_y > CLIMB_REFLAP_VELOCITY
    } else {
        below > FLAP_SLACK && actor.vel_y >= 0.0
    }
}
