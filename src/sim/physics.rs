//! Physics and collision core
//!
//! Motion constants are expressed per 60 Hz frame; the frame multiplier
//! rescales them for whatever time actually elapsed so the game plays the same
//! at any refresh rate.

use super::collision::{CollisionOutcome, actor_hits_obstacle, resolve_hit, within_radius};
use super::powers::Modifiers;
use super::state::{Actor, GameEvent, GameState};

/// Advance the frame clock and return this frame's multiplier
///
/// Elapsed time is clamped (tab switches) and exponentially smoothed so a
/// single late frame doesn't produce a visible lurch.
pub fn frame_multiplier(state: &mut GameState, now_ms: f64) -> f32 {
    let tuning = &state.tuning;
    let elapsed = match state.last_frame_ms {
        Some(last) => (now_ms - last).clamp(0.0, tuning.max_elapsed_ms),
        None => tuning.target_frame_ms,
    };
    state.last_frame_ms = Some(now_ms);

    let smoothed = match state.smoothed_elapsed_ms {
        Some(prev) => prev + (elapsed - prev) * state.frame_smoothing,
        None => elapsed,
    };
    state.smoothed_elapsed_ms = Some(smoothed);

    ((smoothed / tuning.target_frame_ms) as f32).clamp(0.0, tuning.max_frame_multiplier)
}

/// Apply a queued jump, then gravity, then move
///
/// The jump replaces velocity before gravity is added, so a jump frame ends
/// with `vel_y == jump_velocity + gravity * mult`.
pub fn integrate_actor(actor: &mut Actor, jump: bool, gravity: f32, jump_velocity: f32, mult: f32) {
    if jump {
        actor.vel_y = jump_velocity;
    }
    actor.vel_y += gravity * mult;
    actor.pos.y += actor.vel_y * mult;
}

/// Scroll obstacles, resolve hits and score passed pairs
///
/// Returns true if the actor took a fatal hit.
pub fn advance_obstacles(state: &mut GameState, modifiers: &Modifiers, mult: f32, now_ms: f64) -> bool {
    let dx = state.tuning.scroll_speed * modifiers.speed_multiplier * mult;

    for i in 0..state.obstacles.len() {
        state.obstacles[i].x -= dx;
        if state.obstacles[i].pending_removal {
            continue;
        }

        if actor_hits_obstacle(&state.actor, &state.obstacles[i], &state.tuning) {
            match resolve_hit(
                now_ms,
                state.invulnerable_until_ms,
                modifiers.invincible,
                &mut state.shop,
            ) {
                CollisionOutcome::Immune(_) => {}
                CollisionOutcome::Shielded => {
                    let pair = &mut state.obstacles[i];
                    pair.pending_removal = true;
                    log::info!("Shield absorbed hit, obstacle {} demolished", pair.id);
                    state.events.push(GameEvent::ShieldConsumed { obstacle_id: pair.id });
                    continue;
                }
                CollisionOutcome::Fatal => return true,
            }
        }

        let pair = &mut state.obstacles[i];
        if !pair.passed && pair.right() < state.actor.pos.x {
            pair.passed = true;
            state.score += 1;
            state.events.push(GameEvent::ObstaclePassed { score: state.score });
            if state.cadence.record_pass(&mut state.rng) {
                state.prompt_pending = true;
            }
        }
    }

    state
        .obstacles
        .retain(|p| !p.pending_removal && !p.is_offscreen());
    false
}

/// Scroll or home books and capture the ones the actor reaches
///
/// Returns how many books were collected this frame.
pub fn advance_books(state: &mut GameState, modifiers: &Modifiers, mult: f32, now_ms: f64) -> u32 {
    let dx = state.tuning.scroll_speed * modifiers.speed_multiplier * mult;
    let target = state.actor.center();
    let magnet = state.shop.magnet_delay_ms().is_some();
    let coins = state.tuning.book_coins * state.shop.reward_multiplier();
    let pull_step = state.tuning.magnet_pull_speed * mult;
    let canvas_width = state.tuning.canvas_width;
    let mut collected = 0;

    for book in state.books.iter_mut().filter(|b| !b.collected) {
        state.shop.observe_book(book, canvas_width, now_ms);

        if book.is_pulled() {
            let to_actor = target - book.center();
            let distance = to_actor.length();
            if distance <= pull_step {
                book.pos += to_actor;
            } else {
                book.pos += to_actor / distance * pull_step;
            }
        } else {
            book.pos.x -= dx;
        }

        let captured = if magnet {
            book.is_pulled()
                && within_radius(book.center(), target, state.tuning.magnet_capture_radius)
        } else {
            within_radius(book.center(), target, state.tuning.capture_radius)
        };

        if captured {
            book.collect();
            collected += 1;
            state.events.push(GameEvent::BookCollected { coins });
            state.prompt_pending = true;
        }
    }

    state
        .books
        .retain(|b| !b.collected && b.pos.x + b.size >= 0.0);
    collected
}
