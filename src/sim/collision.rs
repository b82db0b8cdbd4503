//! Collision predicates and the immunity rules applied to a hit
//!
//! Hitboxes are inset by generous margins so grazing an obstacle edge does not
//! end a run.

use glam::Vec2;

use super::shop::ShopOverlay;
use super::state::{Actor, ObstaclePair, Rect};
use crate::tuning::Tuning;

/// Why a hit was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Immunity {
    /// Grace window after resuming from a power prompt
    PostPrompt,
    /// Ghost shop power (run-start window)
    Ghost,
    /// Invincibility granted by an active run power
    Invincible,
}

/// Result of an actor/obstacle hit after immunity rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    Immune(Immunity),
    /// Shield absorbed the hit; the obstacle is demolished
    Shielded,
    Fatal,
}

/// Strict AABB overlap on both axes
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

/// Actor rectangle as used for obstacle hits
pub fn actor_hitbox(actor: &Actor, tuning: &Tuning) -> Rect {
    Rect {
        pos: actor.pos,
        size: actor.size,
    }
    .inset(tuning.actor_hitbox_margin)
}

/// Does the actor overlap either segment of the pair (margins applied)?
pub fn actor_hits_obstacle(actor: &Actor, pair: &ObstaclePair, tuning: &Tuning) -> bool {
    let hitbox = actor_hitbox(actor, tuning);
    let margin = tuning.obstacle_hitbox_margin;
    let top = pair.top_rect().inset(margin);
    let bottom = pair.bottom_rect(tuning.canvas_height).inset(margin);
    rects_overlap(&hitbox, &top) || rects_overlap(&hitbox, &bottom)
}

/// The actor is gone once it has fully left the canvas, not when it touches an edge
pub fn actor_out_of_bounds(actor: &Actor, canvas_height: f32) -> bool {
    actor.pos.y + actor.size.y < 0.0 || actor.pos.y > canvas_height
}

#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Apply the immunity rules, in precedence order, to a hit at `now_ms`
///
/// Consumes the shield when it is the only thing standing between the actor
/// and a game over.
pub fn resolve_hit(
    now_ms: f64,
    invulnerable_until_ms: f64,
    power_invincible: bool,
    shop: &mut ShopOverlay,
) -> CollisionOutcome {
    if now_ms < invulnerable_until_ms {
        CollisionOutcome::Immune(Immunity::PostPrompt)
    } else if shop.ghost_active(now_ms) {
        CollisionOutcome::Immune(Immunity::Ghost)
    } else if power_invincible {
        CollisionOutcome::Immune(Immunity::Invincible)
    } else if shop.consume_shield() {
        CollisionOutcome::Shielded
    } else {
        CollisionOutcome::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shop::{OwnedShopPower, ShopPowerId};

    fn pair_at(x: f32, gap_top: f32, gap_size: f32) -> ObstaclePair {
        ObstaclePair {
            id: 1,
            x,
            width: 60.0,
            gap_top,
            gap_size,
            passed: false,
            pending_removal: false,
        }
    }

    #[test]
    fn test_actor_inside_gap_is_safe() {
        let tuning = Tuning::default();
        let mut actor = Actor::new(&tuning);
        actor.pos.y = 200.0;
        let pair = pair_at(actor.pos.x - 10.0, 180.0, 170.0);
        assert!(!actor_hits_obstacle(&actor, &pair, &tuning));
    }

    #[test]
    fn test_margin_forgives_grazing() {
        let tuning = Tuning::default();
        let mut actor = Actor::new(&tuning);
        // Actor top 3px inside the top segment - within both margins
        let pair = pair_at(actor.pos.x, 200.0, 170.0);
        actor.pos.y = 197.0;
        assert!(!actor_hits_obstacle(&actor, &pair, &tuning));

        // Deep overlap is a hit
        actor.pos.y = 150.0;
        assert!(actor_hits_obstacle(&actor, &pair, &tuning));
    }

    #[test]
    fn test_bottom_segment_hit() {
        let tuning = Tuning::default();
        let mut actor = Actor::new(&tuning);
        let pair = pair_at(actor.pos.x, 100.0, 150.0);
        actor.pos.y = 260.0;
        assert!(actor_hits_obstacle(&actor, &pair, &tuning));
    }

    #[test]
    fn test_out_of_bounds_requires_full_exit() {
        let tuning = Tuning::default();
        let mut actor = Actor::new(&tuning);
        actor.pos.y = -actor.size.y; // bottom edge exactly at 0
        assert!(!actor_out_of_bounds(&actor, 600.0));
        actor.pos.y -= 0.1;
        assert!(actor_out_of_bounds(&actor, 600.0));

        actor.pos.y = 600.0;
        assert!(!actor_out_of_bounds(&actor, 600.0));
        actor.pos.y = 600.1;
        assert!(actor_out_of_bounds(&actor, 600.0));
    }

    #[test]
    fn test_immunity_precedence() {
        let mut shop = ShopOverlay::new(vec![
            OwnedShopPower::new(ShopPowerId::Ghost),
            OwnedShopPower::new(ShopPowerId::Shield),
        ]);
        shop.start_run(0.0);

        assert_eq!(
            resolve_hit(10.0, 100.0, true, &mut shop),
            CollisionOutcome::Immune(Immunity::PostPrompt)
        );
        assert_eq!(
            resolve_hit(200.0, 100.0, true, &mut shop),
            CollisionOutcome::Immune(Immunity::Ghost)
        );
        // Ghost window over
        assert_eq!(
            resolve_hit(60_000.0, 0.0, true, &mut shop),
            CollisionOutcome::Immune(Immunity::Invincible)
        );
        // None of the above - shield takes it once
        assert!(shop.shield_armed());
        assert_eq!(resolve_hit(60_000.0, 0.0, false, &mut shop), CollisionOutcome::Shielded);
        assert_eq!(resolve_hit(60_001.0, 0.0, false, &mut shop), CollisionOutcome::Fatal);
    }
}
