//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads goes through [`Tuning`] so a
//! settings file can rebalance the game without a rebuild. Missing fields fall
//! back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Canvas ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Frame timing ===
    pub target_frame_ms: f64,
    pub max_elapsed_ms: f64,
    pub frame_smoothing: f64,
    pub touch_frame_smoothing: f64,
    pub max_frame_multiplier: f32,

    // === Actor ===
    pub actor_x: f32,
    pub actor_start_y: f32,
    pub actor_width: f32,
    pub actor_height: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub actor_hitbox_margin: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    pub obstacle_hitbox_margin: f32,
    pub scroll_speed: f32,
    pub base_gap: f32,
    pub min_gap: f32,
    pub gap_top_margin: f32,
    pub gap_bottom_margin: f32,
    pub spawn_interval_ms: f64,
    pub min_obstacle_spacing: f32,

    // === Books ===
    pub book_size: f32,
    pub book_chance: f64,
    pub book_jitter: f32,
    pub book_interval_ms: f64,
    pub book_spawn_chance: f64,
    pub book_window: f32,
    pub band_padding: f32,
    pub band_margin: f32,
    pub capture_radius: f32,
    pub magnet_capture_radius: f32,
    pub magnet_pull_speed: f32,
    pub book_coins: u64,

    // === Grace windows ===
    pub continue_grace_ms: f64,
    pub spawn_grace_ms: f64,
    pub restart_delay_ms: f64,

    // === Power prompts ===
    pub selection_min: u32,
    pub selection_max: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            target_frame_ms: TARGET_FRAME_MS,
            max_elapsed_ms: MAX_ELAPSED_MS,
            frame_smoothing: FRAME_SMOOTHING,
            touch_frame_smoothing: TOUCH_FRAME_SMOOTHING,
            max_frame_multiplier: MAX_FRAME_MULTIPLIER,

            actor_x: ACTOR_X,
            actor_start_y: ACTOR_START_Y,
            actor_width: ACTOR_WIDTH,
            actor_height: ACTOR_HEIGHT,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            actor_hitbox_margin: ACTOR_HITBOX_MARGIN,

            obstacle_width: OBSTACLE_WIDTH,
            obstacle_hitbox_margin: OBSTACLE_HITBOX_MARGIN,
            scroll_speed: SCROLL_SPEED,
            base_gap: BASE_GAP,
            min_gap: MIN_GAP,
            gap_top_margin: GAP_TOP_MARGIN,
            gap_bottom_margin: GAP_BOTTOM_MARGIN,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            min_obstacle_spacing: MIN_OBSTACLE_SPACING,

            book_size: BOOK_SIZE,
            book_chance: BOOK_CHANCE,
            book_jitter: BOOK_JITTER,
            book_interval_ms: BOOK_INTERVAL_MS,
            book_spawn_chance: BOOK_SPAWN_CHANCE,
            book_window: BOOK_WINDOW,
            band_padding: BAND_PADDING,
            band_margin: BAND_MARGIN,
            capture_radius: CAPTURE_RADIUS,
            magnet_capture_radius: MAGNET_CAPTURE_RADIUS,
            magnet_pull_speed: MAGNET_PULL_SPEED,
            book_coins: BOOK_COINS,

            continue_grace_ms: CONTINUE_GRACE_MS,
            spawn_grace_ms: SPAWN_GRACE_MS,
            restart_delay_ms: RESTART_DELAY_MS,

            selection_min: SELECTION_MIN,
            selection_max: SELECTION_MAX,
        }
    }
}

impl Tuning {
    /// Reject values the simulation cannot clamp its way out of
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        }

        if self.canvas_width <= 0.0 || self.canvas_height <= 0.0 {
            return invalid("canvas", "dimensions must be positive");
        }
        if self.target_frame_ms <= 0.0 {
            return invalid("target_frame_ms", "must be positive");
        }
        if !(0.0..=1.0).contains(&self.frame_smoothing)
            || !(0.0..=1.0).contains(&self.touch_frame_smoothing)
        {
            return invalid("frame_smoothing", "must be within 0..=1");
        }
        if self.min_gap <= 0.0 {
            return invalid("min_gap", "must be positive");
        }
        if self.min_gap > self.canvas_height {
            return invalid("min_gap", "must fit inside the canvas");
        }
        if self.spawn_interval_ms <= 0.0 {
            return invalid("spawn_interval_ms", "must be positive");
        }
        if self.selection_min == 0 || self.selection_min > self.selection_max {
            return invalid("selection_min", "must be >= 1 and <= selection_max");
        }
        if !(0.0..=1.0).contains(&self.book_chance) || !(0.0..=1.0).contains(&self.book_spawn_chance)
        {
            return invalid("book_chance", "probabilities must be within 0..=1");
        }
        Ok(())
    }
}
