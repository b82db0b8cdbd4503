//! Book Flap - A side-scrolling flap-through-the-gaps arcade game
//!
//! Core modules:
//! - `sim`: Simulation (physics, spawning, collisions, power-ups, game loop)
//! - `session`: Host-facing driver (input queue, power sweep, deferred side effects)
//! - `collaborators`: Stats/leaderboard/currency/shop boundaries
//! - `render`: Read-only frame snapshots and asset lookup
//! - `platform`: Logging setup, wall clock and browser bindings
//! - `tuning`: Data-driven game balance

pub mod collaborators;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{CollaboratorError, ConfigError};
pub use highscores::HighScores;
pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Frame duration the physics constants are expressed against (60 Hz)
    pub const TARGET_FRAME_MS: f64 = 1000.0 / 60.0;
    /// Longest elapsed time a single frame may integrate (tab-switch guard)
    pub const MAX_ELAPSED_MS: f64 = 100.0;
    /// Weight of the newest elapsed sample in the frame-time smoother
    pub const FRAME_SMOOTHING: f64 = 0.5;
    /// Touch platforms smooth harder to hide tap jitter
    pub const TOUCH_FRAME_SMOOTHING: f64 = 0.25;
    /// Upper bound on the frame multiplier
    pub const MAX_FRAME_MULTIPLIER: f32 = 3.0;

    /// Canvas dimensions
    pub const CANVAS_WIDTH: f32 = 400.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Actor defaults
    pub const ACTOR_X: f32 = 80.0;
    pub const ACTOR_START_Y: f32 = 200.0;
    pub const ACTOR_WIDTH: f32 = 34.0;
    pub const ACTOR_HEIGHT: f32 = 24.0;

    /// Gravity (pixels per target frame, squared)
    pub const GRAVITY: f32 = 0.5;
    /// Velocity set by a jump (negative is up)
    pub const JUMP_VELOCITY: f32 = -8.0;

    /// Hitbox insets - generous so near misses feel fair
    pub const ACTOR_HITBOX_MARGIN: f32 = 6.0;
    pub const OBSTACLE_HITBOX_MARGIN: f32 = 4.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 60.0;
    pub const SCROLL_SPEED: f32 = 2.5;
    pub const BASE_GAP: f32 = 170.0;
    pub const MIN_GAP: f32 = 110.0;
    pub const GAP_TOP_MARGIN: f32 = 60.0;
    pub const GAP_BOTTOM_MARGIN: f32 = 60.0;
    pub const SPAWN_INTERVAL_MS: f64 = 1600.0;
    pub const MIN_OBSTACLE_SPACING: f32 = 150.0;

    /// Book (collectible) defaults
    pub const BOOK_SIZE: f32 = 28.0;
    pub const BOOK_CHANCE: f64 = 0.15;
    pub const BOOK_JITTER: f32 = 30.0;
    pub const BOOK_INTERVAL_MS: f64 = 3500.0;
    pub const BOOK_SPAWN_CHANCE: f64 = 0.5;
    pub const BOOK_WINDOW: f32 = 120.0;
    pub const BAND_PADDING: f32 = 20.0;
    pub const BAND_MARGIN: f32 = 40.0;
    pub const CAPTURE_RADIUS: f32 = 30.0;
    pub const MAGNET_CAPTURE_RADIUS: f32 = 16.0;
    pub const MAGNET_PULL_SPEED: f32 = 6.0;
    pub const BOOK_COINS: u64 = 1;

    /// Grace windows
    pub const CONTINUE_GRACE_MS: f64 = 1500.0;
    pub const SPAWN_GRACE_MS: f64 = 1200.0;
    pub const RESTART_DELAY_MS: f64 = 600.0;

    /// Obstacles passed between power prompts (inclusive range)
    pub const SELECTION_MIN: u32 = 10;
    pub const SELECTION_MAX: u32 = 15;

    /// Expired power sweep period
    pub const SWEEP_INTERVAL_MS: f64 = 100.0;

    /// Shop power defaults
    pub const GHOST_DURATION_MS: f64 = 5000.0;
    pub const MAGNET_DELAY_MS: f64 = 600.0;
}
