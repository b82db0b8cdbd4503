//! Game state and core simulation types
//!
//! Everything the frame loop reads or writes lives in [`GameState`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::{PowerDef, draw_choices};
use super::powers::{PowerEngine, SelectionCadence};
use super::shop::ShopOverlay;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, PartialEq)]
pub enum GamePhase {
    /// Waiting for the first trigger
    NotStarted,
    /// Active gameplay - the only phase in which the world advances
    Running,
    /// Frozen while the player picks one of the offered powers
    PowerSelection {
        choices: Vec<&'static PowerDef>,
        highlighted: usize,
    },
    /// Power picked; the next trigger resumes with a jump
    WaitingForContinue,
    /// Run ended
    GameOver,
}

impl GamePhase {
    pub fn is_running(&self) -> bool {
        matches!(self, GamePhase::Running)
    }

    /// Short name for logs and render snapshots
    pub fn label(&self) -> &'static str {
        match self {
            GamePhase::NotStarted => "not_started",
            GamePhase::Running => "running",
            GamePhase::PowerSelection { .. } => "power_selection",
            GamePhase::WaitingForContinue => "waiting_for_continue",
            GamePhase::GameOver => "game_over",
        }
    }
}

/// The player-controlled flyer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel_y: f32,
}

impl Actor {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.actor_x, tuning.actor_start_y),
            size: Vec2::new(tuning.actor_width, tuning.actor_height),
            vel_y: 0.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Axis-aligned rectangle (top-left + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Shrink by `margin` on every side (never below zero size)
    pub fn inset(&self, margin: f32) -> Self {
        let margin = margin.min(self.size.x / 2.0).min(self.size.y / 2.0).max(0.0);
        Self {
            pos: self.pos + Vec2::splat(margin),
            size: self.size - Vec2::splat(margin * 2.0),
        }
    }
}

/// A top/bottom obstacle pair sharing an x position and a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstaclePair {
    pub id: u32,
    /// Left edge
    pub x: f32,
    pub width: f32,
    /// Y where the gap starts (height of the top segment)
    pub gap_top: f32,
    pub gap_size: f32,
    /// Already scored
    pub passed: bool,
    /// Demolished by a shield; pruned at the end of the frame
    pub pending_removal: bool,
}

impl ObstaclePair {
    pub fn gap_bottom(&self) -> f32 {
        self.gap_top + self.gap_size
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, self.width, self.gap_top.max(0.0))
    }

    pub fn bottom_rect(&self, canvas_height: f32) -> Rect {
        let y = self.gap_bottom();
        Rect::new(self.x, y, self.width, (canvas_height - y).max(0.0))
    }

    pub fn is_offscreen(&self) -> bool {
        self.right() < 0.0
    }
}

/// A collectible book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    pub collected: bool,
    /// When the frame loop first saw this book (magnet delay)
    pub first_seen_ms: Option<f64>,
    /// Set once a magnet starts pulling the book in
    pub pull_started_ms: Option<f64>,
}

impl Book {
    pub fn new(id: u32, pos: Vec2, size: f32) -> Self {
        Self {
            id,
            pos,
            size,
            collected: false,
            first_seen_ms: None,
            pull_started_ms: None,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn is_pulled(&self) -> bool {
        self.pull_started_ms.is_some()
    }

    /// Mark collected; permanent
    pub fn collect(&mut self) {
        self.collected = true;
    }
}

/// Side effects produced by a frame, dispatched after it commits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    RunStarted,
    ObstaclePassed { score: u64 },
    BookCollected { coins: u64 },
    ShieldConsumed { obstacle_id: u32 },
    PowerPromptOpened,
    PowerActivated { name: &'static str },
    RunEnded { score: u64 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed of the current RNG stream
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,

    pub actor: Actor,
    /// Insertion (spawn) order
    pub obstacles: Vec<ObstaclePair>,
    pub books: Vec<Book>,

    pub powers: PowerEngine,
    pub cadence: SelectionCadence,
    pub shop: ShopOverlay,

    pub score: u64,
    /// Best score reported by the stats collaborator (cached)
    pub best_score: u64,
    pub run_started_ms: f64,
    pub last_frame_ms: Option<f64>,
    /// Smoothed elapsed time between frames
    pub smoothed_elapsed_ms: Option<f64>,
    pub frame_smoothing: f64,
    pub game_over_ms: f64,
    /// Collisions ignored until this time (granted after a power prompt)
    pub invulnerable_until_ms: f64,
    /// No new obstacles until this time
    pub spawn_suppressed_until_ms: f64,
    pub last_spawn_ms: f64,
    pub last_book_roll_ms: f64,

    /// Jump queued by input, applied at the start of the next frame
    pub jump_queued: bool,
    /// A power prompt is owed at the end of this frame
    pub prompt_pending: bool,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let cadence = SelectionCadence::new(&mut rng, tuning.selection_min, tuning.selection_max);
        Self {
            seed,
            rng,
            actor: Actor::new(&tuning),
            frame_smoothing: tuning.frame_smoothing,
            tuning,
            phase: GamePhase::NotStarted,
            obstacles: Vec::new(),
            books: Vec::new(),
            powers: PowerEngine::new(),
            cadence,
            shop: ShopOverlay::default(),
            score: 0,
            best_score: 0,
            run_started_ms: 0.0,
            last_frame_ms: None,
            smoothed_elapsed_ms: None,
            game_over_ms: 0.0,
            invulnerable_until_ms: 0.0,
            spawn_suppressed_until_ms: 0.0,
            last_spawn_ms: 0.0,
            last_book_roll_ms: 0.0,
            jump_queued: false,
            prompt_pending: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Put everything a run touches back to its starting values
    ///
    /// Best score, shop ownership and the RNG stream survive.
    pub fn reset_run(&mut self) {
        self.actor = Actor::new(&self.tuning);
        self.obstacles.clear();
        self.books.clear();
        self.powers.clear();
        self.cadence = SelectionCadence::new(
            &mut self.rng,
            self.tuning.selection_min,
            self.tuning.selection_max,
        );
        self.score = 0;
        self.phase = GamePhase::NotStarted;
        self.last_frame_ms = None;
        self.smoothed_elapsed_ms = None;
        self.invulnerable_until_ms = 0.0;
        self.spawn_suppressed_until_ms = 0.0;
        self.jump_queued = false;
        self.prompt_pending = false;
    }

    /// Begin a run at `now_ms`
    pub fn start_run(&mut self, now_ms: f64) {
        self.reset_run();
        self.run_started_ms = now_ms;
        self.last_spawn_ms = now_ms;
        self.last_book_roll_ms = now_ms;
        self.last_frame_ms = Some(now_ms);
        self.shop.start_run(now_ms);
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::RunStarted);
        log::info!("Run started (seed {})", self.seed);
    }

    /// Freeze the world and offer three powers
    pub fn open_power_prompt(&mut self) {
        let choices = draw_choices(&mut self.rng, self.shop.lucky_start());
        if choices.is_empty() {
            return;
        }
        self.phase = GamePhase::PowerSelection {
            choices,
            highlighted: 0,
        };
        self.events.push(GameEvent::PowerPromptOpened);
    }

    /// Take all side effects produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
