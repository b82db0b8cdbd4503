//! Host-facing game session
//!
//! Owns the simulation and its collaborators. Input handlers queue actions,
//! the host calls [`Session::frame`] once per animation frame, and side
//! effects produced by the frame are dispatched after it has been presented.
//! In the browser they run as a spawned task; their results come back through
//! an inbox that the next frame applies.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use serde::Serialize;

use crate::collaborators::{AchievementInput, Collaborators};
use crate::consts::SWEEP_INTERVAL_MS;
use crate::error::CollaboratorError;
use crate::render::{RenderSink, RenderSnapshot};
use crate::settings::Settings;
use crate::sim::state::{GameEvent, GamePhase, GameState};
use crate::sim::tick::{TickInput, tick};

/// Advisory message for the player; never affects the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub service: &'static str,
    pub message: String,
}

impl From<&CollaboratorError> for Notification {
    fn from(err: &CollaboratorError) -> Self {
        Self {
            service: err.service(),
            message: err.to_string(),
        }
    }
}

/// Result of a side effect, applied to the session on the next frame
#[derive(Debug, Clone, PartialEq)]
enum Completion {
    Balance(u64),
    BestScore(u64),
    Failed(Notification),
}

/// Periodic power-expiry sweep, independent of the run phase
#[derive(Debug, Clone)]
pub struct SweepTimer {
    interval_ms: f64,
    next_due_ms: Option<f64>,
    armed: bool,
}

impl SweepTimer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            next_due_ms: None,
            armed: true,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.next_due_ms = None;
    }

    /// True when a sweep is due at `now_ms`
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if !self.armed {
            return false;
        }
        match self.next_due_ms {
            Some(due) if now_ms < due => false,
            _ => {
                self.next_due_ms = Some(now_ms + self.interval_ms);
                true
            }
        }
    }
}

/// One player's game, from first tap to teardown
pub struct Session {
    state: GameState,
    collaborators: Rc<RefCell<Collaborators>>,
    inbox: Rc<RefCell<Vec<Completion>>>,
    settings: Settings,
    pending: TickInput,
    notifications: Vec<Notification>,
    sweep: SweepTimer,
    character: Option<String>,
    balance: u64,
}

impl Session {
    pub fn new(settings: Settings, collaborators: Collaborators) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut state = GameState::new(seed, settings.tuning.clone());
        state.frame_smoothing = settings.frame_smoothing();
        let character = settings
            .character_id
            .clone()
            .or_else(|| collaborators.character.selected_character());
        let balance = collaborators.currency.balance();
        log::info!("Session created (seed {seed})");

        Self {
            state,
            collaborators: Rc::new(RefCell::new(collaborators)),
            inbox: Rc::new(RefCell::new(Vec::new())),
            settings,
            pending: TickInput::default(),
            notifications: Vec::new(),
            sweep: SweepTimer::new(SWEEP_INTERVAL_MS),
            character,
            balance,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn collaborators(&self) -> Ref<'_, Collaborators> {
        self.collaborators.borrow()
    }

    /// Last known coin balance
    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweep.is_armed()
    }

    /// Queue the single logical action (tap / click / key)
    pub fn trigger(&mut self) {
        self.pending.trigger = true;
    }

    /// Queue a highlight change on the power prompt
    pub fn choose(&mut self, index: usize) {
        self.pending.choice = Some(index);
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Run one display frame, present it, then hand its events to the collaborators
    pub fn frame(&mut self, now_ms: f64, sink: &mut dyn RenderSink) {
        self.apply_completions();

        if self.sweep.poll(now_ms) {
            let removed = self.state.powers.sweep_expired(now_ms);
            if removed > 0 {
                log::debug!("Swept {removed} expired powers");
            }
        }

        let input = std::mem::take(&mut self.pending);
        if input.trigger && self.state.phase == GamePhase::NotStarted {
            self.refresh_shop();
        }
        tick(&mut self.state, &input, now_ms);

        sink.present(&RenderSnapshot::capture(
            &self.state,
            now_ms,
            self.character.as_deref(),
        ));

        let outbox = self.state.drain_events();
        self.dispatch(outbox);
    }

    /// Tear down the session; no further sweeps run
    pub fn end(&mut self) {
        if self.sweep.is_armed() {
            self.sweep.disarm();
            log::debug!("Session ended");
        }
    }

    /// Ownership is read once per run, just before it starts
    fn refresh_shop(&mut self) {
        let owned = self.collaborators.borrow().shop.owned_powers();
        match owned {
            Ok(owned) => self.state.shop.set_owned(owned),
            Err(err) => {
                log::warn!("{err}");
                self.notifications.push(Notification::from(&err));
            }
        }
    }

    fn dispatch(&mut self, events: Vec<GameEvent>) {
        if events.is_empty() {
            return;
        }
        let collaborators = Rc::clone(&self.collaborators);
        let inbox = Rc::clone(&self.inbox);
        let character = self.character.clone();
        let job = move || {
            let completions =
                run_side_effects(&mut collaborators.borrow_mut(), events, character.as_deref());
            inbox.borrow_mut().extend(completions);
        };

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move { job() });

        #[cfg(not(target_arch = "wasm32"))]
        {
            job();
            self.apply_completions();
        }
    }

    fn apply_completions(&mut self) {
        let completions = std::mem::take(&mut *self.inbox.borrow_mut());
        for completion in completions {
            match completion {
                Completion::Balance(balance) => self.balance = balance,
                Completion::BestScore(best) => {
                    self.state.best_score = self.state.best_score.max(best);
                }
                Completion::Failed(notification) => self.notifications.push(notification),
            }
        }
    }
}

fn run_side_effects(
    collaborators: &mut Collaborators,
    events: Vec<GameEvent>,
    character: Option<&str>,
) -> Vec<Completion> {
    let mut done = Vec::new();
    for event in events {
        match event {
            GameEvent::BookCollected { coins } => match collaborators.currency.credit(coins) {
                Ok(balance) => done.push(Completion::Balance(balance)),
                Err(err) => done.push(failed(&err)),
            },
            GameEvent::RunEnded { score } => {
                finish_run(collaborators, score, character, &mut done);
            }
            GameEvent::ShieldConsumed { obstacle_id } => {
                log::info!("Shield absorbed obstacle {obstacle_id}");
            }
            other => log::debug!("Event: {other:?}"),
        }
    }
    done
}

fn finish_run(
    collaborators: &mut Collaborators,
    score: u64,
    character: Option<&str>,
    done: &mut Vec<Completion>,
) {
    match collaborators.stats.submit_run_result(score) {
        Ok(summary) => {
            done.push(Completion::BestScore(summary.best_score));
            if summary.is_new_best {
                log::info!("New personal best: {}", summary.best_score);
            }
            let input = AchievementInput {
                score,
                games_played: summary.total_games,
                high_score: summary.best_score,
            };
            if let Err(err) = collaborators.achievements.evaluate(&input) {
                done.push(failed(&err));
            }
        }
        Err(err) => done.push(failed(&err)),
    }

    match collaborators.leaderboard.submit_score(score, character) {
        Ok(true) => log::info!("New high score on the leaderboard: {score}"),
        Ok(false) => {}
        Err(err) => done.push(failed(&err)),
    }
}

fn failed(err: &CollaboratorError) -> Completion {
    log::warn!("{err}");
    Completion::Failed(Notification::from(err))
}

impl Drop for Session {
    fn drop(&mut self) {
        self.end();
    }
}
