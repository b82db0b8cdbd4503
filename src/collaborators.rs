//! External collaborators
//!
//! Persistence, leaderboard, achievements, currency and shop ownership live
//! outside the game core. The session only talks to them through these traits,
//! after a frame has committed, and never lets a failure reach the simulation.

use crate::error::CollaboratorError;
use crate::highscores::HighScores;
use crate::platform::wall_clock_ms;
use crate::sim::shop::OwnedShopPower;

/// Derived statistics returned after a run is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total_games: u64,
    pub best_score: u64,
    pub is_new_best: bool,
}

/// Inputs to achievement evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementInput {
    pub score: u64,
    pub games_played: u64,
    pub high_score: u64,
}

pub trait StatsService {
    fn submit_run_result(&mut self, score: u64) -> Result<RunSummary, CollaboratorError>;
}

pub trait LeaderboardService {
    /// Returns whether the score is a new high score
    fn submit_score(
        &mut self,
        score: u64,
        character: Option<&str>,
    ) -> Result<bool, CollaboratorError>;
}

pub trait AchievementService {
    fn evaluate(&mut self, input: &AchievementInput) -> Result<(), CollaboratorError>;
}

pub trait CurrencyService {
    /// Add coins, returning the new balance
    fn credit(&mut self, amount: u64) -> Result<u64, CollaboratorError>;
    fn balance(&self) -> u64;
}

pub trait ShopService {
    fn owned_powers(&self) -> Result<Vec<OwnedShopPower>, CollaboratorError>;
}

pub trait CharacterService {
    /// Opaque visual identifier, no gameplay effect
    fn selected_character(&self) -> Option<String>;
}

/// Everything a session dispatches to
pub struct Collaborators {
    pub stats: Box<dyn StatsService>,
    pub leaderboard: Box<dyn LeaderboardService>,
    pub achievements: Box<dyn AchievementService>,
    pub currency: Box<dyn CurrencyService>,
    pub shop: Box<dyn ShopService>,
    pub character: Box<dyn CharacterService>,
}

impl Collaborators {
    /// In-memory implementations for offline play and tests
    pub fn local() -> Self {
        Self {
            stats: Box::new(LocalStats::default()),
            leaderboard: Box::new(LocalLeaderboard::default()),
            achievements: Box::new(LoggingAchievements::default()),
            currency: Box::new(Wallet::default()),
            shop: Box::new(FixedShop::default()),
            character: Box::new(FixedCharacter::default()),
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::local()
    }
}

/// Run counters kept in memory
#[derive(Debug, Clone, Default)]
pub struct LocalStats {
    pub total_games: u64,
    pub best_score: u64,
}

impl StatsService for LocalStats {
    fn submit_run_result(&mut self, score: u64) -> Result<RunSummary, CollaboratorError> {
        self.total_games += 1;
        let is_new_best = score > self.best_score;
        self.best_score = self.best_score.max(score);
        Ok(RunSummary {
            total_games: self.total_games,
            best_score: self.best_score,
            is_new_best,
        })
    }
}

/// Leaderboard on the local top-10 table
#[derive(Debug, Clone, Default)]
pub struct LocalLeaderboard {
    pub scores: HighScores,
    /// Write through to storage after each accepted score
    pub persist: bool,
}

impl LocalLeaderboard {
    /// Table loaded from storage, saved on every new entry
    pub fn persistent() -> Self {
        Self {
            scores: HighScores::load(),
            persist: true,
        }
    }
}

impl LeaderboardService for LocalLeaderboard {
    fn submit_score(
        &mut self,
        score: u64,
        character: Option<&str>,
    ) -> Result<bool, CollaboratorError> {
        let previous_top = self.scores.top_score();
        let Some(rank) = self.scores.add_score(score, character, wall_clock_ms()) else {
            return Ok(false);
        };
        log::debug!("Leaderboard rank {rank} for score {score}");
        if self.persist {
            self.scores.save();
        }
        Ok(previous_top.is_none_or(|top| score > top))
    }
}

/// Achievement evaluation that only logs milestones
#[derive(Debug, Clone, Default)]
pub struct LoggingAchievements {
    pub evaluated: Vec<AchievementInput>,
}

impl AchievementService for LoggingAchievements {
    fn evaluate(&mut self, input: &AchievementInput) -> Result<(), CollaboratorError> {
        if input.score > 0 && input.score == input.high_score {
            log::info!("Achievement check: new personal best {}", input.score);
        }
        if input.games_played > 0 && input.games_played % 10 == 0 {
            log::info!("Achievement check: {} games played", input.games_played);
        }
        self.evaluated.push(*input);
        Ok(())
    }
}

/// Coin balance kept in memory
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    balance: u64,
}

impl Wallet {
    pub fn with_balance(balance: u64) -> Self {
        Self { balance }
    }
}

impl CurrencyService for Wallet {
    fn credit(&mut self, amount: u64) -> Result<u64, CollaboratorError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| CollaboratorError::rejected("currency", "balance overflow"))?;
        Ok(self.balance)
    }

    fn balance(&self) -> u64 {
        self.balance
    }
}

/// Shop with a fixed set of owned powers
#[derive(Debug, Clone, Default)]
pub struct FixedShop {
    pub owned: Vec<OwnedShopPower>,
}

impl ShopService for FixedShop {
    fn owned_powers(&self) -> Result<Vec<OwnedShopPower>, CollaboratorError> {
        Ok(self.owned.clone())
    }
}

/// Character selection fixed at construction
#[derive(Debug, Clone, Default)]
pub struct FixedCharacter {
    pub id: Option<String>,
}

impl CharacterService for FixedCharacter {
    fn selected_character(&self) -> Option<String> {
        self.id.clone()
    }
}
