//! Shop powers - permanent purchases layered over the run's power engine
//!
//! Three flavours:
//! - passive checks straight from ownership (double points, magnet, lucky start)
//! - a run-start-relative window (ghost mode)
//! - a one-shot per run (shield)

use serde::{Deserialize, Serialize};

use super::state::Book;
use crate::consts::{GHOST_DURATION_MS, MAGNET_DELAY_MS};

/// Purchasable power identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopPowerId {
    Shield,
    Magnet,
    Ghost,
    DoublePoints,
    LuckyStart,
}

/// An owned shop power with its configured parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedShopPower {
    pub id: ShopPowerId,
    /// Ghost window length
    #[serde(default)]
    pub duration_ms: Option<f64>,
    /// Magnet pull delay
    #[serde(default)]
    pub delay_ms: Option<f64>,
}

impl OwnedShopPower {
    pub fn new(id: ShopPowerId) -> Self {
        Self {
            id,
            duration_ms: None,
            delay_ms: None,
        }
    }
}

/// Display entry for an owned shop power
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopPowerView {
    pub id: ShopPowerId,
    pub remaining_ms: Option<f64>,
}

/// Ownership plus per-run activation state
#[derive(Debug, Clone, Default)]
pub struct ShopOverlay {
    owned: Vec<OwnedShopPower>,
    run_started_ms: f64,
    shield_armed: bool,
}

impl ShopOverlay {
    pub fn new(owned: Vec<OwnedShopPower>) -> Self {
        Self {
            owned,
            ..Default::default()
        }
    }

    /// Replace the ownership list (read once per run from the shop)
    pub fn set_owned(&mut self, owned: Vec<OwnedShopPower>) {
        self.owned = owned;
    }

    pub fn owned(&self) -> &[OwnedShopPower] {
        &self.owned
    }

    pub fn owns(&self, id: ShopPowerId) -> bool {
        self.get(id).is_some()
    }

    fn get(&self, id: ShopPowerId) -> Option<&OwnedShopPower> {
        self.owned.iter().find(|p| p.id == id)
    }

    /// Re-arm run-start grants
    pub fn start_run(&mut self, now_ms: f64) {
        self.run_started_ms = now_ms;
        self.shield_armed = self.owns(ShopPowerId::Shield);
    }

    pub fn ghost_duration_ms(&self) -> Option<f64> {
        self.get(ShopPowerId::Ghost)
            .map(|p| p.duration_ms.unwrap_or(GHOST_DURATION_MS))
    }

    /// Ghost mode window, measured from run start
    pub fn ghost_active(&self, now_ms: f64) -> bool {
        self.ghost_duration_ms()
            .is_some_and(|d| now_ms >= self.run_started_ms && now_ms - self.run_started_ms < d)
    }

    pub fn shield_armed(&self) -> bool {
        self.shield_armed
    }

    /// Use up the shield; true if one was available
    pub fn consume_shield(&mut self) -> bool {
        std::mem::replace(&mut self.shield_armed, false)
    }

    pub fn double_points(&self) -> bool {
        self.owns(ShopPowerId::DoublePoints)
    }

    pub fn reward_multiplier(&self) -> u64 {
        if self.double_points() { 2 } else { 1 }
    }

    pub fn lucky_start(&self) -> bool {
        self.owns(ShopPowerId::LuckyStart)
    }

    pub fn magnet_delay_ms(&self) -> Option<f64> {
        self.get(ShopPowerId::Magnet)
            .map(|p| p.delay_ms.unwrap_or(MAGNET_DELAY_MS))
    }

    /// Magnet bookkeeping for one book; true when the book starts being pulled
    ///
    /// The delay runs from the first frame the book is on the canvas, so books
    /// spawned past the right edge aren't pulled before they can be seen.
    pub fn observe_book(&self, book: &mut Book, canvas_width: f32, now_ms: f64) -> bool {
        if book.collected {
            return false;
        }
        if book.first_seen_ms.is_none() && book.pos.x >= canvas_width {
            return false;
        }
        let first_seen = *book.first_seen_ms.get_or_insert(now_ms);

        let Some(delay) = self.magnet_delay_ms() else {
            return false;
        };
        if book.is_pulled() || now_ms - first_seen < delay {
            return false;
        }
        book.pull_started_ms = Some(now_ms);
        true
    }

    /// Owned powers that currently matter for the HUD
    pub fn views(&self, now_ms: f64) -> Vec<ShopPowerView> {
        self.owned
            .iter()
            .filter_map(|p| match p.id {
                ShopPowerId::Shield if !self.shield_armed => None,
                ShopPowerId::Ghost => {
                    let duration = self.ghost_duration_ms()?;
                    self.ghost_active(now_ms).then(|| ShopPowerView {
                        id: p.id,
                        remaining_ms: Some(self.run_started_ms + duration - now_ms),
                    })
                }
                _ => Some(ShopPowerView {
                    id: p.id,
                    remaining_ms: None,
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const CANVAS: f32 = 400.0;

    fn overlay(ids: &[ShopPowerId]) -> ShopOverlay {
        ShopOverlay::new(ids.iter().copied().map(OwnedShopPower::new).collect())
    }

    #[test]
    fn test_shield_is_one_shot_per_run() {
        let mut shop = overlay(&[ShopPowerId::Shield]);
        assert!(!shop.shield_armed());
        shop.start_run(0.0);
        assert!(shop.consume_shield());
        assert!(!shop.consume_shield());

        // Next run re-arms it
        shop.start_run(10_000.0);
        assert!(shop.shield_armed());
    }

    #[test]
    fn test_no_shield_without_purchase() {
        let mut shop = overlay(&[ShopPowerId::Magnet]);
        shop.start_run(0.0);
        assert!(!shop.consume_shield());
    }

    #[test]
    fn test_ghost_window_relative_to_run_start() {
        let mut shop = ShopOverlay::new(vec![OwnedShopPower {
            id: ShopPowerId::Ghost,
            duration_ms: Some(3_000.0),
            delay_ms: None,
        }]);
        shop.start_run(50_000.0);
        assert!(shop.ghost_active(50_000.0));
        assert!(shop.ghost_active(52_999.0));
        assert!(!shop.ghost_active(53_000.0));
        assert!(!shop.ghost_active(10.0));

        let views = shop.views(51_000.0);
        assert_eq!(views[0].remaining_ms, Some(2_000.0));
        assert!(shop.views(60_000.0).is_empty());
    }

    #[test]
    fn test_reward_multiplier() {
        assert_eq!(overlay(&[]).reward_multiplier(), 1);
        assert_eq!(overlay(&[ShopPowerId::DoublePoints]).reward_multiplier(), 2);
    }

    #[test]
    fn test_magnet_pulls_after_delay() {
        let shop = ShopOverlay::new(vec![OwnedShopPower {
            id: ShopPowerId::Magnet,
            duration_ms: None,
            delay_ms: Some(500.0),
        }]);
        let mut book = Book::new(1, Vec2::new(300.0, 100.0), 28.0);

        assert!(!shop.observe_book(&mut book, CANVAS, 1_000.0));
        assert_eq!(book.first_seen_ms, Some(1_000.0));
        assert!(!shop.observe_book(&mut book, CANVAS, 1_499.0));
        assert!(shop.observe_book(&mut book, CANVAS, 1_500.0));
        assert!(book.is_pulled());
        // Only flips once
        assert!(!shop.observe_book(&mut book, CANVAS, 1_600.0));
        assert_eq!(book.pull_started_ms, Some(1_500.0));
    }

    #[test]
    fn test_no_magnet_never_pulls() {
        let shop = overlay(&[]);
        let mut book = Book::new(1, Vec2::ZERO, 28.0);
        assert!(!shop.observe_book(&mut book, CANVAS, 0.0));
        assert!(!shop.observe_book(&mut book, CANVAS, 100_000.0));
        assert!(!book.is_pulled());
    }

    #[test]
    fn test_magnet_delay_waits_for_book_on_canvas() {
        let shop = ShopOverlay::new(vec![OwnedShopPower {
            id: ShopPowerId::Magnet,
            duration_ms: None,
            delay_ms: Some(500.0),
        }]);
        let mut book = Book::new(1, Vec2::new(CANVAS, 100.0), 28.0);

        // Spawned at the right edge, still off screen
        assert!(!shop.observe_book(&mut book, CANVAS, 0.0));
        assert_eq!(book.first_seen_ms, None);

        book.pos.x = CANVAS - 2.5;
        assert!(!shop.observe_book(&mut book, CANVAS, 300.0));
        assert_eq!(book.first_seen_ms, Some(300.0));
        assert!(!shop.observe_book(&mut book, CANVAS, 700.0));
        assert!(shop.observe_book(&mut book, CANVAS, 800.0));
    }
}
