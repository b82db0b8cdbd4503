//! Power engine - active run powers, stacking, expiry and composition
//!
//! Each frame the active set is folded into a single [`Modifiers`] value the
//! physics and spawner read from.

use rand::Rng;
use serde::Serialize;

use super::catalog::{PowerDef, PowerId};

/// A power that has been activated this run
#[derive(Debug, Clone)]
pub struct ActivePower {
    pub def: &'static PowerDef,
    pub activated_at_ms: f64,
    /// `None` for powers that last the whole run
    pub expires_at_ms: Option<f64>,
    /// Times activated without expiring (>= 1)
    pub stack_count: u32,
}

impl ActivePower {
    fn new(def: &'static PowerDef, now_ms: f64) -> Self {
        Self {
            def,
            activated_at_ms: now_ms,
            expires_at_ms: def.effect.duration_ms.map(|d| now_ms + d),
            stack_count: 1,
        }
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.expires_at_ms.is_some_and(|t| t <= now_ms)
    }

    pub fn remaining_ms(&self, now_ms: f64) -> Option<f64> {
        self.expires_at_ms.map(|t| (t - now_ms).max(0.0))
    }

    fn view(&self, now_ms: f64) -> ActivePowerView {
        ActivePowerView {
            id: self.def.id,
            name: self.def.name,
            beneficial: self.def.beneficial,
            stack_count: self.stack_count,
            remaining_ms: self.remaining_ms(now_ms),
        }
    }
}

/// Display entry for an active power
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivePowerView {
    pub id: PowerId,
    pub name: &'static str,
    pub beneficial: bool,
    pub stack_count: u32,
    pub remaining_ms: Option<f64>,
}

/// Effective parameters for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Modifiers {
    pub speed_multiplier: f32,
    pub gap_multiplier: f32,
    pub invincible: bool,
    /// Obstacle spam is active (spawn interval halved)
    pub spam: bool,
    pub active: Vec<ActivePowerView>,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            gap_multiplier: 1.0,
            invincible: false,
            spam: false,
            active: Vec::new(),
        }
    }
}

/// What [`PowerEngine::activate`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Added,
    Stacked(u32),
    Replaced,
    /// Reset power cleared the active set
    Cleared,
}

/// The set of powers active during a run
#[derive(Debug, Clone, Default)]
pub struct PowerEngine {
    active: Vec<ActivePower>,
}

impl PowerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[ActivePower] {
        &self.active
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn is_active(&self, id: PowerId, now_ms: f64) -> bool {
        self.active
            .iter()
            .any(|p| p.def.id == id && !p.is_expired(now_ms))
    }

    pub fn stack_count(&self, id: PowerId, now_ms: f64) -> u32 {
        self.active
            .iter()
            .find(|p| p.def.id == id && !p.is_expired(now_ms))
            .map_or(0, |p| p.stack_count)
    }

    /// Activate a power at `now_ms`
    pub fn activate(&mut self, def: &'static PowerDef, now_ms: f64) -> Activation {
        if def.id == PowerId::Reset {
            self.active.clear();
            log::debug!("Reset power cleared all active powers");
            return Activation::Cleared;
        }

        // An instance that ran out but hasn't been swept yet doesn't count
        self.active
            .retain(|p| !(p.def.id == def.id && p.is_expired(now_ms)));

        let Some(index) = self.active.iter().position(|p| p.def.id == def.id) else {
            self.active.push(ActivePower::new(def, now_ms));
            log::debug!("Activated {}", def.name);
            return Activation::Added;
        };
        let existing = &mut self.active[index];

        if def.is_stackable() {
            existing.stack_count += 1;
            existing.activated_at_ms = now_ms;
            existing.expires_at_ms = def.effect.duration_ms.map(|d| now_ms + d);
            log::debug!("Stacked {} x{}", def.name, existing.stack_count);
            Activation::Stacked(existing.stack_count)
        } else {
            *existing = ActivePower::new(def, now_ms);
            log::debug!("Refreshed {}", def.name);
            Activation::Replaced
        }
    }

    /// Drop every power whose expiry has passed; returns how many were removed
    pub fn sweep_expired(&mut self, now_ms: f64) -> usize {
        let before = self.active.len();
        self.active.retain(|p| !p.is_expired(now_ms));
        before - self.active.len()
    }

    /// Fold the active set into this frame's parameters
    pub fn compute_modifiers(&self, now_ms: f64) -> Modifiers {
        let mut modifiers = Modifiers::default();

        for power in self.active.iter().filter(|p| !p.is_expired(now_ms)) {
            let effect = &power.def.effect;
            if let Some(speed) = effect.speed_multiplier {
                modifiers.speed_multiplier *= speed.powi(power.stack_count as i32);
            }
            // Gap effects count once per identifier
            if let Some(gap) = effect.gap_multiplier {
                modifiers.gap_multiplier *= gap;
            }
            modifiers.invincible |= effect.invincible;
            modifiers.spam |= power.def.id == PowerId::Spam;
            modifiers.active.push(power.view(now_ms));
        }

        modifiers
    }
}

/// Decides when the next power prompt opens (every N obstacles passed)
#[derive(Debug, Clone)]
pub struct SelectionCadence {
    min: u32,
    max: u32,
    passed: u32,
    threshold: u32,
}

impl SelectionCadence {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> Self {
        let max = max.max(min);
        Self {
            min,
            max,
            passed: 0,
            threshold: rng.random_range(min..=max),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn passed(&self) -> u32 {
        self.passed
    }

    /// Start counting again after a power has been picked, whatever opened the prompt
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.passed = 0;
        self.threshold = rng.random_range(self.min..=self.max);
    }

    /// Count one obstacle; true when a prompt is due (and the threshold re-rolls)
    pub fn record_pass<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.passed += 1;
        if self.passed < self.threshold {
            return false;
        }
        self.reset(rng);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::lookup;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_stacking_speed_compounds() {
        let mut engine = PowerEngine::new();
        let turbo = lookup(PowerId::Turbo);

        for n in 1..=3u32 {
            engine.activate(turbo, n as f64 * 100.0);
            assert_eq!(engine.stack_count(PowerId::Turbo, 300.0), n);
        }
        let mods = engine.compute_modifiers(300.0);
        assert!((mods.speed_multiplier - 1.25f32.powi(3)).abs() < 1e-5);
        assert_eq!(engine.active().len(), 1);
    }

    #[test]
    fn test_restack_refreshes_expiry() {
        let mut engine = PowerEngine::new();
        let slow = lookup(PowerId::SlowMotion);
        engine.activate(slow, 0.0);
        engine.activate(slow, 8_000.0);

        let power = &engine.active()[0];
        assert_eq!(power.activated_at_ms, 8_000.0);
        assert_eq!(power.expires_at_ms, Some(18_000.0));
        assert!(engine.is_active(PowerId::SlowMotion, 12_000.0));
    }

    #[test]
    fn test_beneficial_gap_replaces() {
        let mut engine = PowerEngine::new();
        let wide = lookup(PowerId::WideGap);
        assert_eq!(engine.activate(wide, 0.0), Activation::Added);
        assert_eq!(engine.activate(wide, 1_000.0), Activation::Replaced);

        assert_eq!(engine.active().len(), 1);
        assert_eq!(engine.stack_count(PowerId::WideGap, 1_000.0), 1);
        let mods = engine.compute_modifiers(1_000.0);
        assert!((mods.gap_multiplier - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_gap_multipliers_multiply_across_powers() {
        let mut engine = PowerEngine::new();
        engine.activate(lookup(PowerId::WideGap), 0.0);
        engine.activate(lookup(PowerId::NarrowGap), 0.0);
        engine.activate(lookup(PowerId::NarrowGap), 0.0);

        let mods = engine.compute_modifiers(10.0);
        // Narrow gap stacked twice still contributes once
        assert!((mods.gap_multiplier - 1.3 * 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_sweep_expired() {
        let mut engine = PowerEngine::new();
        engine.activate(lookup(PowerId::Invincibility), 0.0); // 5s
        engine.activate(lookup(PowerId::Tailwind), 0.0); // permanent

        assert_eq!(engine.sweep_expired(4_999.0), 0);
        assert!(engine.compute_modifiers(4_999.0).invincible);
        assert_eq!(engine.sweep_expired(5_000.0), 1);
        assert_eq!(engine.active().len(), 1);
        assert_eq!(engine.sweep_expired(1e9), 0);
        assert!(engine.is_active(PowerId::Tailwind, 1e9));
    }

    #[test]
    fn test_expired_but_unswept_is_ignored() {
        let mut engine = PowerEngine::new();
        engine.activate(lookup(PowerId::Turbo), 0.0);
        let mods = engine.compute_modifiers(20_000.0);
        assert_eq!(mods.speed_multiplier, 1.0);
        assert!(mods.active.is_empty());

        // Re-activating after expiry starts a fresh stack
        assert_eq!(engine.activate(lookup(PowerId::Turbo), 20_000.0), Activation::Added);
        assert_eq!(engine.stack_count(PowerId::Turbo, 20_000.0), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut engine = PowerEngine::new();
        engine.activate(lookup(PowerId::Turbo), 0.0);
        engine.activate(lookup(PowerId::WideGap), 0.0);
        assert_eq!(engine.activate(lookup(PowerId::Reset), 10.0), Activation::Cleared);
        assert!(engine.active().is_empty());
        assert_eq!(engine.compute_modifiers(10.0), Modifiers::default());
    }

    #[test]
    fn test_spam_flag() {
        let mut engine = PowerEngine::new();
        engine.activate(lookup(PowerId::Spam), 0.0);
        assert!(engine.compute_modifiers(1.0).spam);
    }

    #[test]
    fn test_selection_cadence() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut cadence = SelectionCadence::new(&mut rng, 10, 15);
        for _ in 0..50 {
            let threshold = cadence.threshold();
            assert!((10..=15).contains(&threshold));
            for _ in 1..threshold {
                assert!(!cadence.record_pass(&mut rng));
            }
            assert!(cadence.record_pass(&mut rng));
            assert_eq!(cadence.passed(), 0);
        }
    }

    #[test]
    fn test_cadence_reset_restarts_count() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut cadence = SelectionCadence::new(&mut rng, 10, 15);
        for _ in 1..cadence.threshold() {
            cadence.record_pass(&mut rng);
        }
        cadence.reset(&mut rng);
        assert_eq!(cadence.passed(), 0);
        assert!((10..=15).contains(&cadence.threshold()));
        assert!(!cadence.record_pass(&mut rng));
    }
}
