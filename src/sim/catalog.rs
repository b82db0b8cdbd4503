//! Power catalog and weighted sampler
//!
//! The catalog is static data. Choices for a power prompt are drawn without
//! replacement from a virtual pool in which every definition appears `weight`
//! times.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of options offered by a power prompt
pub const CHOICE_COUNT: usize = 3;

/// Weight multiplier applied to beneficial powers by the lucky-start shop power
pub const LUCKY_BENEFICIAL_FACTOR: u32 = 3;

/// Power identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerId {
    SlowMotion,
    SnailPace,
    Turbo,
    HyperSpeed,
    Tailwind,
    WideGap,
    HugeGap,
    NarrowGap,
    Chaos,
    Invincibility,
    Spam,
    Reset,
}

/// Power category (display grouping)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerCategory {
    Speed,
    Gap,
    Special,
    Temporary,
}

/// What a power does while active
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerEffect {
    pub speed_multiplier: Option<f32>,
    pub gap_multiplier: Option<f32>,
    pub invincible: bool,
    /// `None` = lasts for the rest of the run
    pub duration_ms: Option<f64>,
}

impl PowerEffect {
    const NONE: Self = Self {
        speed_multiplier: None,
        gap_multiplier: None,
        invincible: false,
        duration_ms: None,
    };
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct PowerDef {
    pub id: PowerId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: PowerCategory,
    pub beneficial: bool,
    /// Selection weight (> 0)
    pub weight: u32,
    pub effect: PowerEffect,
}

impl PowerDef {
    /// Gap-widening beneficial powers replace themselves instead of stacking
    pub fn is_stackable(&self) -> bool {
        !(self.beneficial && self.effect.gap_multiplier.is_some())
    }

    /// Weight after the lucky-start adjustment
    pub fn effective_weight(&self, lucky_boost: bool) -> u32 {
        if !lucky_boost {
            self.weight
        } else if self.beneficial {
            self.weight * LUCKY_BENEFICIAL_FACTOR
        } else {
            (self.weight / 2).max(1)
        }
    }
}

pub static CATALOG: [PowerDef; 12] = [
    PowerDef {
        id: PowerId::SlowMotion,
        name: "Slow Motion",
        description: "Everything scrolls 20% slower",
        category: PowerCategory::Speed,
        beneficial: true,
        weight: 10,
        effect: PowerEffect {
            speed_multiplier: Some(0.8),
            duration_ms: Some(10_000.0),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::SnailPace,
        name: "Snail Pace",
        description: "Scrolling drops to 60% for a few seconds",
        category: PowerCategory::Speed,
        beneficial: true,
        weight: 4,
        effect: PowerEffect {
            speed_multiplier: Some(0.6),
            duration_ms: Some(6_000.0),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::Turbo,
        name: "Turbo",
        description: "Scrolling speeds up by 25%",
        category: PowerCategory::Speed,
        beneficial: false,
        weight: 8,
        effect: PowerEffect {
            speed_multiplier: Some(1.25),
            duration_ms: Some(10_000.0),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::HyperSpeed,
        name: "Hyper Speed",
        description: "Scrolling speeds up by 50%",
        category: PowerCategory::Speed,
        beneficial: false,
        weight: 3,
        effect: PowerEffect {
            speed_multiplier: Some(1.5),
            duration_ms: Some(6_000.0),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::Tailwind,
        name: "Tailwind",
        description: "10% faster for the rest of the run",
        category: PowerCategory::Speed,
        beneficial: false,
        weight: 4,
        effect: PowerEffect {
            speed_multiplier: Some(1.1),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::WideGap,
        name: "Wide Gap",
        description: "New gaps are 30% taller",
        category: PowerCategory::Gap,
        beneficial: true,
        weight: 10,
        effect: PowerEffect {
            gap_multiplier: Some(1.3),
            duration_ms: Some(15_000.0),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::HugeGap,
        name: "Huge Gap",
        description: "New gaps are 60% taller",
        category: PowerCategory::Gap,
        beneficial: true,
        weight: 4,
        effect: PowerEffect {
            gap_multiplier: Some(1.6),
            duration_ms: Some(8_000.0),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::NarrowGap,
        name: "Narrow Gap",
        description: "New gaps are 20% shorter",
        category: PowerCategory::Gap,
        beneficial: false,
        weight: 8,
        effect: PowerEffect {
            gap_multiplier: Some(0.8),
            duration_ms: Some(12_000.0),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::Chaos,
        name: "Chaos",
        description: "Faster scrolling and tighter gaps",
        category: PowerCategory::Gap,
        beneficial: false,
        weight: 5,
        effect: PowerEffect {
            speed_multiplier: Some(1.2),
            gap_multiplier: Some(0.9),
            invincible: false,
            duration_ms: Some(12_000.0),
        },
    },
    PowerDef {
        id: PowerId::Invincibility,
        name: "Invincibility",
        description: "Fly straight through obstacles",
        category: PowerCategory::Temporary,
        beneficial: true,
        weight: 5,
        effect: PowerEffect {
            invincible: true,
            duration_ms: Some(5_000.0),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::Spam,
        name: "Obstacle Spam",
        description: "Obstacles arrive twice as often",
        category: PowerCategory::Special,
        beneficial: false,
        weight: 6,
        effect: PowerEffect {
            duration_ms: Some(10_000.0),
            ..PowerEffect::NONE
        },
    },
    PowerDef {
        id: PowerId::Reset,
        name: "Reset",
        description: "Clears every active power",
        category: PowerCategory::Special,
        beneficial: false,
        weight: 4,
        effect: PowerEffect::NONE,
    },
];

/// Look up a catalog entry
pub fn lookup(id: PowerId) -> &'static PowerDef {
    let index = match id {
        PowerId::SlowMotion => 0,
        PowerId::SnailPace => 1,
        PowerId::Turbo => 2,
        PowerId::HyperSpeed => 3,
        PowerId::Tailwind => 4,
        PowerId::WideGap => 5,
        PowerId::HugeGap => 6,
        PowerId::NarrowGap => 7,
        PowerId::Chaos => 8,
        PowerId::Invincibility => 9,
        PowerId::Spam => 10,
        PowerId::Reset => 11,
    };
    &CATALOG[index]
}

/// Draw up to three distinct powers from the full catalog
pub fn draw_choices<R: Rng + ?Sized>(rng: &mut R, lucky_boost: bool) -> Vec<&'static PowerDef> {
    draw_choices_from(&CATALOG, rng, lucky_boost)
}

/// Weighted draw without replacement over an arbitrary set of definitions
///
/// Returns fewer than [`CHOICE_COUNT`] entries when the set is smaller.
pub fn draw_choices_from<'a, R: Rng + ?Sized>(
    defs: &'a [PowerDef],
    rng: &mut R,
    lucky_boost: bool,
) -> Vec<&'a PowerDef> {
    let mut pool: Vec<usize> = defs
        .iter()
        .enumerate()
        .flat_map(|(i, def)| std::iter::repeat_n(i, def.effective_weight(lucky_boost) as usize))
        .collect();

    let mut picked = Vec::with_capacity(CHOICE_COUNT);
    while picked.len() < CHOICE_COUNT && !pool.is_empty() {
        let index = pool[rng.random_range(0..pool.len())];
        pool.retain(|&i| i != index);
        picked.push(&defs[index]);
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_lookup_follows_table_order() {
        for def in &CATALOG {
            assert!(std::ptr::eq(lookup(def.id), def), "{} misplaced", def.name);
        }
    }

    #[test]
    fn test_catalog_weights_positive_and_ids_unique() {
        for (i, def) in CATALOG.iter().enumerate() {
            assert!(def.weight > 0, "{} has zero weight", def.name);
            assert!(CATALOG[i + 1..].iter().all(|other| other.id != def.id));
            assert_eq!(lookup(def.id).id, def.id);
        }
    }

    #[test]
    fn test_draw_returns_three_distinct() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let choices = draw_choices(&mut rng, false);
            assert_eq!(choices.len(), CHOICE_COUNT);
            assert_ne!(choices[0].id, choices[1].id);
            assert_ne!(choices[0].id, choices[2].id);
            assert_ne!(choices[1].id, choices[2].id);
        }
    }

    #[test]
    fn test_draw_from_small_catalog() {
        let mut rng = Pcg32::seed_from_u64(2);
        let defs = &CATALOG[..2];
        let choices = draw_choices_from(defs, &mut rng, true);
        assert_eq!(choices.len(), 2);
        assert_ne!(choices[0].id, choices[1].id);

        assert!(draw_choices_from(&CATALOG[..0], &mut rng, false).is_empty());
    }

    #[test]
    fn test_lucky_weights() {
        let slow = lookup(PowerId::SlowMotion);
        assert_eq!(slow.effective_weight(false), 10);
        assert_eq!(slow.effective_weight(true), 30);

        let hyper = lookup(PowerId::HyperSpeed);
        assert_eq!(hyper.effective_weight(true), 1); // 3 / 2 floored

        let reset = lookup(PowerId::Reset);
        assert_eq!(reset.effective_weight(true), 2);
    }

    #[test]
    fn test_stackability() {
        assert!(!lookup(PowerId::WideGap).is_stackable());
        assert!(!lookup(PowerId::HugeGap).is_stackable());
        assert!(lookup(PowerId::NarrowGap).is_stackable());
        assert!(lookup(PowerId::SlowMotion).is_stackable());
    }

    #[test]
    fn test_lucky_boost_frequency_matches_tripled_weights() {
        let total: u32 = CATALOG.iter().map(|d| d.effective_weight(true)).sum();
        let beneficial: u32 = CATALOG
            .iter()
            .filter(|d| d.beneficial)
            .map(|d| d.effective_weight(true))
            .sum();
        let expected = beneficial as f64 / total as f64;

        let mut rng = Pcg32::seed_from_u64(0xB00C);
        let draws = 10_000;
        let hits = (0..draws)
            .filter(|_| draw_choices(&mut rng, true)[0].beneficial)
            .count();
        let observed = hits as f64 / draws as f64;

        assert!(
            (observed - expected).abs() < 0.02,
            "observed {observed:.3}, expected {expected:.3}"
        );

        // And it must differ from the unboosted odds
        let plain_total: u32 = CATALOG.iter().map(|d| d.weight).sum();
        let plain_beneficial: u32 = CATALOG.iter().filter(|d| d.beneficial).map(|d| d.weight).sum();
        let plain = plain_beneficial as f64 / plain_total as f64;
        assert!(observed - plain > 0.1);
    }
}
