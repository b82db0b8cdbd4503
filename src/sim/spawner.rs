//! Obstacle and book spawning
//!
//! Obstacles arrive on a time cadence scaled by game speed. Books either ride
//! along inside a fresh gap or are placed on their own in a vertical band no
//! nearby obstacle occupies.

use glam::Vec2;
use rand::Rng;

use super::powers::Modifiers;
use super::state::{Book, GameState, ObstaclePair};
use crate::tuning::Tuning;

/// Slowest speed multiplier the cadence divides by
const MIN_CADENCE_SPEED: f64 = 0.05;

/// Milliseconds between obstacle spawns at the current speed
pub fn spawn_interval_ms(base_ms: f64, speed_multiplier: f32, spam: bool) -> f64 {
    let interval = base_ms / (speed_multiplier as f64).max(MIN_CADENCE_SPEED);
    if spam { interval / 2.0 } else { interval }
}

/// Gap height after power multipliers, never below the configured minimum
pub fn gap_size(tuning: &Tuning, gap_multiplier: f32) -> f32 {
    let gap = tuning.base_gap * gap_multiplier;
    let gap = if gap.is_finite() { gap } else { tuning.base_gap };
    gap.max(tuning.min_gap).min(tuning.canvas_height)
}

/// Random gap start leaving both segments with non-negative height
pub fn place_gap<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning, gap: f32) -> f32 {
    let h = tuning.canvas_height;
    let span = (h - gap - tuning.gap_top_margin - tuning.gap_bottom_margin).max(0.0);
    let top = tuning.gap_top_margin + rng.random::<f32>() * span;
    top.clamp(0.0, (h - gap).max(0.0))
}

/// Spawn a new obstacle pair at the right edge if the cadence allows
///
/// Returns the new pair's id.
pub fn try_spawn_obstacle(state: &mut GameState, modifiers: &Modifiers, now_ms: f64) -> Option<u32> {
    if now_ms < state.spawn_suppressed_until_ms {
        return None;
    }
    let interval = spawn_interval_ms(
        state.tuning.spawn_interval_ms,
        modifiers.speed_multiplier,
        modifiers.spam,
    );
    if now_ms - state.last_spawn_ms <= interval {
        return None;
    }

    let x = state.tuning.canvas_width;
    let spacing = state.tuning.min_obstacle_spacing;
    if state
        .obstacles
        .iter()
        .any(|p| !p.pending_removal && (p.x - x).abs() < spacing)
    {
        return None;
    }

    let gap = gap_size(&state.tuning, modifiers.gap_multiplier);
    let gap_top = place_gap(&mut state.rng, &state.tuning, gap);
    let id = state.next_entity_id();
    let pair = ObstaclePair {
        id,
        x,
        width: state.tuning.obstacle_width,
        gap_top,
        gap_size: gap,
        passed: false,
        pending_removal: false,
    };
    state.last_spawn_ms = now_ms;

    if state.rng.random::<f64>() < state.tuning.book_chance {
        let size = state.tuning.book_size;
        let jitter = state.tuning.book_jitter;
        let offset = (state.rng.random::<f32>() * 2.0 - 1.0) * jitter;
        let y = (gap_top + (gap - size) / 2.0 + offset)
            .clamp(gap_top, (pair.gap_bottom() - size).max(gap_top))
            .clamp(0.0, (state.tuning.canvas_height - size).max(0.0));
        let book_x = x + (pair.width - size) / 2.0;
        let book_id = state.next_entity_id();
        state.books.push(Book::new(book_id, Vec2::new(book_x, y), size));
        log::debug!("Book {} spawned in gap of obstacle {}", book_id, id);
    }

    log::debug!("Obstacle {} spawned (gap {:.0} at {:.0})", id, gap, gap_top);
    state.obstacles.push(pair);
    Some(id)
}

/// A vertical interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub start: f32,
    pub end: f32,
}

impl Band {
    pub fn len(&self) -> f32 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }
}

/// Merged, padded bands covered by obstacles near `x`
pub fn occupied_bands(obstacles: &[ObstaclePair], x: f32, tuning: &Tuning) -> Vec<Band> {
    let h = tuning.canvas_height;
    let pad = tuning.band_padding;
    let window = tuning.book_window;

    let mut bands: Vec<Band> = obstacles
        .iter()
        .filter(|p| !p.pending_removal && p.right() > x - window && p.x < x + window)
        .flat_map(|p| {
            [
                Band {
                    start: 0.0,
                    end: (p.gap_top + pad).min(h),
                },
                Band {
                    start: (p.gap_bottom() - pad).max(0.0),
                    end: h,
                },
            ]
        })
        .collect();
    bands.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Band> = Vec::with_capacity(bands.len());
    for band in bands {
        match merged.last_mut() {
            Some(last) if band.start <= last.end => last.end = last.end.max(band.end),
            _ => merged.push(band),
        }
    }
    merged
}

/// Complement of `occupied` inside `[lo, hi]`
pub fn free_bands(occupied: &[Band], lo: f32, hi: f32) -> Vec<Band> {
    let mut free = Vec::new();
    let mut cursor = lo;
    for band in occupied {
        if band.start > cursor {
            free.push(Band {
                start: cursor,
                end: band.start.min(hi),
            });
        }
        cursor = cursor.max(band.end);
        if cursor >= hi {
            break;
        }
    }
    if cursor < hi {
        free.push(Band { start: cursor, end: hi });
    }
    free.retain(|b| !b.is_empty());
    free
}

/// Pick a y for a book at `x`, or `None` when there's no room
///
/// Prefers a random free band inside the margins; otherwise the largest gap
/// between occupied ranges. The result always keeps the book on the canvas.
pub fn find_book_slot<R: Rng + ?Sized>(
    obstacles: &[ObstaclePair],
    x: f32,
    tuning: &Tuning,
    rng: &mut R,
) -> Option<f32> {
    let size = tuning.book_size;
    let h = tuning.canvas_height;
    let occupied = occupied_bands(obstacles, x, tuning);

    let free: Vec<Band> = free_bands(&occupied, tuning.band_margin, h - tuning.band_margin)
        .into_iter()
        .filter(|b| b.len() >= size)
        .collect();

    let y = if free.is_empty() {
        let widest = occupied
            .windows(2)
            .map(|w| Band {
                start: w[0].end,
                end: w[1].start,
            })
            .max_by(|a, b| a.len().total_cmp(&b.len()))?;
        if widest.len() < size {
            return None;
        }
        widest.start + (widest.len() - size) / 2.0
    } else {
        let band = free[rng.random_range(0..free.len())];
        band.start + rng.random::<f32>() * (band.len() - size)
    };

    Some(y.clamp(0.0, (h - size).max(0.0)))
}

/// Place a standalone book at the right edge; silently skipped if no room
pub fn spawn_book(state: &mut GameState) -> Option<u32> {
    let size = state.tuning.book_size;
    let x = state.tuning.canvas_width;
    let y = find_book_slot(&state.obstacles, x + size / 2.0, &state.tuning, &mut state.rng)?;
    let id = state.next_entity_id();
    state.books.push(Book::new(id, Vec2::new(x, y), size));
    log::debug!("Book {} spawned at y={:.0}", id, y);
    Some(id)
}

/// Independent book cadence: every `book_interval_ms`, maybe spawn one
pub fn try_spawn_book(state: &mut GameState, now_ms: f64) -> Option<u32> {
    if now_ms < state.spawn_suppressed_until_ms
        || now_ms - state.last_book_roll_ms < state.tuning.book_interval_ms
    {
        return None;
    }
    state.last_book_roll_ms = now_ms;
    if state.rng.random::<f64>() >= state.tuning.book_spawn_chance {
        return None;
    }
    spawn_book(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::{PowerId, lookup};
    use crate::sim::powers::PowerEngine;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pair(x: f32, gap_top: f32, gap_size: f32) -> ObstaclePair {
        ObstaclePair {
            id: 0,
            x,
            width: 60.0,
            gap_top,
            gap_size,
            passed: false,
            pending_removal: false,
        }
    }

    fn running_state() -> GameState {
        let mut state = GameState::new(77, Tuning::default());
        state.start_run(0.0);
        state
    }

    #[test]
    fn test_interval_scales_with_speed_and_spam() {
        assert_eq!(spawn_interval_ms(1600.0, 1.0, false), 1600.0);
        assert_eq!(spawn_interval_ms(1600.0, 2.0, false), 800.0);
        assert_eq!(spawn_interval_ms(1600.0, 2.0, true), 400.0);
    }

    #[test]
    fn test_gap_clamped_to_minimum() {
        let tuning = Tuning::default();
        assert_eq!(gap_size(&tuning, 0.1), tuning.min_gap);
        assert_eq!(gap_size(&tuning, 1.0), tuning.base_gap);
        assert_eq!(gap_size(&tuning, 100.0), tuning.canvas_height);
    }

    #[test]
    fn test_spawn_respects_cadence() {
        let mut state = running_state();
        let mods = Modifiers::default();
        assert!(try_spawn_obstacle(&mut state, &mods, 1_000.0).is_none());
        assert!(try_spawn_obstacle(&mut state, &mods, 1_601.0).is_some());
        assert_eq!(state.last_spawn_ms, 1_601.0);
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_spawn_suppressed_during_grace() {
        let mut state = running_state();
        state.spawn_suppressed_until_ms = 5_000.0;
        assert!(try_spawn_obstacle(&mut state, &Modifiers::default(), 4_000.0).is_none());
        assert!(try_spawn_obstacle(&mut state, &Modifiers::default(), 5_000.0).is_some());
    }

    #[test]
    fn test_spawn_rejects_overlap() {
        let mut state = running_state();
        let x = state.tuning.canvas_width;
        state.obstacles.push(pair(x - 20.0, 100.0, 170.0));
        assert!(try_spawn_obstacle(&mut state, &Modifiers::default(), 10_000.0).is_none());
        assert_eq!(state.obstacles.len(), 1);

        state.obstacles[0].x = x - 200.0;
        assert!(try_spawn_obstacle(&mut state, &Modifiers::default(), 10_000.0).is_some());
    }

    #[test]
    fn test_spawn_uses_power_gap() {
        let mut state = running_state();
        let mut engine = PowerEngine::new();
        engine.activate(lookup(PowerId::WideGap), 0.0);
        let mods = engine.compute_modifiers(0.0);
        try_spawn_obstacle(&mut state, &mods, 2_000.0);
        let gap = state.obstacles[0].gap_size;
        assert!((gap - state.tuning.base_gap * 1.3).abs() < 1e-3);
    }

    #[test]
    fn test_book_in_gap_stays_inside_gap() {
        let tuning = Tuning {
            book_chance: 1.0,
            ..Default::default()
        };
        let mut state = GameState::new(9, tuning);
        state.start_run(0.0);
        try_spawn_obstacle(&mut state, &Modifiers::default(), 2_000.0);
        let pair = &state.obstacles[0];
        let book = &state.books[0];
        assert!(book.pos.y >= pair.gap_top);
        assert!(book.pos.y + book.size <= pair.gap_bottom() + 1e-3);
    }

    #[test]
    fn test_free_bands_complement() {
        let occupied = [
            Band { start: 0.0, end: 100.0 },
            Band { start: 300.0, end: 600.0 },
        ];
        assert_eq!(
            free_bands(&occupied, 40.0, 560.0),
            vec![Band { start: 100.0, end: 300.0 }]
        );
        assert_eq!(
            free_bands(&[], 40.0, 560.0),
            vec![Band { start: 40.0, end: 560.0 }]
        );
    }

    #[test]
    fn test_occupied_bands_merge() {
        let tuning = Tuning::default();
        let obstacles = [pair(400.0, 100.0, 170.0), pair(420.0, 150.0, 170.0)];
        let bands = occupied_bands(&obstacles, 400.0, &tuning);
        // Padded tops [0,120] [0,170] and bottoms [250,600] [300,600]
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0], Band { start: 0.0, end: 170.0 });
        assert_eq!(bands[1], Band { start: 250.0, end: 600.0 });
    }

    #[test]
    fn test_book_slot_avoids_obstacle() {
        let tuning = Tuning::default();
        let obstacles = [pair(390.0, 200.0, 170.0)];
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..100 {
            let y = find_book_slot(&obstacles, 414.0, &tuning, &mut rng).unwrap();
            assert!(y >= 220.0 && y + tuning.book_size <= 350.0, "y = {y}");
        }
    }

    #[test]
    fn test_book_slot_falls_back_to_widest_gap() {
        let tuning = Tuning {
            band_padding: 0.0,
            ..Default::default()
        };
        // Only opening is [10, 45], mostly inside the top margin
        let obstacles = [pair(400.0, 10.0, 35.0)];
        let mut rng = Pcg32::seed_from_u64(1);
        let y = find_book_slot(&obstacles, 400.0, &tuning, &mut rng).unwrap();
        assert!((y - 13.5).abs() < 1e-4);
    }

    #[test]
    fn test_book_slot_skipped_when_covered() {
        let tuning = Tuning::default();
        // Three overlapping obstacles leave nothing book-sized
        let obstacles = [
            pair(380.0, 100.0, 110.0),
            pair(400.0, 180.0, 110.0),
            pair(420.0, 260.0, 110.0),
        ];
        let mut rng = Pcg32::seed_from_u64(8);
        assert_eq!(find_book_slot(&obstacles, 410.0, &tuning, &mut rng), None);

        let mut state = running_state();
        state.obstacles.extend(obstacles);
        state.tuning.canvas_width = 382.0;
        assert!(spawn_book(&mut state).is_none());
        assert!(state.books.is_empty());
    }

    proptest! {
        #[test]
        fn prop_gap_never_below_minimum(mults in proptest::collection::vec(0.01f32..3.0, 0..6)) {
            let tuning = Tuning::default();
            let product: f32 = mults.iter().product();
            let gap = gap_size(&tuning, product);
            prop_assert!(gap >= tuning.min_gap);

            let mut rng = Pcg32::seed_from_u64(product.to_bits() as u64);
            let top = place_gap(&mut rng, &tuning, gap);
            prop_assert!(top >= 0.0);
            prop_assert!(top + gap <= tuning.canvas_height + 1e-3);
        }

        #[test]
        fn prop_book_slot_on_canvas(
            gaps in proptest::collection::vec((0.0f32..600.0, 0.0f32..300.0, 300.0f32..500.0), 0..5),
            seed in any::<u64>(),
        ) {
            let tuning = Tuning::default();
            let obstacles: Vec<ObstaclePair> = gaps
                .iter()
                .map(|&(top, size, x)| pair(x, top, size.min(600.0 - top)))
                .collect();
            let mut rng = Pcg32::seed_from_u64(seed);
            if let Some(y) = find_book_slot(&obstacles, 400.0, &tuning, &mut rng) {
                prop_assert!(y >= 0.0);
                prop_assert!(y + tuning.book_size <= tuning.canvas_height);
            }
        }
    }
}
