//! Render-side boundary
//!
//! The simulation hands the host one read-only [`RenderSnapshot`] per
//! committed frame. How it gets drawn is up to the [`RenderSink`].

use std::collections::HashMap;

use serde::Serialize;

use crate::sim::catalog::{PowerCategory, PowerId};
use crate::sim::powers::ActivePowerView;
use crate::sim::shop::ShopPowerView;
use crate::sim::state::{Actor, Book, GamePhase, GameState, ObstaclePair};

/// One offered power on the selection prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceView {
    pub id: PowerId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: PowerCategory,
    pub beneficial: bool,
    pub highlighted: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub phase: &'static str,
    pub actor: Actor,
    pub obstacles: Vec<ObstaclePair>,
    /// Uncollected books only
    pub books: Vec<Book>,
    pub score: u64,
    pub best_score: u64,
    pub active_powers: Vec<ActivePowerView>,
    pub shop_powers: Vec<ShopPowerView>,
    pub choices: Vec<ChoiceView>,
    /// Opaque visual identifier of the selected character
    pub character_id: Option<String>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState, now_ms: f64, character_id: Option<&str>) -> Self {
        let choices = match &state.phase {
            GamePhase::PowerSelection {
                choices,
                highlighted,
            } => choices
                .iter()
                .enumerate()
                .map(|(i, def)| ChoiceView {
                    id: def.id,
                    name: def.name,
                    description: def.description,
                    category: def.category,
                    beneficial: def.beneficial,
                    highlighted: i == *highlighted,
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            phase: state.phase.label(),
            actor: state.actor,
            obstacles: state
                .obstacles
                .iter()
                .filter(|p| !p.pending_removal)
                .cloned()
                .collect(),
            books: state.books.iter().filter(|b| !b.collected).cloned().collect(),
            score: state.score,
            best_score: state.best_score,
            active_powers: state.powers.compute_modifiers(now_ms).active,
            shop_powers: state.shop.views(now_ms),
            choices,
            character_id: character_id.map(str::to_owned),
        }
    }
}

/// Consumer of committed frames
pub trait RenderSink {
    fn present(&mut self, snapshot: &RenderSnapshot);
}

/// Sink that drops every frame (headless runs)
#[derive(Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn present(&mut self, _snapshot: &RenderSnapshot) {}
}

/// Sink that keeps the most recent snapshot
#[derive(Debug, Default)]
pub struct LatestSink {
    pub latest: Option<RenderSnapshot>,
    pub frames: u64,
}

impl RenderSink for LatestSink {
    fn present(&mut self, snapshot: &RenderSnapshot) {
        self.latest = Some(snapshot.clone());
        self.frames += 1;
    }
}

/// What to draw for a sprite key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Visual {
    /// Host-side handle of a loaded image
    Image { handle: u32, width: u32, height: u32 },
    /// Flat box in the entity's bounds until the image arrives
    Placeholder { color: [f32; 4] },
}

#[derive(Debug, Clone, PartialEq)]
enum AssetState {
    Pending,
    Loaded { handle: u32, width: u32, height: u32 },
    Failed,
}

/// Keyed sprite cache owned by the render side
///
/// Lookups never block; anything not loaded yet resolves to a placeholder.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: HashMap<String, AssetState>,
}

impl AssetRegistry {
    pub const PLACEHOLDER_COLOR: [f32; 4] = [0.85, 0.35, 0.85, 1.0];

    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key whose image is still loading
    pub fn request(&mut self, key: impl Into<String>) {
        self.assets.entry(key.into()).or_insert(AssetState::Pending);
    }

    pub fn mark_loaded(&mut self, key: impl Into<String>, handle: u32, width: u32, height: u32) {
        self.assets.insert(
            key.into(),
            AssetState::Loaded {
                handle,
                width,
                height,
            },
        );
    }

    pub fn mark_failed(&mut self, key: &str) {
        if let Some(state) = self.assets.get_mut(key) {
            log::warn!("Asset failed to load: {key}");
            *state = AssetState::Failed;
        }
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        matches!(self.assets.get(key), Some(AssetState::Loaded { .. }))
    }

    pub fn pending(&self) -> usize {
        self.assets
            .values()
            .filter(|s| **s == AssetState::Pending)
            .count()
    }

    pub fn resolve(&self, key: &str) -> Visual {
        match self.assets.get(key) {
            Some(AssetState::Loaded {
                handle,
                width,
                height,
            }) => Visual::Image {
                handle: *handle,
                width: *width,
                height: *height,
            },
            _ => Visual::Placeholder {
                color: Self::PLACEHOLDER_COLOR,
            },
        }
    }
}
