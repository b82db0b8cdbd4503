//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform code:
//! - Host time is passed in, never read
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - Side effects are queued as events, never performed

pub mod autopilot;
pub mod catalog;
pub mod collision;
pub mod physics;
pub mod powers;
pub mod shop;
pub mod spawner;
pub mod state;
pub mod tick;

pub use autopilot::autopilot_input;
pub use catalog::{CATALOG, PowerCategory, PowerDef, PowerEffect, PowerId, draw_choices};
pub use collision::{CollisionOutcome, Immunity};
pub use powers::{Activation, ActivePower, ActivePowerView, Modifiers, PowerEngine};
pub use shop::{OwnedShopPower, ShopOverlay, ShopPowerId, ShopPowerView};
pub use spawner::{find_book_slot, spawn_book};
pub use state::{Actor, Book, GameEvent, GamePhase, GameState, ObstaclePair, Rect};
pub use tick::{TickInput, tick};
