//! Browser binding
//!
//! The page owns the canvas and the `requestAnimationFrame` loop. It calls
//! `frame(now)` with the callback timestamp, forwards taps as `trigger()`, and
//! draws whatever `snapshot_json()` describes.

use wasm_bindgen::prelude::*;

use crate::collaborators::{Collaborators, LocalLeaderboard};
use crate::render::{AssetRegistry, LatestSink};
use crate::session::Session;
use crate::settings::Settings;

/// Sprite keys the page is expected to load
const SPRITE_KEYS: [&str; 3] = ["obstacle", "book", "background"];

#[wasm_bindgen(start)]
pub fn start() {
    super::init_logging();
    log::info!("Book Flap starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session,
    sink: LatestSink,
    assets: AssetRegistry,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let settings = Settings::load();
        let collaborators = Collaborators {
            leaderboard: Box::new(LocalLeaderboard::persistent()),
            ..Collaborators::local()
        };
        let session = Session::new(settings, collaborators);

        let mut assets = AssetRegistry::new();
        for key in SPRITE_KEYS {
            assets.request(key);
        }
        assets.request(actor_key(session.character()));

        WebGame {
            session,
            sink: LatestSink::default(),
            assets,
        }
    }

    /// Advance one animation frame
    pub fn frame(&mut self, now_ms: f64) {
        self.session.frame(now_ms, &mut self.sink);
    }

    pub fn trigger(&mut self) {
        self.session.trigger();
    }

    pub fn choose(&mut self, index: usize) {
        self.session.choose(index);
    }

    pub fn balance(&self) -> f64 {
        self.session.balance() as f64
    }

    /// Latest committed frame as JSON (`null` before the first frame)
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.sink.latest).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Pending advisory notifications as a JSON array, clearing them
    pub fn take_notifications_json(&mut self) -> Result<String, JsValue> {
        let notifications = self.session.take_notifications();
        serde_json::to_string(&notifications).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Key of the actor sprite for the selected character
    pub fn actor_sprite_key(&self) -> String {
        actor_key(self.session.character())
    }

    pub fn asset_loaded(&mut self, key: String, handle: u32, width: u32, height: u32) {
        self.assets.mark_loaded(key, handle, width, height);
    }

    pub fn asset_failed(&mut self, key: &str) {
        self.assets.mark_failed(key);
    }

    /// Image or placeholder to draw for `key`, as JSON
    pub fn visual_json(&self, key: &str) -> Result<String, JsValue> {
        serde_json::to_string(&self.assets.resolve(key))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn save_settings(&self) {
        self.session.settings().save();
    }

    /// Stop the power sweep; call when the page tears the game down
    pub fn end(&mut self) {
        self.session.end();
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}

fn actor_key(character: Option<&str>) -> String {
    match character {
        Some(id) => format!("actor:{id}"),
        None => "actor:default".to_string(),
    }
}
