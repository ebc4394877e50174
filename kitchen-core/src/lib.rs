use std::sync::Arc;

use wasm_bindgen::prelude::*;

mod catalog;
mod config;
mod customer;
pub mod error;
mod flavor;
mod goal;
mod patience;
mod pot;
mod queue;
mod rack;
mod robot;
mod score;
mod session;
mod snapshot;
mod types;

pub use catalog::*;
pub use config::*;
pub use customer::*;
pub use error::Error;
pub use flavor::*;
pub use goal::*;
pub use patience::*;
pub use pot::*;
pub use queue::*;
pub use rack::*;
pub use robot::*;
pub use score::*;
pub use session::*;
pub use snapshot::*;
pub use types::*;

#[cfg(feature = "instrument")]
pub use instrument;

// ============================================================================
// WASM API - Game
// ============================================================================

#[wasm_bindgen]
pub struct Game {
    session: Session,
}

fn js_error(err: Error) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[wasm_bindgen]
impl Game {
    /// Start a session with default tuning.
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: &str, seed: u64) -> std::result::Result<Game, JsValue> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        let catalog = IngredientCatalog::from_json(catalog_json).map_err(js_error)?;
        Ok(Self {
            session: Session::with_defaults(Arc::new(catalog), seed),
        })
    }

    /// Start a session with tuning overrides. Missing config fields keep
    /// their defaults.
    #[wasm_bindgen]
    pub fn with_config(
        catalog_json: &str,
        config_json: &str,
        seed: u64,
    ) -> std::result::Result<Game, JsValue> {
        console_error_panic_hook::set_once();

        let catalog = IngredientCatalog::from_json(catalog_json).map_err(js_error)?;
        let config = GameConfig::from_json(config_json).map_err(js_error)?;
        Ok(Self {
            session: Session::new(Arc::new(catalog), config, seed),
        })
    }

    /// Advance one frame of `dt` seconds.
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f64) {
        self.session.update(dt);
    }

    #[wasm_bindgen]
    pub fn add_ingredient(&mut self, key: &str) -> bool {
        self.session.add_ingredient(key)
    }

    #[wasm_bindgen]
    pub fn restock(&mut self, key: &str, amount: u32) {
        self.session.restock([(key, amount)]);
    }

    /// Serve the pot. Returns a `ServeOutcome`, or `undefined` when nobody
    /// is waiting.
    #[wasm_bindgen]
    pub fn serve(&mut self) -> std::result::Result<JsValue, JsValue> {
        match self.session.serve() {
            Some(outcome) => Ok(serde_wasm_bindgen::to_value(&outcome)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Events since the last call, as an array of `SessionEvent`.
    #[wasm_bindgen]
    pub fn drain_events(&mut self) -> std::result::Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.session.drain_events())?)
    }

    #[wasm_bindgen]
    pub fn get_snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Ingredient keys in rack display order.
    #[wasm_bindgen]
    pub fn rack_order(&self) -> Vec<String> {
        self.session
            .catalog()
            .rack_order()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[wasm_bindgen]
    pub fn get_lives(&self) -> i32 {
        self.session.lives()
    }

    #[wasm_bindgen]
    pub fn is_over(&self) -> bool {
        self.session.is_over()
    }

    #[wasm_bindgen]
    pub fn get_result(&self) -> SessionResult {
        self.session.result()
    }
}

impl Game {
    pub fn session(&self) -> &Session {
        &self.session
    }
}
