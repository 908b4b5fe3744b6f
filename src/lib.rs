//! Split Click core crate.
//!
//! Squares bounce around a full-window canvas; clicking one splits it into
//! two smaller squares until they get too small, at which point they turn
//! into slow, color-cycling circles. The rules ([`sim`], [`item`]) are plain
//! Rust and run natively in tests; [`start_game`] wires them to the browser.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod item;
pub mod sim;

mod game;

pub use config::{GameConfig, Viewport};
pub use item::{BoundingBox, Item, Rgb};
pub use sim::{FrameClock, PressOutcome, Simulation, SplitResult, Stats};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (e.g. in browser tests) keeps the first logger.
    let _ = console_log::init_with_level(log::Level::Debug);
}

// -----------------------------------------------------------------------------
// Entry points
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    game::start(GameConfig::default())
}

/// Starts the game with a JSON config; omitted fields keep their defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config =
        GameConfig::from_json(json).map_err(|e| JsValue::from_str(&format!("bad config: {e}")))?;
    game::start(config)
}
