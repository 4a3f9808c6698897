//! Browser binding
//!
//! The bead-grid engine lives in JavaScript. Each exported callback runs the
//! session against a `RecordingHost` and returns the recorded host calls as
//! JSON for the page to replay.

use wasm_bindgen::prelude::*;

use super::{HostCall, RecordingHost};
use crate::session::GameSession;
use crate::settings::Settings;
use crate::sim::Campaign;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmGame {
    session: GameSession<RecordingHost>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game on the built-in campaign, or on a JSON level pack
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>, level_pack_json: Option<String>) -> Result<WasmGame, JsValue> {
        let settings = match settings_json {
            Some(json) => Settings::from_json(&json).map_err(js_err)?,
            None => Settings::default(),
        };
        let campaign = match level_pack_json {
            Some(json) => Campaign::from_json(&json).map_err(js_err)?,
            None => Campaign::builtin().map_err(js_err)?,
        };
        let session = GameSession::new(campaign, &settings, RecordingHost::new()).map_err(js_err)?;
        Ok(Self { session })
    }

    pub fn init(&mut self) -> Result<String, JsValue> {
        self.session.on_init();
        self.drain()
    }

    pub fn tick(&mut self) -> Result<String, JsValue> {
        self.session.on_tick();
        self.drain()
    }

    pub fn touch(&mut self, x: i32, y: i32) -> Result<String, JsValue> {
        self.session.on_cell_clicked(x, y);
        self.drain()
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, code: u32) {
        self.session.on_key_down(code);
    }

    #[wasm_bindgen(js_name = keyUp)]
    pub fn key_up(&mut self, code: u32) {
        self.session.on_key_up(code);
    }

    /// Current snapshot as JSON (debug overlay)
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(js_err)
    }
}

impl WasmGame {
    fn drain(&mut self) -> Result<String, JsValue> {
        let calls: Vec<HostCall> = self.session.host_mut().take_calls();
        serde_json::to_string(&calls).map_err(js_err)
    }
}

/// Module entry: install the panic hook and console logger
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) keeps the existing logger
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Tilt Maze loaded");
}
