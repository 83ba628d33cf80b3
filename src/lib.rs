pub mod config;
pub mod controls;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod instrument;
pub mod lifecycle;
pub mod note;
pub mod patcher;
pub mod scheduler;

#[cfg(test)]
mod fake;

use std::rc::Rc;

use log::warn;
use wasm_bindgen::prelude::*;

use crate::config::InstrumentConfig;
use crate::dsp::PolySynth;
use crate::error::InstrumentError;
use crate::instrument::{Instrument, MessageQueue, UiEvent};
use crate::scheduler::VirtualClock;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the knobsynth-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: route `log` output to the browser console and report
/// panics there. Call once before creating an instrument.
#[wasm_bindgen]
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Debug).ok();
    }
}

/// WASM-exposed instrument driven by the page and an AudioWorklet.
///
/// Notes are released on the render clock: each `render` call advances time
/// by the block's length. Outgoing messages (`knob-updated`, `mount-dial`,
/// `set-dial-value`) queue up until `drain_messages` is called.
#[wasm_bindgen]
pub struct WebInstrument {
    instrument: Instrument<PolySynth, VirtualClock, MessageQueue>,
    queue: MessageQueue,
}

#[wasm_bindgen]
impl WebInstrument {
    /// Build from a config object; `undefined` or `null` use the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WebInstrument, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            InstrumentConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?
        };
        WebInstrument::try_with_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Handle a `{ type, payload }` event. Malformed or failing events are
    /// logged and ignored.
    pub fn handle_event(&mut self, event: JsValue) {
        match serde_wasm_bindgen::from_value::<UiEvent>(event) {
            Ok(event) => self.instrument.dispatch(event),
            Err(e) => warn!("undecodable UI event: {e}"),
        }
    }

    /// Called by the dial widget when the user turns knob `id`.
    pub fn dial_changed(&self, id: &str, value: f64) {
        if let Err(e) = self.instrument.dial_changed(id, value) {
            warn!("dial change ignored: {e}");
        }
    }

    /// Fill `out` with the next mono block.
    pub fn render(&mut self, out: &mut [f32]) {
        self.instrument.render(out);
    }

    /// Take all queued outgoing messages as an array.
    pub fn drain_messages(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.queue.drain())
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    /// Voices still sounding, release tails included.
    pub fn active_voices(&self) -> usize {
        self.instrument.engine().borrow().active_voices()
    }
}

impl WebInstrument {
    /// Validate `config`, then build the instrument.
    pub fn try_with_config(config: InstrumentConfig) -> Result<Self, InstrumentError> {
        Ok(WebInstrument::with_config(config.validate()?))
    }

    /// Build from an already validated config.
    pub fn with_config(config: InstrumentConfig) -> Self {
        let engine = engine::shared(PolySynth::with_polyphony(config.sample_rate, config.polyphony));
        let queue = MessageQueue::new();
        let instrument = Instrument::new(
            config,
            engine,
            VirtualClock::new(),
            queue.clone(),
            Rc::new(queue.clone()),
        );
        WebInstrument { instrument, queue }
    }
}
