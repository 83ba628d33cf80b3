//! The synthesis engine contract.
//!
//! The controller and the patcher only ever talk to the engine through this
//! trait, and always through a handle passed in at construction.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::error::ParamError;

/// A polyphonic synthesizer as seen from the instrument layer.
pub trait SynthEngine {
    /// Start one voice per frequency, immediately, at `velocity`.
    fn trigger_attack(&mut self, frequencies: &[f64], velocity: f64);

    /// Release the voices sounding `frequencies`.
    fn trigger_release(&mut self, frequencies: &[f64]);

    /// Read the parameter at a dotted path (`"envelope"`, `"oscillator.type"`).
    fn get(&self, path: &str) -> Option<Value>;

    /// Replace the parameter at a dotted path. Groups are replaced wholesale.
    fn set(&mut self, path: &str, value: Value) -> Result<(), ParamError>;
}

/// Single-threaded shared handle on an engine.
pub type SharedEngine<E> = Rc<RefCell<E>>;

pub fn shared<E: SynthEngine>(engine: E) -> SharedEngine<E> {
    Rc::new(RefCell::new(engine))
}
