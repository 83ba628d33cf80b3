//! Recording engine shared by unit tests.

use serde_json::{Value, json};

use crate::engine::SynthEngine;
use crate::error::ParamError;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Attack { frequencies: Vec<f64>, velocity: f64 },
    Release { frequencies: Vec<f64> },
}

/// Records note traffic and stores parameters as a plain JSON tree.
/// `set` replaces whatever sits at the path, like a real engine does.
#[derive(Debug)]
pub struct RecordingEngine {
    pub events: Vec<EngineEvent>,
    pub params: Value,
}

impl RecordingEngine {
    pub fn new() -> Self {
        RecordingEngine {
            events: Vec::new(),
            params: json!({
                "oscillator": { "type": "custom", "partials": [0, 2, 3, 4] },
                "envelope": { "attack": 0.005, "decay": 0.1, "sustain": 0.3, "release": 1.0 },
            }),
        }
    }

    pub fn with_params(params: Value) -> Self {
        RecordingEngine {
            events: Vec::new(),
            params,
        }
    }
}

fn pointer(path: &str) -> String {
    format!("/{}", path.replace('.', "/"))
}

impl SynthEngine for RecordingEngine {
    fn trigger_attack(&mut self, frequencies: &[f64], velocity: f64) {
        self.events.push(EngineEvent::Attack {
            frequencies: frequencies.to_vec(),
            velocity,
        });
    }

    fn trigger_release(&mut self, frequencies: &[f64]) {
        self.events.push(EngineEvent::Release {
            frequencies: frequencies.to_vec(),
        });
    }

    fn get(&self, path: &str) -> Option<Value> {
        self.params.pointer(&pointer(path)).cloned()
    }

    fn set(&mut self, path: &str, value: Value) -> Result<(), ParamError> {
        let slot = self
            .params
            .pointer_mut(&pointer(path))
            .ok_or_else(|| ParamError::UnknownPath {
                path: path.to_string(),
            })?;
        *slot = value;
        Ok(())
    }
}
