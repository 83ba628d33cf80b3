//! Instrument configuration, loaded from JSON or a JS object.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controls::{DIAL_HEIGHT, DIAL_WIDTH, KNOB_STEP};
use crate::dsp::synth::DEFAULT_POLYPHONY;
use crate::error::InstrumentError;

/// Where a knob's value lands in the engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBinding {
    pub group: String,
    pub field: String,
}

/// Instrument settings. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstrumentConfig {
    /// How long a played note is held before release.
    pub note_duration_ms: u64,
    /// Step of every dial declared through a knob model.
    pub knob_step: f64,
    pub dial_width: u32,
    pub dial_height: u32,
    /// Voices in the built-in synth.
    pub polyphony: usize,
    /// Frames per second of the render callback. Must be finite and positive.
    pub sample_rate: f64,
    /// Knob id -> engine parameter. Unbound knobs only echo to the UI.
    pub bindings: BTreeMap<String, ParameterBinding>,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        InstrumentConfig {
            note_duration_ms: 200,
            knob_step: KNOB_STEP,
            dial_width: DIAL_WIDTH,
            dial_height: DIAL_HEIGHT,
            polyphony: DEFAULT_POLYPHONY,
            sample_rate: 44100.0,
            bindings: BTreeMap::new(),
        }
    }
}

impl InstrumentConfig {
    pub fn from_json(source: &str) -> Result<Self, InstrumentError> {
        let config: InstrumentConfig = serde_json::from_str(source)?;
        config.validate()
    }

    /// Reject settings the render loop cannot run with.
    pub fn validate(self) -> Result<Self, InstrumentError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(InstrumentError::Decode(format!(
                "sample rate must be a positive number, got {}",
                self.sample_rate
            )));
        }
        if !(self.knob_step.is_finite() && self.knob_step > 0.0) {
            return Err(InstrumentError::Decode(format!(
                "knob step must be a positive number, got {}",
                self.knob_step
            )));
        }
        Ok(self)
    }

    pub fn note_duration(&self) -> Duration {
        Duration::from_millis(self.note_duration_ms)
    }

    /// Bind knob `id` to `group.field`.
    pub fn bind(mut self, id: &str, group: &str, field: &str) -> Self {
        self.bindings.insert(
            id.to_string(),
            ParameterBinding {
                group: group.to_string(),
                field: field.to_string(),
            },
        );
        self
    }
}
