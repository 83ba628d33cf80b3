//! PolySynth: the built-in engine behind the instrument.
//!
//! Parameters form a nested tree (`oscillator`, `envelope`) that is read and
//! written as JSON by dotted path. Writing a group replaces it wholesale:
//! fields left out of the new value fall back to their defaults.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::SynthEngine;
use crate::error::ParamError;

use super::envelope::EnvelopeOptions;
use super::mixer::Mixer;
use super::oscillator::Waveform;
use super::voice::Voice;

pub const DEFAULT_POLYPHONY: usize = 6;

/// Oscillator parameter group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OscillatorOptions {
    #[serde(rename = "type")]
    pub kind: Waveform,
    /// Harmonic amplitudes used by the `custom` type.
    pub partials: Vec<f64>,
}

impl Default for OscillatorOptions {
    fn default() -> Self {
        OscillatorOptions {
            kind: Waveform::Custom,
            partials: vec![0.0, 2.0, 3.0, 4.0],
        }
    }
}

/// The full parameter snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthOptions {
    pub oscillator: OscillatorOptions,
    pub envelope: EnvelopeOptions,
}

fn json_pointer(path: &str) -> String {
    format!("/{}", path.replace('.', "/"))
}

/// Polyphonic additive synth with a fixed pool of voices.
pub struct PolySynth {
    sample_rate: f64,
    options: SynthOptions,
    voices: Vec<Voice>,
    next_stamp: u64,
    mixer: Mixer,
}

impl PolySynth {
    pub fn new(sample_rate: f64) -> Self {
        Self::with_polyphony(sample_rate, DEFAULT_POLYPHONY)
    }

    pub fn with_polyphony(sample_rate: f64, polyphony: usize) -> Self {
        let options = SynthOptions::default();
        let voices = (0..polyphony.max(1))
            .map(|_| Voice::new(&options, sample_rate))
            .collect();
        PolySynth {
            sample_rate,
            options,
            voices,
            next_stamp: 0,
            mixer: Mixer::new(),
        }
    }

    pub fn options(&self) -> &SynthOptions {
        &self.options
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    /// Voices currently sounding, including those in their release tail.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_finished()).count()
    }

    /// Voices between attack and release.
    pub fn gated_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_gated()).count()
    }

    /// Render one mono block.
    pub fn render(&mut self, out: &mut [f32]) {
        self.mixer.begin(out.len());
        for voice in self.voices.iter_mut().filter(|v| !v.is_finished()) {
            self.mixer.add_with(|| voice.next_sample());
        }
        self.mixer.finish(out);
    }

    /// A free voice if there is one, then the oldest voice in its release
    /// tail, then the oldest held voice.
    fn allocate(&mut self) -> &mut Voice {
        let idx = match self.voices.iter().position(|v| v.is_finished()) {
            Some(idx) => idx,
            None => self
                .voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| (v.is_gated(), v.started()))
                .map(|(idx, _)| idx)
                .unwrap_or(0),
        };
        &mut self.voices[idx]
    }

    fn apply(&mut self, options: SynthOptions) {
        for voice in &mut self.voices {
            voice.configure(&options);
        }
        self.options = options;
    }
}

impl SynthEngine for PolySynth {
    fn trigger_attack(&mut self, frequencies: &[f64], velocity: f64) {
        for &frequency in frequencies {
            let stamp = self.next_stamp;
            self.next_stamp += 1;
            self.allocate().note_on(frequency, velocity, stamp);
        }
    }

    /// Releases the oldest gated voice for each listed frequency.
    fn trigger_release(&mut self, frequencies: &[f64]) {
        for &frequency in frequencies {
            let voice = self
                .voices
                .iter_mut()
                .filter(|v| v.is_gated() && v.frequency() == frequency)
                .min_by_key(|v| v.started());
            match voice {
                Some(voice) => voice.note_off(),
                None => debug!("release {frequency}: no gated voice"),
            }
        }
    }

    fn get(&self, path: &str) -> Option<Value> {
        let tree = serde_json::to_value(&self.options).ok()?;
        tree.pointer(&json_pointer(path)).cloned()
    }

    fn set(&mut self, path: &str, value: Value) -> Result<(), ParamError> {
        let rejected = |e: serde_json::Error| ParamError::Rejected {
            path: path.to_string(),
            reason: e.to_string(),
        };

        let mut tree = serde_json::to_value(&self.options).map_err(rejected)?;
        let slot = tree
            .pointer_mut(&json_pointer(path))
            .ok_or_else(|| ParamError::UnknownPath {
                path: path.to_string(),
            })?;
        *slot = value;

        let options: SynthOptions = serde_json::from_value(tree).map_err(rejected)?;
        debug!("set {path}");
        self.apply(options);
        Ok(())
    }
}
