//! DSP: the built-in polyphonic synth.
//!
//! Renders mono f32 blocks, so the same engine can feed an AudioWorklet in
//! the browser or be driven offline in tests.

pub mod envelope;
pub mod mixer;
pub mod oscillator;
pub mod synth;
pub mod voice;

pub use envelope::EnvelopeOptions;
pub use oscillator::Waveform;
pub use synth::{OscillatorOptions, PolySynth, SynthOptions};
