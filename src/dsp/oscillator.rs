//! Oscillators: PolyBLEP basic shapes plus an additive "custom" shape.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// Oscillator shape. `Custom` sums the configured partials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    Custom,
}

/// Single oscillator with a free-running phase.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    /// Harmonic amplitudes; index 0 is the fundamental.
    partials: Vec<f64>,
    /// Sum of |partials|, used to keep custom output within [-1, 1].
    partial_norm: f64,
    pub frequency: f64,
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            partials: Vec::new(),
            partial_norm: 0.0,
            frequency: 440.0,
            phase: 0.0,
            sample_rate,
        }
    }

    pub fn set_partials(&mut self, partials: &[f64]) {
        self.partials = partials.to_vec();
        self.partial_norm = partials.iter().map(|p| p.abs()).sum();
    }

    pub fn partials(&self) -> &[f64] {
        &self.partials
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn next_sample(&mut self) -> f64 {
        let inc = self.frequency / self.sample_rate;
        let sample = match self.waveform {
            Waveform::Sine => (TAU * self.phase).sin(),
            Waveform::Sawtooth => 2.0 * self.phase - 1.0 - poly_blep(self.phase, inc),
            Waveform::Square => {
                let naive = if self.phase < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(self.phase, inc) - poly_blep((self.phase + 0.5) % 1.0, inc)
            }
            Waveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
            Waveform::Custom => self.additive(),
        };

        self.phase = (self.phase + inc).fract();
        sample
    }

    fn additive(&self) -> f64 {
        if self.partial_norm == 0.0 {
            return 0.0;
        }
        let sum: f64 = self
            .partials
            .iter()
            .enumerate()
            .map(|(k, amp)| amp * (TAU * (k + 1) as f64 * self.phase).sin())
            .sum();
        sum / self.partial_norm
    }
}

/// Polynomial band-limited step correction around a wrap at phase 0.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}
