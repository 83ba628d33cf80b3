//! ADSR envelope with linear segments.

use serde::{Deserialize, Serialize};

/// Envelope parameter group. Times are in seconds.
///
/// Missing fields take their default when the group is written as a whole;
/// unknown fields are refused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvelopeOptions {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        EnvelopeOptions {
            attack: 0.005,
            decay: 0.1,
            sustain: 0.3,
            release: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// ADSR envelope with linear ramps, one level per sample.
#[derive(Debug, Clone)]
pub struct Envelope {
    options: EnvelopeOptions,
    stage: Stage,
    level: f64,
    /// Level change per sample in the current stage.
    step: f64,
    sample_rate: f64,
}

impl Envelope {
    pub fn new(options: EnvelopeOptions, sample_rate: f64) -> Self {
        Envelope {
            options,
            stage: Stage::Idle,
            level: 0.0,
            step: 0.0,
            sample_rate,
        }
    }

    /// New times apply from the next stage change on.
    pub fn set_options(&mut self, options: EnvelopeOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &EnvelopeOptions {
        &self.options
    }

    /// Start the attack from the current level (retrigger does not click).
    pub fn gate_on(&mut self) {
        self.stage = Stage::Attack;
        self.step = (1.0 - self.level) / self.samples(self.options.attack);
    }

    pub fn gate_off(&mut self) {
        if self.stage == Stage::Idle {
            return;
        }
        self.stage = Stage::Release;
        self.step = self.level / self.samples(self.options.release);
    }

    pub fn next_sample(&mut self) -> f64 {
        match self.stage {
            Stage::Idle => self.level = 0.0,
            Stage::Attack => {
                self.level += self.step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                    self.step = (1.0 - self.sustain()) / self.samples(self.options.decay);
                }
            }
            Stage::Decay => {
                self.level -= self.step;
                if self.level <= self.sustain() {
                    self.level = self.sustain();
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => self.level = self.sustain(),
            Stage::Release => {
                self.level -= self.step;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }

    pub fn is_idle(&self) -> bool {
        self.stage == Stage::Idle
    }

    fn sustain(&self) -> f64 {
        self.options.sustain.clamp(0.0, 1.0)
    }

    /// Stage length in samples, at least one.
    fn samples(&self, seconds: f64) -> f64 {
        (seconds.max(0.0) * self.sample_rate).max(1.0)
    }
}
