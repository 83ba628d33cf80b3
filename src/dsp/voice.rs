//! Voice: one pitch of the polyphonic synth.

use super::envelope::Envelope;
use super::oscillator::Oscillator;
use super::synth::SynthOptions;

/// One oscillator shaped by one envelope, scaled by note velocity.
#[derive(Debug, Clone)]
pub struct Voice {
    oscillator: Oscillator,
    envelope: Envelope,
    velocity: f64,
    /// Allocation stamp; lower is older.
    started: u64,
    /// True between note-on and note-off.
    gated: bool,
}

impl Voice {
    pub fn new(options: &SynthOptions, sample_rate: f64) -> Self {
        let mut oscillator = Oscillator::new(options.oscillator.kind, sample_rate);
        oscillator.set_partials(&options.oscillator.partials);
        Voice {
            oscillator,
            envelope: Envelope::new(options.envelope, sample_rate),
            velocity: 0.0,
            started: 0,
            gated: false,
        }
    }

    pub fn configure(&mut self, options: &SynthOptions) {
        self.oscillator.waveform = options.oscillator.kind;
        self.oscillator.set_partials(&options.oscillator.partials);
        self.envelope.set_options(options.envelope);
    }

    pub fn note_on(&mut self, frequency: f64, velocity: f64, started: u64) {
        self.oscillator.frequency = frequency;
        self.oscillator.reset();
        self.velocity = velocity;
        self.started = started;
        self.gated = true;
        self.envelope.gate_on();
    }

    pub fn note_off(&mut self) {
        self.gated = false;
        self.envelope.gate_off();
    }

    pub fn next_sample(&mut self) -> f64 {
        if self.is_finished() {
            return 0.0;
        }
        self.oscillator.next_sample() * self.envelope.next_sample() * self.velocity
    }

    pub fn frequency(&self) -> f64 {
        self.oscillator.frequency
    }

    pub fn started(&self) -> u64 {
        self.started
    }

    pub fn is_gated(&self) -> bool {
        self.gated
    }

    /// Silent and free for reuse.
    pub fn is_finished(&self) -> bool {
        !self.gated && self.envelope.is_idle()
    }
}
