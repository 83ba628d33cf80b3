//! Mixer: sums voices into an output block with gain and soft clipping.

/// Summing bus with master gain and tanh soft clipping.
#[derive(Debug, Clone)]
pub struct Mixer {
    pub master_gain: f64,
    bus: Vec<f64>,
}

impl Mixer {
    pub fn new() -> Self {
        Mixer {
            master_gain: 0.8,
            bus: Vec::new(),
        }
    }

    /// Zero the bus for a block of `frames` samples.
    pub fn begin(&mut self, frames: usize) {
        self.bus.clear();
        self.bus.resize(frames, 0.0);
    }

    /// Accumulate one source over the whole block.
    pub fn add_with(&mut self, mut source: impl FnMut() -> f64) {
        for slot in &mut self.bus {
            *slot += source();
        }
    }

    /// Write the block into `out`, gained and soft clipped.
    pub fn finish(&self, out: &mut [f32]) {
        for (o, s) in out.iter_mut().zip(&self.bus) {
            *o = (s * self.master_gain).tanh() as f32;
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}
