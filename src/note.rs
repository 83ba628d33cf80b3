//! Note: the transient value carried by a play-note request.

use serde::{Deserialize, Serialize};

use crate::error::NoteError;

/// One or more pitches played together at a single velocity.
///
/// A note has no identity beyond its frequency set: it is built per play
/// request and dropped once its release has been scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NotePayload")]
pub struct Note {
    frequencies: Vec<f64>,
    /// Velocity in [0, 1]. Values outside the range are forwarded as-is.
    velocity: f64,
}

impl Note {
    pub fn new(frequencies: impl Into<Vec<f64>>, velocity: f64) -> Result<Self, NoteError> {
        let frequencies = frequencies.into();
        if frequencies.is_empty() {
            return Err(NoteError::EmptyChord);
        }
        Ok(Note {
            frequencies,
            velocity,
        })
    }

    /// A single-voice note.
    pub fn single(frequency: f64, velocity: f64) -> Self {
        Note {
            frequencies: vec![frequency],
            velocity,
        }
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub(crate) fn into_frequencies(self) -> Vec<f64> {
        self.frequencies
    }
}

fn full_velocity() -> f64 {
    1.0
}

/// Wire shape of a note. Older UIs send a bare frequency (or list of
/// frequencies) with no velocity.
#[derive(Deserialize)]
#[serde(untagged)]
enum NotePayload {
    Full {
        frequencies: Frequencies,
        #[serde(default = "full_velocity")]
        velocity: f64,
    },
    Bare(Frequencies),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Frequencies {
    One(f64),
    Many(Vec<f64>),
}

impl From<Frequencies> for Vec<f64> {
    fn from(f: Frequencies) -> Self {
        match f {
            Frequencies::One(freq) => vec![freq],
            Frequencies::Many(freqs) => freqs,
        }
    }
}

impl TryFrom<NotePayload> for Note {
    type Error = NoteError;

    fn try_from(payload: NotePayload) -> Result<Self, Self::Error> {
        match payload {
            NotePayload::Full {
                frequencies,
                velocity,
            } => Note::new(frequencies, velocity),
            NotePayload::Bare(frequencies) => Note::new(frequencies, full_velocity()),
        }
    }
}
