// Swing: delay the off-beat eighths of every pitched part.
//
// A note whose start falls strictly between 0.4 and 0.6 of its beat is moved
// later, start and end together, by `amount` of a sixteenth note. Percussion
// is left straight. The pass is a pure track-to-track transform; composer.rs
// makes sure it runs exactly once per finished track.

use crate::event::Track;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingQuantizer {
    /// Fraction of a sixteenth note to delay swung notes by.
    pub amount: f64,
    pub tempo: u32,
}

impl SwingQuantizer {
    pub fn new(amount: f64, tempo: u32) -> Self {
        SwingQuantizer { amount, tempo }
    }

    fn beat(&self) -> f64 {
        60.0 / self.tempo.max(1) as f64
    }

    /// Delay applied to a swung note, in seconds.
    pub fn offset(&self) -> f64 {
        self.amount * self.beat() * 0.25
    }

    /// Whether a note starting at `start` sits on a swung off-beat.
    pub fn is_off_beat(&self, start: f64) -> bool {
        let position = (start / self.beat()).fract();
        position > 0.4 && position < 0.6
    }

    pub fn apply(&self, track: &Track) -> Track {
        if track.instrument.is_percussion() || self.amount == 0.0 {
            return track.clone();
        }
        let offset = self.offset();
        track.map_events(|e| {
            if self.is_off_beat(e.start) {
                e.shifted(offset)
            } else {
                *e
            }
        })
    }
}
