// The voice-generator contract shared by every part.
//
// A generator turns a section's chord progression and time span into note
// events for one part. The progression-driven parts divide the span evenly
// across the chords (`chord_slots`) and each chord slot across the steps of a
// rhythm grid; drums tile fixed-length bars instead.
//
// Boundary rule: an onset computed at or after the end of the span is
// discarded, never clipped. After humanization, `place` keeps the note start
// inside `[span.start, span.end)` so every event belongs to its section.
//
// Implementations: comping.rs, bass.rs (line + walking), lead.rs (lead +
// solo), drums.rs, pad.rs.

use crate::chord::ChordSymbol;
use crate::event::{Instrument, NoteEvent};
use crate::patterns::SectionKind;
use crate::scale::{Key, ScaleDegrees};
use jazzhop_prng::SeededRng;

/// Where a section sits in time, and what kind it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionSpan {
    pub kind: SectionKind,
    pub start: f64,
    pub duration: f64,
}

impl SectionSpan {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end()
    }
}

/// One chord's share of a section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordSlot {
    pub index: usize,
    pub count: usize,
    pub symbol: ChordSymbol,
    pub start: f64,
    pub duration: f64,
}

impl ChordSlot {
    /// Absolute onset of `step` on a grid of `steps` equal subdivisions.
    pub fn onset(&self, step: usize, steps: usize) -> f64 {
        self.start + step as f64 * self.step_duration(steps)
    }

    pub fn step_duration(&self, steps: usize) -> f64 {
        self.duration / steps.max(1) as f64
    }
}

/// Divide `span` evenly across the chords of `progression`.
pub fn chord_slots(progression: &[ChordSymbol], span: &SectionSpan) -> Vec<ChordSlot> {
    if progression.is_empty() {
        return Vec::new();
    }
    let count = progression.len();
    let duration = span.duration / count as f64;
    progression
        .iter()
        .enumerate()
        .map(|(index, &symbol)| ChordSlot {
            index,
            count,
            symbol,
            start: span.start + index as f64 * duration,
            duration,
        })
        .collect()
}

/// Build an event for a humanized onset, or `None` if it falls past the span.
///
/// Early jitter is pulled back to the span start; `length` is measured from
/// the placed start so the note always has positive duration.
pub fn place(
    span: &SectionSpan,
    start: f64,
    length: f64,
    pitch: i32,
    velocity: i32,
    instrument: Instrument,
) -> Option<NoteEvent> {
    if start >= span.end() {
        return None;
    }
    let start = start.max(span.start);
    Some(NoteEvent::new(
        pitch,
        start,
        start + length,
        velocity,
        instrument,
    ))
}

/// Settings every generator shares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub key: Key,
    pub tempo: u32,
    /// Added to the part's base velocity before humanization.
    pub velocity_offset: i32,
}

impl VoiceParams {
    pub fn new(key: Key, tempo: u32) -> Self {
        VoiceParams {
            key,
            tempo,
            velocity_offset: 0,
        }
    }

    pub fn with_velocity_offset(self, velocity_offset: i32) -> Self {
        VoiceParams {
            velocity_offset,
            ..self
        }
    }

    pub fn degrees(&self, octave: i32) -> ScaleDegrees {
        ScaleDegrees::for_key(self.key, octave)
    }

    /// Seconds per quarter-note beat.
    pub fn beat_duration(&self) -> f64 {
        60.0 / self.tempo.max(1) as f64
    }

    /// Seconds per 4/4 bar.
    pub fn bar_duration(&self) -> f64 {
        self.beat_duration() * 4.0
    }
}

/// One part of the band.
pub trait VoiceGenerator {
    /// Name of the output track this part accumulates into.
    fn track_name(&self) -> &'static str;

    fn instrument(&self) -> Instrument;

    /// Note events for one section, each starting inside `span`.
    fn generate(
        &self,
        progression: &[ChordSymbol],
        span: &SectionSpan,
        rng: &mut SeededRng,
    ) -> Vec<NoteEvent>;
}

/// Keep `pitch` inside `[low, high]` by octave folding.
pub fn fold_into(pitch: i32, low: i32, high: i32) -> i32 {
    let mut p = pitch;
    while p < low {
        p += 12;
    }
    while p > high {
        p -= 12;
    }
    p
}
