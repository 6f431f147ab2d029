// Note events and tracks: the engine's output representation.
//
// A `NoteEvent` is one sounded note in absolute seconds. Events are values:
// the finishing passes (dynamics, swing, mix) never edit one in place, they
// build a shifted or re-levelled copy through `shifted` / `with_velocity`.
// A `Track` is a named, instrument-tagged list of events kept in start order.
//
// Seconds (not ticks) are the engine's time unit; midi.rs converts to ticks
// only at the output boundary.

use serde::{Deserialize, Serialize};

/// The instrument a note is written for. Lead and comping piano share
/// `Piano`; the mix pass tells them apart by density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    Piano,
    FingerBass,
    UprightBass,
    DrumKit,
    Pad,
}

impl Instrument {
    /// General MIDI program number.
    pub fn program(self) -> u8 {
        match self {
            Instrument::Piano => 0,
            Instrument::UprightBass => 32,
            Instrument::FingerBass => 33,
            // Ignored on the percussion channel.
            Instrument::DrumKit => 0,
            // New Age pad
            Instrument::Pad => 88,
        }
    }

    pub fn is_percussion(self) -> bool {
        self == Instrument::DrumKit
    }

    pub fn is_bass(self) -> bool {
        matches!(self, Instrument::FingerBass | Instrument::UprightBass)
    }
}

/// One note: pitch, start/end in seconds, velocity 1-127.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: u8,
    pub start: f64,
    pub end: f64,
    pub velocity: u8,
    pub instrument: Instrument,
}

impl NoteEvent {
    /// Build an event, clamping pitch to 0-127 and velocity to 1-127.
    ///
    /// `end` is raised to just past `start` if it would not follow it.
    pub fn new(pitch: i32, start: f64, end: f64, velocity: i32, instrument: Instrument) -> Self {
        let start = start.max(0.0);
        NoteEvent {
            pitch: pitch.clamp(0, 127) as u8,
            start,
            end: if end > start { end } else { start + 0.001 },
            velocity: clamp_velocity(velocity),
            instrument,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Copy moved later (or earlier) by `offset` seconds, duration preserved.
    pub fn shifted(&self, offset: f64) -> NoteEvent {
        NoteEvent {
            start: self.start + offset,
            end: self.end + offset,
            ..*self
        }
    }

    /// Copy with a new velocity, clamped to 1-127.
    pub fn with_velocity(&self, velocity: i32) -> NoteEvent {
        NoteEvent {
            velocity: clamp_velocity(velocity),
            ..*self
        }
    }

    /// Copy with the velocity multiplied by `factor` (truncating), clamped.
    pub fn scaled(&self, factor: f64) -> NoteEvent {
        self.with_velocity((self.velocity as f64 * factor) as i32)
    }
}

pub fn clamp_velocity(velocity: i32) -> u8 {
    velocity.clamp(1, 127) as u8
}

/// A named part: one instrument, events ordered by start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub instrument: Instrument,
    pub events: Vec<NoteEvent>,
}

impl Track {
    pub fn new(name: impl Into<String>, instrument: Instrument) -> Self {
        Track {
            name: name.into(),
            instrument,
            events: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append events and restore start order. The sort is stable, so
    /// simultaneous notes keep their generation order.
    pub fn extend(&mut self, events: impl IntoIterator<Item = NoteEvent>) {
        self.events.extend(events);
        self.events.sort_by(|a, b| a.start.total_cmp(&b.start));
    }

    /// Latest note end, or 0 for an empty track.
    pub fn end_time(&self) -> f64 {
        self.events.iter().map(|e| e.end).fold(0.0, f64::max)
    }

    /// Rebuild the track with every event mapped through `f`.
    pub fn map_events(&self, f: impl FnMut(&NoteEvent) -> NoteEvent) -> Track {
        Track {
            name: self.name.clone(),
            instrument: self.instrument,
            events: self.events.iter().map(f).collect(),
        }
    }

    /// Events starting in `[from, to)`.
    pub fn events_between(&self, from: f64, to: f64) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter(move |e| e.start >= from && e.start < to)
    }
}
