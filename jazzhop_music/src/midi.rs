// MIDI output for finished arrangements.
//
// Converts engine tracks (seconds) into a Standard MIDI File, format 1:
// track 0 carries the tempo, then one MIDI track per engine track with its
// name, a program change and the notes. Times are converted with the run
// tempo at 480 ticks per quarter note. At equal ticks, note-offs are written
// before note-ons so a repeated pitch re-strikes instead of being cut short.
//
// Every instrument takes its channel from a `ChannelMap` built from the
// config; drums default to the General MIDI percussion channel.
//
// Uses the `midly` crate for MIDI writing.

use crate::error::GenerateError;
use crate::event::{Instrument, Track};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// General MIDI percussion channel (channel 10, zero-based).
pub const PERCUSSION_CHANNEL: u8 = 9;

/// MIDI channel per instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelMap {
    pub piano: u8,
    pub bass: u8,
    pub upright_bass: u8,
    pub drums: u8,
    pub pad: u8,
}

impl Default for ChannelMap {
    fn default() -> Self {
        ChannelMap {
            piano: 0,
            bass: 1,
            upright_bass: 2,
            drums: PERCUSSION_CHANNEL,
            pad: 3,
        }
    }
}

impl ChannelMap {
    pub fn channel(&self, instrument: Instrument) -> u8 {
        let channel = match instrument {
            Instrument::Piano => self.piano,
            Instrument::FingerBass => self.bass,
            Instrument::UprightBass => self.upright_bass,
            Instrument::Pad => self.pad,
            Instrument::DrumKit => self.drums,
        };
        channel.min(15)
    }
}

/// Seconds to ticks at `tempo` BPM.
pub fn seconds_to_ticks(seconds: f64, tempo: u32) -> u32 {
    let beats = seconds.max(0.0) * tempo as f64 / 60.0;
    (beats * TICKS_PER_QUARTER as f64).round() as u32
}

/// Build an in-memory SMF. Track names are borrowed from `tracks`.
pub fn to_smf<'a>(tracks: &'a [Track], tempo: u32, channels: &ChannelMap) -> Smf<'a> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo track
    let tempo_microseconds = 60_000_000 / tempo.max(1);
    smf.tracks.push(vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]);

    for track in tracks {
        smf.tracks.push(encode_track(track, tempo, channels));
    }
    smf
}

fn encode_track<'a>(track: &'a Track, tempo: u32, channels: &ChannelMap) -> Vec<TrackEvent<'a>> {
    let channel = u4::new(channels.channel(track.instrument));
    let mut events = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(track.name.as_bytes())),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(track.instrument.program()),
                },
            },
        },
    ];

    // (tick, is_on, message); offs sort before ons at the same tick.
    let mut timed: Vec<(u32, bool, MidiMessage)> = Vec::with_capacity(track.events.len() * 2);
    for note in &track.events {
        let key = u7::new(note.pitch.min(127));
        let on = seconds_to_ticks(note.start, tempo);
        let off = seconds_to_ticks(note.end, tempo).max(on + 1);
        timed.push((
            on,
            true,
            MidiMessage::NoteOn {
                key,
                vel: u7::new(note.velocity.clamp(1, 127)),
            },
        ));
        timed.push((
            off,
            false,
            MidiMessage::NoteOff {
                key,
                vel: u7::new(0),
            },
        ));
    }
    timed.sort_by_key(|&(tick, is_on, _)| (tick, is_on));

    let mut last_tick = 0;
    for (tick, _, message) in timed {
        events.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }

    events.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    events
}

/// Encode `tracks` as SMF bytes.
pub fn encode(tracks: &[Track], tempo: u32, channels: &ChannelMap) -> Result<Vec<u8>, GenerateError> {
    let smf = to_smf(tracks, tempo, channels);
    let mut buf = Vec::new();
    smf.write_std(&mut buf).map_err(GenerateError::Midi)?;
    Ok(buf)
}

/// Encode `tracks` and write them to `path`.
pub fn write_midi(
    path: &Path,
    tracks: &[Track],
    tempo: u32,
    channels: &ChannelMap,
) -> Result<(), GenerateError> {
    let bytes = encode(tracks, tempo, channels)?;
    std::fs::write(path, bytes).map_err(|e| GenerateError::io(path, e))
}
