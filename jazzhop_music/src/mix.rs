// Final mix levels: one velocity scale per part, relative to the drums.
//
// Piano tracks share an instrument tag, so a piano track is treated as the
// lead when it is dense (more than `LEAD_DENSITY` notes per second of the
// whole song) and as comping otherwise. Generated lead lines are capped at a
// few notes per chord, so in practice they stay under the threshold and are
// levelled as comping; only an unusually busy piano track gets `LEAD`.

use crate::event::{Instrument, Track};

pub const DRUMS: f64 = 1.0;
pub const BASS: f64 = 0.9;
pub const COMPING: f64 = 0.8;
pub const LEAD: f64 = 0.95;
pub const PAD: f64 = 0.6;

/// Notes per second above which a piano track counts as the lead.
pub const LEAD_DENSITY: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixBalancer {
    /// End of the whole arrangement, in seconds.
    pub song_end: f64,
}

impl MixBalancer {
    pub fn for_tracks(tracks: &[Track]) -> Self {
        MixBalancer {
            song_end: tracks.iter().map(Track::end_time).fold(0.0, f64::max),
        }
    }

    pub fn level(&self, track: &Track) -> f64 {
        match track.instrument {
            Instrument::DrumKit => DRUMS,
            Instrument::FingerBass | Instrument::UprightBass => BASS,
            Instrument::Pad => PAD,
            Instrument::Piano => {
                let span = if self.song_end > 0.0 { self.song_end } else { 1.0 };
                if track.events.len() as f64 / span > LEAD_DENSITY {
                    LEAD
                } else {
                    COMPING
                }
            }
        }
    }

    /// Scale every velocity by the track's level, truncating and clamping
    /// to 1-127.
    pub fn apply(&self, track: &Track) -> Track {
        let level = self.level(track);
        track.map_events(|e| e.scaled(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NoteEvent;

    fn track(instrument: Instrument, notes: usize, end: f64, velocity: i32) -> Track {
        let mut t = Track::new("t", instrument);
        let step = end / notes as f64;
        t.extend((0..notes).map(|i| {
            let s = i as f64 * step;
            NoteEvent::new(60, s, s + step, velocity, instrument)
        }));
        t
    }

    #[test]
    fn levels_per_role() {
        let tracks = vec![
            track(Instrument::DrumKit, 10, 10.0, 100),
            track(Instrument::FingerBass, 10, 10.0, 100),
            track(Instrument::Pad, 2, 10.0, 30),
        ];
        let mix = MixBalancer::for_tracks(&tracks);
        let out: Vec<u8> = tracks.iter().map(|t| mix.apply(t).events[0].velocity).collect();
        assert_eq!(out, vec![100, 90, 18]);
    }

    #[test]
    fn piano_density_picks_lead_or_comping() {
        let dense = track(Instrument::Piano, 200, 10.0, 100);
        let sparse = track(Instrument::Piano, 20, 10.0, 100);
        let mix = MixBalancer::for_tracks(&[dense.clone(), sparse.clone()]);
        assert_eq!(mix.level(&dense), LEAD);
        assert_eq!(mix.level(&sparse), COMPING);
    }

    #[test]
    fn lead_threshold_is_strictly_above_ten_per_second() {
        let mix = MixBalancer { song_end: 10.0 };
        let at_threshold = track(Instrument::Piano, 100, 10.0, 100);
        let above = track(Instrument::Piano, 101, 10.0, 100);
        assert_eq!(mix.level(&at_threshold), COMPING);
        assert_eq!(mix.level(&above), LEAD);
        assert_eq!(mix.apply(&above).events[0].velocity, (100.0 * LEAD) as u8);
    }

    #[test]
    fn scaled_velocity_never_drops_below_one() {
        let quiet = track(Instrument::Pad, 4, 4.0, 1);
        let mix = MixBalancer::for_tracks(std::slice::from_ref(&quiet));
        assert!(mix.apply(&quiet).events.iter().all(|e| e.velocity == 1));
    }
}
