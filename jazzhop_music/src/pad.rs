// Ambient pad: one soft, sustained block chord per chord slot.

use crate::chord::{ChordSymbol, VoicingStyle, resolve};
use crate::event::{Instrument, NoteEvent};
use crate::humanize::Humanizer;
use crate::patterns::{PatternRole, patterns_for};
use crate::voice::{SectionSpan, VoiceGenerator, VoiceParams, chord_slots, place};
use jazzhop_prng::SeededRng;

const OCTAVE: i32 = 3;
const BASE_VELOCITY: i32 = 30;
/// Fraction of the chord slot the pad holds, leaving a breath before the
/// next chord.
const SUSTAIN: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct PadGenerator {
    params: VoiceParams,
    humanizer: Humanizer,
}

impl PadGenerator {
    pub fn new(params: VoiceParams) -> Self {
        PadGenerator {
            params,
            humanizer: Humanizer::PAD,
        }
    }
}

impl VoiceGenerator for PadGenerator {
    fn track_name(&self) -> &'static str {
        "Ambient Pad"
    }

    fn instrument(&self) -> Instrument {
        Instrument::Pad
    }

    fn generate(
        &self,
        progression: &[ChordSymbol],
        span: &SectionSpan,
        rng: &mut SeededRng,
    ) -> Vec<NoteEvent> {
        let degrees = self.params.degrees(OCTAVE);
        let grids = patterns_for(PatternRole::Pad, span.kind);
        let mut events = Vec::new();
        let Some(grid) = grids.first() else {
            return events;
        };

        for slot in chord_slots(progression, span) {
            let voicing = resolve(slot.symbol, &degrees, OCTAVE, VoicingStyle::Block);
            let mut pitches = voicing.pitches;
            pitches.push(voicing.root + 12);
            let step = slot.step_duration(grid.len());

            for index in grid.onsets() {
                let onset = slot.onset(index, grid.len());
                if onset >= span.end() {
                    break;
                }
                let (start, velocity) = self.humanizer.apply(
                    onset,
                    BASE_VELOCITY + self.params.velocity_offset,
                    rng,
                );
                events.extend(pitches.iter().filter_map(|&pitch| {
                    place(span, start, step * SUSTAIN, pitch, velocity, Instrument::Pad)
                }));
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::SectionKind;
    use crate::progression::fit_to_bars;
    use crate::scale::Key;

    #[test]
    fn one_soft_chord_per_slot() {
        let prog = fit_to_bars(&["Imaj7", "vi7"], 4);
        let s = SectionSpan {
            kind: SectionKind::Intro,
            start: 0.0,
            duration: 9.6,
        };
        let mut rng = SeededRng::new(3);
        let pad = PadGenerator::new(VoiceParams::new(Key::parse("C"), 100));
        let events = pad.generate(&prog, &s, &mut rng);
        // Four chords of five voices each.
        assert_eq!(events.len(), 20);
        assert!(events.iter().all(|e| (25..=35).contains(&e.velocity)));
        let first: Vec<u8> = events[..5].iter().map(|e| e.pitch).collect();
        assert_eq!(first, vec![48, 52, 55, 59, 60]);
        assert!((events[0].duration() - 2.4 * 0.95).abs() < 1e-9);
        // One jittered onset per chord, shared by all its voices.
        for (i, chord) in events.chunks(5).enumerate() {
            let slot_start = i as f64 * 2.4;
            assert!(chord.iter().all(|e| e.start == chord[0].start));
            assert!((chord[0].start - slot_start).abs() <= 0.02 + 1e-9);
        }
    }
}
