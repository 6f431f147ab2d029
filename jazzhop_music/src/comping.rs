// Piano comping: rootless-voiced chord stabs on a syncopated sixteenth grid.
//
// For each chord the grid is picked from the positional feel (first 30% of the
// progression verse-like, middle 40% chorus-like, rest second-verse-like), so
// long sections get some internal variety no matter what the section is
// called. Every onset strikes the whole rootless voicing; the voices of a
// stab share one humanized start and velocity.

use crate::chord::{ChordSymbol, VoicingStyle, resolve};
use crate::event::{Instrument, NoteEvent};
use crate::humanize::Humanizer;
use crate::patterns::{PatternRole, patterns_for, positional_feel};
use crate::voice::{SectionSpan, VoiceGenerator, VoiceParams, chord_slots, place};
use jazzhop_prng::SeededRng;

const OCTAVE: i32 = 4;
const BASE_VELOCITY: i32 = 65;
/// Stab length in grid steps.
const SUSTAIN_STEPS: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct CompingGenerator {
    params: VoiceParams,
    humanizer: Humanizer,
}

impl CompingGenerator {
    pub fn new(params: VoiceParams) -> Self {
        CompingGenerator {
            params,
            humanizer: Humanizer::COMPING,
        }
    }
}

impl VoiceGenerator for CompingGenerator {
    fn track_name(&self) -> &'static str {
        "Piano Comping"
    }

    fn instrument(&self) -> Instrument {
        Instrument::Piano
    }

    fn generate(
        &self,
        progression: &[ChordSymbol],
        span: &SectionSpan,
        rng: &mut SeededRng,
    ) -> Vec<NoteEvent> {
        let degrees = self.params.degrees(OCTAVE);
        let mut events = Vec::new();

        for slot in chord_slots(progression, span) {
            if slot.start >= span.end() {
                break;
            }
            let feel = positional_feel(slot.index, slot.count);
            let grids = patterns_for(PatternRole::Comping, feel);
            let Some(grid) = rng.choose(&grids) else {
                continue;
            };
            let voicing = resolve(slot.symbol, &degrees, OCTAVE, VoicingStyle::Rootless);
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
                for &pitch in &voicing.pitches {
                    if let Some(event) = place(
                        span,
                        start,
                        step * SUSTAIN_STEPS,
                        pitch,
                        velocity,
                        Instrument::Piano,
                    ) {
                        events.push(event);
                    }
                }
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

    fn generator() -> CompingGenerator {
        CompingGenerator::new(VoiceParams::new(Key::parse("C"), 100))
    }

    fn span(start: f64, bars: usize) -> SectionSpan {
        SectionSpan {
            kind: SectionKind::VerseA,
            start,
            duration: bars as f64 * 2.4,
        }
    }

    #[test]
    fn stabs_stay_inside_the_section() {
        let prog = fit_to_bars(&["Imaj7", "vi7", "ii7", "V7"], 16);
        let s = span(19.2, 16);
        let mut rng = SeededRng::new(42);
        let events = generator().generate(&prog, &s, &mut rng);
        assert!(!events.is_empty());
        for e in &events {
            assert!(s.contains(e.start), "start {} outside section", e.start);
            assert!(e.end > e.start);
            assert!((40..=80).contains(&e.velocity));
        }
    }

    #[test]
    fn stabs_are_rootless_voicings() {
        let prog = fit_to_bars(&["Imaj7"], 1);
        let mut rng = SeededRng::new(1);
        let events = generator().generate(&prog, &span(0.0, 1), &mut rng);
        // C maj7 rootless: E G B D
        let mut pitches: Vec<u8> = events.iter().map(|e| e.pitch).collect();
        pitches.sort_unstable();
        pitches.dedup();
        assert_eq!(pitches, vec![64, 67, 71, 74]);
        assert_eq!(events.len() % 4, 0);
    }

    #[test]
    fn chords_of_a_stab_share_start_and_velocity() {
        let prog = fit_to_bars(&["ii7", "V7"], 2);
        let mut rng = SeededRng::new(9);
        let events = generator().generate(&prog, &span(0.0, 2), &mut rng);
        for stab in events.chunks(4) {
            assert!(stab.iter().all(|e| e.start == stab[0].start));
            assert!(stab.iter().all(|e| e.velocity == stab[0].velocity));
        }
    }
}
