// Drums: bar-tiled kit grids with occasional variation, plus boundary fills.
//
// Unlike the progression-driven parts, drums ignore the chords. The section
// is tiled with 4/4 bars from its start; each bar plays every kit piece's
// sixteenth grid. Before each bar there is a `VARIATION_CHANCE` that the
// running kit is varied (see `vary_kit`). Variations accumulate: a varied
// kit is the starting point for the next variation, for the rest of the
// section.
//
// `fill` builds the tom run that the arranger drops into the last second
// before certain section boundaries.

use crate::chord::ChordSymbol;
use crate::event::{Instrument, NoteEvent};
use crate::humanize::Humanizer;
use crate::patterns::{DrumKit, FILL, drum_kit_for};
use crate::voice::{SectionSpan, VoiceGenerator, VoiceParams, place};
use jazzhop_prng::SeededRng;

const STEPS_PER_BAR: usize = 16;
const SUSTAIN: f64 = 0.5;
const VARIATION_CHANCE: f64 = 0.2;
const STEP_CHANCE: f64 = 0.05;
const REMOVE_CHANCE: f64 = 0.3;

/// Length of each fill hit, in seconds.
pub const FILL_HIT: f64 = 0.2;

/// A copy of `kit` with a few steps flipped.
///
/// Each step of each piece is touched with 5% probability: an empty step on
/// a ghost-note piece (closed hi-hat, rim) gains a hit; an existing hit is
/// removed with probability 0.3.
pub fn vary_kit(kit: &DrumKit, rng: &mut SeededRng) -> DrumKit {
    kit.iter()
        .map(|(voice, grid)| {
            let mut varied = grid.clone();
            for step in 0..grid.len() {
                if !rng.chance(STEP_CHANCE) {
                    continue;
                }
                if !grid.is_onset(step) {
                    if voice.takes_ghost_notes() {
                        varied.set(step, true);
                    }
                } else if rng.chance(REMOVE_CHANCE) {
                    varied.set(step, false);
                }
            }
            (*voice, varied)
        })
        .collect()
}

/// Fill hits starting at `start`, keeping only those earlier than `length`
/// seconds into the fill.
pub fn fill(start: f64, length: f64) -> Vec<NoteEvent> {
    FILL.iter()
        .filter(|(offset, _, _)| *offset < length)
        .map(|&(offset, voice, velocity)| {
            let at = start + offset;
            NoteEvent::new(
                voice.pitch() as i32,
                at,
                at + FILL_HIT,
                velocity,
                Instrument::DrumKit,
            )
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct DrumGenerator {
    params: VoiceParams,
    humanizer: Humanizer,
}

impl DrumGenerator {
    pub fn new(params: VoiceParams) -> Self {
        DrumGenerator {
            params,
            humanizer: Humanizer::DRUMS,
        }
    }
}

impl VoiceGenerator for DrumGenerator {
    fn track_name(&self) -> &'static str {
        "Drums"
    }

    fn instrument(&self) -> Instrument {
        Instrument::DrumKit
    }

    fn generate(
        &self,
        _progression: &[ChordSymbol],
        span: &SectionSpan,
        rng: &mut SeededRng,
    ) -> Vec<NoteEvent> {
        let bar = self.params.bar_duration();
        let step = bar / STEPS_PER_BAR as f64;
        let end = span.end();
        let mut kit = drum_kit_for(span.kind);
        let mut events = Vec::new();
        let mut bar_start = span.start;

        while bar_start < end {
            if rng.chance(VARIATION_CHANCE) {
                kit = vary_kit(&kit, rng);
            }
            for index in 0..STEPS_PER_BAR {
                let onset = bar_start + index as f64 * step;
                if onset >= end {
                    break;
                }
                for (voice, grid) in &kit {
                    if !grid.is_onset(index) {
                        continue;
                    }
                    let (start, velocity) = self.humanizer.apply(
                        onset,
                        voice.base_velocity() + self.params.velocity_offset,
                        rng,
                    );
                    if let Some(event) = place(
                        span,
                        start,
                        step * SUSTAIN,
                        voice.pitch() as i32,
                        velocity,
                        Instrument::DrumKit,
                    ) {
                        events.push(event);
                    }
                }
            }
            bar_start += bar;
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{DrumVoice, RhythmPattern, SectionKind};
    use crate::scale::Key;

    fn generator() -> DrumGenerator {
        DrumGenerator::new(VoiceParams::new(Key::parse("C"), 100))
    }

    #[test]
    fn kick_lands_on_every_downbeat() {
        let s = SectionSpan {
            kind: SectionKind::VerseA,
            start: 0.0,
            duration: 8.0 * 2.4,
        };
        let mut rng = SeededRng::new(42);
        let events = generator().generate(&[], &s, &mut rng);
        for e in &events {
            assert!(s.contains(e.start));
            assert_eq!(e.instrument, Instrument::DrumKit);
        }
        // Variation may drop a kick now and then, so only require most bars.
        let kicked = (0..8)
            .filter(|bar| {
                let downbeat = *bar as f64 * 2.4;
                events
                    .iter()
                    .any(|e| e.pitch == 36 && (e.start - downbeat).abs() <= 0.01 + 1e-9)
            })
            .count();
        assert!(kicked >= 5, "only {kicked} bars start with a kick");
    }

    #[test]
    fn partial_bar_stops_at_section_end() {
        // One and a half bars at 100 BPM.
        let s = SectionSpan {
            kind: SectionKind::Chorus,
            start: 2.0,
            duration: 3.6,
        };
        let mut rng = SeededRng::new(1);
        let events = generator().generate(&[], &s, &mut rng);
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.start >= 2.0 && e.start < 5.6));
    }

    #[test]
    fn variation_only_adds_ghosts_to_hats_and_rim() {
        let kit: DrumKit = vec![
            (DrumVoice::Kick, RhythmPattern::from_steps(&[0; 16])),
            (DrumVoice::HiHatClosed, RhythmPattern::from_steps(&[0; 16])),
        ];
        let mut rng = SeededRng::new(77);
        let mut varied = kit.clone();
        for _ in 0..50 {
            varied = vary_kit(&varied, &mut rng);
        }
        assert_eq!(varied[0].1.onsets().count(), 0);
        assert!(varied[1].1.onsets().count() > 0);
    }

    #[test]
    fn fill_covers_the_last_second() {
        let hits = fill(10.0, 1.0);
        let pitches: Vec<u8> = hits.iter().map(|e| e.pitch).collect();
        // The crash at offset 1.0 belongs to the next section.
        assert_eq!(pitches, vec![50, 47, 41, 38]);
        assert_eq!(hits[0].start, 10.0);
        assert!(hits.iter().all(|e| e.end <= 11.0));
        assert_eq!(hits[3].velocity, 100);
    }
}
