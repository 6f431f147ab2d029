// Melodic piano: the chorus lead line and the solo-section improvisation.
//
// `LeadGenerator` plays short motifs above the comping. Per chord it draws a
// lead grid for the section kind and one `FromRoot` movement template, then
// walks the template from the chord root in the lead octave, at most
// `MAX_NOTES_PER_CHORD` onsets per chord.
//
// `SoloGenerator` is denser and freer: a notes-per-chord density is chosen
// once for the whole section, and each note is a random chord-scale tone an
// octave up with an occasional chromatic neighbour. Note lengths vary.

use crate::chord::{ChordSymbol, VoicingStyle, resolve};
use crate::event::{Instrument, NoteEvent};
use crate::humanize::Humanizer;
use crate::patterns::{Movement, PatternRole, movement_patterns_for, patterns_for};
use crate::scale::ScaleDegrees;
use crate::voice::{SectionSpan, VoiceGenerator, VoiceParams, chord_slots, fold_into, place};
use jazzhop_prng::SeededRng;

const OCTAVE: i32 = 5;

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

pub const MAX_NOTES_PER_CHORD: usize = 4;
const LEAD_VELOCITY: i32 = 90;
const LEAD_SUSTAIN: f64 = 0.8;
/// C4 to C7.
const LEAD_REGISTER: (i32, i32) = (60, 96);

#[derive(Debug, Clone)]
pub struct LeadGenerator {
    params: VoiceParams,
    humanizer: Humanizer,
}

impl LeadGenerator {
    pub fn new(params: VoiceParams) -> Self {
        LeadGenerator {
            params,
            humanizer: Humanizer::LEAD,
        }
    }
}

impl VoiceGenerator for LeadGenerator {
    fn track_name(&self) -> &'static str {
        "Lead Piano"
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
        let grids = patterns_for(PatternRole::Lead, span.kind);
        let movements = movement_patterns_for(PatternRole::Lead);
        let (low, high) = LEAD_REGISTER;
        let mut events = Vec::new();

        for slot in chord_slots(progression, span) {
            if slot.start >= span.end() {
                break;
            }
            let Some(grid) = rng.choose(&grids) else {
                continue;
            };
            let Some(pattern) = rng.choose(movements) else {
                continue;
            };
            let Movement::FromRoot(offsets) = pattern.movement else {
                continue;
            };
            let root = resolve(slot.symbol, &degrees, OCTAVE, VoicingStyle::Block).root;
            let step = slot.step_duration(grid.len());

            for (n, index) in grid.onsets().take(MAX_NOTES_PER_CHORD).enumerate() {
                let onset = slot.onset(index, grid.len());
                if onset >= span.end() {
                    break;
                }
                let pitch = fold_into(root + offsets[n % offsets.len()], low, high);
                let (start, velocity) = self.humanizer.apply(
                    onset,
                    LEAD_VELOCITY + self.params.velocity_offset,
                    rng,
                );
                if let Some(event) =
                    place(span, start, step * LEAD_SUSTAIN, pitch, velocity, Instrument::Piano)
                {
                    events.push(event);
                }
            }
        }
        events
    }
}

// ---------------------------------------------------------------------------
// Solo
// ---------------------------------------------------------------------------

/// Notes per chord; one is chosen for the whole section.
pub const SOLO_DENSITIES: [usize; 3] = [8, 12, 16];
const SOLO_VELOCITY: i32 = 82;
const CHROMATIC_CHANCE: f64 = 0.2;
const SOLO_REGISTER: (i32, i32) = (60, 108);

/// Chord tones in the solo octave plus the lowest three an octave up, sorted.
fn chord_scale(symbol: ChordSymbol, degrees: &ScaleDegrees) -> Vec<i32> {
    let voicing = resolve(symbol, degrees, OCTAVE, VoicingStyle::Rootless);
    let mut scale = voicing.pitches.clone();
    scale.extend(voicing.pitches.iter().take(3).map(|p| p + 12));
    scale.sort_unstable();
    scale
}

#[derive(Debug, Clone)]
pub struct SoloGenerator {
    params: VoiceParams,
    humanizer: Humanizer,
}

impl SoloGenerator {
    pub fn new(params: VoiceParams) -> Self {
        SoloGenerator {
            params,
            humanizer: Humanizer::SOLO,
        }
    }
}

impl VoiceGenerator for SoloGenerator {
    fn track_name(&self) -> &'static str {
        "Piano Solo"
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
        let density = rng.choose(&SOLO_DENSITIES).copied().unwrap_or(8);
        let (low, high) = SOLO_REGISTER;
        let mut events = Vec::new();
        log::debug!("solo over {} chords at {density} notes per chord", progression.len());

        for slot in chord_slots(progression, span) {
            if slot.start >= span.end() {
                break;
            }
            let scale = chord_scale(slot.symbol, &degrees);
            let step = slot.step_duration(density);

            for index in 0..density {
                let onset = slot.onset(index, density);
                if onset >= span.end() {
                    break;
                }
                let Some(&tone) = rng.choose(&scale) else {
                    break;
                };
                let mut pitch = tone + 12;
                if rng.chance(CHROMATIC_CHANCE) {
                    pitch += if rng.chance(0.5) { 1 } else { -1 };
                }
                let length = step * rng.range_f64(0.6, 0.9);
                let (start, velocity) = self.humanizer.apply(
                    onset,
                    SOLO_VELOCITY + self.params.velocity_offset,
                    rng,
                );
                if let Some(event) = place(
                    span,
                    start,
                    length,
                    fold_into(pitch, low, high),
                    velocity,
                    Instrument::Piano,
                ) {
                    events.push(event);
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

    fn params() -> VoiceParams {
        VoiceParams::new(Key::parse("C"), 100)
    }

    fn span(kind: SectionKind, bars: usize) -> SectionSpan {
        SectionSpan {
            kind,
            start: 4.8,
            duration: bars as f64 * 2.4,
        }
    }

    #[test]
    fn lead_caps_notes_per_chord() {
        let prog = fit_to_bars(&["Imaj7", "vi7", "ii7", "V7"], 16);
        let s = span(SectionKind::Chorus, 16);
        let mut rng = SeededRng::new(21);
        let events = LeadGenerator::new(params()).generate(&prog, &s, &mut rng);
        assert!(!events.is_empty());
        assert!(events.len() <= 16 * MAX_NOTES_PER_CHORD);
        for bar in 0..16 {
            // Shifted window so a downbeat jittered early still counts.
            let from = s.start + bar as f64 * 2.4 - 0.01;
            let in_bar = events.iter().filter(|e| e.start >= from && e.start < from + 2.4);
            assert!(in_bar.count() <= MAX_NOTES_PER_CHORD);
        }
    }

    #[test]
    fn lead_sits_in_its_register() {
        let prog = fit_to_bars(&["Imaj7", "vi7", "ii7", "V7"], 16);
        let s = span(SectionKind::Chorus2, 16);
        let mut rng = SeededRng::new(2);
        let events = LeadGenerator::new(params()).generate(&prog, &s, &mut rng);
        for e in &events {
            assert!((60..=96).contains(&(e.pitch as i32)));
            assert!(s.contains(e.start));
            assert!((80..=100).contains(&e.velocity));
        }
    }

    #[test]
    fn lead_motif_starts_on_the_chord_root() {
        // The verse lead grid opens on step 0 and every template starts at 0.
        let prog = fit_to_bars(&["ii7"], 1);
        let s = span(SectionKind::VerseA, 1);
        let mut rng = SeededRng::new(8);
        let events = LeadGenerator::new(params()).generate(&prog, &s, &mut rng);
        assert_eq!(events[0].pitch, 74);
    }

    #[test]
    fn chord_scale_adds_upper_octave() {
        let degrees = ScaleDegrees::for_key(Key::parse("C"), OCTAVE);
        let scale = chord_scale(ChordSymbol::parse("Imaj7"), &degrees);
        assert_eq!(scale, vec![76, 79, 83, 86, 88, 91, 95]);
    }

    #[test]
    fn solo_density_is_fixed_for_the_section() {
        let prog = fit_to_bars(&["ii7", "V7", "Imaj7", "vi7"], 8);
        let s = span(SectionKind::Solo, 8);
        let mut rng = SeededRng::new(17);
        let events = SoloGenerator::new(params()).generate(&prog, &s, &mut rng);
        assert_eq!(events.len() % 8, 0);
        let per_chord = events.len() / 8;
        assert!(SOLO_DENSITIES.contains(&per_chord));
        for e in &events {
            assert!(s.contains(e.start));
            assert!((70..=94).contains(&e.velocity));
            assert!((60..=108).contains(&(e.pitch as i32)));
        }
    }
}
