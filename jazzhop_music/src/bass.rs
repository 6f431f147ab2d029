// Bass lines: the sixteenth-grid electric line and the quarter-note walk.
//
// `BassGenerator` picks a rhythm grid per chord from the positional feel, and
// a movement pattern per chord that it consumes cyclically across that
// chord's onsets. The pitch pool is the chord's block voicing in the bass
// octave plus the root an octave up. Stepwise movements continue from the
// previous note, which carries across chord boundaries, so chromatic runs
// can climb out of one chord into the next. Every note is folded back into
// `REGISTER`.
//
// `WalkingBassGenerator` plays the jazz-form sections (head, solo): four
// quarter notes per chord (root, third, fifth, then a chromatic approach
// tone around the root) on an upright bass.

use crate::chord::{ChordSymbol, VoicingStyle, resolve};
use crate::event::{Instrument, NoteEvent};
use crate::humanize::Humanizer;
use crate::patterns::{Movement, PatternRole, movement_patterns_for, patterns_for, positional_feel};
use crate::scale::ScaleDegrees;
use crate::voice::{SectionSpan, VoiceGenerator, VoiceParams, chord_slots, fold_into, place};
use jazzhop_prng::SeededRng;

const OCTAVE: i32 = 2;
/// Lowest and highest bass pitch (E1 to G3).
pub const REGISTER: (i32, i32) = (28, 55);

/// Root, chord tones and the octave above the root, lowest first.
fn bass_tones(symbol: ChordSymbol, degrees: &ScaleDegrees) -> Vec<i32> {
    let voicing = resolve(symbol, degrees, OCTAVE, VoicingStyle::Block);
    let mut tones = voicing.pitches;
    tones.push(voicing.root + 12);
    tones
}

// ---------------------------------------------------------------------------
// Sixteenth-grid line
// ---------------------------------------------------------------------------

const LINE_VELOCITY: i32 = 85;
const LINE_SUSTAIN: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct BassGenerator {
    params: VoiceParams,
    humanizer: Humanizer,
}

impl BassGenerator {
    pub fn new(params: VoiceParams) -> Self {
        BassGenerator {
            params,
            humanizer: Humanizer::BASS,
        }
    }
}

/// Pitch for the `n`th onset of a chord under `movement`.
fn line_pitch(movement: Movement, n: usize, tones: &[i32], previous: i32) -> i32 {
    match movement {
        Movement::ChordTones(indices) => {
            let index = indices[n % indices.len()];
            tones[index % tones.len()]
        }
        Movement::Stepwise(offsets) => previous + offsets[n % offsets.len()],
        Movement::FromRoot(offsets) => tones[0] + offsets[n % offsets.len()],
    }
}

impl VoiceGenerator for BassGenerator {
    fn track_name(&self) -> &'static str {
        "Bass"
    }

    fn instrument(&self) -> Instrument {
        Instrument::FingerBass
    }

    fn generate(
        &self,
        progression: &[ChordSymbol],
        span: &SectionSpan,
        rng: &mut SeededRng,
    ) -> Vec<NoteEvent> {
        let degrees = self.params.degrees(OCTAVE);
        let movements = movement_patterns_for(PatternRole::Bass);
        let (low, high) = REGISTER;
        let mut events = Vec::new();
        let mut last_note: Option<i32> = None;

        for slot in chord_slots(progression, span) {
            if slot.start >= span.end() {
                break;
            }
            let feel = positional_feel(slot.index, slot.count);
            let grids = patterns_for(PatternRole::Bass, feel);
            let Some(grid) = rng.choose(&grids) else {
                continue;
            };
            let Some(pattern) = rng.choose(movements) else {
                continue;
            };
            let tones = bass_tones(slot.symbol, &degrees);
            let step = slot.step_duration(grid.len());
            let mut previous = last_note.unwrap_or(tones[0]);

            for (n, index) in grid.onsets().enumerate() {
                let onset = slot.onset(index, grid.len());
                if onset >= span.end() {
                    break;
                }
                let pitch = fold_into(line_pitch(pattern.movement, n, &tones, previous), low, high);
                previous = pitch;
                let (start, velocity) = self.humanizer.apply(
                    onset,
                    LINE_VELOCITY + self.params.velocity_offset,
                    rng,
                );
                if let Some(event) = place(
                    span,
                    start,
                    step * LINE_SUSTAIN,
                    pitch,
                    velocity,
                    Instrument::FingerBass,
                ) {
                    events.push(event);
                }
            }
            last_note = Some(previous);
        }
        events
    }
}

// ---------------------------------------------------------------------------
// Walking bass
// ---------------------------------------------------------------------------

const WALK_VELOCITY: i32 = 78;
const WALK_SUSTAIN: f64 = 0.9;
/// Semitone offsets from the root for the fourth-beat approach tone.
const APPROACH: [i32; 3] = [-1, 1, 2];

#[derive(Debug, Clone)]
pub struct WalkingBassGenerator {
    params: VoiceParams,
    humanizer: Humanizer,
}

impl WalkingBassGenerator {
    pub fn new(params: VoiceParams) -> Self {
        WalkingBassGenerator {
            params,
            humanizer: Humanizer::WALKING_BASS,
        }
    }
}

impl VoiceGenerator for WalkingBassGenerator {
    fn track_name(&self) -> &'static str {
        "Walking Bass"
    }

    fn instrument(&self) -> Instrument {
        Instrument::UprightBass
    }

    fn generate(
        &self,
        progression: &[ChordSymbol],
        span: &SectionSpan,
        rng: &mut SeededRng,
    ) -> Vec<NoteEvent> {
        let degrees = self.params.degrees(OCTAVE);
        let grids = patterns_for(PatternRole::WalkingBass, span.kind);
        let (low, high) = REGISTER;
        let mut events = Vec::new();

        let Some(grid) = grids.first() else {
            return events;
        };

        for slot in chord_slots(progression, span) {
            if slot.start >= span.end() {
                break;
            }
            let tones = bass_tones(slot.symbol, &degrees);
            let root = tones[0];
            let approach = rng.choose(&APPROACH).copied().unwrap_or(-1);
            let walk = [root, tones[1], tones[2], root + approach];
            let step = slot.step_duration(grid.len());

            for (n, index) in grid.onsets().enumerate() {
                let onset = slot.onset(index, grid.len());
                if onset >= span.end() {
                    break;
                }
                let pitch = fold_into(walk[n % walk.len()], low, high);
                let (start, velocity) = self.humanizer.apply(
                    onset,
                    WALK_VELOCITY + self.params.velocity_offset,
                    rng,
                );
                if let Some(event) = place(
                    span,
                    start,
                    step * WALK_SUSTAIN,
                    pitch,
                    velocity,
                    Instrument::UprightBass,
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
            start: 0.0,
            duration: bars as f64 * 2.4,
        }
    }

    #[test]
    fn bass_tones_are_block_voicing_plus_octave() {
        let degrees = ScaleDegrees::for_key(Key::parse("C"), OCTAVE);
        let tones = bass_tones(ChordSymbol::parse("Imaj7"), &degrees);
        assert_eq!(tones, vec![36, 40, 43, 47, 48]);
    }

    #[test]
    fn chord_tone_movement_cycles_through_indices() {
        let tones = [36, 40, 43, 47, 48];
        let root_fifth = Movement::ChordTones(&[0, 2]);
        let picked: Vec<i32> = (0..4).map(|n| line_pitch(root_fifth, n, &tones, 0)).collect();
        assert_eq!(picked, vec![36, 43, 36, 43]);
        // Index 7 wraps around the five-tone pool.
        let octave_jump = Movement::ChordTones(&[0, 7, 0, 4]);
        assert_eq!(line_pitch(octave_jump, 1, &tones, 0), 43);
    }

    #[test]
    fn stepwise_movement_continues_from_previous_note() {
        let tones = [36, 40, 43, 47, 48];
        let chromatic = Movement::Stepwise(&[0, 0, 1, 1]);
        assert_eq!(line_pitch(chromatic, 2, &tones, 45), 46);
        assert_eq!(line_pitch(chromatic, 0, &tones, 45), 45);
    }

    #[test]
    fn line_stays_in_register_and_section() {
        let prog = fit_to_bars(&["ii7", "V7", "Imaj7", "vi7"], 32);
        let s = span(SectionKind::Chorus, 32);
        let mut rng = SeededRng::new(3);
        let events = BassGenerator::new(params()).generate(&prog, &s, &mut rng);
        assert!(!events.is_empty());
        for e in &events {
            assert!((28..=55).contains(&(e.pitch as i32)), "pitch {}", e.pitch);
            assert!(s.contains(e.start));
            assert_eq!(e.instrument, Instrument::FingerBass);
        }
    }

    #[test]
    fn every_chord_starts_on_the_downbeat() {
        // All bass grids have an onset on step 0.
        let prog = fit_to_bars(&["Imaj7", "IVmaj7"], 4);
        let s = span(SectionKind::VerseA, 4);
        let mut rng = SeededRng::new(11);
        let events = BassGenerator::new(params()).generate(&prog, &s, &mut rng);
        for bar in 0..4 {
            let downbeat = bar as f64 * 2.4;
            assert!(
                events.iter().any(|e| (e.start - downbeat).abs() <= 0.005 + 1e-9),
                "no note near {downbeat}"
            );
        }
    }

    #[test]
    fn one_grid_and_one_movement_per_chord() {
        // Ten one-bar chords so the positional feel changes mid-section.
        let prog = fit_to_bars(&["Imaj7", "vi7", "ii7", "V7", "iii7"], 10);
        let s = span(SectionKind::Chorus, 10);
        let degrees = ScaleDegrees::for_key(Key::parse("C"), OCTAVE);
        let (low, high) = REGISTER;
        let step = 2.4 / 16.0;

        for seed in 0..20 {
            let mut rng = SeededRng::new(seed);
            let events = BassGenerator::new(params()).generate(&prog, &s, &mut rng);
            let mut previous: Option<i32> = None;

            for (i, &symbol) in prog.iter().enumerate() {
                let bar_start = i as f64 * 2.4;
                let notes: Vec<&NoteEvent> = events
                    .iter()
                    .filter(|e| ((e.start + 0.01) / 2.4).floor() as usize == i)
                    .collect();

                let steps: Vec<usize> = notes
                    .iter()
                    .map(|e| ((e.start - bar_start) / step).round() as usize)
                    .collect();
                let grids = patterns_for(PatternRole::Bass, positional_feel(i, prog.len()));
                assert!(
                    grids.iter().any(|g| g.onsets().collect::<Vec<_>>() == steps),
                    "seed {seed} chord {i}: onsets {steps:?} match no single grid"
                );

                // Every bass grid has more onsets than any movement is long,
                // so a match means the movement wrapped around cyclically.
                let tones = bass_tones(symbol, &degrees);
                let pitches: Vec<i32> = notes.iter().map(|e| e.pitch as i32).collect();
                let entry = previous.unwrap_or(tones[0]);
                assert!(pitches.len() > 4);
                let explained = movement_patterns_for(PatternRole::Bass).iter().any(|p| {
                    let mut prev = entry;
                    pitches.iter().enumerate().all(|(n, &pitch)| {
                        let expected = fold_into(line_pitch(p.movement, n, &tones, prev), low, high);
                        prev = pitch;
                        expected == pitch
                    })
                });
                assert!(
                    explained,
                    "seed {seed} chord {i}: {pitches:?} mixes movement patterns"
                );
                previous = pitches.last().copied().or(previous);
            }
        }
    }

    #[test]
    fn a_switched_movement_is_not_one_pattern() {
        // Root-fifth for two onsets, then the chord-tone climb: no single
        // pattern produces this line.
        let tones = [36, 40, 43, 47, 48];
        let mixed = [36, 43, 43, 48];
        let explained = movement_patterns_for(PatternRole::Bass).iter().any(|p| {
            let mut prev = tones[0];
            mixed.iter().enumerate().all(|(n, &pitch)| {
                let expected = fold_into(line_pitch(p.movement, n, &tones, prev), 28, 55);
                prev = pitch;
                expected == pitch
            })
        });
        assert!(!explained);
    }

    #[test]
    fn walking_bass_plays_four_quarters_per_chord() {
        let prog = fit_to_bars(&["iim7", "V7", "Imaj7", "Imaj7"], 4);
        let s = span(SectionKind::Head, 4);
        let mut rng = SeededRng::new(5);
        let events = WalkingBassGenerator::new(params()).generate(&prog, &s, &mut rng);
        assert_eq!(events.len(), 16);
        // iim7 in C: D F A, then an approach tone around D.
        let first: Vec<u8> = events[..3].iter().map(|e| e.pitch).collect();
        assert_eq!(first, vec![38, 41, 45]);
        // A bare `7` suffix is a dominant seventh on any numeral: V7 walks G B D.
        let second: Vec<u8> = events[4..7].iter().map(|e| e.pitch).collect();
        assert_eq!(second, vec![43, 47, 50]);
        let approach = events[3].pitch as i32 - 38;
        assert!(APPROACH.contains(&approach));
        assert!(events.iter().all(|e| e.instrument == Instrument::UprightBass));
        assert!(events.iter().all(|e| (71..=85).contains(&e.velocity)));
    }
}
