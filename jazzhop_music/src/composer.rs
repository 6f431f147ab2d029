// Orchestration: timeline, per-section generation, overlays, finishing passes.
//
// `TrackComposer` owns one run. It asks the planner for a timeline, then walks
// it section by section and, within a section, part by part in the
// instrumentation order, so the order of RNG draws (and therefore the whole
// result) depends only on the seed and the settings. Each part's events get
// the section's dynamics envelope as soon as they are generated, and are
// appended to the track named by their generator. Transition overlays are
// appended after all section tracks.
//
// The finishing passes form a typestate pipeline:
//
//   compose_raw -> Arrangement<Humanized> --swing--> Arrangement<Swung>
//               --balance--> Arrangement<Balanced>
//
// Each pass consumes its input, so swing cannot be applied twice and mix
// levels cannot be applied to unswung tracks.

use crate::arrangement::{
    ArrangementPlanner, ArrangementStyle, Part, SectionPlan, StructureStyle, Timeline,
    dynamics_at,
};
use crate::bass::{BassGenerator, WalkingBassGenerator};
use crate::comping::CompingGenerator;
use crate::drums::DrumGenerator;
use crate::event::{Instrument, NoteEvent, Track};
use crate::lead::{LeadGenerator, SoloGenerator};
use crate::mix::MixBalancer;
use crate::pad::PadGenerator;
use crate::patterns::SectionKind;
use crate::scale::Key;
use crate::swing::SwingQuantizer;
use crate::voice::{SectionSpan, VoiceGenerator, VoiceParams};
use jazzhop_prng::SeededRng;
use std::marker::PhantomData;

/// Per-instrument adjustments added to each generator's base velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VelocityOffsets {
    pub piano: i32,
    pub bass: i32,
    pub upright_bass: i32,
    pub drums: i32,
    pub pad: i32,
}

impl VelocityOffsets {
    pub fn for_instrument(&self, instrument: Instrument) -> i32 {
        match instrument {
            Instrument::Piano => self.piano,
            Instrument::FingerBass => self.bass,
            Instrument::UprightBass => self.upright_bass,
            Instrument::DrumKit => self.drums,
            Instrument::Pad => self.pad,
        }
    }
}

/// Everything a run needs, already validated and resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerSettings {
    pub key: Key,
    pub tempo: u32,
    pub sections: Vec<SectionPlan>,
    pub arrangement: ArrangementStyle,
    /// Swing delay as a fraction of a sixteenth; 0 plays straight.
    pub swing_amount: f64,
    pub velocity_offsets: VelocityOffsets,
}

impl ComposerSettings {
    /// Settings for a named structure style with the default arrangement,
    /// the default swing and no velocity adjustments.
    pub fn new(key: Key, tempo: u32, structure: StructureStyle) -> Self {
        ComposerSettings {
            key,
            tempo,
            sections: structure.plans(),
            arrangement: ArrangementStyle::Full,
            swing_amount: 0.15,
            velocity_offsets: VelocityOffsets::default(),
        }
    }

    pub fn with_sections(mut self, sections: Vec<SectionPlan>) -> Self {
        self.sections = sections;
        self
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Tracks straight out of the generators: humanized, dynamics applied.
#[derive(Debug)]
pub struct Humanized;
/// Swing applied.
#[derive(Debug)]
pub struct Swung;
/// Mix levels applied; ready for output.
#[derive(Debug)]
pub struct Balanced;

/// A run's tracks and timeline at pipeline stage `S`.
#[derive(Debug)]
pub struct Arrangement<S> {
    timeline: Timeline,
    tracks: Vec<Track>,
    stage: PhantomData<S>,
}

/// A finished arrangement.
pub type Composition = Arrangement<Balanced>;

impl<S> Arrangement<S> {
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    pub fn total_bars(&self) -> usize {
        self.timeline.total_bars()
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.events.len()).sum()
    }

    fn advance<T>(self, pass: impl Fn(&Track) -> Track) -> Arrangement<T> {
        Arrangement {
            tracks: self.tracks.iter().map(pass).collect(),
            timeline: self.timeline,
            stage: PhantomData,
        }
    }
}

impl Arrangement<Humanized> {
    pub fn swing(self, quantizer: &SwingQuantizer) -> Arrangement<Swung> {
        self.advance(|t| quantizer.apply(t))
    }
}

impl Arrangement<Swung> {
    pub fn balance(self) -> Arrangement<Balanced> {
        let mix = MixBalancer::for_tracks(&self.tracks);
        self.advance(|t| mix.apply(t))
    }
}

impl Arrangement<Balanced> {
    pub fn into_parts(self) -> (Timeline, Vec<Track>) {
        (self.timeline, self.tracks)
    }
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrackComposer {
    settings: ComposerSettings,
}

impl TrackComposer {
    pub fn new(settings: ComposerSettings) -> Self {
        TrackComposer { settings }
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    fn planner(&self) -> ArrangementPlanner {
        ArrangementPlanner::new(
            self.settings.key,
            self.settings.tempo,
            self.settings.arrangement,
        )
    }

    /// The generator playing `part` in a section of `kind`.
    fn generator(&self, part: Part, kind: SectionKind) -> Box<dyn VoiceGenerator> {
        let base = VoiceParams::new(self.settings.key, self.settings.tempo);
        let offsets = self.settings.velocity_offsets;
        let params = |instrument| base.with_velocity_offset(offsets.for_instrument(instrument));
        match part {
            Part::Comping => Box::new(CompingGenerator::new(params(Instrument::Piano))),
            Part::Bass if kind.is_jazz_form() => {
                Box::new(WalkingBassGenerator::new(params(Instrument::UprightBass)))
            }
            Part::Bass => Box::new(BassGenerator::new(params(Instrument::FingerBass))),
            Part::Drums => Box::new(DrumGenerator::new(params(Instrument::DrumKit))),
            Part::Lead if kind == SectionKind::Solo => {
                Box::new(SoloGenerator::new(params(Instrument::Piano)))
            }
            Part::Lead => Box::new(LeadGenerator::new(params(Instrument::Piano))),
            Part::Pad => Box::new(PadGenerator::new(params(Instrument::Pad))),
        }
    }

    /// Generate every section and the transition overlays, before swing and
    /// mix.
    pub fn compose_raw(&self, rng: &mut SeededRng) -> Arrangement<Humanized> {
        let planner = self.planner();
        let timeline = planner.build_timeline(&self.settings.sections, rng);
        let bar = planner.bar_duration();
        let mut tracks: Vec<Track> = Vec::new();

        for entry in timeline.iter() {
            let span = entry.span();
            let section = &entry.section;
            for &part in &section.instrumentation {
                let generator = self.generator(part, section.kind);
                let events = generator.generate(&section.progression, &span, rng);
                let events = apply_dynamics(events, &span, section.bars, bar);
                log::debug!(
                    "{} / {}: {} notes",
                    section.kind.name(),
                    generator.track_name(),
                    events.len()
                );
                track_for(&mut tracks, generator.track_name(), generator.instrument())
                    .extend(events);
            }
        }
        tracks.extend(planner.transitions(&timeline));

        log::info!(
            "composed {} sections, {} bars, {} tracks",
            timeline.entries.len(),
            timeline.total_bars(),
            tracks.len()
        );
        Arrangement {
            timeline,
            tracks,
            stage: PhantomData,
        }
    }

    /// The full pipeline: generate, swing, balance.
    pub fn compose(&self, rng: &mut SeededRng) -> Composition {
        let swing = SwingQuantizer::new(self.settings.swing_amount, self.settings.tempo);
        self.compose_raw(rng).swing(&swing).balance()
    }
}

/// The track called `name`, created at the end of `tracks` on first use.
fn track_for<'a>(tracks: &'a mut Vec<Track>, name: &str, instrument: Instrument) -> &'a mut Track {
    let index = match tracks.iter().position(|t| t.name == name) {
        Some(index) => index,
        None => {
            tracks.push(Track::new(name, instrument));
            tracks.len() - 1
        }
    };
    &mut tracks[index]
}

/// Scale each event by the envelope value of the bar it starts in.
fn apply_dynamics(
    events: Vec<NoteEvent>,
    span: &SectionSpan,
    bars: usize,
    bar_duration: f64,
) -> Vec<NoteEvent> {
    let last_bar = bars.saturating_sub(1);
    events
        .into_iter()
        .map(|e| {
            let bar = ((e.start - span.start) / bar_duration).floor().max(0.0) as usize;
            e.scaled(dynamics_at(span.kind, bar.min(last_bar), bars))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(sections: &str) -> ComposerSettings {
        ComposerSettings::new(Key::C_MAJOR, 100, StructureStyle::Classic)
            .with_sections(SectionPlan::parse_list(sections).unwrap())
    }

    #[test]
    fn tracks_accumulate_across_sections() {
        let composer = TrackComposer::new(settings("verse_a:4,verse_b:4"));
        let mut rng = SeededRng::new(9);
        let raw = composer.compose_raw(&mut rng);
        let names: Vec<&str> = raw.tracks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Piano Comping", "Bass", "Drums"]);
        let comping = raw.track("Piano Comping").unwrap();
        assert!(comping.events.iter().any(|e| e.start < 9.6));
        assert!(comping.events.iter().any(|e| e.start >= 9.6));
    }

    #[test]
    fn jazz_sections_walk_and_solo() {
        let composer = TrackComposer::new(settings("head:2,solo_section:2"));
        let mut rng = SeededRng::new(4);
        let raw = composer.compose_raw(&mut rng);
        assert!(raw.track("Walking Bass").is_some());
        assert!(raw.track("Bass").is_none());
        let solo = raw.track("Piano Solo").unwrap();
        assert!(solo.events.iter().all(|e| e.start >= 4.8));
        // solo -> head would fill, head -> solo does not.
        assert!(raw.track("Drum Fills").is_none());
    }

    #[test]
    fn dynamics_scale_by_bar() {
        let span = SectionSpan {
            kind: SectionKind::Outro,
            start: 10.0,
            duration: 4.0 * 2.4,
        };
        let events = vec![
            NoteEvent::new(60, 10.0, 10.5, 100, Instrument::Piano),
            NoteEvent::new(60, 17.3, 17.5, 100, Instrument::Piano),
        ];
        let scaled = apply_dynamics(events, &span, 4, 2.4);
        let expected = |bar| (100.0 * dynamics_at(SectionKind::Outro, bar, 4)) as u8;
        assert_eq!(scaled[0].velocity, expected(0));
        assert_eq!(scaled[1].velocity, expected(3));
        assert!(scaled[1].velocity < scaled[0].velocity);
    }

    #[test]
    fn pipeline_keeps_every_note() {
        let composer = TrackComposer::new(settings("intro:2,chorus:2"));
        let raw = composer.compose_raw(&mut SeededRng::new(5));
        let finished = composer.compose(&mut SeededRng::new(5));
        assert_eq!(raw.note_count(), finished.note_count());
        assert_eq!(finished.total_bars(), 4);
        assert!(finished.track("Lead Piano").is_some());
        assert!(finished.track("Transition Chords").is_some());
    }

    #[test]
    fn velocity_offsets_follow_the_instrument() {
        let offsets = VelocityOffsets {
            piano: -5,
            drums: 10,
            ..VelocityOffsets::default()
        };
        assert_eq!(offsets.for_instrument(Instrument::Piano), -5);
        assert_eq!(offsets.for_instrument(Instrument::DrumKit), 10);
        assert_eq!(offsets.for_instrument(Instrument::UprightBass), 0);
    }
}
