// Song form: structure templates, instrumentation, timeline, dynamics and
// section transitions.
//
// A structure style names an ordered list of section kinds; each kind has a
// fixed bar count. The planner turns that list (or an explicit `kind:bars`
// list) into a contiguous `Timeline` at the run tempo, drawing one chord
// progression per section from the shared RNG in section order.
//
// Instrumentation comes from an arrangement style table keyed by section
// kind, with a fallback of comping, bass and drums for kinds a style does not
// list. The dynamics envelope is a per-kind base level times a per-kind curve
// over the section's bars.
//
// Transitions are overlays. Fills and pivot chords are built as their own
// tracks and never touch the notes of the sections they bridge:
// - drum fill in the last second before verse -> chorus, chorus -> bridge,
//   bridge -> chorus and solo -> head;
// - the key's dominant seventh in the last half second before any change
//   into a chorus or bridge.

use crate::chord::{ChordSymbol, VoicingStyle, resolve};
use crate::drums;
use crate::error::ConfigError;
use crate::event::{Instrument, NoteEvent, Track};
use crate::patterns::SectionKind;
use crate::progression::progression_for;
use crate::scale::{Key, ScaleDegrees};
use crate::voice::SectionSpan;
use jazzhop_prng::SeededRng;
use serde::{Deserialize, Serialize};

/// Bars per section kind when the form comes from a structure style.
pub fn bars_for(kind: SectionKind) -> usize {
    match kind {
        SectionKind::Intro | SectionKind::Bridge | SectionKind::Outro => 8,
        SectionKind::Solo => 32,
        SectionKind::VerseA
        | SectionKind::VerseB
        | SectionKind::Chorus
        | SectionKind::Chorus2
        | SectionKind::Head
        | SectionKind::Default => 16,
    }
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureStyle {
    Classic,
    Standard,
    Extended,
    Simple,
    JazzStandard,
}

impl StructureStyle {
    pub const ALL: [StructureStyle; 5] = [
        StructureStyle::Classic,
        StructureStyle::Standard,
        StructureStyle::Extended,
        StructureStyle::Simple,
        StructureStyle::JazzStandard,
    ];

    /// Parse a style name; unknown names fall back to `Classic`.
    pub fn parse(name: &str) -> StructureStyle {
        StructureStyle::ALL
            .into_iter()
            .find(|s| s.name() == name.trim())
            .unwrap_or_else(|| {
                log::debug!("unknown structure style '{name}', using classic");
                StructureStyle::Classic
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            StructureStyle::Classic => "classic",
            StructureStyle::Standard => "standard",
            StructureStyle::Extended => "extended",
            StructureStyle::Simple => "simple",
            StructureStyle::JazzStandard => "jazz_standard",
        }
    }

    pub fn sections(self) -> &'static [SectionKind] {
        use SectionKind::*;
        match self {
            StructureStyle::Classic => &[Intro, VerseA, Chorus, VerseB, Chorus2, Outro],
            StructureStyle::Standard => &[Intro, VerseA, Chorus, VerseB, Chorus, Outro],
            StructureStyle::Extended => {
                &[Intro, VerseA, Chorus, VerseB, Chorus, Bridge, Chorus, Outro]
            }
            StructureStyle::Simple => &[Intro, VerseA, VerseB, Chorus, Outro],
            StructureStyle::JazzStandard => &[Intro, Head, Solo, Head, Outro],
        }
    }

    /// The style's sections with their table bar counts.
    pub fn plans(self) -> Vec<SectionPlan> {
        self.sections()
            .iter()
            .map(|&kind| SectionPlan {
                kind,
                bars: bars_for(kind),
            })
            .collect()
    }
}

/// A section kind and how many bars it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPlan {
    pub kind: SectionKind,
    pub bars: usize,
}

impl SectionPlan {
    /// Parse `"intro:8,verse_a:16"`. A bare kind takes its table bar count.
    pub fn parse_list(list: &str) -> Result<Vec<SectionPlan>, ConfigError> {
        let plans = list
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(SectionPlan::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if plans.is_empty() {
            return Err(ConfigError::NoSections);
        }
        Ok(plans)
    }

    fn parse(item: &str) -> Result<SectionPlan, ConfigError> {
        let (kind, bars) = match item.split_once(':') {
            Some((kind, bars)) => {
                let kind = SectionKind::parse(kind);
                let bars = bars
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::Section(item.to_string()))?;
                (kind, bars)
            }
            None => {
                let kind = SectionKind::parse(item);
                (kind, bars_for(kind))
            }
        };
        if bars == 0 {
            return Err(ConfigError::Section(item.to_string()));
        }
        Ok(SectionPlan { kind, bars })
    }
}

// ---------------------------------------------------------------------------
// Instrumentation
// ---------------------------------------------------------------------------

/// A role in the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Part {
    Comping,
    Bass,
    Drums,
    /// Lead line, or the solo in a solo section.
    Lead,
    Pad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrangementStyle {
    Full,
    Minimal,
    Building,
}

const FALLBACK_PARTS: &[Part] = &[Part::Comping, Part::Bass, Part::Drums];

impl ArrangementStyle {
    pub const ALL: [ArrangementStyle; 3] = [
        ArrangementStyle::Full,
        ArrangementStyle::Minimal,
        ArrangementStyle::Building,
    ];

    /// Parse a style name; unknown names fall back to `Full`.
    pub fn parse(name: &str) -> ArrangementStyle {
        ArrangementStyle::ALL
            .into_iter()
            .find(|s| s.name() == name.trim())
            .unwrap_or_else(|| {
                log::debug!("unknown arrangement style '{name}', using full");
                ArrangementStyle::Full
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            ArrangementStyle::Full => "full",
            ArrangementStyle::Minimal => "minimal",
            ArrangementStyle::Building => "building",
        }
    }

    /// Parts playing in a section of `kind`.
    pub fn instrumentation(self, kind: SectionKind) -> Vec<Part> {
        use Part::*;
        use SectionKind as K;
        let parts: &[Part] = match (self, kind) {
            (ArrangementStyle::Full, K::Intro | K::Outro) => &[Comping, Bass],
            (ArrangementStyle::Full, K::VerseA | K::VerseB) => &[Comping, Bass, Drums],
            (ArrangementStyle::Full, K::Chorus | K::Chorus2 | K::Solo) => {
                &[Comping, Bass, Drums, Lead]
            }

            (ArrangementStyle::Minimal, K::Intro | K::VerseA) => &[Comping, Bass],
            (ArrangementStyle::Minimal, K::Chorus | K::Chorus2 | K::VerseB) => {
                &[Comping, Bass, Drums]
            }
            (ArrangementStyle::Minimal, K::Outro) => &[Comping],

            (ArrangementStyle::Building, K::Intro) => &[Comping],
            (ArrangementStyle::Building, K::VerseA | K::Outro) => &[Comping, Bass],
            (ArrangementStyle::Building, K::Chorus | K::Chorus2) => &[Comping, Bass, Drums],
            (ArrangementStyle::Building, K::VerseB) => &[Comping, Bass, Drums, Pad],

            _ => FALLBACK_PARTS,
        };
        parts.to_vec()
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// One planned section: its chords and who plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub bars: usize,
    pub progression: Vec<ChordSymbol>,
    pub instrumentation: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub section: Section,
    pub start: f64,
    pub duration: f64,
}

impl TimelineEntry {
    pub fn span(&self) -> SectionSpan {
        SectionSpan {
            kind: self.section.kind,
            start: self.start,
            duration: self.duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Contiguous, non-overlapping sections in play order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn total_duration(&self) -> f64 {
        self.entries.last().map_or(0.0, TimelineEntry::end)
    }

    pub fn total_bars(&self) -> usize {
        self.entries.iter().map(|e| e.section.bars).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    /// Adjacent (current, next) pairs.
    pub fn boundaries(&self) -> impl Iterator<Item = (&TimelineEntry, &TimelineEntry)> {
        self.entries.iter().zip(self.entries.iter().skip(1))
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

pub const FILL_LENGTH: f64 = 1.0;
pub const PIVOT_LENGTH: f64 = 0.5;
const PIVOT_VELOCITY: i32 = 70;
const PIVOT_OCTAVE: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrangementPlanner {
    pub key: Key,
    pub tempo: u32,
    pub style: ArrangementStyle,
}

impl ArrangementPlanner {
    pub fn new(key: Key, tempo: u32, style: ArrangementStyle) -> Self {
        ArrangementPlanner { key, tempo, style }
    }

    pub fn bar_duration(&self) -> f64 {
        60.0 / self.tempo.max(1) as f64 * 4.0
    }

    /// Lay `plans` end to end, drawing each section's progression.
    pub fn build_timeline(&self, plans: &[SectionPlan], rng: &mut SeededRng) -> Timeline {
        let mut start = 0.0;
        let mut entries = Vec::with_capacity(plans.len());
        for plan in plans {
            let duration = self.bar_duration() * plan.bars as f64;
            let section = Section {
                kind: plan.kind,
                bars: plan.bars,
                progression: progression_for(plan.kind, plan.bars, rng),
                instrumentation: self.style.instrumentation(plan.kind),
            };
            log::debug!(
                "section {} at {start:.2}s: {} bars, {:?}",
                plan.kind.name(),
                plan.bars,
                section.instrumentation
            );
            entries.push(TimelineEntry {
                section,
                start,
                duration,
            });
            start += duration;
        }
        Timeline { entries }
    }

    /// Fill and pivot overlay tracks for every section boundary.
    pub fn transitions(&self, timeline: &Timeline) -> Vec<Track> {
        let mut fills = Track::new("Drum Fills", Instrument::DrumKit);
        let mut pivots = Track::new("Transition Chords", Instrument::Piano);

        for (current, next) in timeline.boundaries() {
            let (from, to) = (current.section.kind, next.section.kind);
            if needs_drum_fill(from, to) {
                let start = (current.end() - FILL_LENGTH).max(current.start);
                fills.extend(drums::fill(start, FILL_LENGTH));
            }
            if needs_pivot(from, to) {
                pivots.extend(self.pivot(current));
            }
        }
        [fills, pivots].into_iter().filter(|t| !t.is_empty()).collect()
    }

    /// The key's V7 held through the last half second of `section`.
    fn pivot(&self, section: &TimelineEntry) -> Vec<NoteEvent> {
        let end = section.end();
        let start = (end - PIVOT_LENGTH).max(section.start);
        let degrees = ScaleDegrees::for_key(self.key, PIVOT_OCTAVE);
        resolve(
            ChordSymbol::dominant(),
            &degrees,
            PIVOT_OCTAVE,
            VoicingStyle::Block,
        )
        .pitches
        .into_iter()
        .map(|pitch| NoteEvent::new(pitch, start, end, PIVOT_VELOCITY, Instrument::Piano))
        .collect()
    }
}

pub fn needs_drum_fill(current: SectionKind, next: SectionKind) -> bool {
    (current.is_verse_like() && next.is_chorus_like())
        || (current.is_chorus_like() && next == SectionKind::Bridge)
        || (current == SectionKind::Bridge && next.is_chorus_like())
        || (current == SectionKind::Solo && next == SectionKind::Head)
}

pub fn needs_pivot(current: SectionKind, next: SectionKind) -> bool {
    current != next && (next.is_chorus_like() || next == SectionKind::Bridge)
}

// ---------------------------------------------------------------------------
// Dynamics
// ---------------------------------------------------------------------------

fn base_level(kind: SectionKind) -> f64 {
    match kind {
        SectionKind::Intro | SectionKind::Outro => 0.6,
        SectionKind::VerseB => 0.75,
        SectionKind::Chorus | SectionKind::Chorus2 => 0.85,
        SectionKind::Bridge => 0.8,
        SectionKind::Solo => 0.9,
        SectionKind::VerseA | SectionKind::Head | SectionKind::Default => 0.7,
    }
}

/// Velocity scale for bar `bar` of a `total_bars`-bar section of `kind`.
///
/// Choruses and solos build from 0.9 to 1.0 of their base level, outros fade
/// from 1.0 to 0.6, everything else builds gently from 0.95.
pub fn dynamics_at(kind: SectionKind, bar: usize, total_bars: usize) -> f64 {
    let progress = if total_bars == 0 {
        0.0
    } else {
        bar as f64 / total_bars as f64
    };
    let curve = if kind.is_chorus_like() || kind == SectionKind::Solo {
        0.9 + 0.1 * progress
    } else if kind == SectionKind::Outro {
        1.0 - 0.4 * progress
    } else {
        0.95 + 0.05 * progress
    };
    base_level(kind) * curve
}
