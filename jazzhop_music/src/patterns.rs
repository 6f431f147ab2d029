// Pattern library: rhythmic step grids and melodic movement templates.
//
// Pure data plus lookup. Rhythm grids are one bar of sixteenths (the lead and
// walking-bass grids use eighths and quarters) keyed by section kind and
// pattern role. A kind with no entry for a role resolves to the verse set
// (`SectionKind::DEFAULT_PATTERNS`). Choosing among alternative grids is the
// caller's job and happens once per chord or per section, never per note.
//
// Movement patterns describe how consecutive onsets move:
// - `ChordTones`: indices into the current chord's tone list.
// - `FromRoot`: semitone offsets above the chord root.
// - `Stepwise`: semitone offsets from the previously played pitch.
//
// Also holds the section-kind enumeration and the positional "feel" split used
// by the progression-driven generators (bass, comping).

use serde::{Deserialize, Serialize};

/// The kinds of song section the arranger knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKind {
    Intro,
    VerseA,
    VerseB,
    Chorus,
    Chorus2,
    Bridge,
    Head,
    Solo,
    Outro,
    /// Anything unrecognized; behaves like a verse.
    Default,
}

impl SectionKind {
    pub const ALL: [SectionKind; 10] = [
        SectionKind::Intro,
        SectionKind::VerseA,
        SectionKind::VerseB,
        SectionKind::Chorus,
        SectionKind::Chorus2,
        SectionKind::Bridge,
        SectionKind::Head,
        SectionKind::Solo,
        SectionKind::Outro,
        SectionKind::Default,
    ];

    /// Kind whose patterns stand in for kinds without their own entry.
    pub const DEFAULT_PATTERNS: SectionKind = SectionKind::VerseA;

    pub fn parse(name: &str) -> SectionKind {
        match name.trim().to_lowercase().as_str() {
            "intro" => SectionKind::Intro,
            "verse" | "verse_a" => SectionKind::VerseA,
            "verse_b" => SectionKind::VerseB,
            "chorus" => SectionKind::Chorus,
            "chorus_2" | "chorus2" => SectionKind::Chorus2,
            "bridge" => SectionKind::Bridge,
            "head" => SectionKind::Head,
            "solo" | "solo_section" => SectionKind::Solo,
            "outro" => SectionKind::Outro,
            other => {
                log::debug!("unknown section kind '{other}', treating it as a verse");
                SectionKind::Default
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::VerseA => "verse_a",
            SectionKind::VerseB => "verse_b",
            SectionKind::Chorus => "chorus",
            SectionKind::Chorus2 => "chorus_2",
            SectionKind::Bridge => "bridge",
            SectionKind::Head => "head",
            SectionKind::Solo => "solo_section",
            SectionKind::Outro => "outro",
            SectionKind::Default => "default",
        }
    }

    pub fn is_chorus_like(self) -> bool {
        matches!(self, SectionKind::Chorus | SectionKind::Chorus2)
    }

    pub fn is_verse_like(self) -> bool {
        matches!(
            self,
            SectionKind::VerseA | SectionKind::VerseB | SectionKind::Default
        )
    }

    /// Jazz-form sections, played with a walking bass.
    pub fn is_jazz_form(self) -> bool {
        matches!(self, SectionKind::Head | SectionKind::Solo)
    }
}

/// Pattern "feel" for chord `index` of a `len`-chord progression.
///
/// The first 30% of the chords play verse-like grids, the middle 40%
/// chorus-like grids and the rest the second verse set, regardless of the
/// section the progression belongs to.
pub fn positional_feel(index: usize, len: usize) -> SectionKind {
    let position = index as f64;
    let len = len as f64;
    if position < len * 0.3 {
        SectionKind::VerseA
    } else if position < len * 0.7 {
        SectionKind::Chorus
    } else {
        SectionKind::VerseB
    }
}

/// A fixed-length onset grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhythmPattern {
    steps: Vec<bool>,
}

impl RhythmPattern {
    pub fn from_steps(steps: &[u8]) -> Self {
        RhythmPattern {
            steps: steps.iter().map(|&s| s != 0).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_onset(&self, step: usize) -> bool {
        self.steps.get(step).copied().unwrap_or(false)
    }

    pub fn set(&mut self, step: usize, onset: bool) {
        if let Some(s) = self.steps.get_mut(step) {
            *s = onset;
        }
    }

    /// Indices of onset steps, in order.
    pub fn onsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| i)
    }
}

/// Which generator a rhythm grid is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternRole {
    Comping,
    Bass,
    WalkingBass,
    Lead,
    Pad,
}

type Grid16 = [u8; 16];

const COMPING_VERSE_A: &[Grid16] = &[
    [0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
    [0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0],
];
const COMPING_VERSE_B: &[Grid16] = &[
    [0, 0, 1, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0],
    [0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 1, 0],
    [1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0, 1],
];
const COMPING_CHORUS: &[Grid16] = &[
    [0, 0, 1, 0, 0, 1, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0],
    [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 1, 0],
    [0, 1, 1, 0, 0, 1, 0, 1, 0, 1, 1, 0, 0, 1, 0, 0],
];
const COMPING_CHORUS_2: &[Grid16] = &[
    [0, 0, 1, 1, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0, 1, 0],
    [1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0],
];
const COMPING_OUTRO: &[Grid16] = &[
    [0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
];

const BASS_VERSE_A: &[Grid16] = &[
    [1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0],
    [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0, 0],
    [1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0],
];
const BASS_VERSE_B: &[Grid16] = &[
    [1, 0, 0, 0, 0, 1, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0],
    [1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0],
    [1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 0],
];
const BASS_CHORUS: &[Grid16] = &[
    [1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0],
    [1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 0],
    [1, 0, 0, 1, 0, 0, 1, 1, 1, 0, 0, 0, 1, 0, 1, 0],
];
const BASS_CHORUS_2: &[Grid16] = &[
    [1, 0, 0, 0, 1, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 0],
];
const BASS_OUTRO: &[Grid16] = &[
    [1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0],
];

// Lead grids are eighth notes over one chord.
const LEAD_VERSE: &[[u8; 8]] = &[[1, 0, 0, 0, 1, 0, 1, 0]];
const LEAD_CHORUS: &[[u8; 8]] = &[
    [1, 0, 1, 0, 1, 0, 1, 0],
    [1, 0, 0, 1, 0, 1, 1, 0],
    [0, 1, 1, 0, 1, 0, 0, 1],
];
const LEAD_CHORUS_2: &[[u8; 8]] = &[[1, 1, 0, 1, 0, 1, 0, 0], [1, 0, 1, 1, 0, 0, 1, 0]];

// One quarter note per beat.
const WALKING: &[[u8; 4]] = &[[1, 1, 1, 1]];

// One sustained onset per chord.
const PAD: &[[u8; 1]] = &[[1]];

fn grids<const N: usize>(table: &[[u8; N]]) -> Vec<RhythmPattern> {
    table.iter().map(|g| RhythmPattern::from_steps(g)).collect()
}

/// Grids registered for exactly this role and kind, if any.
pub fn lookup(role: PatternRole, kind: SectionKind) -> Option<Vec<RhythmPattern>> {
    use SectionKind as K;
    let found = match role {
        PatternRole::Comping => match kind {
            K::VerseA => grids(COMPING_VERSE_A),
            K::VerseB => grids(COMPING_VERSE_B),
            K::Chorus => grids(COMPING_CHORUS),
            K::Chorus2 => grids(COMPING_CHORUS_2),
            K::Outro => grids(COMPING_OUTRO),
            _ => return None,
        },
        PatternRole::Bass => match kind {
            K::VerseA => grids(BASS_VERSE_A),
            K::VerseB => grids(BASS_VERSE_B),
            K::Chorus => grids(BASS_CHORUS),
            K::Chorus2 => grids(BASS_CHORUS_2),
            K::Outro => grids(BASS_OUTRO),
            _ => return None,
        },
        PatternRole::Lead => match kind {
            K::VerseA => grids(LEAD_VERSE),
            K::Chorus => grids(LEAD_CHORUS),
            K::Chorus2 => grids(LEAD_CHORUS_2),
            _ => return None,
        },
        PatternRole::WalkingBass => grids(WALKING),
        PatternRole::Pad => grids(PAD),
    };
    Some(found)
}

/// Grids for `role` in `kind`, falling back to the default pattern kind.
pub fn patterns_for(role: PatternRole, kind: SectionKind) -> Vec<RhythmPattern> {
    lookup(role, kind)
        .or_else(|| lookup(role, SectionKind::DEFAULT_PATTERNS))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Drum kit
// ---------------------------------------------------------------------------

/// Kit pieces, mapped to General MIDI percussion keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrumVoice {
    Kick,
    Snare,
    HiHatClosed,
    HiHatOpen,
    Crash,
    Ride,
    Rim,
    TomLow,
    TomMid,
    TomHigh,
}

impl DrumVoice {
    pub fn pitch(self) -> u8 {
        match self {
            DrumVoice::Kick => 36,
            DrumVoice::Snare => 38,
            DrumVoice::HiHatClosed => 42,
            DrumVoice::HiHatOpen => 46,
            DrumVoice::Crash => 49,
            DrumVoice::Ride => 51,
            DrumVoice::Rim => 37,
            DrumVoice::TomLow => 41,
            DrumVoice::TomMid => 47,
            DrumVoice::TomHigh => 50,
        }
    }

    pub fn base_velocity(self) -> i32 {
        match self {
            DrumVoice::Kick => 100,
            DrumVoice::Snare => 95,
            DrumVoice::HiHatClosed => 70,
            DrumVoice::HiHatOpen => 80,
            DrumVoice::Crash => 110,
            DrumVoice::Ride => 75,
            DrumVoice::Rim => 60,
            DrumVoice::TomLow | DrumVoice::TomMid | DrumVoice::TomHigh => 80,
        }
    }

    /// Pieces that may pick up ghost notes when a bar is varied.
    pub fn takes_ghost_notes(self) -> bool {
        matches!(self, DrumVoice::HiHatClosed | DrumVoice::Rim)
    }
}

/// One bar of drum grids, one per kit piece.
pub type DrumKit = Vec<(DrumVoice, RhythmPattern)>;

const KIT_VERSE_A: &[(DrumVoice, Grid16)] = &[
    (DrumVoice::Kick, [1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0]),
    (DrumVoice::Snare, [0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]),
    (DrumVoice::HiHatClosed, [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0]),
    (DrumVoice::HiHatOpen, [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1]),
];
const KIT_VERSE_B: &[(DrumVoice, Grid16)] = &[
    (DrumVoice::Kick, [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0]),
    (DrumVoice::Snare, [0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0]),
    (DrumVoice::HiHatClosed, [1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 0]),
    (DrumVoice::Rim, [0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1]),
];
const KIT_CHORUS: &[(DrumVoice, Grid16)] = &[
    (DrumVoice::Kick, [1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 1, 0, 0, 1, 0]),
    (DrumVoice::Snare, [0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]),
    (DrumVoice::HiHatClosed, [1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1, 1]),
    (DrumVoice::Crash, [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
];
const KIT_CHORUS_2: &[(DrumVoice, Grid16)] = &[
    (DrumVoice::Kick, [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0]),
    (DrumVoice::Snare, [0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 1]),
    (DrumVoice::HiHatClosed, [0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1]),
    (DrumVoice::HiHatOpen, [1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0]),
];
const KIT_OUTRO: &[(DrumVoice, Grid16)] = &[
    (DrumVoice::Kick, [1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]),
    (DrumVoice::Snare, [0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]),
    (DrumVoice::HiHatClosed, [1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 1, 0]),
    (DrumVoice::Ride, [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0]),
];

/// The drum kit registered for exactly this kind, if any.
pub fn lookup_kit(kind: SectionKind) -> Option<DrumKit> {
    let table = match kind {
        SectionKind::VerseA => KIT_VERSE_A,
        SectionKind::VerseB => KIT_VERSE_B,
        SectionKind::Chorus => KIT_CHORUS,
        SectionKind::Chorus2 => KIT_CHORUS_2,
        SectionKind::Outro => KIT_OUTRO,
        _ => return None,
    };
    Some(
        table
            .iter()
            .map(|(voice, grid)| (*voice, RhythmPattern::from_steps(grid)))
            .collect(),
    )
}

/// Drum kit for `kind`, falling back to the default pattern kind.
pub fn drum_kit_for(kind: SectionKind) -> DrumKit {
    lookup_kit(kind)
        .or_else(|| lookup_kit(SectionKind::DEFAULT_PATTERNS))
        .unwrap_or_default()
}

/// Tom fill played into a section boundary: (offset in seconds, piece).
pub const FILL: &[(f64, DrumVoice, i32)] = &[
    (0.0, DrumVoice::TomHigh, 90),
    (0.25, DrumVoice::TomMid, 85),
    (0.5, DrumVoice::TomLow, 95),
    (0.75, DrumVoice::Snare, 100),
    (1.0, DrumVoice::Crash, 110),
];

// ---------------------------------------------------------------------------
// Movement patterns
// ---------------------------------------------------------------------------

/// How successive onsets pick their pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    ChordTones(&'static [usize]),
    FromRoot(&'static [i32]),
    Stepwise(&'static [i32]),
}

impl Movement {
    pub fn len(&self) -> usize {
        match self {
            Movement::ChordTones(s) => s.len(),
            Movement::FromRoot(s) | Movement::Stepwise(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementPattern {
    pub name: &'static str,
    pub movement: Movement,
}

const BASS_MOVEMENTS: &[MovementPattern] = &[
    MovementPattern {
        name: "root_fifth",
        movement: Movement::ChordTones(&[0, 2]),
    },
    MovementPattern {
        name: "walking",
        movement: Movement::ChordTones(&[0, 1, 2, 4]),
    },
    MovementPattern {
        name: "chord_tones",
        movement: Movement::ChordTones(&[0, 2, 4, 6]),
    },
    MovementPattern {
        name: "chromatic",
        movement: Movement::Stepwise(&[0, 0, 1, 1]),
    },
    MovementPattern {
        name: "octave_jump",
        movement: Movement::ChordTones(&[0, 7, 0, 4]),
    },
];

const LEAD_MOVEMENTS: &[MovementPattern] = &[
    MovementPattern {
        name: "scalar",
        movement: Movement::FromRoot(&[0, 2, 4, 6, 4, 2, 0, -2]),
    },
    MovementPattern {
        name: "arpeggiated",
        movement: Movement::FromRoot(&[0, 4, 8, 12, 8, 4, 0]),
    },
    MovementPattern {
        name: "bluesy",
        movement: Movement::FromRoot(&[0, 4, 6, 4, 0, -2, 0]),
    },
    MovementPattern {
        name: "chromatic",
        movement: Movement::FromRoot(&[0, 1, 2, 3, 4, 3, 2, 1]),
    },
];

/// Named movement templates for a melodic role.
pub fn movement_patterns_for(role: PatternRole) -> &'static [MovementPattern] {
    match role {
        PatternRole::Lead => LEAD_MOVEMENTS,
        PatternRole::Bass | PatternRole::WalkingBass => BASS_MOVEMENTS,
        PatternRole::Comping | PatternRole::Pad => &[],
    }
}
