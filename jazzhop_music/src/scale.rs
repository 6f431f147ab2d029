// Keys and scale degrees.
//
// A `Key` is a tonic pitch class plus a major / natural-minor flag, chosen once
// per run. `ScaleDegrees` turns a key into the seven absolute MIDI pitches of
// its scale at a given octave register; every other pitch the engine produces
// (chord voicings, bass tones, lead lines) is derived from these.
//
// Key names follow the lead-sheet spellings the generator accepts on the
// command line and in the config file ("C", "Bb", "Dm", ...). An unknown name
// degrades to C major rather than failing, so composition never aborts on a
// musical input.
//
// Consumed by chord.rs (voicing resolution) and every voice generator.

use serde::{Deserialize, Serialize};

/// Major or natural minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleMode {
    Major,
    Minor,
}

impl ScaleMode {
    /// Semitone offsets of degrees 1-7 from the tonic.
    pub fn intervals(self) -> [i32; 7] {
        match self {
            ScaleMode::Major => [0, 2, 4, 5, 7, 9, 11],
            ScaleMode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }
}

/// Accepted key spellings with their tonic pitch class and mode.
const KEY_TABLE: &[(&str, u8, ScaleMode)] = &[
    ("C", 0, ScaleMode::Major),
    ("Db", 1, ScaleMode::Major),
    ("D", 2, ScaleMode::Major),
    ("Eb", 3, ScaleMode::Major),
    ("E", 4, ScaleMode::Major),
    ("F", 5, ScaleMode::Major),
    ("Gb", 6, ScaleMode::Major),
    ("G", 7, ScaleMode::Major),
    ("Ab", 8, ScaleMode::Major),
    ("A", 9, ScaleMode::Major),
    ("Bb", 10, ScaleMode::Major),
    ("B", 11, ScaleMode::Major),
    ("Cm", 0, ScaleMode::Minor),
    ("Dm", 2, ScaleMode::Minor),
    ("Em", 4, ScaleMode::Minor),
    ("Fm", 5, ScaleMode::Minor),
    ("Gm", 7, ScaleMode::Minor),
    ("Am", 9, ScaleMode::Minor),
];

/// A tonic and mode. Immutable for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Pitch class of the tonic (0 = C).
    pub tonic_pc: u8,
    pub mode: ScaleMode,
}

impl Key {
    pub const C_MAJOR: Key = Key {
        tonic_pc: 0,
        mode: ScaleMode::Major,
    };

    /// Look up a key by name; `None` if the spelling is not in the table.
    pub fn try_parse(name: &str) -> Option<Key> {
        KEY_TABLE
            .iter()
            .find(|(n, _, _)| *n == name.trim())
            .map(|&(_, tonic_pc, mode)| Key { tonic_pc, mode })
    }

    /// Look up a key by name, falling back to C major for unknown names.
    pub fn parse(name: &str) -> Key {
        Key::try_parse(name).unwrap_or_else(|| {
            log::debug!("unknown key '{name}', using C major");
            Key::C_MAJOR
        })
    }

    /// All accepted key spellings.
    pub fn names() -> impl Iterator<Item = &'static str> {
        KEY_TABLE.iter().map(|(n, _, _)| *n)
    }

    /// Canonical spelling of this key.
    pub fn name(&self) -> &'static str {
        KEY_TABLE
            .iter()
            .find(|(_, pc, mode)| *pc == self.tonic_pc && *mode == self.mode)
            .map(|(n, _, _)| *n)
            .unwrap_or(match self.mode {
                ScaleMode::Major => "C",
                ScaleMode::Minor => "Cm",
            })
    }

    /// Tonic MIDI pitch in the given octave (C4 = 60).
    pub fn tonic_pitch(&self, octave: i32) -> i32 {
        12 * (octave + 1) + self.tonic_pc as i32
    }
}

/// The seven scale pitches of a key, anchored at one octave register.
///
/// Strictly increasing; moving to another octave is a constant shift of 12
/// per octave (`at_octave`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleDegrees {
    octave: i32,
    pitches: [i32; 7],
}

impl ScaleDegrees {
    /// Derive the scale of `key` with its tonic in `octave`.
    pub fn for_key(key: Key, octave: i32) -> Self {
        let tonic = key.tonic_pitch(octave);
        ScaleDegrees {
            octave,
            pitches: key.mode.intervals().map(|iv| tonic + iv),
        }
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn pitches(&self) -> [i32; 7] {
        self.pitches
    }

    /// Pitch of degree `index` (wrapped to 0-6) in the anchor octave.
    pub fn degree(&self, index: usize) -> i32 {
        self.pitches[index % 7]
    }

    /// The same scale re-anchored at another octave.
    pub fn at_octave(&self, octave: i32) -> ScaleDegrees {
        let shift = 12 * (octave - self.octave);
        ScaleDegrees {
            octave,
            pitches: self.pitches.map(|p| p + shift),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_at_octave_four() {
        let degrees = ScaleDegrees::for_key(Key::parse("C"), 4);
        assert_eq!(degrees.pitches(), [60, 62, 64, 65, 67, 69, 71]);
    }

    #[test]
    fn minor_keys_use_natural_minor() {
        let degrees = ScaleDegrees::for_key(Key::parse("Am"), 4);
        assert_eq!(degrees.pitches(), [69, 71, 72, 74, 76, 77, 79]);
    }

    #[test]
    fn unknown_key_falls_back_to_c() {
        assert_eq!(Key::parse("H#"), Key::C_MAJOR);
        assert_eq!(Key::try_parse("H#"), None);
    }

    #[test]
    fn octave_shift_is_twelve_per_octave() {
        let mid = ScaleDegrees::for_key(Key::parse("Eb"), 4);
        let low = mid.at_octave(2);
        for (a, b) in mid.pitches().iter().zip(low.pitches()) {
            assert_eq!(a - b, 24);
        }
        assert_eq!(low, ScaleDegrees::for_key(Key::parse("Eb"), 2));
    }

    #[test]
    fn degrees_strictly_increase() {
        for name in Key::names() {
            let p = ScaleDegrees::for_key(Key::parse(name), 3).pitches();
            assert!(p.windows(2).all(|w| w[0] < w[1]), "{name}: {p:?}");
        }
    }

    #[test]
    fn name_round_trips() {
        for name in Key::names() {
            assert_eq!(Key::parse(name).name(), name);
        }
    }
}
