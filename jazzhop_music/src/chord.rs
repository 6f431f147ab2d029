// Roman-numeral chord symbols and their voicings.
//
// A `ChordSymbol` is a scale-degree index (0-6) plus a `Quality`. Progression
// tables are written as lead-sheet strings ("Imaj7", "vi7", "IVmaj7") and
// parsed here. The numeral is matched by longest prefix over both upper- and
// lower-case numerals, so "vii7" is degree 6, "IVmaj7" is degree 3 with a
// maj7 quality and "V7" is degree 4.
//
// `resolve` turns a symbol into absolute pitches against a `ScaleDegrees` set:
// - Block: root position, close ("maj7" → 0 4 7 11).
// - Rootless: root omitted, 9th added for colour (the left-hand comping
//   voicings of jazz piano).
// An unrecognized quality suffix resolves as a plain major triad.

use crate::scale::ScaleDegrees;
use serde::{Deserialize, Serialize};

/// Chord quality tag parsed from the symbol suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// "maj7"
    Major7,
    /// "7"
    Dominant7,
    /// "m7"
    Minor7,
    /// "dim7"
    Diminished7,
    /// Anything else, including an empty suffix.
    Triad,
}

impl Quality {
    pub fn parse(suffix: &str) -> Quality {
        match suffix {
            "maj7" => Quality::Major7,
            "7" => Quality::Dominant7,
            "m7" => Quality::Minor7,
            "dim7" => Quality::Diminished7,
            "" => Quality::Triad,
            other => {
                log::debug!("unknown chord quality '{other}', using a major triad");
                Quality::Triad
            }
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Quality::Major7 => "maj7",
            Quality::Dominant7 => "7",
            Quality::Minor7 => "m7",
            Quality::Diminished7 => "dim7",
            Quality::Triad => "",
        }
    }

    /// Semitone offsets above the root for a block voicing.
    pub fn block_intervals(self) -> &'static [i32] {
        match self {
            Quality::Major7 => &[0, 4, 7, 11],
            Quality::Dominant7 => &[0, 4, 7, 10],
            Quality::Minor7 => &[0, 3, 7, 10],
            Quality::Diminished7 => &[0, 3, 6, 9],
            Quality::Triad => &[0, 4, 7],
        }
    }

    /// Semitone offsets above the (omitted) root for a rootless voicing.
    pub fn rootless_intervals(self) -> &'static [i32] {
        match self {
            // 3 5 7 9
            Quality::Major7 => &[4, 7, 11, 14],
            // 3 13 b7 9
            Quality::Dominant7 => &[4, 9, 10, 14],
            Quality::Minor7 => &[3, 7, 10, 14],
            Quality::Diminished7 => &[3, 6, 9, 14],
            Quality::Triad => &[4, 7, 11],
        }
    }
}

/// Roman numerals and their degree indices. Matched by longest prefix.
const NUMERALS: &[(&str, usize)] = &[
    ("I", 0),
    ("II", 1),
    ("III", 2),
    ("IV", 3),
    ("V", 4),
    ("VI", 5),
    ("VII", 6),
    ("i", 0),
    ("ii", 1),
    ("iii", 2),
    ("iv", 3),
    ("v", 4),
    ("vi", 5),
    ("vii", 6),
];

/// A scale-relative chord: degree index plus quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordSymbol {
    pub degree: usize,
    pub quality: Quality,
}

impl ChordSymbol {
    pub fn new(degree: usize, quality: Quality) -> Self {
        ChordSymbol {
            degree: degree % 7,
            quality,
        }
    }

    /// Split a symbol into its numeral and quality suffix.
    ///
    /// Returns `None` when no numeral prefixes the string.
    pub fn try_parse(symbol: &str) -> Option<ChordSymbol> {
        let (numeral, degree) = NUMERALS
            .iter()
            .filter(|(numeral, _)| symbol.starts_with(*numeral))
            .max_by_key(|(numeral, _)| numeral.len())?;
        let quality = Quality::parse(&symbol[numeral.len()..]);
        Some(ChordSymbol::new(*degree, quality))
    }

    /// Parse a symbol, treating a missing numeral as the tonic.
    pub fn parse(symbol: &str) -> ChordSymbol {
        ChordSymbol::try_parse(symbol).unwrap_or_else(|| {
            log::debug!("unparsable chord symbol '{symbol}', using I");
            ChordSymbol::new(0, Quality::parse(""))
        })
    }

    /// The dominant seventh of the key, used for transition pivots.
    pub fn dominant() -> ChordSymbol {
        ChordSymbol::new(4, Quality::Dominant7)
    }
}

impl std::fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const UPPER: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];
        write!(f, "{}{}", UPPER[self.degree], self.quality.suffix())
    }
}

/// How a chord is spread across the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoicingStyle {
    Block,
    Rootless,
}

/// Absolute pitches of a resolved chord, lowest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voicing {
    /// Root pitch of the chord, present in the voicing only for block style.
    pub root: i32,
    pub pitches: Vec<i32>,
}

impl Voicing {
    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}

/// Resolve `symbol` against `degrees`, with the root in `octave`.
pub fn resolve(
    symbol: ChordSymbol,
    degrees: &ScaleDegrees,
    octave: i32,
    style: VoicingStyle,
) -> Voicing {
    let root = degrees.at_octave(octave).degree(symbol.degree);
    let intervals = match style {
        VoicingStyle::Block => symbol.quality.block_intervals(),
        VoicingStyle::Rootless => symbol.quality.rootless_intervals(),
    };
    Voicing {
        root,
        pitches: intervals.iter().map(|iv| root + iv).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::Key;

    fn c_major() -> ScaleDegrees {
        ScaleDegrees::for_key(Key::parse("C"), 4)
    }

    #[test]
    fn longest_numeral_prefix_wins() {
        assert_eq!(ChordSymbol::parse("vii7").degree, 6);
        assert_eq!(ChordSymbol::parse("vi7").degree, 5);
        assert_eq!(ChordSymbol::parse("iii7").degree, 2);
        assert_eq!(ChordSymbol::parse("ii7").degree, 1);
        assert_eq!(ChordSymbol::parse("iv7").degree, 3);
        assert_eq!(ChordSymbol::parse("V7").degree, 4);
        assert_eq!(ChordSymbol::parse("VI7").degree, 5);
    }

    #[test]
    fn upper_case_four_keeps_its_quality() {
        let sym = ChordSymbol::parse("IVmaj7");
        assert_eq!(sym, ChordSymbol::new(3, Quality::Major7));
    }

    #[test]
    fn quality_suffixes() {
        assert_eq!(ChordSymbol::parse("Imaj7").quality, Quality::Major7);
        assert_eq!(ChordSymbol::parse("I7").quality, Quality::Dominant7);
        assert_eq!(ChordSymbol::parse("iim7").quality, Quality::Minor7);
        assert_eq!(ChordSymbol::parse("viidim7").quality, Quality::Diminished7);
        assert_eq!(ChordSymbol::parse("V").quality, Quality::Triad);
    }

    #[test]
    fn unknown_quality_is_a_triad() {
        let sym = ChordSymbol::parse("Vsus13");
        assert_eq!(sym, ChordSymbol::new(4, Quality::Triad));
        let v = resolve(sym, &c_major(), 4, VoicingStyle::Block);
        assert_eq!(v.pitches, vec![67, 71, 74]);
    }

    #[test]
    fn block_maj7_and_m7_offsets() {
        let degrees = c_major();
        let tonic = Key::parse("C").tonic_pitch(4);
        let maj7 = resolve(ChordSymbol::parse("Imaj7"), &degrees, 4, VoicingStyle::Block);
        let offsets: Vec<i32> = maj7.pitches.iter().map(|p| p - tonic).collect();
        assert_eq!(offsets, vec![0, 4, 7, 11]);

        let m7 = resolve(ChordSymbol::parse("Im7"), &degrees, 4, VoicingStyle::Block);
        let offsets: Vec<i32> = m7.pitches.iter().map(|p| p - tonic).collect();
        assert_eq!(offsets, vec![0, 3, 7, 10]);
    }

    #[test]
    fn rootless_omits_root_and_adds_ninth() {
        let v = resolve(ChordSymbol::parse("ii7"), &c_major(), 4, VoicingStyle::Rootless);
        assert_eq!(v.root, 62);
        assert!(!v.pitches.contains(&62));
        assert!(v.pitches.contains(&(62 + 14)));
    }

    #[test]
    fn octave_argument_moves_the_root() {
        let degrees = c_major();
        let low = resolve(ChordSymbol::parse("V7"), &degrees, 2, VoicingStyle::Block);
        let high = resolve(ChordSymbol::parse("V7"), &degrees, 5, VoicingStyle::Block);
        assert_eq!(low.root, 43);
        assert_eq!(high.root, 79);
    }

    #[test]
    fn missing_numeral_falls_back_to_tonic() {
        assert_eq!(ChordSymbol::try_parse("maj7"), None);
        assert_eq!(ChordSymbol::parse("maj7").degree, 0);
    }

    #[test]
    fn display_uses_upper_case_numerals() {
        assert_eq!(ChordSymbol::parse("vi7").to_string(), "VI7");
        assert_eq!(ChordSymbol::parse("IVmaj7").to_string(), "IVmaj7");
    }
}
