// Chord progression tables per section kind.
//
// Each section kind has a few alternative progressions written as lead-sheet
// symbols. `progression_for` picks one uniformly and sizes it to the section:
// shorter templates repeat their own prefix cyclically, longer ones are cut,
// so the result always has exactly one chord per requested bar. Kinds without
// a table (bridge, head, solo) borrow the verse set.

use crate::chord::ChordSymbol;
use crate::patterns::SectionKind;
use jazzhop_prng::SeededRng;

const INTRO: &[&[&str]] = &[
    &["Imaj7", "vi7", "ii7", "V7"],
    &["Imaj7", "IV7", "iii7", "vi7"],
    &["vi7", "ii7", "V7", "Imaj7"],
];

const VERSE_A: &[&[&str]] = &[
    &["Imaj7", "vi7", "ii7", "V7", "iii7", "vi7", "ii7", "V7"],
    &["Imaj7", "I7", "IVmaj7", "iv7", "iii7", "vi7", "ii7", "V7"],
    &["vi7", "ii7", "V7", "Imaj7", "vi7", "ii7", "V7", "Imaj7"],
];

const VERSE_B: &[&[&str]] = &[
    &["IVmaj7", "iv7", "iii7", "vi7", "ii7", "V7", "Imaj7", "V7"],
    &["Imaj7", "vi7", "IVmaj7", "IV7", "iii7", "vi7", "ii7", "V7"],
    &["vi7", "V7", "Imaj7", "vi7", "ii7", "V7", "Imaj7", "Imaj7"],
];

const CHORUS: &[&[&str]] = &[
    &["Imaj7", "vi7", "ii7", "V7", "Imaj7", "vi7", "ii7", "V7"],
    &["IVmaj7", "V7", "iii7", "vi7", "ii7", "V7", "Imaj7", "V7"],
    &["vi7", "ii7", "V7", "Imaj7", "IVmaj7", "iii7", "ii7", "V7"],
];

const CHORUS_2: &[&[&str]] = &[
    &["Imaj7", "I7", "IVmaj7", "iv7", "iii7", "VI7", "ii7", "V7"],
    &["vi7", "ii7", "V7", "Imaj7", "vi7", "ii7", "V7", "Imaj7"],
    &["IVmaj7", "V7", "vi7", "iii7", "ii7", "V7", "Imaj7", "V7"],
];

const OUTRO: &[&[&str]] = &[
    &["ii7", "V7", "Imaj7", "Imaj7"],
    &["vi7", "ii7", "V7", "Imaj7"],
    &["IVmaj7", "V7", "Imaj7", "Imaj7"],
];

/// Progression templates for a kind, or `None` if the kind has no table.
pub fn templates(kind: SectionKind) -> Option<&'static [&'static [&'static str]]> {
    match kind {
        SectionKind::Intro => Some(INTRO),
        SectionKind::VerseA => Some(VERSE_A),
        SectionKind::VerseB => Some(VERSE_B),
        SectionKind::Chorus => Some(CHORUS),
        SectionKind::Chorus2 => Some(CHORUS_2),
        SectionKind::Outro => Some(OUTRO),
        SectionKind::Bridge | SectionKind::Head | SectionKind::Solo | SectionKind::Default => None,
    }
}

/// Pick a progression for `kind` and size it to exactly `bars` chords.
pub fn progression_for(kind: SectionKind, bars: usize, rng: &mut SeededRng) -> Vec<ChordSymbol> {
    let table = templates(kind).unwrap_or_else(|| {
        log::debug!("no progressions for {kind:?}, borrowing the verse set");
        VERSE_A
    });
    let template = rng.choose(table).copied().unwrap_or(VERSE_A[0]);
    fit_to_bars(template, bars)
}

/// Repeat or truncate `template` to exactly `bars` parsed chords.
pub fn fit_to_bars(template: &[&str], bars: usize) -> Vec<ChordSymbol> {
    if template.is_empty() {
        return Vec::new();
    }
    template
        .iter()
        .cycle()
        .take(bars)
        .map(|s| ChordSymbol::parse(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Quality;

    #[test]
    fn progression_has_exactly_the_requested_bars() {
        let mut rng = SeededRng::new(3);
        for kind in SectionKind::ALL {
            for bars in [0, 1, 3, 4, 8, 16, 32] {
                let prog = progression_for(kind, bars, &mut rng);
                assert_eq!(prog.len(), bars, "{kind:?} with {bars} bars");
            }
        }
    }

    #[test]
    fn extension_repeats_the_template_prefix() {
        let prog = fit_to_bars(OUTRO[0], 10);
        let expected: Vec<ChordSymbol> = ["ii7", "V7", "Imaj7", "Imaj7"]
            .iter()
            .cycle()
            .take(10)
            .map(|s| ChordSymbol::parse(s))
            .collect();
        assert_eq!(prog, expected);
        assert_eq!(prog[4], prog[0]);
        assert_eq!(prog[9], prog[1]);
    }

    #[test]
    fn truncation_keeps_the_head() {
        let prog = fit_to_bars(VERSE_A[1], 3);
        assert_eq!(prog.len(), 3);
        assert_eq!(prog[1], ChordSymbol::new(0, Quality::Dominant7));
        assert_eq!(prog[2], ChordSymbol::new(3, Quality::Major7));
    }

    #[test]
    fn untabled_kinds_borrow_the_verse_set() {
        let mut rng = SeededRng::new(11);
        let prog = progression_for(SectionKind::Bridge, 8, &mut rng);
        let verse: Vec<Vec<ChordSymbol>> = VERSE_A.iter().map(|t| fit_to_bars(t, 8)).collect();
        assert!(verse.contains(&prog));
    }

    #[test]
    fn every_template_symbol_parses() {
        for kind in SectionKind::ALL {
            if let Some(table) = templates(kind) {
                for template in table {
                    for symbol in *template {
                        assert!(ChordSymbol::try_parse(symbol).is_some(), "{symbol}");
                    }
                }
            }
        }
    }
}
