// Jazz-Hop Music Generator
//
// A procedural jazz-hip hop arrangement engine. Given a key, a tempo and a
// song form made of named sections, it writes comping piano, bass, drums and
// lead parts as humanized note events, stitches the sections together with
// fills and pivot chords, then swings and balances the result.
//
// Architecture:
// - scale.rs: Keys and the seven-degree scale at any octave
// - chord.rs: Roman-numeral chord symbols and block / rootless voicings
// - progression.rs: Per-section progression tables, sized to the bar count
// - patterns.rs: Section kinds, rhythm grids, drum kits, movement templates
// - event.rs: Note events and tracks (the engine's output)
// - humanize.rs: Per-onset timing and velocity jitter presets
// - voice.rs: The generator contract shared by every part
// - comping.rs, bass.rs, lead.rs, drums.rs, pad.rs: The parts
// - arrangement.rs: Structure styles, timeline, instrumentation, dynamics,
//   transition overlays
// - swing.rs: Off-beat swing pass
// - mix.rs: Per-part mix levels
// - composer.rs: Orchestration and the humanize -> swing -> balance pipeline
// - config.rs: JSON generator config with default bootstrap
// - midi.rs: Standard MIDI File output
// - metadata.rs: Companion JSON metadata
// - error.rs: Config and output errors
//
// Composition is deterministic given a seed: every random choice draws from
// one `jazzhop_prng::SeededRng` threaded through the run.

pub mod arrangement;
pub mod bass;
pub mod chord;
pub mod comping;
pub mod composer;
pub mod config;
pub mod drums;
pub mod error;
pub mod event;
pub mod humanize;
pub mod lead;
pub mod metadata;
pub mod midi;
pub mod mix;
pub mod pad;
pub mod patterns;
pub mod progression;
pub mod scale;
pub mod swing;
pub mod voice;
