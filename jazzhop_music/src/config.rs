// Generator configuration, loaded from JSON.
//
// `GeneratorConfig` holds the run-independent settings: the tempo range and
// key list random picks are drawn from, swing, the default structure and
// arrangement style names, and per-instrument velocity and channel hints.
// A missing config file is not an error: the defaults are written to that
// path and used. Validation runs once after loading; it is the only way a
// run can be rejected before composition starts.
//
// Velocity hints are turned into offsets from the default hint, so an
// untouched config leaves every generator at its own base velocity.
//
// See also: composer.rs (`ComposerSettings`, what the config resolves to),
// midi.rs (`ChannelMap`).

use crate::composer::VelocityOffsets;
use crate::error::{ConfigError, GenerateError};
use crate::midi::ChannelMap;
use crate::scale::Key;
use jazzhop_prng::SeededRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tempo bounds the generator accepts.
pub const TEMPO_LIMITS: (u32, u32) = (70, 120);

/// Velocity and MIDI channel for one instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentHint {
    pub velocity: u8,
    pub channel: u8,
}

impl InstrumentHint {
    const fn new(velocity: u8, channel: u8) -> Self {
        InstrumentHint { velocity, channel }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentHints {
    pub piano: InstrumentHint,
    pub bass: InstrumentHint,
    /// Walking bass in head and solo sections.
    #[serde(default = "InstrumentHints::default_upright_bass")]
    pub upright_bass: InstrumentHint,
    pub drums: InstrumentHint,
    #[serde(default = "InstrumentHints::default_pad")]
    pub pad: InstrumentHint,
}

impl InstrumentHints {
    fn default_upright_bass() -> InstrumentHint {
        InstrumentHint::new(90, 2)
    }

    fn default_pad() -> InstrumentHint {
        InstrumentHint::new(30, 3)
    }

    fn named(&self) -> [(&'static str, InstrumentHint); 5] {
        [
            ("piano", self.piano),
            ("bass", self.bass),
            ("upright_bass", self.upright_bass),
            ("drums", self.drums),
            ("pad", self.pad),
        ]
    }
}

impl Default for InstrumentHints {
    fn default() -> Self {
        InstrumentHints {
            piano: InstrumentHint::new(80, 0),
            bass: InstrumentHint::new(90, 1),
            upright_bass: InstrumentHints::default_upright_bass(),
            drums: InstrumentHint::new(100, 9),
            pad: InstrumentHints::default_pad(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Inclusive BPM range a random tempo is drawn from.
    pub tempo_range: [u32; 2],
    /// Keys a random key is drawn from.
    pub preferred_keys: Vec<String>,
    /// Swing delay as a fraction of a sixteenth note.
    pub swing_amount: f64,
    /// Structure style name; unknown names play the classic form.
    #[serde(default = "GeneratorConfig::default_structure")]
    pub structure: String,
    /// Arrangement style name; unknown names use the full arrangement.
    #[serde(default = "GeneratorConfig::default_arrangement")]
    pub arrangement: String,
    pub instruments: InstrumentHints,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            tempo_range: [70, 120],
            preferred_keys: ["C", "Dm", "F", "G", "Am", "Bb", "Eb"]
                .into_iter()
                .map(String::from)
                .collect(),
            swing_amount: 0.15,
            structure: GeneratorConfig::default_structure(),
            arrangement: GeneratorConfig::default_arrangement(),
            instruments: InstrumentHints::default(),
        }
    }
}

impl GeneratorConfig {
    fn default_structure() -> String {
        "classic".to_string()
    }

    fn default_arrangement() -> String {
        "full".to_string()
    }

    pub fn from_json(json: &str) -> Result<GeneratorConfig, GenerateError> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or write the defaults there and use them if it does not
    /// exist. Returns the config and whether it was freshly created.
    pub fn load_or_create(path: &Path) -> Result<(GeneratorConfig, bool), GenerateError> {
        if path.exists() {
            let json = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
            return Ok((GeneratorConfig::from_json(&json)?, false));
        }
        let config = GeneratorConfig::default();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;
        }
        let json = serde_json::to_string_pretty(&config)?;
        std::fs::write(path, json).map_err(|e| GenerateError::io(path, e))?;
        log::info!("wrote default config to {}", path.display());
        Ok((config, true))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let [low, high] = self.tempo_range;
        let (min, max) = TEMPO_LIMITS;
        if low > high || low < min || high > max {
            return Err(ConfigError::TempoRange { low, high });
        }
        if self.preferred_keys.is_empty() {
            return Err(ConfigError::NoKeys);
        }
        if let Some(bad) = self
            .preferred_keys
            .iter()
            .find(|k| Key::try_parse(k).is_none())
        {
            return Err(ConfigError::UnknownKey(bad.clone()));
        }
        if !(0.0..=1.0).contains(&self.swing_amount) {
            return Err(ConfigError::SwingAmount(self.swing_amount));
        }
        for (part, hint) in self.instruments.named() {
            if hint.channel > 15 {
                return Err(ConfigError::Channel {
                    part,
                    channel: hint.channel,
                });
            }
        }
        Ok(())
    }

    /// Check a tempo given on the command line.
    pub fn check_tempo(tempo: u32) -> Result<u32, ConfigError> {
        let (min, max) = TEMPO_LIMITS;
        if (min..=max).contains(&tempo) {
            Ok(tempo)
        } else {
            Err(ConfigError::Tempo(tempo))
        }
    }

    /// A tempo drawn uniformly from the configured range.
    pub fn pick_tempo(&self, rng: &mut SeededRng) -> u32 {
        let [low, high] = self.tempo_range;
        rng.range_i32_inclusive(low as i32, high.max(low) as i32) as u32
    }

    /// A key drawn uniformly from the preferred keys.
    pub fn pick_key(&self, rng: &mut SeededRng) -> Result<Key, ConfigError> {
        let name = rng.choose(&self.preferred_keys).ok_or(ConfigError::NoKeys)?;
        Key::try_parse(name).ok_or_else(|| ConfigError::UnknownKey(name.clone()))
    }

    /// Offsets of each velocity hint from its default.
    pub fn velocity_offsets(&self) -> VelocityOffsets {
        let defaults = InstrumentHints::default();
        let delta = |hint: InstrumentHint, default: InstrumentHint| {
            hint.velocity as i32 - default.velocity as i32
        };
        let hints = &self.instruments;
        VelocityOffsets {
            piano: delta(hints.piano, defaults.piano),
            bass: delta(hints.bass, defaults.bass),
            upright_bass: delta(hints.upright_bass, defaults.upright_bass),
            drums: delta(hints.drums, defaults.drums),
            pad: delta(hints.pad, defaults.pad),
        }
    }

    pub fn channels(&self) -> ChannelMap {
        let hints = &self.instruments;
        ChannelMap {
            piano: hints.piano.channel,
            bass: hints.bass.channel,
            upright_bass: hints.upright_bass.channel,
            drums: hints.drums.channel,
            pad: hints.pad.channel,
        }
    }
}
