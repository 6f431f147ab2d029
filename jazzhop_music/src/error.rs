// Error types for the generator's outer layer.
//
// Composition itself never fails: musical inputs it does not recognize fall
// back to defaults. What can fail is everything around it: reading and
// validating the config, parsing a section list from the command line,
// writing the MIDI file and the metadata record.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("tempo range {low}-{high} must lie within 70-120 BPM with low <= high")]
    TempoRange { low: u32, high: u32 },
    #[error("tempo {0} BPM is outside 70-120")]
    Tempo(u32),
    #[error("no preferred keys configured")]
    NoKeys,
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("swing amount {0} must be between 0 and 1")]
    SwingAmount(f64),
    #[error("MIDI channel {channel} for {part} must be 0-15")]
    Channel { part: &'static str, channel: u8 },
    #[error("bad section '{0}', expected kind:bars with bars > 0")]
    Section(String),
    #[error("empty section list")]
    NoSections,
}

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("MIDI encoding error: {0}")]
    Midi(#[source] std::io::Error),
}

impl GenerateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }
}
