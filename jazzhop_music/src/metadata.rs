// Companion metadata record written next to each MIDI file.

use crate::error::GenerateError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const GENRE: &str = "Jazz-Hip Hop";

pub const HASHTAGS: [&str; 5] = [
    "#jazzhiphop",
    "#smoothjazzinstrumental",
    "#jazzpiano",
    "#jazzfunk",
    "#soulmusic",
];

/// Timestamp format used in titles and file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub key: String,
    pub tempo: u32,
    pub genre: String,
    pub hashtags: Vec<String>,
    pub generated_at: String,
    pub duration_bars: usize,
    pub seed: u64,
    pub structure: Vec<String>,
}

impl TrackMetadata {
    pub fn new(
        key: &str,
        tempo: u32,
        duration_bars: usize,
        seed: u64,
        structure: Vec<String>,
        generated_at: DateTime<Local>,
    ) -> Self {
        let timestamp = generated_at.format(TIMESTAMP_FORMAT).to_string();
        TrackMetadata {
            title: format!("{GENRE} Track {timestamp}"),
            key: key.to_string(),
            tempo,
            genre: GENRE.to_string(),
            hashtags: HASHTAGS.iter().map(|t| t.to_string()).collect(),
            generated_at: timestamp,
            duration_bars,
            seed,
            structure,
        }
    }

    /// Shared stem of the MIDI and metadata file names.
    pub fn file_stem(&self) -> String {
        format!("jazzhop_{}_{}bpm_{}", self.key, self.tempo, self.generated_at)
    }

    pub fn midi_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.mid", self.file_stem()))
    }

    pub fn metadata_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_metadata.json", self.file_stem()))
    }

    pub fn write(&self, path: &Path) -> Result<(), GenerateError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| GenerateError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> TrackMetadata {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        TrackMetadata::new("Bb", 92, 80, 42, vec!["intro".into(), "outro".into()], at)
    }

    #[test]
    fn names_follow_the_timestamp() {
        let m = sample();
        assert_eq!(m.generated_at, "20240309_140507");
        assert_eq!(m.title, "Jazz-Hip Hop Track 20240309_140507");
        assert_eq!(
            m.midi_path(Path::new("out")),
            Path::new("out").join("jazzhop_Bb_92bpm_20240309_140507.mid")
        );
        assert!(
            m.metadata_path(Path::new("out"))
                .to_string_lossy()
                .ends_with("_metadata.json")
        );
    }

    #[test]
    fn serializes_with_fixed_tags() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["genre"], "Jazz-Hip Hop");
        assert_eq!(json["hashtags"].as_array().unwrap().len(), 5);
        assert_eq!(json["duration_bars"], 80);
    }
}
