// Harmonizer configuration, loaded from JSON.
//
// `HarmonizerConfig` groups the voicing search parameters (see voicing.rs)
// and the export settings used by midi.rs and lilypond.rs. Every field has a
// default, so a config file only needs to name what it changes; `{}` is a
// valid config. The CLI applies its flags on top of whatever was loaded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::voicing::VoicingConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonizerConfig {
    pub voicing: VoicingConfig,
    pub export: ExportConfig,
}

/// Playback and engraving settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub tempo_bpm: u16,
    /// Length of each chord in MIDI ticks (480 per quarter note).
    pub ticks_per_chord: u32,
    /// General MIDI program for all four voices (52 = choir aahs).
    pub program: u8,
    pub title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            tempo_bpm: 60,
            ticks_per_chord: 960,
            program: 52,
            title: "Four-Part Chorale".to_string(),
        }
    }
}

impl HarmonizerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voicing::SeedStrategy;
    use std::io::Write;

    #[test]
    fn test_empty_object_is_default() {
        let config: HarmonizerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HarmonizerConfig::default());
        assert_eq!(config.export.ticks_per_chord, 960);
        assert!(config.voicing.forbid_parallels);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{"voicing": {"seed_strategy": "exhaustive"}, "export": {"tempo_bpm": 90}}"#;
        let config: HarmonizerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.voicing.seed_strategy, SeedStrategy::Exhaustive);
        assert!(config.voicing.forbid_parallels);
        assert_eq!(config.export.tempo_bpm, 90);
        assert_eq!(config.export.program, 52);
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut config = HarmonizerConfig::default();
        config.voicing.max_upper_spacing = Some(12);
        config.export.title = "Test".to_string();
        let json = serde_json::to_string(&config).unwrap();
        let back: HarmonizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"voicing": {{"forbid_parallels": false}}}}"#).unwrap();
        let config = HarmonizerConfig::load(file.path()).unwrap();
        assert!(!config.voicing.forbid_parallels);
    }

    #[test]
    fn test_load_errors() {
        let missing = HarmonizerConfig::load(Path::new("/nonexistent/chorale.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let bad = HarmonizerConfig::load(file.path());
        assert!(matches!(bad, Err(ConfigError::Parse { .. })));
    }
}
