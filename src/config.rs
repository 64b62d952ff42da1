//! Player configuration — optional ~/.konghou/config.yaml with serde
//! defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Roll timing for the macro sink, in milliseconds per chord note.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RollConfig {
    #[serde(default = "RollConfig::default_min_ms")]
    pub min_ms: f64,
    #[serde(default = "RollConfig::default_max_ms")]
    pub max_ms: f64,
}

impl RollConfig {
    fn default_min_ms() -> f64 {
        8.0
    }

    fn default_max_ms() -> f64 {
        35.0
    }
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            min_ms: Self::default_min_ms(),
            max_ms: Self::default_max_ms(),
        }
    }
}

/// Player configuration loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// SoundFont for the synth sink.
    #[serde(default = "PlayerConfig::default_soundfont")]
    pub soundfont: PathBuf,
    /// Initial mixer volume (0..=127).
    #[serde(default = "PlayerConfig::default_volume")]
    pub volume: u8,
    #[serde(default)]
    pub roll: RollConfig,
}

impl PlayerConfig {
    /// Load config from the standard path (~/.konghou/config.yaml).
    /// Returns None if the file doesn't exist (graceful fallback).
    pub fn load() -> Option<Self> {
        let home = dirs::home_dir()?;
        let path = home.join(".konghou").join("config.yaml");
        let content = std::fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&content).ok()
    }

    fn default_soundfont() -> PathBuf {
        PathBuf::from("GeneralUser.sf2")
    }

    fn default_volume() -> u8 {
        100
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            soundfont: Self::default_soundfont(),
            volume: Self::default_volume(),
            roll: RollConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.soundfont, PathBuf::from("GeneralUser.sf2"));
        assert_eq!(config.volume, 100);
        assert!(config.roll.min_ms < config.roll.max_ms);
    }

    #[test]
    fn serialize_deserialize() {
        let config = PlayerConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: PlayerConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.soundfont, config.soundfont);
        assert_eq!(parsed.volume, config.volume);
    }

    #[test]
    fn custom_config_deserialize() {
        let yaml = r#"
soundfont: "banks/konghou.sf2"
volume: 90
roll:
  min_ms: 5.0
  max_ms: 20.0
"#;
        let config: PlayerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.soundfont, PathBuf::from("banks/konghou.sf2"));
        assert_eq!(config.volume, 90);
        assert_eq!(config.roll.min_ms, 5.0);
        assert_eq!(config.roll.max_ms, 20.0);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: PlayerConfig = serde_yaml::from_str("volume: 64").unwrap();
        assert_eq!(config.volume, 64);
        assert_eq!(config.soundfont, PathBuf::from("GeneralUser.sf2"));
    }

    #[test]
    fn load_missing_file_returns_none() {
        // Just verify the lookup path never panics when the file is absent.
        let _ = PlayerConfig::load();
    }
}
