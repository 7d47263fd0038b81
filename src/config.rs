//! Engine tuning parameters, loadable from JSON.

use crate::clip::Clip;
use crate::curve::FalloffCurve;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TUNING_TOLERANCE: f32 = 0.3;
pub const DEFAULT_INTERFERENCE_RATE: f64 = 0.1;
pub const DEFAULT_INTERFERENCE_DEPTH: f32 = 0.2;

const CONFIG_DIR: &str = "radio-dial";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// A station is reachable when the dial is strictly closer than this.
    #[serde(default = "default_tolerance")]
    pub tuning_tolerance: f32,
    /// Main channel volume at perfect reception.
    #[serde(default = "default_strength")]
    pub max_strength: f32,
    /// Static channel volume with no reception at all.
    #[serde(default = "default_strength")]
    pub static_strength: f32,
    #[serde(default)]
    pub falloff: FalloffCurve,
    /// Noise axis units per simulated second.
    #[serde(default = "default_interference_rate")]
    pub interference_rate: f64,
    /// Largest quality drop interference can cause.
    #[serde(default = "default_interference_depth")]
    pub interference_depth: f32,
    /// Seed for content picks and interference. Absent = seeded from entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// One-shot cue played on every dial turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuning_cue: Option<Clip>,
    /// Clip looped on the static channel for the whole session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_clip: Option<Clip>,
}

fn default_tolerance() -> f32 {
    DEFAULT_TUNING_TOLERANCE
}

fn default_strength() -> f32 {
    1.0
}

fn default_interference_rate() -> f64 {
    DEFAULT_INTERFERENCE_RATE
}

fn default_interference_depth() -> f32 {
    DEFAULT_INTERFERENCE_DEPTH
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tuning_tolerance: DEFAULT_TUNING_TOLERANCE,
            max_strength: 1.0,
            static_strength: 1.0,
            falloff: FalloffCurve::default(),
            interference_rate: DEFAULT_INTERFERENCE_RATE,
            interference_depth: DEFAULT_INTERFERENCE_DEPTH,
            seed: None,
            tuning_cue: None,
            static_clip: None,
        }
    }
}

impl EngineConfig {
    /// Default config location: `<user config dir>/radio-dial/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig =
            serde_json::from_str(&data).map_err(|source| ConfigurationError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigurationError> {
        if path.exists() {
            EngineConfig::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(EngineConfig::default())
        }
    }

    /// Persist config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        let io_err = |source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(ConfigurationError::Serialize)?;
        fs::write(path, json).map_err(io_err)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.tuning_tolerance.is_finite() || self.tuning_tolerance <= 0.0 {
            return Err(ConfigurationError::InvalidSetting(format!(
                "tuning_tolerance must be > 0 (got {})",
                self.tuning_tolerance
            )));
        }
        for (name, value) in [
            ("max_strength", self.max_strength),
            ("static_strength", self.static_strength),
            ("interference_depth", self.interference_depth),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::InvalidSetting(format!(
                    "{} must be within [0, 1] (got {})",
                    name, value
                )));
            }
        }
        if !self.interference_rate.is_finite() || self.interference_rate < 0.0 {
            return Err(ConfigurationError::InvalidSetting(format!(
                "interference_rate must be >= 0 (got {})",
                self.interference_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.tuning_tolerance, 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_default() {
        let config: EngineConfig = serde_json::from_str(r#"{"seed": 5}"#).unwrap();
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.max_strength, 1.0);
        assert_eq!(config.interference_depth, 0.2);
        assert_eq!(config.falloff, FalloffCurve::default());
    }

    #[test]
    fn rejects_negative_tolerance() {
        let config = EngineConfig {
            tuning_tolerance: -1.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_strength_above_one() {
        let config = EngineConfig {
            static_strength: 1.5,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = EngineConfig {
            seed: Some(11),
            static_strength: 0.6,
            tuning_cue: Some(Clip::new("cue.wav")),
            ..EngineConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.seed, Some(11));
        assert_eq!(loaded.static_strength, 0.6);
        assert_eq!(loaded.tuning_cue, Some(Clip::new("cue.wav")));
    }

    #[test]
    fn save_into_file_path_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let err = EngineConfig::default()
            .save(&blocker.join("config.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Io { .. }));
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert!(config.seed.is_none());
    }

    #[test]
    fn load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"max_strength": 4.0}"#).unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigurationError::InvalidSetting(_))
        ));
    }
}
