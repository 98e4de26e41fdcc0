use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DatmoError, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatmoConfig {
    // ── Scan ingestion ──
    pub max_beams: usize,

    // ── Motion detection ──
    pub motion_threshold: f64,

    // ── Clustering ──
    pub cluster_threshold: f64,

    // ── Leg / person classification ──
    pub leg_size_min: f64,
    pub leg_size_max: f64,
    pub dynamic_threshold: f64, // percent of dynamic beams
    pub legs_distance_max: f64,

    // ── Tracker hysteresis ──
    pub frequency_init: i32,
    pub uncertainty_min: f64,
    pub uncertainty_max: f64,
    pub uncertainty_inc: f64,
}

impl Default for DatmoConfig {
    fn default() -> Self {
        Self {
            max_beams: 1000,
            motion_threshold: 0.1,
            cluster_threshold: 0.2,
            leg_size_min: 0.05,
            leg_size_max: 0.25,
            dynamic_threshold: 75.0,
            legs_distance_max: 0.7,
            frequency_init: 5,
            uncertainty_min: 0.5,
            uncertainty_max: 1.0,
            uncertainty_inc: 0.05,
        }
    }
}

impl DatmoConfig {
    /// Load a JSON config; missing keys fall back to the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: DatmoConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("motion_threshold", self.motion_threshold),
            ("cluster_threshold", self.cluster_threshold),
            ("legs_distance_max", self.legs_distance_max),
            ("uncertainty_inc", self.uncertainty_inc),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(DatmoError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.max_beams == 0 {
            return Err(DatmoError::InvalidConfig("max_beams must be non-zero".into()));
        }
        if !(self.leg_size_min >= 0.0 && self.leg_size_min < self.leg_size_max) {
            return Err(DatmoError::InvalidConfig(format!(
                "leg size bounds must satisfy 0 <= min < max, got ({}, {})",
                self.leg_size_min, self.leg_size_max
            )));
        }
        if !(0.0..=100.0).contains(&self.dynamic_threshold) {
            return Err(DatmoError::InvalidConfig(format!(
                "dynamic_threshold is a percentage, got {}",
                self.dynamic_threshold
            )));
        }
        if !(self.uncertainty_min >= 0.0 && self.uncertainty_min < self.uncertainty_max) {
            return Err(DatmoError::InvalidConfig(format!(
                "uncertainty bounds must satisfy 0 <= min < max, got ({}, {})",
                self.uncertainty_min, self.uncertainty_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("person_tracker_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_default_is_valid() {
        assert!(DatmoConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let path = temp_path("partial.json");
        fs::write(&path, r#"{ "cluster_threshold": 0.3, "frequency_init": 2 }"#).unwrap();

        let config = DatmoConfig::from_file(&path).unwrap();
        assert_eq!(config.cluster_threshold, 0.3);
        assert_eq!(config.frequency_init, 2);
        assert_eq!(config.leg_size_max, DatmoConfig::default().leg_size_max);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("saved.json");
        let config = DatmoConfig {
            uncertainty_max: 2.5,
            ..DatmoConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(DatmoConfig::from_file(&path).unwrap(), config);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rejects_inverted_leg_bounds() {
        let config = DatmoConfig {
            leg_size_min: 0.3,
            leg_size_max: 0.2,
            ..DatmoConfig::default()
        };
        assert!(matches!(config.validate(), Err(DatmoError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_nan_threshold() {
        let config = DatmoConfig {
            cluster_threshold: f64::NAN,
            ..DatmoConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = DatmoConfig::from_file(temp_path("does_not_exist.json")).unwrap_err();
        assert!(matches!(err, DatmoError::Io(_)));
    }
}
