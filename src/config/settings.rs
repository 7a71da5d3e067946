//! Engine settings
//!
//! Everything a host can tune, stored as JSON. Missing fields fall back to
//! their defaults, so older settings files keep loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::VirtualKey;
use crate::stealth::StealthConfig;
use crate::vision::DetectorConfig;
use crate::weapons::WeaponProfile;

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multiplier for vertical compensation
    pub vertical_sensitivity: f32,
    /// Multiplier for horizontal compensation
    pub horizontal_sensitivity: f32,
    /// Minimum time between two corrections (ms)
    pub shot_delay_ms: u64,
    /// Key that starts and stops the engine
    pub toggle_key: VirtualKey,
    /// Flash detection settings
    pub detector: DetectorConfig,
    /// Movement randomization settings
    pub stealth: StealthConfig,
    /// Index of the profile selected at startup
    pub active_profile: usize,
    /// User profiles, appended after the built-in ones
    pub custom_profiles: Vec<WeaponProfile>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vertical_sensitivity: 1.0,
            horizontal_sensitivity: 1.0,
            shot_delay_ms: 100,
            toggle_key: VirtualKey::F8,
            detector: DetectorConfig::default(),
            stealth: StealthConfig::default(),
            active_profile: 0,
            custom_profiles: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Check values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.detector.region.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "scan region must be at least 1x1, got {}x{}",
                self.detector.region.width, self.detector.region.height
            )));
        }

        let threshold = self.detector.match_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "match threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        for profile in self.custom_profiles.iter().filter(|p| p.is_empty()) {
            log::warn!(
                "Custom profile '{}' has no pattern points and will not compensate",
                profile.name
            );
        }

        Ok(())
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}
