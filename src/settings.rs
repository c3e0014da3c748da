//! Session settings
//!
//! Loaded from JSON handed over by the host (no persistence).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::levels;

/// What happens when the final level is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LevelProgression {
    /// Go back to level 1 and keep playing
    #[default]
    Wrap,
    /// Stay on the final level
    Cap,
}

impl LevelProgression {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelProgression::Wrap => "wrap",
            LevelProgression::Cap => "cap",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wrap" | "loop" => Some(LevelProgression::Wrap),
            "cap" | "clamp" => Some(LevelProgression::Cap),
            _ => None,
        }
    }

    /// Level that follows `level` (1-based) in a table of `count` levels
    pub fn next_level(&self, level: u32, count: u32) -> u32 {
        if level < count {
            return level + 1;
        }
        match self {
            LevelProgression::Wrap => 1,
            LevelProgression::Cap => count,
        }
    }
}

/// Paddle control scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    Keyboard,
    #[default]
    Mouse,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Keyboard => ControlMode::Mouse,
            ControlMode::Mouse => ControlMode::Keyboard,
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Level the session starts on (1-based)
    pub starting_level: u32,
    /// Behavior after the final level
    pub level_progression: LevelProgression,
    /// Initial paddle control scheme
    pub control: ControlMode,
    /// Publish the predicted ball path to the renderer
    pub show_trajectory: bool,
    /// Fixed RNG seed (host clock is used when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_level: 1,
            level_progression: LevelProgression::Wrap,
            control: ControlMode::Mouse,
            show_trajectory: true,
            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!(
            "Loaded settings: level {}, progression {}",
            settings.starting_level,
            settings.level_progression.as_str()
        );
        Ok(settings)
    }

    /// Check settings against the level table
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_level == 0 {
            return Err(ConfigError::InvalidSettings(
                "starting_level is 1-based".to_string(),
            ));
        }
        levels::level(self.starting_level)?;
        Ok(())
    }

    /// Override the progression policy by name (host flag)
    pub fn set_progression(&mut self, name: &str) -> Result<(), ConfigError> {
        self.level_progression = LevelProgression::from_str(name).ok_or_else(|| {
            ConfigError::InvalidSettings(format!("unknown level progression: {}", name))
        })?;
        Ok(())
    }

    /// Seed to use for a new session
    pub fn seed_or(&self, fallback: u64) -> u64 {
        self.seed.unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings.starting_level, 1);
        assert_eq!(settings.level_progression, LevelProgression::Wrap);
        assert!(settings.show_trajectory);
    }

    #[test]
    fn test_parse_fields() {
        let settings = Settings::from_json(
            r#"{"starting_level": 3, "level_progression": "cap", "control": "keyboard", "seed": 7}"#,
        )
        .unwrap();
        assert_eq!(settings.starting_level, 3);
        assert_eq!(settings.level_progression, LevelProgression::Cap);
        assert_eq!(settings.control, ControlMode::Keyboard);
        assert_eq!(settings.seed_or(1), 7);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = Settings::from_json(r#"{"starting_level": 99}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLevel(99)));
        let err = Settings::from_json(r#"{"starting_level": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSettings(_)));
    }

    #[test]
    fn test_bad_json_rejected() {
        let err = Settings::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_progression() {
        assert_eq!(LevelProgression::Wrap.next_level(2, 6), 3);
        assert_eq!(LevelProgression::Wrap.next_level(6, 6), 1);
        assert_eq!(LevelProgression::Cap.next_level(6, 6), 6);
        assert_eq!(LevelProgression::from_str("LOOP"), Some(LevelProgression::Wrap));
        assert_eq!(LevelProgression::from_str("nope"), None);
    }

    #[test]
    fn test_progression_override() {
        let mut settings = Settings::default();
        settings.set_progression("Cap").unwrap();
        assert_eq!(settings.level_progression, LevelProgression::Cap);

        let err = settings.set_progression("forever").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSettings(_)));
        assert_eq!(settings.level_progression, LevelProgression::Cap);
    }
}
