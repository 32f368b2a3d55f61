//! Data-driven game balance
//!
//! Every knob of the difficulty ramp and the feel of the slice lives here so a
//! session can be re-balanced from a JSON file without touching the sim.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LIVES;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Difficulty ramp ===
    /// Delay (seconds) before the next beat once the field is empty
    pub spawn_interval: f64,
    /// Span (seconds) a chain beat spreads its spawns over
    pub chain_spacing: f64,
    /// Physics speed multiplier at the start of a run
    pub fall_speed: f32,
    /// Applied to `spawn_interval` after every beat
    pub spawn_interval_decay: f64,
    /// Applied to `chain_spacing` after every beat
    pub chain_spacing_decay: f64,
    /// Applied to `fall_speed` after every beat
    pub fall_speed_growth: f32,

    // === Sequencing ===
    /// Delay (seconds) between game start and the first beat
    pub kickoff_delay: f64,
    /// Random beats appended each time the plan is extended
    pub plan_batch: usize,
    /// A random spawn is a bomb when a roll in `0..bomb_odds` comes up 0
    pub bomb_odds: u32,

    // === Player ===
    pub starting_lives: u8,

    // === Feel ===
    /// Ribbon fade-out after the finger lifts (seconds)
    pub ribbon_fade_secs: f32,
    /// How long a swoosh sound blocks the next one (seconds)
    pub swoosh_secs: f64,
    /// Scale a life indicator pops to when lost
    pub life_pulse_scale: f32,
    /// Time for the indicator to settle back to 1.0 (seconds)
    pub life_pulse_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_interval: 0.9,
            chain_spacing: 3.0,
            fall_speed: 0.85,
            spawn_interval_decay: 0.991,
            chain_spacing_decay: 0.99,
            fall_speed_growth: 1.02,

            kickoff_delay: 2.0,
            plan_batch: 1001,
            bomb_odds: 7,

            starting_lives: MAX_LIVES,

            ribbon_fade_secs: 0.25,
            swoosh_secs: 0.5,
            life_pulse_scale: 1.3,
            life_pulse_secs: 0.1,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would stall or invert the ramp
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spawn_interval.is_nan() || self.spawn_interval <= 0.0 {
            return Err(ConfigError::invalid("spawn_interval", "must be positive"));
        }
        if self.chain_spacing.is_nan() || self.chain_spacing <= 0.0 {
            return Err(ConfigError::invalid("chain_spacing", "must be positive"));
        }
        if self.fall_speed.is_nan() || self.fall_speed <= 0.0 {
            return Err(ConfigError::invalid("fall_speed", "must be positive"));
        }
        if self.spawn_interval_decay.is_nan()
            || self.spawn_interval_decay <= 0.0
            || self.spawn_interval_decay > 1.0
        {
            return Err(ConfigError::invalid("spawn_interval_decay", "must be in (0, 1]"));
        }
        if self.chain_spacing_decay.is_nan()
            || self.chain_spacing_decay <= 0.0
            || self.chain_spacing_decay > 1.0
        {
            return Err(ConfigError::invalid("chain_spacing_decay", "must be in (0, 1]"));
        }
        if self.fall_speed_growth.is_nan() || self.fall_speed_growth < 1.0 {
            return Err(ConfigError::invalid("fall_speed_growth", "must be at least 1"));
        }
        if self.kickoff_delay.is_nan() || self.kickoff_delay < 0.0 {
            return Err(ConfigError::invalid("kickoff_delay", "must not be negative"));
        }
        if self.plan_batch == 0 {
            return Err(ConfigError::invalid("plan_batch", "must be at least 1"));
        }
        if self.bomb_odds == 0 {
            return Err(ConfigError::invalid("bomb_odds", "must be at least 1"));
        }
        if self.starting_lives == 0 || self.starting_lives > MAX_LIVES {
            return Err(ConfigError::invalid(
                "starting_lives",
                format!("must be between 1 and {MAX_LIVES}"),
            ));
        }
        if self.ribbon_fade_secs.is_nan() || self.ribbon_fade_secs <= 0.0 {
            return Err(ConfigError::invalid("ribbon_fade_secs", "must be positive"));
        }
        if self.life_pulse_secs.is_nan() || self.life_pulse_secs <= 0.0 {
            return Err(ConfigError::invalid("life_pulse_secs", "must be positive"));
        }
        if self.swoosh_secs.is_nan() || self.swoosh_secs < 0.0 {
            return Err(ConfigError::invalid("swoosh_secs", "must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "chain_spacing": 2.0, "starting_lives": 2 }"#).unwrap();
        assert_eq!(tuning.chain_spacing, 2.0);
        assert_eq!(tuning.starting_lives, 2);
        assert_eq!(tuning.spawn_interval, 0.9);
        assert_eq!(tuning.plan_batch, 1001);
    }

    #[test]
    fn test_rejects_growing_interval() {
        let err = Tuning::from_json(r#"{ "spawn_interval_decay": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "spawn_interval_decay", .. }));
    }

    #[test]
    fn test_rejects_zero_life_pulse() {
        let err = Tuning::from_json(r#"{ "life_pulse_secs": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "life_pulse_secs", .. }));
        assert!(err.to_string().contains("life_pulse_secs"));

        let err = Tuning::from_json(r#"{ "ribbon_fade_secs": -1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "ribbon_fade_secs", .. }));
    }

    #[test]
    fn test_nan_is_rejected() {
        let tuning = Tuning {
            fall_speed: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::Invalid { field: "fall_speed", .. })
        ));
    }

    #[test]
    fn test_rejects_too_many_lives() {
        let err = Tuning::from_json(r#"{ "starting_lives": 9 }"#).unwrap_err();
        assert!(err.to_string().contains("starting_lives"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
