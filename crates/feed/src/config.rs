//! Feed tuning constants and the `FeedConfig` resource.
//!
//! Defaults reproduce the dashboard's mock ambulance feed: a 1 s simulated
//! fetch, a 2 s update interval, and a 0.001 degree step at 30 km/h.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::movement::MovementParams;

/// Rate of the `FixedUpdate` schedule that drives the feed.
pub const TICK_HZ: u32 = 10;
/// Simulated time covered by one `FixedUpdate` run.
pub const FIXED_STEP: Duration = Duration::from_millis(1000 / TICK_HZ as u64);

pub const LOAD_DELAY_MS: u64 = 1_000;
pub const UPDATE_INTERVAL_MS: u64 = 2_000;
/// Degrees moved per tick by a unit travelling at `REFERENCE_SPEED`.
pub const BASE_STEP_DEGREES: f64 = 0.001;
pub const REFERENCE_SPEED: f64 = 30.0;
/// Minutes removed from every moving unit's ETA per tick.
pub const ETA_DECREMENT_MINUTES: f64 = 0.2;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Simulated fetch latency before the first snapshot.
    pub load_delay_ms: u64,
    /// Period of the movement tick once the feed is ready.
    pub update_interval_ms: u64,
    pub base_step: f64,
    pub reference_speed: f64,
    pub eta_decrement: f64,
    /// Queue a `Start` command at app startup.
    pub autostart: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            load_delay_ms: LOAD_DELAY_MS,
            update_interval_ms: UPDATE_INTERVAL_MS,
            base_step: BASE_STEP_DEGREES,
            reference_speed: REFERENCE_SPEED,
            eta_decrement: ETA_DECREMENT_MINUTES,
            autostart: true,
        }
    }
}

impl FeedConfig {
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn movement(&self) -> MovementParams {
        MovementParams {
            base_step: self.base_step,
            reference_speed: self.reference_speed,
            eta_decrement: self.eta_decrement,
        }
    }

    /// Reject values that would stall the interval or poison positions with NaN.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "update_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !self.reference_speed.is_finite() || self.reference_speed <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "reference_speed must be positive, got {}",
                self.reference_speed
            )));
        }
        if !self.base_step.is_finite() || self.base_step < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "base_step must be non-negative, got {}",
                self.base_step
            )));
        }
        if !self.eta_decrement.is_finite() || self.eta_decrement < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "eta_decrement must be non-negative, got {}",
                self.eta_decrement
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FeedConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FeedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.load_delay(), Duration::from_secs(1));
        assert_eq!(config.update_interval(), Duration::from_secs(2));
        assert!(config.autostart);
    }

    #[test]
    fn test_fixed_step_is_ten_hz() {
        assert_eq!(FIXED_STEP, Duration::from_millis(100));
        assert_eq!(FIXED_STEP * TICK_HZ, Duration::from_secs(1));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = FeedConfig::from_json_str(r#"{ "update_interval_ms": 500 }"#).unwrap();
        assert_eq!(config.update_interval_ms, 500);
        assert_eq!(config.load_delay_ms, LOAD_DELAY_MS);
        assert_eq!(config.eta_decrement, ETA_DECREMENT_MINUTES);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = FeedConfig::from_json_str(r#"{ "update_interval_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
    }

    #[test]
    fn test_non_positive_reference_speed_rejected() {
        let config = FeedConfig {
            reference_speed: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_decrement_rejected() {
        let config = FeedConfig {
            eta_decrement: -0.1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_garbage_json_is_parse_error() {
        let err = FeedConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got: {err}");
    }

    #[test]
    fn test_movement_params_mirror_config() {
        let config = FeedConfig {
            base_step: 0.002,
            reference_speed: 60.0,
            eta_decrement: 0.5,
            ..Default::default()
        };
        let params = config.movement();
        assert_eq!(params.base_step, 0.002);
        assert_eq!(params.reference_speed, 60.0);
        assert_eq!(params.eta_decrement, 0.5);
    }
}
