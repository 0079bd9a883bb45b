use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Errors from validating a [`RuntimeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tick rate must be finite and positive, got {0}")]
    InvalidTickRate(f64),
    #[error("diagnostics sample interval must be at least one tick")]
    ZeroSampleInterval,
}

/// Sampling diagnostics for the frame loop and tick dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Record update/render timings and log periodic samples.
    pub enabled: bool,
    /// Log one sample every N simulation ticks.
    pub sample_every_n_ticks: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sample_every_n_ticks: 60,
        }
    }
}

/// Runtime parameters handed to the frame driver by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Simulation ticks per second.
    pub tick_rate_hz: f64,
    /// Directory that asset keys are resolved against.
    pub assets_root: PathBuf,
    pub diagnostics: DiagnosticsConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            assets_root: PathBuf::from("Assets/Sprites"),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Check the values a driver cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidTickRate(self.tick_rate_hz));
        }
        if self.diagnostics.sample_every_n_ticks == 0 {
            return Err(ConfigError::ZeroSampleInterval);
        }
        Ok(())
    }

    /// Fixed tick interval in seconds.
    pub fn tick_interval(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_rate_hz, 60.0);
        assert_eq!(config.diagnostics.sample_every_n_ticks, 60);
        assert!(!config.diagnostics.enabled);
    }

    #[test]
    fn tick_interval_is_reciprocal_of_rate() {
        let config = RuntimeConfig {
            tick_rate_hz: 30.0,
            ..RuntimeConfig::default()
        };
        assert!((config.tick_interval() - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_tick_rates() {
        for rate in [0.0, -60.0, f64::NAN, f64::INFINITY] {
            let config = RuntimeConfig {
                tick_rate_hz: rate,
                ..RuntimeConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidTickRate(_))
            ));
        }
    }

    #[test]
    fn rejects_zero_sample_interval() {
        let mut config = RuntimeConfig::default();
        config.diagnostics.sample_every_n_ticks = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroSampleInterval)
        ));
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{ "tick_rate_hz": 120.0 }"#).unwrap();
        assert_eq!(config.tick_rate_hz, 120.0);
        assert_eq!(config.assets_root, PathBuf::from("Assets/Sprites"));
        assert_eq!(config.diagnostics, DiagnosticsConfig::default());
    }
}
