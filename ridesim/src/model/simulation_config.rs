use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// engine tuning knobs, loadable from a TOML file. every field has a
/// default so a partial file (or none at all) is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// seconds between expiration sweeps
    pub check_interval_secs: u64,
    /// idle seconds before a waiting commuter expires
    pub inactivity_threshold_secs: u64,
    /// seconds between spawn batches
    pub spawn_interval_secs: u64,
    /// the window each Poisson draw covers
    pub spawn_window_minutes: f64,
    /// scales zone population density into commuters per hour
    pub base_coefficient: f64,
    /// grid cell edge and boarding match radius, meters
    pub proximity_threshold_m: f64,
    /// broadcast buffer for lifecycle events
    pub event_channel_capacity: usize,
    /// fixed seed for reproducible spawn sequences
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> SimulationConfig {
        SimulationConfig {
            check_interval_secs: 30,
            inactivity_threshold_secs: 900,
            spawn_interval_secs: 60,
            spawn_window_minutes: 5.0,
            base_coefficient: 0.1,
            proximity_threshold_m: 250.0,
            event_channel_capacity: 1024,
            rng_seed: None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failure reading simulation config: {0}")]
    ReadError(String),
}

impl SimulationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, ConfigError> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .build()
            .map_err(|e| ConfigError::ReadError(format!("failed to load {path:?}: {e}")))?;
        settings
            .try_deserialize()
            .map_err(|e| ConfigError::ReadError(format!("failed to parse {path:?}: {e}")))
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn inactivity_threshold(&self) -> Duration {
        Duration::from_secs(self.inactivity_threshold_secs)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_secs(self.spawn_interval_secs)
    }
}

#[cfg(test)]
mod test {
    use super::SimulationConfig;

    #[test]
    fn test_defaults_are_sane() {
        let config = SimulationConfig::default();
        assert!(config.inactivity_threshold() > config.check_interval());
        assert!(config.proximity_threshold_m > 0.0);
        assert!(config.event_channel_capacity > 0);
    }
}
