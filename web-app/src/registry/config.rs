use std::{fs, path::PathBuf, time::Duration};

use serde::Deserialize;
use shared::{data::Vehicle, seed::seed_vehicles};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file '{0}'. {1}")]
    FileReadError(PathBuf, std::io::Error),
    #[error("Seed file '{0}' is not a list of vehicles. {1}")]
    Malformed(PathBuf, serde_json::Error),
}

/// The `registry` table of `Rocket.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub submit_delay_ms: u64,
    pub lookup_delay_ms: u64,
    pub recent_count: usize,
    pub seed_file: Option<PathBuf>,
    /// Wizards untouched for this long are dropped.
    pub wizard_idle_minutes: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 1500,
            lookup_delay_ms: 500,
            recent_count: 3,
            seed_file: None,
            wizard_idle_minutes: 30,
        }
    }
}

impl RegistryConfig {
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn lookup_delay(&self) -> Duration {
        Duration::from_millis(self.lookup_delay_ms)
    }

    pub fn wizard_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.wizard_idle_minutes.saturating_mul(60))
    }

    /// The configured seed file, or the built in records when none is set.
    pub fn load_seed(&self) -> Result<Vec<Vehicle>, SeedError> {
        let Some(path) = &self.seed_file else {
            return Ok(seed_vehicles());
        };

        let contents =
            fs::read_to_string(path).map_err(|e| SeedError::FileReadError(path.clone(), e))?;
        serde_json::from_str(&contents).map_err(|e| SeedError::Malformed(path.clone(), e))
    }
}
