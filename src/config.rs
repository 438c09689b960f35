use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::emulator::{DEFAULT_MEMORY_SIZE, MAX_MEMORY_SIZE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("memory size must be between 1 and {MAX_MEMORY_SIZE}, got {0}")]
    InvalidMemorySize(usize),
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Machine and driver settings. Every field has a default, so a RON file
/// only needs to name what it changes:
///
/// ```ron
/// (memory_size: 64, rng_seed: Some(42))
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    pub memory_size: usize,
    /// Pause between steps in the native driver
    pub step_interval_ms: u64,
    /// Length of one `SLEEP` unit
    pub sleep_unit_ms: u64,
    /// Fixed seed for `RAND`; `None` seeds from the OS
    pub rng_seed: Option<u64>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            step_interval_ms: 2,
            sleep_unit_ms: 1000,
            rng_seed: None,
        }
    }
}

impl EmulatorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!("loading config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: EmulatorConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_MEMORY_SIZE).contains(&self.memory_size) {
            return Err(ConfigError::InvalidMemorySize(self.memory_size));
        }
        Ok(())
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn sleep_unit(&self) -> Duration {
        Duration::from_millis(self.sleep_unit_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = EmulatorConfig::from_ron("(memory_size: 64, rng_seed: Some(42))").unwrap();
        assert_eq!(config.memory_size, 64);
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.step_interval_ms, 2);
        assert_eq!(config.sleep_unit(), Duration::from_secs(1));
    }

    #[traced_test]
    #[test]
    fn test_empty_ron_is_default() {
        assert_eq!(EmulatorConfig::from_ron("()").unwrap(), EmulatorConfig::default());
    }

    #[traced_test]
    #[test]
    fn test_rejects_bad_memory_size() {
        for size in [0, 257, 4096] {
            let text = format!("(memory_size: {size})");
            assert!(matches!(
                EmulatorConfig::from_ron(&text),
                Err(ConfigError::InvalidMemorySize(s)) if s == size
            ));
        }
    }

    #[traced_test]
    #[test]
    fn test_rejects_malformed_ron() {
        assert!(matches!(
            EmulatorConfig::from_ron("(memory_size: \"big\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[traced_test]
    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EmulatorConfig::load("/definitely/not/here.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}
