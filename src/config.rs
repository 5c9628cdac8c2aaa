//! Runtime configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```ignore
//! let config = RuntimeConfig::from_toml_str(r#"
//!     max_rows = 3
//!     animation_interval = 2
//! "#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables shared by every `ViewRuntime` created from the same manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum number of rows a chest-style window may declare.
    pub max_rows: u16,
    /// Ticks before the first run of an interval task.
    pub interval_delay: u64,
    /// Ticks between two animation steps.
    pub animation_interval: u64,
    /// Upper bound on flush iterations before the pass is abandoned.
    pub max_flush_iterations: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_rows: 6,
            interval_delay: 1,
            animation_interval: 1,
            max_flush_iterations: 64,
        }
    }
}

impl RuntimeConfig {
    /// Parse a config from TOML. Missing keys fall back to the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = RuntimeConfig::from_toml_str("animation_interval = 4\nmax_rows = 3").unwrap();
        assert_eq!(config.animation_interval, 4);
        assert_eq!(config.max_rows, 3);
        assert_eq!(config.interval_delay, 1);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let result = RuntimeConfig::from_toml_str("max_rows = \"six\"");
        assert!(result.is_err());
    }
}
