// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! memory_budget = "512M"
//! num_threads = 4
//! block_size = 256
//! seed = 42
//! enable_profiling = true
//! ```

use crate::RuntimeError;
use device_memory::DeviceBudget;
use std::path::Path;

/// Default number of tasks per launch block.
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Configuration for a [`crate::Device`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceConfig {
    /// Device memory budget (human-readable, e.g. `"512M"`).
    pub memory_budget: String,
    /// Number of kernel worker threads (defaults to the number of online cores).
    pub num_threads: Option<usize>,
    /// Tasks per launch block.
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Seed for the device random generator. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Whether to record per-launch metrics.
    #[serde(default = "default_true")]
    pub enable_profiling: bool,
}

fn default_true() -> bool {
    true
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

impl DeviceConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Parses the memory budget string into a [`DeviceBudget`].
    pub fn parse_budget(&self) -> Result<DeviceBudget, RuntimeError> {
        DeviceBudget::parse(&self.memory_budget)
            .map_err(|e| RuntimeError::ConfigError(format!("invalid budget: {e}")))
    }

    /// Resolves the number of worker threads.
    pub fn resolve_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// Checks the fields that have no meaningful zero value.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.block_size == 0 {
            return Err(RuntimeError::ConfigError("block_size must be positive".into()));
        }
        if self.num_threads == Some(0) {
            return Err(RuntimeError::ConfigError("num_threads must be positive".into()));
        }
        self.parse_budget().map(|_| ())
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            memory_budget: "512M".to_string(),
            num_threads: None,
            block_size: DEFAULT_BLOCK_SIZE,
            seed: None,
            enable_profiling: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = DeviceConfig::default();
        assert_eq!(c.memory_budget, "512M");
        assert_eq!(c.block_size, 256);
        assert!(c.enable_profiling);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_parse_budget() {
        let c = DeviceConfig {
            memory_budget: "256M".into(),
            ..Default::default()
        };
        assert_eq!(c.parse_budget().unwrap().as_mb(), 256);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
memory_budget = "1G"
num_threads = 2
block_size = 64
seed = 7
enable_profiling = false
"#;
        let c = DeviceConfig::from_toml(toml).unwrap();
        assert_eq!(c.memory_budget, "1G");
        assert_eq!(c.num_threads, Some(2));
        assert_eq!(c.block_size, 64);
        assert_eq!(c.seed, Some(7));
        assert!(!c.enable_profiling);
    }

    #[test]
    fn test_from_toml_defaults() {
        let c = DeviceConfig::from_toml(r#"memory_budget = "8M""#).unwrap();
        assert_eq!(c.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(c.seed, None);
        assert!(c.enable_profiling);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = DeviceConfig {
            seed: Some(99),
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        let back = DeviceConfig::from_toml(&toml).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let c = DeviceConfig {
            block_size: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = DeviceConfig {
            num_threads: Some(0),
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = DeviceConfig {
            memory_budget: "lots".into(),
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_resolve_threads() {
        let c = DeviceConfig {
            num_threads: Some(8),
            ..Default::default()
        };
        assert_eq!(c.resolve_threads(), 8);
        assert!(DeviceConfig::default().resolve_threads() >= 1);
    }
}
