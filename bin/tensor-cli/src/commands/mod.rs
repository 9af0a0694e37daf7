// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CLI subcommands and shared setup.

pub mod bench;
pub mod demo;
pub mod info;

use anyhow::Context;
use device_runtime::DeviceConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the device configuration from `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<DeviceConfig> {
    match path {
        Some(path) => {
            let config = DeviceConfig::from_file(path)
                .with_context(|| format!("loading device config from {}", path.display()))?;
            tracing::info!("loaded device config from {}", path.display());
            Ok(config)
        }
        None => Ok(DeviceConfig::default()),
    }
}
