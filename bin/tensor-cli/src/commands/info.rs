// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tensor-rt info` command: show how the device will be set up.

use device_runtime::{Device, DeviceConfig};
use tensor_core::DType;

pub fn execute(config: DeviceConfig) -> anyhow::Result<()> {
    let device = Device::new(config)?;
    let config = device.config();

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           tensor-rt · Device Information            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    println!("  Device");
    println!("   Memory budget:  {}", device.pool().budget());
    println!("   Worker threads: {}", device.num_threads());
    println!("   Block size:     {} tasks", device.block_size());
    match config.seed {
        Some(seed) => println!("   RNG seed:       {seed}"),
        None => println!("   RNG seed:       (entropy)"),
    }
    println!(
        "   Profiling:      {}",
        if config.enable_profiling { "on" } else { "off" }
    );
    println!();

    println!("  Element types");
    for dtype in [DType::F32, DType::F64] {
        println!("   {:<4} {} bytes", dtype.as_str(), dtype.size_bytes());
    }
    println!();

    println!("  Effective config (TOML)");
    for line in config.to_toml()?.lines() {
        println!("   {line}");
    }
    Ok(())
}
