// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: config → device → launches → memory accounting.
//!
//! These tests drive a [`Device`] the way `tensor-core` does: allocate
//! buffers from the pool, copy host data in, chain launches that read the
//! previous launch's output, and copy the result back.

use device_runtime::{Device, DeviceConfig, Dim3, MemoryError, RuntimeError};

// ── Helpers ────────────────────────────────────────────────────

fn device_from_toml(toml: &str) -> Device {
    let config = DeviceConfig::from_toml(toml).expect("config should parse");
    Device::new(config).expect("device should start")
}

fn small_device() -> Device {
    device_from_toml(
        r#"
memory_budget = "1M"
num_threads = 4
block_size = 32
seed = 3
"#,
    )
}

// ── Tests ──────────────────────────────────────────────────────

#[test]
fn test_chained_launches_observe_previous_results() {
    let device = small_device();
    let n = 1000;

    let mut input = device.allocate::<f32>(n).unwrap();
    let host: Vec<f32> = (0..n).map(|i| i as f32).collect();
    input.copy_from_host(&host).unwrap();

    let mut doubled = device.allocate::<f32>(n).unwrap();
    let src = input.as_slice();
    device.launch("double", doubled.as_mut_slice(), |i| src[i] * 2.0);

    let mut shifted = device.allocate::<f32>(n).unwrap();
    let src = doubled.as_slice();
    device.launch("shift", shifted.as_mut_slice(), |i| src[i] + 1.0);

    let mut back = vec![0.0f32; n];
    shifted.copy_to_host(&mut back).unwrap();
    assert!(back.iter().enumerate().all(|(i, &v)| v == 2.0 * i as f32 + 1.0));

    let metrics = device.metrics();
    assert_eq!(metrics.total_launches, 2);
    assert_eq!(metrics.recent[0].kernel, "double");
    assert_eq!(metrics.recent[1].kernel, "shift");
    assert_eq!(metrics.recent[0].blocks, 32);
}

#[test]
fn test_extent_launch_computes_outer_product() {
    let device = small_device();
    let rows = [1.0f64, 2.0, 3.0];
    let cols = [10.0f64, 20.0];
    let extent = Dim3::new(rows.len(), cols.len(), 1);

    let mut out = device.allocate::<f64>(extent.volume()).unwrap();
    device.launch_extent("outer", out.as_mut_slice(), extent, |p| rows[p.x] * cols[p.y]);

    let mut host = vec![0.0; extent.volume()];
    out.copy_to_host(&mut host).unwrap();
    assert_eq!(host, vec![10.0, 20.0, 20.0, 40.0, 30.0, 60.0]);
}

#[test]
fn test_pool_budget_is_enforced_and_released() {
    let device = small_device();
    let big = device.allocate::<u8>(768 * 1024).unwrap();

    let err = device.allocate::<u8>(512 * 1024).unwrap_err();
    assert!(matches!(err, MemoryError::OutOfMemory { .. }));

    drop(big);
    assert_eq!(device.pool().allocated_bytes(), 0);
    assert!(device.allocate::<u8>(512 * 1024).is_ok());

    let stats = device.memory_stats();
    assert_eq!(stats.oom_count, 1);
    assert_eq!(stats.total_allocations, 3);
    assert_eq!(stats.live_buffers(), 0);
}

#[test]
fn test_config_file_roundtrip() {
    let config = DeviceConfig {
        memory_budget: "2M".into(),
        num_threads: Some(2),
        block_size: 128,
        seed: Some(11),
        enable_profiling: false,
    };
    let path = std::env::temp_dir().join(format!("device-config-{}.toml", std::process::id()));
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();

    let loaded = DeviceConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, config);

    let device = Device::new(loaded).unwrap();
    assert_eq!(device.num_threads(), 2);
    assert_eq!(device.block_size(), 128);
    assert_eq!(device.pool().budget().as_mb(), 2);
}

#[test]
fn test_missing_config_file_is_reported() {
    let err = DeviceConfig::from_file(std::path::Path::new("/nonexistent/device.toml")).unwrap_err();
    assert!(matches!(err, RuntimeError::ConfigError(_)));
}

#[test]
fn test_devices_are_shared_between_threads() {
    let device = small_device();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let device = device.clone();
            std::thread::spawn(move || {
                let mut out = vec![0usize; 100];
                device.launch("thread", &mut out, |i| i + t);
                out[99]
            })
        })
        .collect();

    let results: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![99, 100, 101, 102]);
    assert_eq!(device.metrics().total_launches, 4);
}
