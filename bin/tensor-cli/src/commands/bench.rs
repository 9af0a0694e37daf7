// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tensor-rt bench` command: sweep kernels across matrix sizes.
//!
//! For each size `n`, times `n×n @ n×n` matmul (dense and with a transposed
//! right-hand view), a `[n, n] + [1, n]` broadcast add, and a full sum, then
//! prints a comparison table.

use anyhow::Context;
use device_runtime::{Device, DeviceConfig};
use std::time::{Duration, Instant};
use tensor_core::{Tensor, TensorError};

struct BenchResult {
    size: usize,
    matmul: Duration,
    matmul_transposed: Duration,
    broadcast_add: Duration,
    sum: Duration,
}

fn parse_sizes(sizes: &str) -> anyhow::Result<Vec<usize>> {
    sizes
        .split(',')
        .map(|s| {
            let s = s.trim();
            match s.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(anyhow::anyhow!("invalid size '{s}'")),
            }
        })
        .collect()
}

/// Mean wall time of `iterations` runs of `f`, after one warm-up run.
fn time<F>(iterations: usize, mut f: F) -> Result<Duration, TensorError>
where
    F: FnMut() -> Result<Tensor<f32>, TensorError>,
{
    f()?;
    let start = Instant::now();
    for _ in 0..iterations {
        f()?;
    }
    Ok(start.elapsed() / iterations.max(1) as u32)
}

fn run_single(device: &Device, n: usize, iterations: usize) -> Result<BenchResult, TensorError> {
    let a = Tensor::<f32>::random_uniform(device, -1.0, 1.0, [n, n])?;
    let b = Tensor::<f32>::random_uniform(device, -1.0, 1.0, [n, n])?;
    let row = Tensor::<f32>::random_uniform(device, -1.0, 1.0, [1, n])?;
    let b_t = b.transpose(0, 1)?;

    Ok(BenchResult {
        size: n,
        matmul: time(iterations, || a.matmul(&b))?,
        matmul_transposed: time(iterations, || a.matmul(&b_t))?,
        broadcast_add: time(iterations, || &a + &row)?,
        sum: time(iterations, || a.sum())?,
    })
}

fn millis(d: Duration) -> String {
    format!("{:.3}ms", d.as_secs_f64() * 1000.0)
}

pub fn execute(config: DeviceConfig, sizes: &str, iterations: usize) -> anyhow::Result<()> {
    let sizes = parse_sizes(sizes)?;
    let device = Device::new(config)?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           tensor-rt · Benchmark Suite               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Sizes:      {sizes:?}");
    println!("  Iterations: {iterations}");
    println!("  Threads:    {}", device.num_threads());
    println!();

    // ── Results Table ──────────────────────────────────────────
    println!(
        "  {:>6} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "Size", "Matmul", "Matmul(Bᵀ)", "Bcast add", "Sum", "GFLOP/s",
    );
    println!("  {}", "-".repeat(70));

    for &n in &sizes {
        let r = run_single(&device, n, iterations)
            .with_context(|| format!("benchmark for size {n} failed"))?;
        let flops = 2.0 * (r.size as f64).powi(3);
        let gflops = flops / r.matmul.as_secs_f64().max(f64::EPSILON) / 1e9;
        println!(
            "  {:>6} {:>12} {:>12} {:>12} {:>12} {:>10.2}",
            r.size,
            millis(r.matmul),
            millis(r.matmul_transposed),
            millis(r.broadcast_add),
            millis(r.sum),
            gflops,
        );
    }

    println!();
    println!("  {}", device.memory_stats().summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sizes() {
        assert_eq!(parse_sizes("64, 128,256").unwrap(), vec![64, 128, 256]);
        assert!(parse_sizes("64,0").is_err());
        assert!(parse_sizes("big").is_err());
    }

    #[test]
    fn test_run_single() {
        let device = Device::new(DeviceConfig {
            memory_budget: "8M".into(),
            num_threads: Some(2),
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        let r = run_single(&device, 8, 1).unwrap();
        assert_eq!(r.size, 8);
    }
}
