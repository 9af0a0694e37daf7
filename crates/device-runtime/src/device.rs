// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The device execution context.
//!
//! ```text
//!          DeviceConfig
//!               │  Device::new()
//!               ▼
//!   ┌───────────────────────────┐
//!   │ Device (Arc-shared)       │
//!   │  ├─ DevicePool  (memory)  │
//!   │  ├─ ThreadPool  (kernels) │
//!   │  ├─ StdRng      (random)  │
//!   │  └─ DeviceMetrics         │
//!   └───────────────────────────┘
//! ```
//!
//! A launch runs one task per output element on the device's worker pool,
//! block by block. Each task is a pure function of its flat index and writes
//! only its own output slot, so tasks never need to synchronise. Launches
//! complete before returning, which makes consecutive launches observe each
//! other's results in issue order.

use crate::launch::{Dim3, LaunchConfig};
use crate::{DeviceConfig, DeviceMetrics, RuntimeError};
use device_memory::{AllocationStats, DeviceBuffer, DevicePool, MemoryError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

struct DeviceInner {
    config: DeviceConfig,
    pool: DevicePool,
    workers: rayon::ThreadPool,
    rng: Mutex<StdRng>,
    metrics: Mutex<DeviceMetrics>,
}

/// A handle to the compute device. Cloning is cheap and yields a handle to
/// the same device.
///
/// # Example
/// ```
/// use device_runtime::{Device, DeviceConfig};
///
/// let device = Device::new(DeviceConfig {
///     memory_budget: "16M".into(),
///     seed: Some(1),
///     ..Default::default()
/// })
/// .unwrap();
///
/// let mut out = device.allocate::<f32>(1000).unwrap();
/// device.launch("iota", out.as_mut_slice(), |i| i as f32);
/// assert_eq!(out.read(999).unwrap(), 999.0);
/// ```
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

impl Device {
    /// Creates a device from the given configuration.
    pub fn new(config: DeviceConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let budget = config.parse_budget()?;
        let threads = config.resolve_threads();

        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("device-worker-{i}"))
            .build()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::info!(
            "device created: {budget} budget, {threads} workers, block size {}",
            config.block_size
        );

        Ok(Self {
            inner: Arc::new(DeviceInner {
                pool: DevicePool::new(budget),
                workers,
                rng: Mutex::new(rng),
                metrics: Mutex::new(DeviceMetrics::new()),
                config,
            }),
        })
    }

    /// Returns the configuration this device was built from.
    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    /// Returns the device memory pool.
    pub fn pool(&self) -> &DevicePool {
        &self.inner.pool
    }

    /// Tasks per launch block.
    pub fn block_size(&self) -> usize {
        self.inner.config.block_size
    }

    /// Number of kernel worker threads.
    pub fn num_threads(&self) -> usize {
        self.inner.workers.current_num_threads()
    }

    /// `true` if both handles refer to the same device.
    pub fn same_device(&self, other: &Device) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Allocates a zero-initialised device buffer of `len` elements.
    pub fn allocate<T>(&self, len: usize) -> Result<DeviceBuffer<T>, MemoryError>
    where
        T: Copy + Default + Send + Sync,
    {
        self.inner.pool.allocate(len)
    }

    /// Runs `f` with exclusive access to the device random generator.
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self
            .inner
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Re-seeds the device random generator.
    pub fn reseed(&self, seed: u64) {
        self.with_rng(|rng| *rng = StdRng::seed_from_u64(seed));
    }

    /// Launches one task per element of `out`. Task `i` computes `out[i]`.
    pub fn launch<T, F>(&self, kernel: &str, out: &mut [T], task: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        let cfg = LaunchConfig::for_elements(out.len(), self.block_size());
        self.dispatch(kernel, cfg, out, task);
    }

    /// Launches one task per point of a 3-D `(row, column, batch)` extent.
    /// `out` is laid out with `z` slowest and `y` fastest (see
    /// [`Dim3::unflatten`]).
    pub fn launch_extent<T, F>(&self, kernel: &str, out: &mut [T], extent: Dim3, task: F)
    where
        T: Send,
        F: Fn(Dim3) -> T + Sync,
    {
        debug_assert_eq!(out.len(), extent.volume());
        let cfg = LaunchConfig::for_matmul(extent, self.block_size());
        self.dispatch(kernel, cfg, out, |index| task(extent.unflatten(index)));
    }

    /// Returns a snapshot of the launch metrics.
    pub fn metrics(&self) -> DeviceMetrics {
        self.inner
            .metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Clears the recorded launch metrics.
    pub fn reset_metrics(&self) {
        if let Ok(mut metrics) = self.inner.metrics.lock() {
            metrics.reset();
        }
    }

    /// Returns a snapshot of the memory pool statistics.
    pub fn memory_stats(&self) -> AllocationStats {
        self.inner.pool.stats()
    }

    fn dispatch<T, F>(&self, kernel: &str, cfg: LaunchConfig, out: &mut [T], task: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        let start = Instant::now();
        let block_size = cfg.block_size;

        self.inner.workers.install(|| {
            out.par_chunks_mut(block_size)
                .enumerate()
                .for_each(|(block, chunk)| {
                    let base = block * block_size;
                    for (thread, slot) in chunk.iter_mut().enumerate() {
                        *slot = task(base + thread);
                    }
                });
        });

        let duration = start.elapsed();
        tracing::debug!(
            kernel,
            tasks = cfg.tasks,
            blocks = cfg.blocks,
            micros = duration.as_micros() as u64,
            "kernel launch complete"
        );
        if self.inner.config.enable_profiling {
            if let Ok(mut metrics) = self.inner.metrics.lock() {
                metrics.record_launch(kernel, cfg.tasks, cfg.blocks, duration);
            }
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("pool", &self.inner.pool)
            .field("threads", &self.num_threads())
            .field("block_size", &self.block_size())
            .field("profiling", &self.inner.config.enable_profiling)
            .finish()
    }
}
