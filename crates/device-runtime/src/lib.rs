// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-runtime
//!
//! The execution context that tensor kernels run on.
//!
//! A [`Device`] bundles:
//! - A budgeted [`DevicePool`] from `device-memory`.
//! - A dedicated `rayon` worker pool that executes kernel launches.
//! - A seedable random generator used by random tensor construction.
//! - Per-launch profiling via [`DeviceMetrics`].
//!
//! # Launch Model
//! A launch is a grid of blocks of `block_size` tasks, one task per output
//! element:
//! ```text
//! out:   [ 0 .. 255 | 256 .. 511 | 512 .. 767 | 768 .. 999 ]
//!          block 0     block 1      block 2      block 3
//! ```
//! Blocks run in parallel on the worker pool. A launch returns only after
//! every task has finished, so launches issued one after another complete in
//! issue order.

mod config;
mod device;
mod error;
mod launch;
mod metrics;

pub use config::{DeviceConfig, DEFAULT_BLOCK_SIZE};
pub use device::Device;
pub use error::RuntimeError;
pub use launch::{Dim3, LaunchConfig};
pub use metrics::{DeviceMetrics, KernelStats, LaunchMetrics, RECENT_LAUNCHES};

pub use device_memory::{AllocationStats, DeviceBudget, DeviceBuffer, DevicePool, MemoryError};
