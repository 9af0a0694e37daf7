// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Kernel launch profiling metrics.
//!
//! [`DeviceMetrics`] keeps running totals, one [`KernelStats`] entry per
//! kernel name, and the last [`RECENT_LAUNCHES`] launch records. Its size is
//! bounded by the number of distinct kernels, not by the number of launches.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// Number of individual launch records kept by [`DeviceMetrics`].
pub const RECENT_LAUNCHES: usize = 64;

/// Metrics for a single kernel launch.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LaunchMetrics {
    /// Kernel name (`"add"`, `"matmul"`, ...).
    pub kernel: String,
    /// Number of tasks launched (one per output element).
    pub tasks: usize,
    /// Number of blocks in the launch grid.
    pub blocks: usize,
    /// Wall-clock time from launch to completion.
    pub duration: Duration,
}

/// Accumulated metrics for every launch of one kernel.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct KernelStats {
    pub launches: usize,
    pub tasks: usize,
    pub duration: Duration,
}

/// Aggregate launch metrics for a device.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DeviceMetrics {
    /// Total number of launches recorded.
    pub total_launches: usize,
    /// Total tasks executed across all launches.
    pub total_tasks: usize,
    /// Total time spent inside launches.
    pub total_duration: Duration,
    /// Per-kernel totals keyed by kernel name.
    pub kernels: BTreeMap<String, KernelStats>,
    /// The most recent launches, oldest first.
    pub recent: VecDeque<LaunchMetrics>,
}

impl DeviceMetrics {
    /// Creates an empty metrics container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed launch.
    pub fn record_launch(&mut self, kernel: &str, tasks: usize, blocks: usize, duration: Duration) {
        self.total_launches += 1;
        self.total_tasks += tasks;
        self.total_duration += duration;

        if !self.kernels.contains_key(kernel) {
            self.kernels.insert(kernel.to_string(), KernelStats::default());
        }
        if let Some(stats) = self.kernels.get_mut(kernel) {
            stats.launches += 1;
            stats.tasks += tasks;
            stats.duration += duration;
        }

        if self.recent.len() == RECENT_LAUNCHES {
            self.recent.pop_front();
        }
        self.recent.push_back(LaunchMetrics {
            kernel: kernel.to_string(),
            tasks,
            blocks,
            duration,
        });
    }

    /// Launch counts keyed by kernel name.
    pub fn launches_by_kernel(&self) -> BTreeMap<&str, usize> {
        self.kernels
            .iter()
            .map(|(name, stats)| (name.as_str(), stats.launches))
            .collect()
    }

    /// Clears all recorded launches.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let kernels = self
            .kernels
            .iter()
            .map(|(name, stats)| {
                format!(
                    "{name}×{} ({:.3}ms)",
                    stats.launches,
                    stats.duration.as_secs_f64() * 1000.0
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Device: {} launches, {} tasks, {:.3}ms in kernels [{}]",
            self.total_launches,
            self.total_tasks,
            self.total_duration.as_secs_f64() * 1000.0,
            kernels,
        )
    }
}
