// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for profiling and diagnostics.

/// Cumulative statistics about device pool usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AllocationStats {
    /// Total number of allocation requests, failed ones included.
    pub total_allocations: u64,
    /// Number of allocation requests rejected by the budget.
    pub oom_count: u64,
    /// Peak live device memory in bytes.
    pub peak_allocated_bytes: usize,
    /// Total bytes ever handed out.
    pub cumulative_allocated_bytes: u64,
    /// Total number of buffers released.
    pub total_deallocations: u64,
    /// Host-to-device transfers performed.
    pub host_to_device_copies: u64,
    /// Device-to-host transfers performed (single-element reads included).
    pub device_to_host_copies: u64,
}

impl AllocationStats {
    /// Number of buffers currently alive.
    pub fn live_buffers(&self) -> u64 {
        let successful = self.total_allocations - self.oom_count;
        successful.saturating_sub(self.total_deallocations)
    }

    pub(crate) fn record_allocation(&mut self, size: usize) {
        self.total_allocations += 1;
        self.cumulative_allocated_bytes += size as u64;
    }

    pub(crate) fn record_oom(&mut self) {
        self.total_allocations += 1;
        self.oom_count += 1;
    }

    pub(crate) fn record_deallocation(&mut self) {
        self.total_deallocations += 1;
    }

    pub(crate) fn record_host_to_device(&mut self) {
        self.host_to_device_copies += 1;
    }

    pub(crate) fn record_device_to_host(&mut self) {
        self.device_to_host_copies += 1;
    }

    /// Updates the peak allocation high-water mark if needed.
    pub(crate) fn update_peak(&mut self, current_bytes: usize) {
        if current_bytes > self.peak_allocated_bytes {
            self.peak_allocated_bytes = current_bytes;
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        let peak_kb = self.peak_allocated_bytes as f64 / 1024.0;
        format!(
            "Allocations: {} total ({} live), {} OOMs, peak {:.2} KB, \
             {} deallocations, {} H2D / {} D2H copies",
            self.total_allocations,
            self.live_buffers(),
            self.oom_count,
            peak_kb,
            self.total_deallocations,
            self.host_to_device_copies,
            self.device_to_host_copies,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let s = AllocationStats::default();
        assert_eq!(s.total_allocations, 0);
        assert_eq!(s.live_buffers(), 0);
    }

    #[test]
    fn test_live_buffers() {
        let mut s = AllocationStats::default();
        s.record_allocation(100);
        s.record_allocation(100);
        s.record_oom();
        s.record_deallocation();
        assert_eq!(s.total_allocations, 3);
        assert_eq!(s.live_buffers(), 1);
    }

    #[test]
    fn test_peak_tracking() {
        let mut s = AllocationStats::default();
        s.update_peak(100);
        s.update_peak(50);
        assert_eq!(s.peak_allocated_bytes, 100);
        s.update_peak(200);
        assert_eq!(s.peak_allocated_bytes, 200);
    }

    #[test]
    fn test_summary() {
        let mut s = AllocationStats::default();
        s.record_allocation(2048);
        s.record_host_to_device();
        s.update_peak(2048);
        let summary = s.summary();
        assert!(summary.contains("1 total"));
        assert!(summary.contains("1 live"));
        assert!(summary.contains("1 H2D"));
    }

    #[test]
    fn test_serialize() {
        let mut s = AllocationStats::default();
        s.record_allocation(64);
        s.record_oom();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["total_allocations"], 2);
        assert_eq!(json["oom_count"], 1);
        assert_eq!(json["cumulative_allocated_bytes"], 64);
    }
}
