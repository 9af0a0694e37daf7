// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Budget-enforced device buffer pool.
//!
//! The [`DevicePool`] is the allocator behind every tensor buffer. It:
//!
//! 1. Enforces a hard memory ceiling. Allocations that would exceed the
//!    budget return `Err(OutOfMemory)` instead of aborting the process.
//! 2. Hands out zero-initialised [`DeviceBuffer`]s typed by element.
//! 3. Tracks allocation and transfer statistics.
//!
//! # Thread Safety
//! `DevicePool` is a cheap `Clone` handle around `Arc<PoolInner>`; all
//! interior state is atomic or behind a `Mutex`, so the pool is `Send + Sync`
//! and can be shared with kernel worker threads.

use crate::{AllocationStats, DeviceBudget, DeviceBuffer, MemoryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Internal pool state, shared between the pool and its live buffers.
pub struct PoolInner {
    budget: DeviceBudget,
    /// Bytes held by live buffers.
    allocated_bytes: AtomicUsize,
    stats: Mutex<AllocationStats>,
}

impl PoolInner {
    /// Called by `DeviceBuffer::drop` to give its bytes back to the budget.
    pub(crate) fn release(&self, size_bytes: usize) {
        self.allocated_bytes.fetch_sub(size_bytes, Ordering::AcqRel);
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_deallocation();
        }
        tracing::trace!(size_bytes, "device buffer released");
    }

    pub(crate) fn record_host_to_device(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_host_to_device();
        }
    }

    pub(crate) fn record_device_to_host(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_device_to_host();
        }
    }
}

/// The device memory allocator.
///
/// # Example
/// ```
/// use device_memory::{DeviceBudget, DevicePool};
///
/// let pool = DevicePool::new(DeviceBudget::from_mb(1));
/// let buffer = pool.allocate::<f64>(128).unwrap();
/// assert_eq!(pool.allocated_bytes(), 1024);
///
/// drop(buffer);
/// assert_eq!(pool.allocated_bytes(), 0);
/// ```
#[derive(Clone)]
pub struct DevicePool {
    inner: Arc<PoolInner>,
}

impl DevicePool {
    /// Creates a new pool with the given budget.
    pub fn new(budget: DeviceBudget) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                budget,
                allocated_bytes: AtomicUsize::new(0),
                stats: Mutex::new(AllocationStats::default()),
            }),
        }
    }

    /// Allocates a zero-initialised buffer of `len` elements of `T`.
    ///
    /// Returns `Err(ZeroSizedAllocation)` for `len == 0` and
    /// `Err(OutOfMemory)` if the request does not fit in the remaining
    /// budget. The returned buffer is freed when dropped.
    pub fn allocate<T>(&self, len: usize) -> Result<DeviceBuffer<T>, MemoryError>
    where
        T: Copy + Default + Send + Sync,
    {
        if len == 0 {
            return Err(MemoryError::ZeroSizedAllocation);
        }
        let budget = self.inner.budget.as_bytes();
        let size_bytes = len.checked_mul(std::mem::size_of::<T>()).ok_or(
            MemoryError::OutOfMemory {
                requested_bytes: usize::MAX,
                available_bytes: self.available_bytes(),
                budget_bytes: budget,
            },
        )?;

        // Reserve the bytes atomically so concurrent requests cannot
        // jointly overshoot the budget.
        let reserved = self.inner.allocated_bytes.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |current| {
                current
                    .checked_add(size_bytes)
                    .filter(|&total| total <= budget)
            },
        );

        let previous = match reserved {
            Ok(previous) => previous,
            Err(current) => {
                if let Ok(mut stats) = self.inner.stats.lock() {
                    stats.record_oom();
                }
                tracing::warn!(size_bytes, current, budget, "device allocation rejected");
                return Err(MemoryError::OutOfMemory {
                    requested_bytes: size_bytes,
                    available_bytes: budget.saturating_sub(current),
                    budget_bytes: budget,
                });
            }
        };

        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_allocation(size_bytes);
            stats.update_peak(previous + size_bytes);
        }
        tracing::trace!(len, size_bytes, "device buffer allocated");

        Ok(DeviceBuffer::new(
            vec![T::default(); len],
            Arc::clone(&self.inner),
            size_bytes,
        ))
    }

    /// Returns the number of bytes held by live buffers.
    pub fn allocated_bytes(&self) -> usize {
        self.inner.allocated_bytes.load(Ordering::Acquire)
    }

    /// Returns the number of bytes remaining before hitting the budget.
    pub fn available_bytes(&self) -> usize {
        self.inner
            .budget
            .as_bytes()
            .saturating_sub(self.allocated_bytes())
    }

    /// Returns the memory budget.
    pub fn budget(&self) -> DeviceBudget {
        self.inner.budget
    }

    /// Returns a snapshot of allocation statistics.
    pub fn stats(&self) -> AllocationStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for DevicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevicePool")
            .field("budget", &self.inner.budget)
            .field("allocated_bytes", &self.allocated_bytes())
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_drop() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));

        let buffer = pool.allocate::<f32>(256).unwrap();
        assert_eq!(pool.allocated_bytes(), 1024);
        assert_eq!(buffer.size_bytes(), 1024);
        assert_eq!(buffer.len(), 256);

        drop(buffer);
        assert_eq!(pool.allocated_bytes(), 0);
    }

    #[test]
    fn test_buffer_is_zeroed() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));
        let buffer = pool.allocate::<f64>(16).unwrap();
        assert!(buffer.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_oom() {
        let pool = DevicePool::new(DeviceBudget::from_bytes(1024));

        let _a = pool.allocate::<f32>(128).unwrap();
        let _b = pool.allocate::<f32>(128).unwrap();

        let result = pool.allocate::<f32>(1);
        assert!(matches!(
            result,
            Err(MemoryError::OutOfMemory {
                requested_bytes: 4,
                available_bytes: 0,
                budget_bytes: 1024,
            })
        ));
    }

    #[test]
    fn test_zero_allocation() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));
        let result = pool.allocate::<f32>(0);
        assert!(matches!(result, Err(MemoryError::ZeroSizedAllocation)));
    }

    #[test]
    fn test_budget_freed_for_reuse() {
        let pool = DevicePool::new(DeviceBudget::from_bytes(400));
        let a = pool.allocate::<f32>(100).unwrap();
        assert!(pool.allocate::<f32>(1).is_err());
        drop(a);
        assert!(pool.allocate::<f32>(100).is_ok());
    }

    #[test]
    fn test_available_bytes() {
        let pool = DevicePool::new(DeviceBudget::from_bytes(10_000));
        assert_eq!(pool.available_bytes(), 10_000);
        let _g = pool.allocate::<u8>(3000).unwrap();
        assert_eq!(pool.available_bytes(), 7000);
    }

    #[test]
    fn test_stats_peak_and_oom() {
        let pool = DevicePool::new(DeviceBudget::from_bytes(4000));

        let a = pool.allocate::<u8>(1000).unwrap();
        let b = pool.allocate::<u8>(2000).unwrap();
        drop(a);
        drop(b);
        let _ = pool.allocate::<u8>(8000);

        let stats = pool.stats();
        assert_eq!(stats.peak_allocated_bytes, 3000);
        assert_eq!(stats.oom_count, 1);
        assert_eq!(stats.total_deallocations, 2);
        assert_eq!(stats.live_buffers(), 0);
    }

    #[test]
    fn test_clone_shares_accounting() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));
        let other = pool.clone();
        let _g = other.allocate::<f32>(10).unwrap();
        assert_eq!(pool.allocated_bytes(), 40);
    }

    #[test]
    fn test_debug_format() {
        let pool = DevicePool::new(DeviceBudget::from_mb(64));
        let debug = format!("{pool:?}");
        assert!(debug.contains("DevicePool"));
        assert!(debug.contains("budget"));
    }
}
