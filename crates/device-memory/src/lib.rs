// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-memory
//!
//! The device memory service behind every tensor buffer: a budget-enforced
//! pool that hands out typed, zero-initialised buffers and accounts for
//! every byte until it is released.
//!
//! # Key Components
//!
//! - [`DeviceBudget`] — a hard ceiling on device memory with human-readable
//!   parsing (`"512M"`, `"1G"`, etc.).
//! - [`DevicePool`] — the allocator: enforces the budget and tracks
//!   statistics.
//! - [`DeviceBuffer`] — an RAII handle to `len` device-resident scalars.
//!   Host data only crosses into or out of a buffer through the explicit
//!   [`copy_from_host`](DeviceBuffer::copy_from_host) /
//!   [`copy_to_host`](DeviceBuffer::copy_to_host) / [`read`](DeviceBuffer::read)
//!   transfers. Dropping the buffer frees it.
//! - [`AllocationStats`] — cumulative allocator metrics (peak usage, OOM
//!   count, live buffers).
//!
//! # Ownership Model
//!
//! ```text
//! DevicePool::allocate::<T>(len)
//!       │
//!       ▼
//!   DeviceBuffer<T>  ◄─── owns Vec<T>, holds Arc<PoolInner>
//!       │
//!       │  drop()
//!       ▼
//!   PoolInner::release()  ──► allocated bytes decremented
//! ```
//!
//! Buffers that must be shared (a tensor and its transposed views) are
//! wrapped in an `Arc` by the caller; the pool only sees the final drop.
//!
//! # Example
//! ```
//! use device_memory::{DeviceBudget, DevicePool};
//!
//! let pool = DevicePool::new(DeviceBudget::from_mb(64));
//!
//! let mut a = pool.allocate::<f32>(1024).unwrap();
//! a.copy_from_host(&vec![1.0; 1024]).unwrap();
//! assert_eq!(pool.allocated_bytes(), 4096);
//!
//! drop(a);
//! assert_eq!(pool.allocated_bytes(), 0);
//! ```

mod budget;
mod buffer;
mod error;
pub mod pool;
mod stats;

pub use budget::DeviceBudget;
pub use buffer::DeviceBuffer;
pub use error::MemoryError;
pub use pool::DevicePool;
pub use stats::AllocationStats;
