// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII device buffer that gives its bytes back to the pool on drop.
//!
//! Host code moves data across the boundary only through the explicit
//! transfer methods. Kernels get direct slice access through
//! [`as_slice`](DeviceBuffer::as_slice) / [`as_mut_slice`](DeviceBuffer::as_mut_slice),
//! which stand in for the raw device pointer a launch would receive.

use crate::pool::PoolInner;
use crate::MemoryError;
use std::sync::Arc;

/// A device-resident buffer of `len` elements of `T`.
///
/// # Example
/// ```ignore
/// let mut buffer = pool.allocate::<f32>(4)?;
/// buffer.copy_from_host(&[1.0, 2.0, 3.0, 4.0])?;   // host → device
/// assert_eq!(buffer.read(2)?, 3.0);                // one element device → host
/// drop(buffer);                                    // bytes returned to pool
/// ```
pub struct DeviceBuffer<T> {
    data: Vec<T>,
    pool: Arc<PoolInner>,
    size_bytes: usize,
}

impl<T: Copy> DeviceBuffer<T> {
    pub(crate) fn new(data: Vec<T>, pool: Arc<PoolInner>, size_bytes: usize) -> Self {
        Self {
            data,
            pool,
            size_bytes,
        }
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: the pool never hands out empty buffers.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of this allocation in bytes.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Copies a host slice into the buffer. The lengths must match exactly.
    pub fn copy_from_host(&mut self, host: &[T]) -> Result<(), MemoryError> {
        if host.len() != self.data.len() {
            return Err(MemoryError::CopySizeMismatch {
                device_len: self.data.len(),
                host_len: host.len(),
            });
        }
        self.data.copy_from_slice(host);
        self.pool.record_host_to_device();
        Ok(())
    }

    /// Copies the whole buffer into a host slice of the same length.
    pub fn copy_to_host(&self, host: &mut [T]) -> Result<(), MemoryError> {
        if host.len() != self.data.len() {
            return Err(MemoryError::CopySizeMismatch {
                device_len: self.data.len(),
                host_len: host.len(),
            });
        }
        host.copy_from_slice(&self.data);
        self.pool.record_device_to_host();
        Ok(())
    }

    /// Reads a single element back to the host.
    pub fn read(&self, offset: usize) -> Result<T, MemoryError> {
        let value = self
            .data
            .get(offset)
            .copied()
            .ok_or(MemoryError::OffsetOutOfBounds {
                offset,
                len: self.data.len(),
            })?;
        self.pool.record_device_to_host();
        Ok(value)
    }

    /// Kernel-side read access.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Kernel-side write access.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        self.pool.release(self.size_bytes);
    }
}

impl<T> std::fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("len", &self.data.len())
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}
