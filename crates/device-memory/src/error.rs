// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for device memory management.

/// Errors raised by the device pool and by host/device transfers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// The requested allocation would exceed the device budget.
    #[error("out of device memory: requested {requested_bytes} bytes, but only {available_bytes} available (budget: {budget_bytes})")]
    OutOfMemory {
        requested_bytes: usize,
        available_bytes: usize,
        budget_bytes: usize,
    },

    /// Attempted to allocate a zero-sized buffer.
    #[error("cannot allocate zero-sized buffer")]
    ZeroSizedAllocation,

    /// A host/device copy was given a host slice of the wrong length.
    #[error("copy size mismatch: device buffer holds {device_len} elements, host slice holds {host_len}")]
    CopySizeMismatch { device_len: usize, host_len: usize },

    /// A single-element read addressed past the end of the buffer.
    #[error("device offset {offset} out of bounds for buffer of {len} elements")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// A budget string could not be parsed.
    #[error("invalid budget: {0}")]
    InvalidBudget(String),
}
