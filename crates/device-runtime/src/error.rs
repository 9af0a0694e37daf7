// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the device runtime.

/// Errors that can occur while configuring or creating a [`crate::Device`].
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Configuration is unreadable or inconsistent.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The kernel worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Device memory error.
    #[error("memory error: {0}")]
    Memory(#[from] device_memory::MemoryError),
}
