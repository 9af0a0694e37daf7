// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Launch geometry.
//!
//! A launch is a grid of blocks, each block a fixed number of tasks. 1-D
//! launches cover `n` output elements with `ceil(n / block)` blocks; the
//! matmul launch uses a 3-D extent of `(rows, columns, batch)` and maps
//! each flat task index back to its triple.

/// A 3-D launch extent or coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dim3 {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Dim3 {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Total number of points in the extent.
    pub fn volume(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Maps a flat task index to its coordinate. `z` varies slowest and `y`
    /// fastest, so consecutive tasks walk along a row of one batch entry.
    pub fn unflatten(&self, index: usize) -> Dim3 {
        let plane = self.x * self.y;
        let z = index / plane;
        let rem = index % plane;
        Dim3 {
            x: rem / self.y,
            y: rem % self.y,
            z,
        }
    }
}

/// Grid and block sizes of one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Number of tasks that produce output.
    pub tasks: usize,
    /// Tasks per block.
    pub block_size: usize,
    /// Number of blocks in the grid.
    pub blocks: usize,
}

impl LaunchConfig {
    /// Standard launch covering `n` elements.
    pub fn for_elements(n: usize, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            tasks: n,
            block_size,
            blocks: n.div_ceil(block_size).max(1),
        }
    }

    /// Matmul launch: one task per `(row, column, batch)` point of `extent`.
    pub fn for_matmul(extent: Dim3, block_size: usize) -> Self {
        Self::for_elements(extent.volume(), block_size)
    }
}
