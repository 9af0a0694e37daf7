// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Broadcast resolution for same-rank elementwise operations.
//!
//! Dimension by dimension:
//! ```text
//! lhs [2, 3]  strides [3, 1]
//! rhs [1, 3]  strides [3, 1]
//! ─────────────────────────────
//! out [2, 3]  lhs [3, 1]  rhs [0, 1]
//! ```
//! A size-1 operand dimension gets stride 0, so every output coordinate along
//! that axis reads the same element. Nothing is copied.

use crate::{Layout, Shape, TensorError};

/// Output shape and per-operand effective strides of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub shape: Shape,
    pub lhs_strides: Vec<usize>,
    pub rhs_strides: Vec<usize>,
}

impl Broadcast {
    /// Dense row-major strides of the output.
    pub fn out_strides(&self) -> Vec<usize> {
        self.shape.strides()
    }
}

/// Resolves the broadcast of two operands of equal rank.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the ranks differ, or if a
/// dimension differs and neither side is 1.
pub fn resolve(op: &'static str, lhs: &Layout, rhs: &Layout) -> Result<Broadcast, TensorError> {
    let mismatch = || TensorError::ShapeMismatch {
        op,
        lhs: lhs.shape().clone(),
        rhs: rhs.shape().clone(),
    };

    if lhs.rank() != rhs.rank() {
        return Err(mismatch());
    }

    let rank = lhs.rank();
    let mut dims = Vec::with_capacity(rank);
    let mut lhs_strides = lhs.strides().to_vec();
    let mut rhs_strides = rhs.strides().to_vec();

    for (i, (&l, &r)) in lhs.shape().dims().iter().zip(rhs.shape().dims()).enumerate() {
        let size = if l == r {
            l
        } else if l == 1 {
            lhs_strides[i] = 0;
            r
        } else if r == 1 {
            rhs_strides[i] = 0;
            l
        } else {
            return Err(mismatch());
        };
        dims.push(size);
    }

    Ok(Broadcast {
        shape: Shape::new(dims),
        lhs_strides,
        rhs_strides,
    })
}
