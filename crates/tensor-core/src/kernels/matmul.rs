// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Batched matrix multiplication.
//!
//! `A` is `[..batch, height, shared]`, `B` is `[..batch, shared, width]` and
//! the output is `[..batch, height, width]`. The launch has one task per
//! `(row, column, batch)`; each task computes a single dot product over
//! `shared`, addressing both operands through their own strides. Transposed
//! operands therefore need no copy.

use super::decode_offsets;
use crate::{Element, Layout, Shape, TensorError};
use device_runtime::{Device, Dim3};

/// Validates operand shapes and returns the output shape.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] unless both operands have the same
/// rank `>= 2`, the same batch dimensions, and `A.shape[-1] == B.shape[-2]`.
pub(crate) fn matmul_shape(lhs: &Layout, rhs: &Layout) -> Result<Shape, TensorError> {
    let a = lhs.shape().dims();
    let b = rhs.shape().dims();
    let rank = a.len();

    let compatible = rank >= 2
        && b.len() == rank
        && a[rank - 1] == b[rank - 2]
        && a[..rank - 2] == b[..rank - 2];
    if !compatible {
        return Err(TensorError::ShapeMismatch {
            op: "matmul",
            lhs: lhs.shape().clone(),
            rhs: rhs.shape().clone(),
        });
    }

    let mut dims = a[..rank - 2].to_vec();
    dims.push(a[rank - 2]);
    dims.push(b[rank - 1]);
    Ok(Shape::new(dims))
}

/// Computes `out = lhs @ rhs`. Shapes must have been checked with
/// [`matmul_shape`]; `out` is dense in the output shape.
pub(crate) fn matmul<T: Element>(
    device: &Device,
    lhs: &[T],
    lhs_layout: &Layout,
    rhs: &[T],
    rhs_layout: &Layout,
    out: &mut [T],
) {
    let rank = lhs_layout.rank();
    let a_dims = lhs_layout.shape().dims();
    let (height, shared) = (a_dims[rank - 2], a_dims[rank - 1]);
    let width = rhs_layout.shape().dims()[rank - 1];

    let batch_shape = Shape::from(&a_dims[..rank - 2]);
    let batch_strides = batch_shape.strides();
    let extent = Dim3::new(height, width, batch_shape.num_elements());

    let a_strides = lhs_layout.strides();
    let b_strides = rhs_layout.strides();
    let (a_row, a_k) = (a_strides[rank - 2], a_strides[rank - 1]);
    let (b_k, b_col) = (b_strides[rank - 2], b_strides[rank - 1]);

    device.launch_extent("matmul", out, extent, |p| {
        let (a_base, b_base) = decode_offsets(
            p.z,
            &batch_strides,
            &a_strides[..rank - 2],
            &b_strides[..rank - 2],
        );
        let a_base = a_base + p.x * a_row;
        let b_base = b_base + p.y * b_col;
        (0..shared).fold(T::ZERO, |acc, k| {
            acc + lhs[a_base + k * a_k] * rhs[b_base + k * b_k]
        })
    });
}
