// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device kernels.
//!
//! Every kernel runs one task per output element. A task receives only its
//! flat output index and recovers everything else from strides:
//!
//! ```text
//! index ──÷ out_strides──▶ coords ──·lhs_strides──▶ lhs offset
//!                                 └─·rhs_strides──▶ rhs offset
//! ```
//!
//! Output buffers are always dense, so the output strides are the row-major
//! strides of the output shape. Operand strides may be permuted (transposed
//! views) or contain zeros (broadcast axes).

mod binary;
mod matmul;
mod reduce;
mod unary;

pub(crate) use binary::{binary, BinaryOp};
pub(crate) use matmul::{matmul, matmul_shape};
pub(crate) use reduce::sum;
pub(crate) use unary::{unary, UnaryOp};

/// Maps a flat output index to an offset into each of two operands.
///
/// Coordinates are peeled off largest stride first by successive division
/// and remainder; each coordinate is then weighted by the operand's stride
/// for that dimension.
#[inline]
pub fn decode_offsets(
    index: usize,
    out_strides: &[usize],
    lhs_strides: &[usize],
    rhs_strides: &[usize],
) -> (usize, usize) {
    let mut rem = index;
    let mut lhs = 0;
    let mut rhs = 0;
    for ((&out, &l), &r) in out_strides.iter().zip(lhs_strides).zip(rhs_strides) {
        let coord = rem / out;
        rem %= out;
        lhs += coord * l;
        rhs += coord * r;
    }
    (lhs, rhs)
}

/// Single-operand form of [`decode_offsets`].
#[inline]
pub fn decode_offset(index: usize, out_strides: &[usize], strides: &[usize]) -> usize {
    let mut rem = index;
    let mut offset = 0;
    for (&out, &s) in out_strides.iter().zip(strides) {
        offset += (rem / out) * s;
        rem %= out;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_layout() {
        let strides = [12, 4, 1];
        for i in 0..24 {
            assert_eq!(decode_offsets(i, &strides, &strides, &strides), (i, i));
            assert_eq!(decode_offset(i, &strides, &strides), i);
        }
    }

    #[test]
    fn test_broadcast_stride_zero() {
        // out [2, 3], rhs is a [1, 3] row reused for both output rows.
        let out = [3, 1];
        let offsets: Vec<_> = (0..6).map(|i| decode_offsets(i, &out, &out, &[0, 1])).collect();
        assert_eq!(offsets, vec![(0, 0), (1, 1), (2, 2), (3, 0), (4, 1), (5, 2)]);
    }

    #[test]
    fn test_transposed_operand() {
        // out [3, 2] read from a [2, 3] source through strides [1, 3].
        let out = [2, 1];
        let offsets: Vec<_> = (0..6).map(|i| decode_offset(i, &out, &[1, 3])).collect();
        assert_eq!(offsets, vec![0, 3, 1, 4, 2, 5]);
    }

    #[test]
    fn test_scalar() {
        assert_eq!(decode_offsets(0, &[], &[], &[]), (0, 0));
    }
}
