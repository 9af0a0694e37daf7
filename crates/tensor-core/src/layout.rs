// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shape plus strides: how a tensor's logical elements map onto its buffer.
//!
//! A freshly allocated tensor has the dense row-major strides of its shape.
//! A transposed view swaps two entries of both the shape and the strides, so
//! it indexes the *original* buffer in a different order without moving any
//! data:
//! ```text
//! shape [2, 3], strides [3, 1]   ──transpose(0, 1)──▶   shape [3, 2], strides [1, 3]
//! ```

use crate::{Shape, TensorError};

/// Shape and per-dimension strides (in elements) of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    shape: Shape,
    strides: Vec<usize>,
}

impl Layout {
    /// Dense row-major layout for `shape`.
    pub fn contiguous(shape: Shape) -> Self {
        let strides = shape.strides();
        Self { shape, strides }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Swaps dimensions `dim1` and `dim2` in both shape and strides.
    ///
    /// # Errors
    /// Returns [`TensorError::RankMismatch`] if either dimension is `>= rank`.
    pub fn transpose(&self, dim1: usize, dim2: usize) -> Result<Layout, TensorError> {
        let rank = self.rank();
        for dim in [dim1, dim2] {
            if dim >= rank {
                return Err(TensorError::RankMismatch {
                    op: "transpose",
                    index: dim,
                    rank,
                });
            }
        }
        let mut dims = self.shape.dims().to_vec();
        let mut strides = self.strides.clone();
        dims.swap(dim1, dim2);
        strides.swap(dim1, dim2);
        Ok(Layout {
            shape: Shape::new(dims),
            strides,
        })
    }

    /// `true` if the strides are the dense row-major strides of the shape.
    pub fn is_contiguous(&self) -> bool {
        self.strides == self.shape.strides()
    }

    /// Buffer offset of the element at `coords`. Coordinates are not checked.
    pub fn offset_of(&self, coords: &[usize]) -> usize {
        coords
            .iter()
            .zip(&self.strides)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Buffer offset of the element at `coords`, with bounds checking.
    pub fn checked_offset(&self, coords: &[usize]) -> Result<usize, TensorError> {
        if coords.len() != self.rank() {
            return Err(TensorError::RankMismatch {
                op: "index",
                index: coords.len(),
                rank: self.rank(),
            });
        }
        if coords.iter().zip(self.shape.dims()).any(|(c, d)| c >= d) {
            return Err(TensorError::IndexOutOfBounds {
                index: coords.to_vec(),
                shape: self.shape.clone(),
            });
        }
        Ok(self.offset_of(coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous() {
        let l = Layout::contiguous(Shape::new(vec![2, 3, 4]));
        assert_eq!(l.strides(), &[12, 4, 1]);
        assert!(l.is_contiguous());
        assert_eq!(l.offset_of(&[1, 2, 3]), 23);
    }

    #[test]
    fn test_transpose_swaps_shape_and_strides() {
        let l = Layout::contiguous(Shape::matrix(2, 3));
        let t = l.transpose(0, 1).unwrap();
        assert_eq!(t.shape().dims(), &[3, 2]);
        assert_eq!(t.strides(), &[1, 3]);
        assert!(!t.is_contiguous());
        // Element (row 2, col 1) of the transpose is element (1, 2) of the source.
        assert_eq!(t.offset_of(&[2, 1]), l.offset_of(&[1, 2]));
    }

    #[test]
    fn test_transpose_is_an_involution() {
        let l = Layout::contiguous(Shape::new(vec![2, 3, 5]));
        for (i, j) in [(0, 1), (0, 2), (1, 2), (1, 1)] {
            let back = l.transpose(i, j).unwrap().transpose(i, j).unwrap();
            assert_eq!(back, l);
        }
    }

    #[test]
    fn test_transpose_rejects_bad_dims() {
        let l = Layout::contiguous(Shape::matrix(2, 3));
        assert!(matches!(
            l.transpose(0, 2),
            Err(TensorError::RankMismatch { index: 2, rank: 2, .. })
        ));
    }

    #[test]
    fn test_checked_offset() {
        let l = Layout::contiguous(Shape::matrix(2, 3));
        assert_eq!(l.checked_offset(&[1, 1]).unwrap(), 4);
        assert!(matches!(
            l.checked_offset(&[1]),
            Err(TensorError::RankMismatch { .. })
        ));
        assert!(matches!(
            l.checked_offset(&[2, 0]),
            Err(TensorError::IndexOutOfBounds { .. })
        ));
    }
}
