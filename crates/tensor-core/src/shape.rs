// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Logical extents of a tensor.

use crate::{DType, TensorError};
use std::fmt;

/// Per-dimension extents, outermost first.
///
/// A `Shape` says nothing about memory order; pair it with strides in a
/// [`crate::Layout`] for that. Rank 0 is a scalar holding one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![4, 2, 3]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.strides(), vec![6, 3, 1]);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn scalar() -> Self {
        Self::new(Vec::new())
    }

    pub fn vector(len: usize) -> Self {
        Self::new(vec![len])
    }

    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self::new(vec![rows, cols])
    }

    /// `[1; rank]`, the shape of a full reduction over a rank-`rank` input.
    pub fn ones(rank: usize) -> Self {
        Self::new(vec![1; rank])
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Product of the extents (1 for a scalar).
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Bytes needed to hold a dense buffer of this shape.
    pub fn size_bytes(&self, dtype: DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }

    /// Dense row-major strides: the last dimension has stride 1 and
    /// `strides[i] = strides[i + 1] * dims[i + 1]`.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1usize; self.rank()];
        let mut step = 1;
        for (stride, &dim) in strides.iter_mut().zip(&self.dims).rev() {
            *stride = step;
            step *= dim;
        }
        strides
    }

    /// Every extent must be at least 1.
    pub fn validate(&self) -> Result<(), TensorError> {
        match self.dims.iter().any(|&d| d == 0) {
            true => Err(TensorError::InvalidShape(self.clone())),
            false => Ok(()),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(usize::to_string).collect();
        write!(f, "[{}]", dims.join(", "))
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}
