// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

use crate::Shape;
use device_memory::MemoryError;

/// Errors that can occur during tensor operations.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// Two tensors have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// A dimension index or coordinate count does not fit the tensor's rank.
    #[error("{op}: index {index} is invalid for a rank-{rank} tensor")]
    RankMismatch {
        op: &'static str,
        index: usize,
        rank: usize,
    },

    /// A coordinate is outside its dimension.
    #[error("index {index:?} out of bounds for shape {shape}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Shape },

    /// The tensor has no autograd node.
    #[error("tensor has no gradient node")]
    NullGradientNode,

    /// Gradients were requested from a node that does not accumulate them.
    #[error("gradient node is not a leaf")]
    NotALeaf,

    /// The leaf has not received any gradient yet.
    #[error("no gradients have been accumulated")]
    NoGradients,

    /// A device buffer request or transfer failed.
    #[error("device memory: {0}")]
    AllocationFailure(#[from] MemoryError),

    /// The provided host values do not match the element count of the shape.
    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The shape has a zero-sized dimension.
    #[error("invalid shape {0}: dimensions must be positive")]
    InvalidShape(Shape),

    /// Random construction parameters do not describe a distribution.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// Operands live on different devices.
    #[error("{op}: operands live on different devices")]
    DeviceMismatch { op: &'static str },
}
