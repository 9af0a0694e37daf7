// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Elementwise unary kernels.

use super::decode_offset;
use crate::{Element, Layout};
use device_runtime::Device;

/// Elementwise unary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Relu,
    ReluDerivative,
}

impl UnaryOp {
    pub(crate) fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Relu => "relu",
            UnaryOp::ReluDerivative => "relu_derivative",
        }
    }

    #[inline]
    fn apply<T: Element>(self, x: T) -> T {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Relu => {
                if x > T::ZERO {
                    x
                } else {
                    T::ZERO
                }
            }
            UnaryOp::ReluDerivative => {
                if x > T::ZERO {
                    T::ONE
                } else {
                    T::ZERO
                }
            }
        }
    }
}

/// Applies `op` to every element of `input`, read through `layout`, writing
/// the results densely into `out`.
pub(crate) fn unary<T: Element>(
    device: &Device,
    op: UnaryOp,
    input: &[T],
    layout: &Layout,
    out: &mut [T],
) {
    let out_strides = layout.shape().strides();
    let strides = layout.strides();
    device.launch(op.name(), out, |i| {
        op.apply(input[decode_offset(i, &out_strides, strides)])
    });
}
