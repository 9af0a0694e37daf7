// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Elementwise binary kernels with broadcasting.

use super::decode_offsets;
use crate::{Broadcast, Element};
use device_runtime::Device;

/// Elementwise binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub(crate) fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
        }
    }

    #[inline]
    fn apply<T: Element>(self, a: T, b: T) -> T {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

/// `out[i] = lhs[lhs_offset(i)] op rhs[rhs_offset(i)]` for every output index.
pub(crate) fn binary<T: Element>(
    device: &Device,
    op: BinaryOp,
    lhs: &[T],
    rhs: &[T],
    bc: &Broadcast,
    out: &mut [T],
) {
    let out_strides = bc.out_strides();
    device.launch(op.name(), out, |i| {
        let (l, r) = decode_offsets(i, &out_strides, &bc.lhs_strides, &bc.rhs_strides);
        op.apply(lhs[l], rhs[r])
    });
}
