// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Strided N-dimensional tensors computed on a [`device_runtime::Device`].
//!
//! This crate provides:
//! - [`Tensor`] — an n-dimensional tensor in device memory, and
//!   [`TensorView`], a zero-copy borrowed view with its own [`Layout`].
//! - [`Shape`] and [`Layout`] — dimensions, row-major strides, transposition.
//! - [`broadcast::resolve`] — same-rank broadcasting through zero strides.
//! - Kernels: elementwise `+ - * /`, `neg`, `relu`, `relu_derivative`, a
//!   tree-reduced `sum`, and batched `matmul`, each one task per output element.
//! - A reverse-mode gradient graph in which multiplication records
//!   product-rule nodes ([`autograd`]).
//!
//! # Design Goals
//! - Zero-copy views: transposes permute strides, broadcasts use stride 0.
//! - Every kernel reads its operands through their strides, so views never
//!   need to be materialised.
//! - Clean error types via `thiserror`.
//!
//! # Differentiability
//! Only `*` records a gradient node. The outputs of `+`, `-`, `/`, `matmul`,
//! unary operations and `sum` carry no node; a warning is logged when one of
//! them consumes a tensor that does.

pub mod autograd;
pub mod broadcast;
mod dtype;
mod element;
mod error;
mod format;
mod kernels;
mod layout;
mod shape;
mod tensor;
mod view;

pub use autograd::{GradKind, Node, NodeRef};
pub use broadcast::Broadcast;
pub use dtype::DType;
pub use element::Element;
pub use error::TensorError;
pub use kernels::{decode_offset, decode_offsets};
pub use layout::Layout;
pub use shape::Shape;
pub use tensor::Tensor;
pub use view::{AsView, TensorView};
