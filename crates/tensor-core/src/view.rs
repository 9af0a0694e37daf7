// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Borrowed tensor views.

use crate::autograd::NodeRef;
use crate::kernels::{decode_offset, BinaryOp, UnaryOp};
use crate::{Element, Layout, Shape, Tensor, TensorError};
use device_runtime::Device;

/// A zero-copy view over a [`Tensor`]'s buffer with its own layout.
///
/// Views are tied to the lifetime of the source tensor, enforced by the
/// borrow checker. Use [`TensorView::to_shared`] when the view has to
/// outlive the borrow.
///
/// A view shares the source tensor's gradient node, so multiplying a view
/// wires the product into the same graph as the source.
#[derive(Clone)]
pub struct TensorView<'a, T: Element> {
    source: &'a Tensor<T>,
    layout: Layout,
}

/// Anything that can be read as a [`TensorView`]: operations accept both
/// owned tensors and views through this trait.
pub trait AsView<T: Element> {
    fn as_view(&self) -> TensorView<'_, T>;
}

impl<T: Element> AsView<T> for Tensor<T> {
    fn as_view(&self) -> TensorView<'_, T> {
        self.view()
    }
}

impl<'a, T: Element> AsView<T> for TensorView<'a, T> {
    fn as_view(&self) -> TensorView<'_, T> {
        self.clone()
    }
}

impl<'a, T: Element> TensorView<'a, T> {
    pub(crate) fn new(source: &'a Tensor<T>, layout: Layout) -> Self {
        Self { source, layout }
    }

    pub fn shape(&self) -> &Shape {
        self.layout.shape()
    }

    pub fn strides(&self) -> &[usize] {
        self.layout.strides()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn rank(&self) -> usize {
        self.layout.rank()
    }

    pub fn num_elements(&self) -> usize {
        self.layout.num_elements()
    }

    pub fn device(&self) -> &'a Device {
        self.source.device()
    }

    pub(crate) fn data(&self) -> &'a [T] {
        self.source.buffer().as_slice()
    }

    pub(crate) fn node(&self) -> Option<&'a NodeRef<T>> {
        self.source.node()
    }

    /// Swaps two more dimensions of this view.
    pub fn transpose(&self, dim1: usize, dim2: usize) -> Result<TensorView<'a, T>, TensorError> {
        Ok(Self::new(self.source, self.layout.transpose(dim1, dim2)?))
    }

    /// An owning tensor that shares the source buffer and keeps this view's
    /// layout and gradient node.
    pub fn to_shared(&self) -> Tensor<T> {
        self.source.clone().with_layout(self.layout.clone())
    }

    /// Reads the element at `coords` back to the host.
    pub fn get(&self, coords: &[usize]) -> Result<T, TensorError> {
        let offset = self.layout.checked_offset(coords)?;
        Ok(self.source.buffer().read(offset)?)
    }

    /// Copies every element back to the host in logical row-major order.
    pub fn to_vec(&self) -> Result<Vec<T>, TensorError> {
        let buffer = self.source.buffer();
        let mut host = vec![T::ZERO; buffer.len()];
        buffer.copy_to_host(&mut host)?;

        if self.layout.is_contiguous() {
            return Ok(host);
        }
        let out_strides = self.shape().strides();
        Ok((0..self.num_elements())
            .map(|i| host[decode_offset(i, &out_strides, self.strides())])
            .collect())
    }

    pub fn add(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        Tensor::binary_op(BinaryOp::Add, self, &rhs.as_view(), true)
    }

    pub fn sub(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        Tensor::binary_op(BinaryOp::Sub, self, &rhs.as_view(), true)
    }

    pub fn mul(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        Tensor::binary_op(BinaryOp::Mul, self, &rhs.as_view(), true)
    }

    pub fn div(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        Tensor::binary_op(BinaryOp::Div, self, &rhs.as_view(), true)
    }

    pub fn neg(&self) -> Result<Tensor<T>, TensorError> {
        Tensor::unary_op(UnaryOp::Neg, self)
    }

    pub fn relu(&self) -> Result<Tensor<T>, TensorError> {
        Tensor::unary_op(UnaryOp::Relu, self)
    }

    pub fn relu_derivative(&self) -> Result<Tensor<T>, TensorError> {
        Tensor::unary_op(UnaryOp::ReluDerivative, self)
    }

    pub fn matmul(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        Tensor::matmul_op(self, &rhs.as_view())
    }

    pub fn sum(&self) -> Result<Tensor<T>, TensorError> {
        Tensor::sum_op(self)
    }
}

impl<'a, T: Element> std::fmt::Debug for TensorView<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorView")
            .field("shape", self.shape())
            .field("strides", &self.strides())
            .field("dtype", &T::DTYPE)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_runtime::DeviceConfig;

    fn device() -> Device {
        Device::new(DeviceConfig {
            memory_budget: "1M".into(),
            num_threads: Some(2),
            block_size: 4,
            ..Default::default()
        })
        .unwrap()
    }

    fn matrix(dev: &Device) -> Tensor<f32> {
        Tensor::from_values(dev, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3]).unwrap()
    }

    #[test]
    fn test_transpose_is_zero_copy() {
        let dev = device();
        let t = matrix(&dev);
        let before = dev.pool().allocated_bytes();
        let v = t.transpose(0, 1).unwrap();
        assert_eq!(dev.pool().allocated_bytes(), before);
        assert_eq!(v.shape().dims(), &[3, 2]);
        assert_eq!(v.strides(), &[1, 3]);
        assert_eq!(v.get(&[2, 1]).unwrap(), 6.0);
        assert_eq!(v.get(&[0, 1]).unwrap(), 4.0);
    }

    #[test]
    fn test_to_vec_in_logical_order() {
        let dev = device();
        let t = matrix(&dev);
        let v = t.transpose(0, 1).unwrap();
        assert_eq!(v.to_vec().unwrap(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_double_transpose_restores_layout() {
        let dev = device();
        let t = matrix(&dev);
        let v = t.transpose(0, 1).unwrap().transpose(0, 1).unwrap();
        assert_eq!(v.layout(), t.layout());
        assert_eq!(v.to_vec().unwrap(), t.to_vec().unwrap());
    }

    #[test]
    fn test_to_shared_outlives_the_borrow() {
        let dev = device();
        let shared = {
            let t = matrix(&dev);
            let v = t.transpose(0, 1).unwrap();
            v.to_shared()
        };
        assert!(!shared.is_contiguous());
        assert_eq!(shared.shape().dims(), &[3, 2]);
        assert_eq!(shared.to_vec().unwrap(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        // The source tensor is gone; its buffer lives on in `shared`.
        assert_eq!(dev.pool().allocated_bytes(), 24);
    }

    #[test]
    fn test_view_ops() {
        let dev = device();
        let t = matrix(&dev);
        let v = t.transpose(0, 1).unwrap();
        let relu = (-&v).unwrap().relu().unwrap();
        assert!(relu.to_vec().unwrap().iter().all(|&x| x == 0.0));

        let doubled = (&v + &v).unwrap();
        assert_eq!(doubled.shape().dims(), &[3, 2]);
        assert!(doubled.is_contiguous());
        assert_eq!(doubled.to_vec().unwrap(), vec![2.0, 8.0, 4.0, 10.0, 6.0, 12.0]);
    }

    #[test]
    fn test_view_transpose_rank_check() {
        let dev = device();
        let t = matrix(&dev);
        assert!(matches!(
            t.transpose(1, 2),
            Err(TensorError::RankMismatch { index: 2, rank: 2, .. })
        ));
    }
}
