// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type.

use crate::autograd::{self, GradKind, Node, NodeRef};
use crate::kernels::{self, BinaryOp, UnaryOp};
use crate::view::{AsView, TensorView};
use crate::{broadcast, DType, Element, Layout, Shape, TensorError};
use device_memory::DeviceBuffer;
use device_runtime::Device;
use rand::distributions::Uniform;
use rand::Rng;
use std::sync::Arc;

/// An n-dimensional tensor stored in device memory.
///
/// A tensor is a handle: the device buffer is shared by reference count, so
/// cloning a tensor (or escaping a view with [`TensorView::to_shared`]) never
/// copies data. Arithmetic always allocates a fresh, densely laid out output.
///
/// # Memory Layout
/// Elements are addressed through the tensor's [`Layout`]. Freshly created
/// tensors are row-major; tensors obtained from transposed views keep the
/// permuted strides of the buffer they index.
///
/// # Examples
/// ```
/// use device_runtime::{Device, DeviceConfig};
/// use tensor_core::Tensor;
///
/// let device = Device::new(DeviceConfig::default()).unwrap();
/// let a = Tensor::from_values(&device, &[1.0f32, 2.0, 3.0, 4.0], [2, 2]).unwrap();
/// let b = Tensor::fill(&device, 10.0f32, [1, 2]).unwrap();
/// let c = (&a + &b).unwrap();
/// assert_eq!(c.to_vec().unwrap(), vec![11.0, 12.0, 13.0, 14.0]);
/// ```
#[derive(Clone)]
pub struct Tensor<T: Element> {
    device: Device,
    buffer: Arc<DeviceBuffer<T>>,
    layout: Layout,
    node: Option<NodeRef<T>>,
}

impl<T: Element> Tensor<T> {
    fn from_buffer(device: &Device, buffer: DeviceBuffer<T>, shape: Shape) -> Self {
        Self {
            device: device.clone(),
            buffer: Arc::new(buffer),
            layout: Layout::contiguous(shape),
            node: None,
        }
    }

    pub(crate) fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    fn validated(shape: impl Into<Shape>) -> Result<Shape, TensorError> {
        let shape = shape.into();
        shape.validate()?;
        Ok(shape)
    }

    /// Creates a tensor filled with zeros.
    pub fn zeros(device: &Device, shape: impl Into<Shape>) -> Result<Self, TensorError> {
        let shape = Self::validated(shape)?;
        let buffer = device.allocate::<T>(shape.num_elements())?;
        Ok(Self::from_buffer(device, buffer, shape))
    }

    /// Creates a tensor from host values in row-major order.
    ///
    /// Returns an error if `values.len()` does not match the element count of `shape`.
    pub fn from_values(
        device: &Device,
        values: &[T],
        shape: impl Into<Shape>,
    ) -> Result<Self, TensorError> {
        let shape = Self::validated(shape)?;
        let expected = shape.num_elements();
        if values.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        let mut buffer = device.allocate::<T>(expected)?;
        buffer.copy_from_host(values)?;
        Ok(Self::from_buffer(device, buffer, shape))
    }

    /// Creates a tensor with every element set to `value`.
    pub fn fill(device: &Device, value: T, shape: impl Into<Shape>) -> Result<Self, TensorError> {
        let shape = Self::validated(shape)?;
        let mut buffer = device.allocate::<T>(shape.num_elements())?;
        device.launch("fill", buffer.as_mut_slice(), |_| value);
        Ok(Self::from_buffer(device, buffer, shape))
    }

    /// Creates a tensor of samples from `U[min, max)`, drawn from the device
    /// generator.
    pub fn random_uniform(
        device: &Device,
        min: T,
        max: T,
        shape: impl Into<Shape>,
    ) -> Result<Self, TensorError> {
        let valid = min.is_finite() && max.is_finite() && min < max && (max - min).is_finite();
        if !valid {
            return Err(TensorError::InvalidDistribution(format!(
                "uniform range [{min}, {max}) is empty or not finite"
            )));
        }
        let shape = Self::validated(shape)?;
        let dist = Uniform::new(min, max);
        let values: Vec<T> = device.with_rng(|rng| {
            (0..shape.num_elements()).map(|_| rng.sample(&dist)).collect()
        });
        Self::from_values(device, &values, shape)
    }

    /// Creates a tensor of samples from `N(mean, std_dev²)`, drawn from the
    /// device generator.
    pub fn random_normal(
        device: &Device,
        mean: T,
        std_dev: T,
        shape: impl Into<Shape>,
    ) -> Result<Self, TensorError> {
        if !(mean.is_finite() && std_dev.is_finite() && std_dev >= T::ZERO) {
            return Err(TensorError::InvalidDistribution(format!(
                "normal distribution needs a finite mean and a finite, non-negative \
                 standard deviation (got mean {mean}, std_dev {std_dev})"
            )));
        }
        let shape = Self::validated(shape)?;
        let values: Vec<T> = device.with_rng(|rng| {
            (0..shape.num_elements())
                .map(|_| T::sample_normal(rng, mean, std_dev))
                .collect()
        });
        Self::from_values(device, &values, shape)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn shape(&self) -> &Shape {
        self.layout.shape()
    }

    pub fn rank(&self) -> usize {
        self.layout.rank()
    }

    pub fn strides(&self) -> &[usize] {
        self.layout.strides()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn num_elements(&self) -> usize {
        self.layout.num_elements()
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Size of the tensor's elements in bytes.
    pub fn size_bytes(&self) -> usize {
        self.shape().size_bytes(T::DTYPE)
    }

    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    pub(crate) fn buffer(&self) -> &DeviceBuffer<T> {
        &self.buffer
    }

    pub(crate) fn node(&self) -> Option<&NodeRef<T>> {
        self.node.as_ref()
    }

    /// Returns a view with this tensor's own layout.
    pub fn view(&self) -> TensorView<'_, T> {
        TensorView::new(self, self.layout.clone())
    }

    /// Returns a view with dimensions `dim1` and `dim2` swapped. No data moves.
    ///
    /// # Errors
    /// Returns [`TensorError::RankMismatch`] if either dimension is `>= rank`.
    pub fn transpose(&self, dim1: usize, dim2: usize) -> Result<TensorView<'_, T>, TensorError> {
        Ok(TensorView::new(self, self.layout.transpose(dim1, dim2)?))
    }

    /// Reads the element at `coords` back to the host.
    pub fn get(&self, coords: &[usize]) -> Result<T, TensorError> {
        self.view().get(coords)
    }

    /// Copies every element back to the host in logical row-major order.
    pub fn to_vec(&self) -> Result<Vec<T>, TensorError> {
        self.view().to_vec()
    }

    pub fn add(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        self.view().add(rhs)
    }

    pub fn sub(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        self.view().sub(rhs)
    }

    /// Elementwise product. The only operation that records a gradient node.
    pub fn mul(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        self.view().mul(rhs)
    }

    pub fn div(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        self.view().div(rhs)
    }

    pub fn neg(&self) -> Result<Tensor<T>, TensorError> {
        self.view().neg()
    }

    /// Batched matrix product over the trailing two dimensions.
    pub fn matmul(&self, rhs: &impl AsView<T>) -> Result<Tensor<T>, TensorError> {
        self.view().matmul(rhs)
    }

    pub fn relu(&self) -> Result<Tensor<T>, TensorError> {
        self.view().relu()
    }

    pub fn relu_derivative(&self) -> Result<Tensor<T>, TensorError> {
        self.view().relu_derivative()
    }

    /// Sum of all elements, as a tensor of shape `[1; rank]`.
    pub fn sum(&self) -> Result<Tensor<T>, TensorError> {
        self.view().sum()
    }

    // ── Gradient graph ─────────────────────────────────────────

    /// Attaches a fresh gradient leaf to this tensor, replacing any node it
    /// held. Other tensors keep the node they already reference.
    pub fn requires_gradients(&mut self) {
        self.node = Some(Node::leaf());
    }

    /// Attaches a node that accepts and discards gradients.
    pub fn stop_gradients(&mut self) {
        self.node = Some(Node::shared(Node::NoOp));
    }

    /// Drops this tensor's reference to its gradient node.
    pub fn detach(&mut self) {
        self.node = None;
    }

    pub(crate) fn without_node(mut self) -> Self {
        self.node = None;
        self
    }

    /// Kind of gradient node this tensor carries, or `None` if it carries
    /// none. Outputs of operations other than `*` always report `None`.
    pub fn grad_kind(&self) -> Option<GradKind> {
        self.node.as_ref().map(|n| autograd::lock(n).kind())
    }

    /// Returns the first gradient accumulated into this tensor's leaf.
    ///
    /// # Errors
    /// - [`TensorError::NullGradientNode`] if the tensor has no node.
    /// - [`TensorError::NotALeaf`] if the node does not accumulate.
    /// - [`TensorError::NoGradients`] if nothing has arrived yet.
    pub fn gradients(&self) -> Result<Tensor<T>, TensorError> {
        self.all_gradients()?
            .into_iter()
            .next()
            .ok_or(TensorError::NoGradients)
    }

    /// Returns every gradient accumulated into this tensor's leaf, in
    /// arrival order.
    pub fn all_gradients(&self) -> Result<Vec<Tensor<T>>, TensorError> {
        let node = self.node.as_ref().ok_or(TensorError::NullGradientNode)?;
        match &*autograd::lock(node) {
            Node::Accumulate { grads } => Ok(grads.clone()),
            _ => Err(TensorError::NotALeaf),
        }
    }

    /// Propagates `gradient` from this tensor's node towards the leaves.
    pub fn backward_with(&self, gradient: &Tensor<T>) -> Result<(), TensorError> {
        let node = self.node.as_ref().ok_or(TensorError::NullGradientNode)?;
        autograd::propagate(node, gradient)
    }

    /// Propagates a gradient of ones shaped like this tensor.
    pub fn backward(&self) -> Result<(), TensorError> {
        if self.node.is_none() {
            return Err(TensorError::NullGradientNode);
        }
        let seed = Tensor::fill(&self.device, T::ONE, self.shape().clone())?;
        self.backward_with(&seed)
    }

    // ── Kernel plumbing shared with views ─────────────────────

    pub(crate) fn binary_op(
        op: BinaryOp,
        lhs: &TensorView<'_, T>,
        rhs: &TensorView<'_, T>,
        record: bool,
    ) -> Result<Tensor<T>, TensorError> {
        let device = lhs.device();
        if !device.same_device(rhs.device()) {
            return Err(TensorError::DeviceMismatch { op: op.name() });
        }
        let bc = broadcast::resolve(op.name(), lhs.layout(), rhs.layout())?;
        let mut out = device.allocate::<T>(bc.shape.num_elements())?;
        kernels::binary(device, op, lhs.data(), rhs.data(), &bc, out.as_mut_slice());

        let mut result = Self::from_buffer(device, out, bc.shape);
        if record {
            if op == BinaryOp::Mul {
                result.node = Some(Node::multiply(
                    lhs.to_shared(),
                    rhs.to_shared(),
                    [lhs.node().cloned(), rhs.node().cloned()],
                ));
            } else {
                warn_untracked(op.name(), &[lhs, rhs]);
            }
        }
        Ok(result)
    }

    pub(crate) fn mul_untracked(&self, rhs: &Tensor<T>) -> Result<Tensor<T>, TensorError> {
        Self::binary_op(BinaryOp::Mul, &self.view(), &rhs.view(), false)
    }

    pub(crate) fn unary_op(op: UnaryOp, input: &TensorView<'_, T>) -> Result<Tensor<T>, TensorError> {
        let device = input.device();
        let mut out = device.allocate::<T>(input.num_elements())?;
        kernels::unary(device, op, input.data(), input.layout(), out.as_mut_slice());
        warn_untracked(op.name(), &[input]);
        Ok(Self::from_buffer(device, out, input.shape().clone()))
    }

    pub(crate) fn matmul_op(
        lhs: &TensorView<'_, T>,
        rhs: &TensorView<'_, T>,
    ) -> Result<Tensor<T>, TensorError> {
        let device = lhs.device();
        if !device.same_device(rhs.device()) {
            return Err(TensorError::DeviceMismatch { op: "matmul" });
        }
        let shape = kernels::matmul_shape(lhs.layout(), rhs.layout())?;
        let mut out = device.allocate::<T>(shape.num_elements())?;
        kernels::matmul(
            device,
            lhs.data(),
            lhs.layout(),
            rhs.data(),
            rhs.layout(),
            out.as_mut_slice(),
        );
        warn_untracked("matmul", &[lhs, rhs]);
        Ok(Self::from_buffer(device, out, shape))
    }

    pub(crate) fn sum_op(input: &TensorView<'_, T>) -> Result<Tensor<T>, TensorError> {
        let device = input.device();
        let out = kernels::sum(device, input.data(), input.layout())?;
        warn_untracked("sum", &[input]);
        Ok(Self::from_buffer(device, out, Shape::ones(input.rank())))
    }
}

fn warn_untracked<T: Element>(op: &'static str, operands: &[&TensorView<'_, T>]) {
    if operands.iter().any(|t| t.node().is_some()) {
        tracing::warn!(
            op,
            "operation is not differentiable; gradients will not flow through its output"
        );
    }
}

impl<T: Element> std::fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", self.shape())
            .field("strides", &self.strides())
            .field("dtype", &T::DTYPE)
            .field("grad", &self.grad_kind())
            .finish()
    }
}

// ── Operators ──────────────────────────────────────────────────

macro_rules! binary_operator {
    ($trait:ident, $method:ident, [$($lt:lifetime),*], $lhs:ty, $rhs:ty) => {
        impl<'a, 'b, $($lt,)* T: Element> std::ops::$trait<&'b $rhs> for &'a $lhs {
            type Output = Result<Tensor<T>, TensorError>;

            fn $method(self, rhs: &'b $rhs) -> Self::Output {
                self.as_view().$method(rhs)
            }
        }
    };
}

macro_rules! binary_operators {
    ($trait:ident, $method:ident) => {
        binary_operator!($trait, $method, [], Tensor<T>, Tensor<T>);
        binary_operator!($trait, $method, ['w], Tensor<T>, TensorView<'w, T>);
        binary_operator!($trait, $method, ['v], TensorView<'v, T>, Tensor<T>);
        binary_operator!($trait, $method, ['v, 'w], TensorView<'v, T>, TensorView<'w, T>);
    };
}

binary_operators!(Add, add);
binary_operators!(Sub, sub);
binary_operators!(Mul, mul);
binary_operators!(Div, div);

impl<'a, T: Element> std::ops::Neg for &'a Tensor<T> {
    type Output = Result<Tensor<T>, TensorError>;

    fn neg(self) -> Self::Output {
        Tensor::neg(self)
    }
}

impl<'a, 'v, T: Element> std::ops::Neg for &'a TensorView<'v, T> {
    type Output = Result<Tensor<T>, TensorError>;

    fn neg(self) -> Self::Output {
        TensorView::neg(self)
    }
}
