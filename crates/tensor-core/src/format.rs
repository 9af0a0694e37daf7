// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Human-readable tensor rendering.
//!
//! ```text
//! [[1, 2], [3, 4]]
//! shape = [2, 2], rank = 2, strides = [2, 1], elements = 4, size = 16 B
//! ```
//!
//! Elements are printed in logical row-major order, so a transposed view
//! prints as the transposed matrix.

use crate::{Element, Tensor, TensorView};
use std::fmt;

fn write_nested<T: Element>(f: &mut fmt::Formatter<'_>, values: &[T], dims: &[usize]) -> fmt::Result {
    let Some((&outer, inner)) = dims.split_first() else {
        return write!(f, "{}", values[0]);
    };
    let chunk = values.len() / outer;
    write!(f, "[")?;
    for (i, row) in values.chunks(chunk).enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_nested(f, row, inner)?;
    }
    write!(f, "]")
}

fn write_tensor<T: Element>(f: &mut fmt::Formatter<'_>, view: &TensorView<'_, T>) -> fmt::Result {
    let values = view.to_vec().map_err(|_| fmt::Error)?;
    let shape = view.shape();
    write_nested(f, &values, shape.dims())?;
    writeln!(f)?;
    write!(
        f,
        "shape = {shape}, rank = {}, strides = {:?}, elements = {}, size = {} B",
        view.rank(),
        view.strides(),
        view.num_elements(),
        shape.size_bytes(T::DTYPE),
    )
}

impl<T: Element> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tensor(f, &self.view())
    }
}

impl<'a, T: Element> fmt::Display for TensorView<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tensor(f, self)
    }
}

#[cfg(test)]
mod tests {
    use crate::Tensor;
    use device_runtime::{Device, DeviceConfig};

    fn device() -> Device {
        Device::new(DeviceConfig {
            memory_budget: "1M".into(),
            num_threads: Some(1),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_matrix() {
        let dev = device();
        let t = Tensor::from_values(&dev, &[1.0f32, 2.0, 3.0, 4.0], [2, 2]).unwrap();
        assert_eq!(
            t.to_string(),
            "[[1, 2], [3, 4]]\nshape = [2, 2], rank = 2, strides = [2, 1], elements = 4, size = 16 B"
        );
    }

    #[test]
    fn test_transposed_view() {
        let dev = device();
        let t = Tensor::from_values(&dev, &[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3]).unwrap();
        let s = t.transpose(0, 1).unwrap().to_string();
        assert!(s.starts_with("[[1, 4], [2, 5], [3, 6]]\n"));
        assert!(s.ends_with("strides = [1, 3], elements = 6, size = 48 B"));
    }

    #[test]
    fn test_rank_three_and_scalar() {
        let dev = device();
        let t = Tensor::from_values(&dev, &[1.0f32, 2.0, 3.0, 4.0], [2, 1, 2]).unwrap();
        assert!(t.to_string().starts_with("[[[1, 2]], [[3, 4]]]\n"));

        let s = Tensor::from_values(&dev, &[0.5f32], Vec::<usize>::new()).unwrap();
        assert!(s.to_string().starts_with("0.5\nshape = [], rank = 0"));
    }
}
