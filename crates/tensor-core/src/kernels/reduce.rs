// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sum reduction.
//!
//! A segmented tree: each task of the first pass sums one block-sized
//! segment of the input (read through the input's strides) into a partial
//! buffer, then each following pass sums segments of the previous partials,
//! until a single value is left.
//!
//! ```text
//! n = 1000, block = 256
//! pass 0: 1000 elements ──▶ 4 partials
//! pass 1:    4 partials ──▶ 1 value
//! ```

use super::decode_offset;
use crate::{Element, Layout};
use device_memory::{DeviceBuffer, MemoryError};
use device_runtime::Device;

/// Sums every logical element of `input` into a one-element device buffer.
pub(crate) fn sum<T: Element>(
    device: &Device,
    input: &[T],
    layout: &Layout,
) -> Result<DeviceBuffer<T>, MemoryError> {
    let segment = device.block_size();
    let n = layout.num_elements();
    let out_strides = layout.shape().strides();
    let strides = layout.strides();

    let mut partials = device.allocate::<T>(n.div_ceil(segment))?;
    device.launch("sum", partials.as_mut_slice(), |task| {
        let start = task * segment;
        let end = (start + segment).min(n);
        (start..end).fold(T::ZERO, |acc, i| {
            acc + input[decode_offset(i, &out_strides, strides)]
        })
    });

    while partials.len() > 1 {
        let len = partials.len();
        let mut next = device.allocate::<T>(len.div_ceil(segment))?;
        let src = partials.as_slice();
        device.launch("sum", next.as_mut_slice(), |task| {
            let start = task * segment;
            let end = (start + segment).min(len);
            src[start..end].iter().fold(T::ZERO, |acc, &x| acc + x)
        });
        partials = next;
    }

    Ok(partials)
}
