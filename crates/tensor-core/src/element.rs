// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scalar element types a tensor can store.

use crate::DType;
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use rand_distr::StandardNormal;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A scalar that kernels can compute with.
///
/// Implemented for `f32` and `f64`.
pub trait Element:
    Copy
    + Default
    + PartialOrd
    + Send
    + Sync
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + SampleUniform
    + 'static
{
    /// The runtime tag for this type.
    const DTYPE: DType;
    const ZERO: Self;
    const ONE: Self;

    fn is_finite(self) -> bool;

    /// Draws one sample from `N(mean, std_dev²)`.
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: Self, std_dev: Self) -> Self;
}

macro_rules! impl_element {
    ($ty:ty, $dtype:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            fn is_finite(self) -> bool {
                <$ty>::is_finite(self)
            }

            fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: Self, std_dev: Self) -> Self {
                let z: $ty = rng.sample(StandardNormal);
                mean + std_dev * z
            }
        }
    };
}

impl_element!(f32, DType::F32);
impl_element!(f64, DType::F64);
