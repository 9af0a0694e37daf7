// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tensor-rt demo` command: a short tour of the engine.

use device_runtime::{Device, DeviceConfig};
use tensor_core::Tensor;

fn section(title: &str) {
    println!();
    println!("  ── {title} {}", "─".repeat(50usize.saturating_sub(title.len())));
}

pub fn execute(config: DeviceConfig) -> anyhow::Result<()> {
    let device = Device::new(config)?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           tensor-rt · Demo                          ║");
    println!("╚══════════════════════════════════════════════════════╝");

    section("Broadcasting");
    let a = Tensor::from_values(&device, &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3])?;
    let row = Tensor::from_values(&device, &[10.0f32, 20.0, 30.0], [1, 3])?;
    println!("a =\n{a}\n");
    println!("row =\n{row}\n");
    println!("a + row =\n{}", (&a + &row)?);

    section("Transposed view");
    let a_t = a.transpose(0, 1)?;
    println!("a^T (no copy) =\n{a_t}");

    section("Matmul");
    let x = Tensor::from_values(&device, &[1.0f32, 2.0, 3.0, 4.0], [2, 2])?;
    let y = Tensor::from_values(&device, &[5.0f32, 6.0, 7.0, 8.0], [2, 2])?;
    println!("x @ y =\n{}\n", x.matmul(&y)?);
    println!("a @ a^T =\n{}", a.matmul(&a_t)?);

    section("ReLU and sum");
    let r = Tensor::from_values(&device, &[-1.0f32, 0.0, 2.0, -3.0], [4])?;
    println!("relu(r) =\n{}\n", r.relu()?);
    println!("relu'(r) =\n{}\n", r.relu_derivative()?);
    println!("sum(a) =\n{}", a.sum()?);

    section("Gradients of a * b");
    let mut p = Tensor::from_values(&device, &[1.0f32, 2.0, 3.0], [3])?;
    let mut q = Tensor::from_values(&device, &[4.0f32, 5.0, 6.0], [3])?;
    p.requires_gradients();
    q.requires_gradients();
    let product = (&p * &q)?;
    product.backward()?;
    println!("d(p*q)/dp =\n{}\n", p.gradients()?);
    println!("d(p*q)/dq =\n{}", q.gradients()?);

    section("Random");
    let n = Tensor::<f32>::random_normal(&device, 0.0, 1.0, [2, 4])?;
    println!("N(0, 1) =\n{n}");

    section("Device");
    println!("{}", device.metrics().summary());
    println!("{}", device.memory_stats().summary());
    Ok(())
}
