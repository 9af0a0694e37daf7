// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-rt
//!
//! Command-line interface for the strided tensor engine.
//!
//! ## Usage
//! ```bash
//! # Walk through broadcasting, views, matmul and gradients
//! tensor-rt demo
//!
//! # Time kernels over a sweep of matrix sizes
//! tensor-rt bench --sizes 64,128,256
//!
//! # Show the device configuration
//! tensor-rt --config device.toml info
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tensor-rt",
    about = "Strided tensor engine with broadcast kernels and multiply autograd",
    version,
    author
)]
struct Cli {
    /// Path to a TOML device configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a short tour of the tensor operations.
    Demo,

    /// Benchmark matmul, broadcast add and sum across matrix sizes.
    Bench {
        /// Comma-separated square matrix sizes (e.g., "64,128,256").
        #[arg(long, default_value = "64,128,256")]
        sizes: String,

        /// Timed repetitions per operation.
        #[arg(long, default_value_t = 5)]
        iterations: usize,
    },

    /// Display the device configuration and memory budget.
    Info,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Demo => commands::demo::execute(config),
        Commands::Bench { sizes, iterations } => commands::bench::execute(config, &sizes, iterations),
        Commands::Info => commands::info::execute(config),
    }
}
