// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device memory budget and parsing.
//!
//! A [`DeviceBudget`] is the ceiling the pool enforces on live device
//! buffers. It parses human-readable strings so it can come straight from a
//! config file or the command line.

use crate::MemoryError;
use std::fmt;

const KB: usize = 1 << 10;
const MB: usize = 1 << 20;
const GB: usize = 1 << 30;

/// Accepted unit suffixes, longest first so `"MB"` is not read as `"B"`.
const UNITS: [(&str, usize); 7] = [
    ("GB", GB),
    ("MB", MB),
    ("KB", KB),
    ("G", GB),
    ("M", MB),
    ("K", KB),
    ("B", 1),
];

/// A hard ceiling on live device memory.
///
/// Parses a byte count with an optional binary suffix, case-insensitive:
/// `"64"`, `"64B"`, `"2048K"`, `"512M"`, `"512MB"`, `"1G"`.
///
/// ```
/// use device_memory::DeviceBudget;
///
/// let b = DeviceBudget::parse("1G").unwrap();
/// assert_eq!(b.as_mb(), 1024);
/// assert_eq!(b.to_string(), "1 GB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceBudget {
    bytes: usize,
}

impl DeviceBudget {
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    pub fn from_mb(mb: usize) -> Self {
        Self::from_bytes(mb * MB)
    }

    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Whole megabytes, truncated.
    pub fn as_mb(&self) -> usize {
        self.bytes / MB
    }

    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        let invalid = |why: &str| MemoryError::InvalidBudget(format!("'{s}': {why}"));

        let upper = s.trim().to_ascii_uppercase();
        let (digits, unit) = UNITS
            .iter()
            .find_map(|&(suffix, unit)| upper.strip_suffix(suffix).map(|d| (d, unit)))
            .unwrap_or((upper.as_str(), 1));

        let count: usize = digits
            .trim()
            .parse()
            .map_err(|_| invalid("expected a number with an optional K, M or G suffix"))?;
        match count.checked_mul(unit) {
            None => Err(invalid("overflows usize")),
            Some(0) => Err(invalid("budget must be positive")),
            Some(bytes) => Ok(Self::from_bytes(bytes)),
        }
    }
}

impl fmt::Display for DeviceBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exact = [(GB, "GB"), (MB, "MB"), (KB, "KB")]
            .into_iter()
            .find(|&(unit, _)| self.bytes >= unit && self.bytes % unit == 0);
        match exact {
            Some((unit, label)) => write!(f, "{} {label}", self.bytes / unit),
            None => write!(f, "{} B", self.bytes),
        }
    }
}
