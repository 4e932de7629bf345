// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Common vocabulary for the PSA Crypto driver layer
//!
//! This crate provides the status taxonomy, the bit-packed algorithm
//! identifier, key attributes, driver configuration and the diagnostic log
//! shared by the hardware abstraction and the crypto drivers.
//!
//! # Features
//!
//! - `std`: Enable standard library support (disabled by default for embedded)
//! - `defmt`: Enable defmt formatting for status codes and identifiers
//!
//! # Security
//!
//! No heap allocations are performed - all buffers use fixed-size arrays or
//! heapless collections.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "std")]
extern crate std;

pub mod types;
pub mod errors;
pub mod config;
pub mod log;
pub mod constants;

// Re-export commonly used items
pub use errors::{PsaResult, Status};
pub use types::*;
pub use config::{DriverConfig, DriverId};
pub use log::{LogBuffer, LogLevel};
