// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hardware Abstraction Layer for the PSA crypto drivers
//!
//! This crate exposes the accelerator blocks the crypto drivers may offload
//! to:
//!
//! - **AES engine**: single-block AES with a loadable key
//! - **Entropy source**: true random number generator feeding the DRBG
//!
//! # Architecture
//!
//! 1. **Traits**: Platform-agnostic interfaces (`traits` module)
//! 2. **Drivers**: Register-level implementations (`cc3xx`, feature-gated)
//!
//! # Security
//!
//! - Key registers are cleared when the engine is released
//! - Every busy wait is bounded and reports a timeout instead of hanging

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod traits;
pub mod error;

#[cfg(feature = "cc3xx")]
pub mod cc3xx;

// Re-export main traits
pub use traits::*;
pub use error::{HalError, HalResult};
