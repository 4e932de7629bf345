// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Oberon software driver
//!
//! Full software coverage for keys in local storage: AEAD, ciphers,
//! hashes, MACs, key derivation and the HMAC_DRBG behind the random
//! context. Every key is copied into the operation at setup.
//!
//! Signatures, ECDH and key management cover P-256, Curve25519 and
//! Edwards25519. ECDSA message signing is not offered here.

mod aead;
mod asym;
mod cipher;
pub mod drbg;
mod hash;
mod kdf;
mod mac;

pub use aead::OberonAead;
pub use cipher::OberonCipher;
pub use hash::OberonHash;
pub use kdf::OberonKeyDerivation;
pub use mac::OberonMac;

use crate::driver::Driver;
use psa_common::{DriverId, KeyLocation};

/// Oberon software driver
#[derive(Debug, Clone, Copy, Default)]
pub struct OberonDriver;

impl OberonDriver {
    /// Create the driver
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for OberonDriver {
    fn id(&self) -> DriverId {
        DriverId::Oberon
    }

    fn supports_location(&self, location: KeyLocation) -> bool {
        location == KeyLocation::LOCAL_STORAGE
    }
}
