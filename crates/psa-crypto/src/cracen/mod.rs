// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! CRACEN driver (software emulation)
//!
//! Owns the CRACEN and CRACEN_KMU key locations and serves as the last
//! software fallback for local-storage keys and hashes. Symmetric key
//! buffers must fit the 32-byte key slot, and keys in KMU slots are never
//! exported.

mod aead;
mod asym;
mod cipher;
mod hash;

pub use aead::CracenAead;
pub use cipher::CracenCipher;
pub use hash::CracenHash;

use crate::driver::Driver;
use psa_common::constants::MAX_SYMMETRIC_KEY_SIZE;
use psa_common::{DriverId, KeyLocation, PsaResult, Status};

/// CRACEN driver
#[derive(Debug, Clone, Copy, Default)]
pub struct CracenDriver;

impl CracenDriver {
    /// Create the driver
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for CracenDriver {
    fn id(&self) -> DriverId {
        DriverId::Cracen
    }

    fn supports_location(&self, location: KeyLocation) -> bool {
        location == KeyLocation::LOCAL_STORAGE
            || location == KeyLocation::CRACEN
            || location == KeyLocation::CRACEN_KMU
    }
}

/// Key slot check done before any algorithm lookup
fn check_key_slot(key: &[u8]) -> PsaResult<()> {
    if key.len() > MAX_SYMMETRIC_KEY_SIZE {
        return Err(Status::InvalidArgument);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations() {
        let driver = CracenDriver::new();
        assert!(driver.supports_location(KeyLocation::LOCAL_STORAGE));
        assert!(driver.supports_location(KeyLocation::CRACEN));
        assert!(driver.supports_location(KeyLocation::CRACEN_KMU));
        assert!(!driver.supports_location(KeyLocation::from_raw(0x12_3400)));
        assert_eq!(driver.id(), DriverId::Cracen);
    }

    #[test]
    fn test_key_slot() {
        assert!(check_key_slot(&[0u8; 32]).is_ok());
        assert_eq!(check_key_slot(&[0u8; 33]), Err(Status::InvalidArgument));
    }
}
