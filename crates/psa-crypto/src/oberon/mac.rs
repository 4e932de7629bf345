// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::OberonDriver;
use crate::backend::mac::MacState;
use crate::driver::MacDriver;
use crate::operation::MacContext;
use crate::zeroize_utils::{secure_zero, verify_tag};
use psa_common::constants::{MAC_MAX_SIZE, MAC_MIN_TRUNCATED_SIZE};
use psa_common::{Algorithm, Direction, KeyAttributes, KeyType, PsaResult, Status};

/// Oberon MAC operation
pub struct OberonMac {
    state: MacState,
    direction: Direction,
    mac_length: usize,
}

impl OberonMac {
    fn setup(
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<Self> {
        let full = alg.full_length_mac();
        let expected_type = if full.is_hmac() {
            KeyType::HMAC
        } else if full == Algorithm::CMAC {
            KeyType::AES
        } else {
            return Err(Status::NotSupported);
        };
        if attributes.key_type() != expected_type {
            return Err(Status::NotSupported);
        }

        let state = MacState::for_algorithm(full, key)?;
        let full_length = state.output_length();
        let mac_length = match alg.mac_truncated_length() {
            0 => full_length,
            n if (MAC_MIN_TRUNCATED_SIZE..=full_length).contains(&n) => n,
            _ => return Err(Status::InvalidArgument),
        };

        Ok(Self {
            state,
            direction,
            mac_length,
        })
    }

    /// MAC length produced or expected
    #[must_use]
    pub const fn mac_length(&self) -> usize {
        self.mac_length
    }

    /// Absorb input
    pub fn update(&mut self, input: &[u8]) {
        self.state.update(input);
    }

    /// Write the (possibly truncated) MAC
    pub fn sign_finish(&mut self, mac: &mut [u8]) -> PsaResult<usize> {
        if self.direction != Direction::Encrypt {
            return Err(Status::BadState);
        }
        if mac.len() < self.mac_length {
            return Err(Status::BufferTooSmall);
        }
        let mut full = [0u8; MAC_MAX_SIZE];
        let result = self.state.finish(&mut full);
        if result.is_ok() {
            mac[..self.mac_length].copy_from_slice(&full[..self.mac_length]);
        }
        secure_zero(&mut full);
        result.map(|_| self.mac_length)
    }

    /// Compare against `expected` in constant time
    pub fn verify_finish(&mut self, expected: &[u8]) -> PsaResult<()> {
        if self.direction != Direction::Decrypt {
            return Err(Status::BadState);
        }
        if expected.len() != self.mac_length {
            return Err(Status::InvalidSignature);
        }
        let mut full = [0u8; MAC_MAX_SIZE];
        let result = self
            .state
            .finish(&mut full)
            .and_then(|_| verify_tag(&full[..self.mac_length], expected));
        secure_zero(&mut full);
        result
    }
}

impl MacDriver for OberonDriver {
    fn mac_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<MacContext> {
        OberonMac::setup(direction, attributes, key, alg).map(MacContext::Oberon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_must_match() {
        let driver = OberonDriver::new();
        let aes = KeyAttributes::new(KeyType::AES, 128);
        let hmac = Algorithm::hmac(Algorithm::SHA_256);
        assert!(matches!(
            driver.mac_setup(Direction::Encrypt, &aes, &[0u8; 16], hmac),
            Err(Status::NotSupported)
        ));
        let key = KeyAttributes::new(KeyType::HMAC, 128);
        assert!(matches!(
            driver.mac_setup(Direction::Encrypt, &key, &[0u8; 16], Algorithm::CMAC),
            Err(Status::NotSupported)
        ));
    }

    #[test]
    fn test_truncation_bounds() {
        let driver = OberonDriver::new();
        let key = KeyAttributes::new(KeyType::HMAC, 128);
        let hmac = Algorithm::hmac(Algorithm::SHA_256);
        for (length, ok) in [(3usize, false), (4, true), (32, true), (33, false)] {
            let result = driver.mac_setup(Direction::Encrypt, &key, &[1u8; 16], hmac.truncated_mac(length));
            assert_eq!(result.is_ok(), ok, "length {length}");
        }
    }

    #[test]
    fn test_sign_then_verify_truncated() {
        let driver = OberonDriver::new();
        let key = KeyAttributes::new(KeyType::HMAC, 128);
        let alg = Algorithm::hmac(Algorithm::SHA_256).truncated_mac(16);

        let mut tag = [0u8; 16];
        let n = driver.mac_compute(&key, &[7u8; 16], alg, b"message", &mut tag).unwrap();
        assert_eq!(n, 16);

        let mut ctx = driver.mac_setup(Direction::Decrypt, &key, &[7u8; 16], alg).unwrap();
        ctx.update(b"message").unwrap();
        assert_eq!(ctx.sign_finish(&mut [0u8; 16]), Err(Status::BadState));
        assert_eq!(ctx.verify_finish(&tag), Ok(()));
    }

    #[test]
    fn test_verify_length_mismatch() {
        let driver = OberonDriver::new();
        let key = KeyAttributes::new(KeyType::AES, 128);
        let mut ctx = driver
            .mac_setup(Direction::Decrypt, &key, &[0u8; 16], Algorithm::CMAC)
            .unwrap();
        assert_eq!(ctx.verify_finish(&[0u8; 15]), Err(Status::InvalidSignature));
    }
}
