// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::OberonDriver;
use crate::backend::aead::{AeadCore, AeadMode};
use crate::backend::{ccm, AesKey, ChaChaKey, SoftKey};
use crate::driver::AeadDriver;
use crate::operation::AeadContext;
use psa_common::constants::AEAD_TAG_MAX_SIZE;
use psa_common::{Algorithm, Direction, KeyAttributes, KeyType, PsaResult, Status};

/// Oberon AEAD operation
pub struct OberonAead {
    pub(crate) core: AeadCore<SoftKey>,
}

impl OberonAead {
    fn setup(
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<Self> {
        let tag_length = alg.tag_length();
        let (soft, mode) = match attributes.key_type() {
            KeyType::AES => {
                let aes = AesKey::new(key)?;
                let mode = match AeadMode::from_algorithm(alg) {
                    Some(AeadMode::Ccm) => {
                        if !ccm::tag_length_valid(tag_length) {
                            return Err(Status::InvalidArgument);
                        }
                        AeadMode::Ccm
                    }
                    Some(AeadMode::Gcm) => {
                        if !(4..=AEAD_TAG_MAX_SIZE).contains(&tag_length) {
                            return Err(Status::InvalidArgument);
                        }
                        AeadMode::Gcm
                    }
                    _ => return Err(Status::NotSupported),
                };
                (SoftKey::Aes(aes), mode)
            }
            KeyType::CHACHA20 => {
                if AeadMode::from_algorithm(alg) != Some(AeadMode::ChaChaPoly) || tag_length != 16 {
                    return Err(Status::NotSupported);
                }
                (SoftKey::ChaCha(ChaChaKey::new(key)?), AeadMode::ChaChaPoly)
            }
            _ => return Err(Status::NotSupported),
        };
        Ok(Self {
            core: AeadCore::new(soft, mode, direction, tag_length),
        })
    }

    /// Check the nonce length for the mode, then set it
    pub fn set_nonce(&mut self, nonce: &[u8]) -> PsaResult<()> {
        let valid = match self.core.mode() {
            AeadMode::Ccm => ccm::nonce_length_valid(nonce.len()),
            AeadMode::Gcm => !nonce.is_empty(),
            AeadMode::ChaChaPoly => nonce.len() == 8 || nonce.len() == 12,
        };
        if !valid {
            return Err(Status::InvalidArgument);
        }
        self.core.set_nonce(nonce)
    }
}

impl AeadDriver for OberonDriver {
    fn aead_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<AeadContext> {
        OberonAead::setup(direction, attributes, key, alg).map(AeadContext::Oberon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aes(bits: usize) -> KeyAttributes {
        KeyAttributes::new(KeyType::AES, bits)
    }

    #[test]
    fn test_key_length_checked_before_mode() {
        let driver = OberonDriver::new();
        let result = driver.aead_setup(Direction::Encrypt, &aes(160), &[0u8; 20], Algorithm::CTR);
        assert!(matches!(result, Err(Status::InvalidArgument)));
        let result = driver.aead_setup(Direction::Encrypt, &aes(128), &[0u8; 16], Algorithm::CTR);
        assert!(matches!(result, Err(Status::NotSupported)));
    }

    #[test]
    fn test_ccm_tag_lengths() {
        let driver = OberonDriver::new();
        for tag in [4usize, 6, 8, 10, 12, 14, 16] {
            let alg = Algorithm::CCM.with_shortened_tag(tag);
            assert!(driver.aead_setup(Direction::Encrypt, &aes(128), &[0u8; 16], alg).is_ok());
        }
        let alg = Algorithm::CCM.with_shortened_tag(5);
        assert!(matches!(
            driver.aead_setup(Direction::Encrypt, &aes(128), &[0u8; 16], alg),
            Err(Status::InvalidArgument)
        ));
    }

    #[test]
    fn test_nonce_ranges() {
        let driver = OberonDriver::new();
        let mut ctx = driver
            .aead_setup(Direction::Encrypt, &aes(256), &[1u8; 32], Algorithm::CCM)
            .unwrap();
        assert_eq!(ctx.set_nonce(&[0u8; 6]), Err(Status::InvalidArgument));
        assert_eq!(ctx.set_nonce(&[0u8; 14]), Err(Status::InvalidArgument));
        assert_eq!(ctx.set_nonce(&[0u8; 13]), Ok(()));

        let mut ctx = driver
            .aead_setup(Direction::Encrypt, &aes(128), &[1u8; 16], Algorithm::GCM)
            .unwrap();
        assert_eq!(ctx.set_nonce(&[]), Err(Status::InvalidArgument));
        assert_eq!(ctx.set_nonce(&[0u8; 1]), Ok(()));

        let chacha = KeyAttributes::new(KeyType::CHACHA20, 256);
        let mut ctx = driver
            .aead_setup(Direction::Encrypt, &chacha, &[1u8; 32], Algorithm::CHACHA20_POLY1305)
            .unwrap();
        assert_eq!(ctx.set_nonce(&[0u8; 10]), Err(Status::InvalidArgument));
        assert_eq!(ctx.set_nonce(&[0u8; 8]), Ok(()));
    }

    #[test]
    fn test_key_type_mismatch_not_supported() {
        let driver = OberonDriver::new();
        let chacha = KeyAttributes::new(KeyType::CHACHA20, 256);
        assert!(matches!(
            driver.aead_setup(Direction::Encrypt, &chacha, &[0u8; 32], Algorithm::GCM),
            Err(Status::NotSupported)
        ));
        let hmac = KeyAttributes::new(KeyType::HMAC, 128);
        assert!(matches!(
            driver.aead_setup(Direction::Encrypt, &hmac, &[0u8; 16], Algorithm::GCM),
            Err(Status::NotSupported)
        ));
    }
}
