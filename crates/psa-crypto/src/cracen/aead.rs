// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::{check_key_slot, CracenDriver};
use crate::backend::aead::{AeadCore, AeadMode};
use crate::backend::{ccm, AesKey, ChaChaKey, SoftKey};
use crate::driver::AeadDriver;
use crate::operation::AeadContext;
use psa_common::constants::{AEAD_DEFAULT_NONCE_SIZE, AEAD_TAG_MAX_SIZE};
use psa_common::{Algorithm, Direction, KeyAttributes, KeyType, PsaResult, Status};

/// CRACEN AEAD operation
pub struct CracenAead {
    pub(crate) core: AeadCore<SoftKey>,
}

impl CracenAead {
    fn setup(
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<Self> {
        check_key_slot(key)?;
        let tag_length = alg.tag_length();
        let mode = AeadMode::from_algorithm(alg).ok_or(Status::NotSupported)?;

        let soft = match (attributes.key_type(), mode) {
            (KeyType::AES, AeadMode::Ccm) if ccm::tag_length_valid(tag_length) => {
                SoftKey::Aes(AesKey::new(key)?)
            }
            (KeyType::AES, AeadMode::Gcm) if (4..=AEAD_TAG_MAX_SIZE).contains(&tag_length) => {
                SoftKey::Aes(AesKey::new(key)?)
            }
            (KeyType::AES, AeadMode::Ccm | AeadMode::Gcm) => return Err(Status::InvalidArgument),
            (KeyType::CHACHA20, AeadMode::ChaChaPoly) if tag_length == AEAD_TAG_MAX_SIZE => {
                SoftKey::ChaCha(ChaChaKey::new(key)?)
            }
            _ => return Err(Status::NotSupported),
        };
        Ok(Self {
            core: AeadCore::new(soft, mode, direction, tag_length),
        })
    }

    /// GCM and ChaCha20-Poly1305 take 12-byte nonces only
    pub fn set_nonce(&mut self, nonce: &[u8]) -> PsaResult<()> {
        let valid = match self.core.mode() {
            AeadMode::Ccm => ccm::nonce_length_valid(nonce.len()),
            AeadMode::Gcm | AeadMode::ChaChaPoly => nonce.len() == AEAD_DEFAULT_NONCE_SIZE,
        };
        if !valid {
            return Err(Status::InvalidArgument);
        }
        self.core.set_nonce(nonce)
    }
}

impl AeadDriver for CracenDriver {
    fn aead_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<AeadContext> {
        CracenAead::setup(direction, attributes, key, alg).map(AeadContext::Cracen)
    }
}
