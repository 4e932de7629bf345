// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::{Cc3xxDriver, Cc3xxKey};
use crate::backend::aead::{AeadCore, AeadMode};
use crate::backend::ccm;
use crate::driver::AeadDriver;
use crate::operation::AeadContext;
use psa_common::{Algorithm, Direction, KeyAttributes, KeyType, PsaResult, Status};

/// CC3XX AEAD operation (AES-CCM)
pub struct Cc3xxAead {
    pub(crate) core: AeadCore<Cc3xxKey>,
}

impl Cc3xxAead {
    /// CCM nonces are 7 to 13 bytes
    pub fn set_nonce(&mut self, nonce: &[u8]) -> PsaResult<()> {
        if !ccm::nonce_length_valid(nonce.len()) {
            return Err(Status::InvalidArgument);
        }
        self.core.set_nonce(nonce)
    }
}

impl AeadDriver for Cc3xxDriver {
    fn aead_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<AeadContext> {
        if attributes.key_type() != KeyType::AES
            || AeadMode::from_algorithm(alg) != Some(AeadMode::Ccm)
        {
            return Err(Status::NotSupported);
        }
        let tag_length = alg.tag_length();
        if !ccm::tag_length_valid(tag_length) {
            return Err(Status::InvalidArgument);
        }
        let key = self.bind_key(key)?;
        Ok(AeadContext::Cc3xx(Cc3xxAead {
            core: AeadCore::new(key, AeadMode::Ccm, direction, tag_length),
        }))
    }
}
