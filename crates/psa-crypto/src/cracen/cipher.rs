// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::{check_key_slot, CracenDriver};
use crate::backend::modes::{CipherCore, CipherMode};
use crate::backend::{AesKey, ChaChaKey, SoftKey};
use crate::driver::CipherDriver;
use crate::operation::CipherContext;
use psa_common::{Algorithm, Direction, KeyAttributes, KeyType, PsaResult, Status};

/// CRACEN cipher operation
pub struct CracenCipher {
    pub(crate) core: CipherCore<SoftKey>,
}

impl CracenCipher {
    fn setup(
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<Self> {
        check_key_slot(key)?;
        let mode = CipherMode::from_algorithm(alg).ok_or(Status::NotSupported)?;
        let soft = match (attributes.key_type(), mode) {
            (KeyType::CHACHA20, CipherMode::Stream) => SoftKey::ChaCha(ChaChaKey::new(key)?),
            (KeyType::AES, CipherMode::Ecb | CipherMode::Cbc | CipherMode::CbcPkcs7 | CipherMode::Ctr) => {
                SoftKey::Aes(AesKey::new(key)?)
            }
            _ => return Err(Status::NotSupported),
        };
        Ok(Self {
            core: CipherCore::new(soft, mode, direction),
        })
    }
}

impl CipherDriver for CracenDriver {
    fn cipher_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<CipherContext> {
        CracenCipher::setup(direction, attributes, key, alg).map(CipherContext::Cracen)
    }
}
