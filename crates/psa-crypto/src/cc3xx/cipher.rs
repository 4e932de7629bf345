// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::{Cc3xxDriver, Cc3xxKey};
use crate::backend::modes::{CipherCore, CipherMode};
use crate::driver::CipherDriver;
use crate::operation::CipherContext;
use psa_common::{Algorithm, Direction, KeyAttributes, KeyType, PsaResult, Status};

/// CC3XX cipher operation
pub struct Cc3xxCipher {
    pub(crate) core: CipherCore<Cc3xxKey>,
}

impl CipherDriver for Cc3xxDriver {
    fn cipher_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<CipherContext> {
        if attributes.key_type() != KeyType::AES {
            return Err(Status::NotSupported);
        }
        let mode = match CipherMode::from_algorithm(alg) {
            Some(mode @ (CipherMode::Ecb | CipherMode::Cbc | CipherMode::CbcPkcs7 | CipherMode::Ctr)) => mode,
            _ => return Err(Status::NotSupported),
        };
        let key = self.bind_key(key)?;
        Ok(CipherContext::Cc3xx(Cc3xxCipher {
            core: CipherCore::new(key, mode, direction),
        }))
    }
}
