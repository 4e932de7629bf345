// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::CracenDriver;
use crate::backend::hash::HashState;
use crate::driver::HashDriver;
use crate::operation::HashContext;
use psa_common::{Algorithm, PsaResult, Status};

/// CRACEN hash operation (SHA-1 and SHA-2)
#[derive(Clone)]
pub struct CracenHash {
    pub(crate) state: HashState,
}

pub(super) const SUPPORTED: [Algorithm; 5] = [
    Algorithm::SHA_1,
    Algorithm::SHA_224,
    Algorithm::SHA_256,
    Algorithm::SHA_384,
    Algorithm::SHA_512,
];

impl HashDriver for CracenDriver {
    fn hash_setup(&self, alg: Algorithm) -> PsaResult<HashContext> {
        if !SUPPORTED.contains(&alg) {
            return Err(Status::NotSupported);
        }
        Ok(HashContext::Cracen(CracenHash {
            state: HashState::new(alg)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha3_not_supported() {
        let driver = CracenDriver::new();
        assert!(matches!(driver.hash_setup(Algorithm::SHA3_256), Err(Status::NotSupported)));
        let mut out = [0u8; 32];
        assert_eq!(driver.hash_compute(Algorithm::SHA_256, b"abc", &mut out), Ok(32));
        assert_eq!(out[..4], [0xba, 0x78, 0x16, 0xbf]);
    }
}
