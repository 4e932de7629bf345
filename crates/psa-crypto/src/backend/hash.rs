// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Incremental hashing over the SHA-1, SHA-2 and SHA-3 families

use psa_common::{Algorithm, PsaResult, Status};
use sha1::Sha1;
use sha2::digest::Digest;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

/// Running digest for one hash algorithm
#[derive(Clone)]
pub enum HashState {
    /// SHA-1
    Sha1(Sha1),
    /// SHA-224
    Sha224(Sha224),
    /// SHA-256
    Sha256(Sha256),
    /// SHA-384
    Sha384(Sha384),
    /// SHA-512
    Sha512(Sha512),
    /// SHA3-224
    Sha3_224(Sha3_224),
    /// SHA3-256
    Sha3_256(Sha3_256),
    /// SHA3-384
    Sha3_384(Sha3_384),
    /// SHA3-512
    Sha3_512(Sha3_512),
}

macro_rules! each_state {
    ($self:expr, $h:ident => $body:expr) => {
        match $self {
            HashState::Sha1($h) => $body,
            HashState::Sha224($h) => $body,
            HashState::Sha256($h) => $body,
            HashState::Sha384($h) => $body,
            HashState::Sha512($h) => $body,
            HashState::Sha3_224($h) => $body,
            HashState::Sha3_256($h) => $body,
            HashState::Sha3_384($h) => $body,
            HashState::Sha3_512($h) => $body,
        }
    };
}

impl HashState {
    /// Start a digest
    ///
    /// Returns [`Status::NotSupported`] for identifiers outside the families above.
    pub fn new(alg: Algorithm) -> PsaResult<Self> {
        Ok(match alg {
            Algorithm::SHA_1 => Self::Sha1(Sha1::new()),
            Algorithm::SHA_224 => Self::Sha224(Sha224::new()),
            Algorithm::SHA_256 => Self::Sha256(Sha256::new()),
            Algorithm::SHA_384 => Self::Sha384(Sha384::new()),
            Algorithm::SHA_512 => Self::Sha512(Sha512::new()),
            Algorithm::SHA3_224 => Self::Sha3_224(Sha3_224::new()),
            Algorithm::SHA3_256 => Self::Sha3_256(Sha3_256::new()),
            Algorithm::SHA3_384 => Self::Sha3_384(Sha3_384::new()),
            Algorithm::SHA3_512 => Self::Sha3_512(Sha3_512::new()),
            _ => return Err(Status::NotSupported),
        })
    }

    /// Hash identifier
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        match self {
            Self::Sha1(_) => Algorithm::SHA_1,
            Self::Sha224(_) => Algorithm::SHA_224,
            Self::Sha256(_) => Algorithm::SHA_256,
            Self::Sha384(_) => Algorithm::SHA_384,
            Self::Sha512(_) => Algorithm::SHA_512,
            Self::Sha3_224(_) => Algorithm::SHA3_224,
            Self::Sha3_256(_) => Algorithm::SHA3_256,
            Self::Sha3_384(_) => Algorithm::SHA3_384,
            Self::Sha3_512(_) => Algorithm::SHA3_512,
        }
    }

    /// Digest length in bytes
    #[must_use]
    pub const fn output_length(&self) -> usize {
        self.algorithm().hash_length()
    }

    /// Absorb input
    pub fn update(&mut self, input: &[u8]) {
        each_state!(self, h => Digest::update(h, input));
    }

    /// Write the digest into `output[..output_length()]`
    ///
    /// The state is reset afterwards. A short `output` is rejected with
    /// [`Status::BufferTooSmall`] and leaves the state untouched.
    pub fn finish(&mut self, output: &mut [u8]) -> PsaResult<usize> {
        let length = self.output_length();
        if output.len() < length {
            return Err(Status::BufferTooSmall);
        }
        each_state!(self, h => output[..length].copy_from_slice(&Digest::finalize_reset(h)));
        Ok(length)
    }

    /// One-shot digest
    pub fn digest(alg: Algorithm, input: &[u8], output: &mut [u8]) -> PsaResult<usize> {
        let mut state = Self::new(alg)?;
        state.update(input);
        state.finish(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psa_common::constants::HASH_MAX_SIZE;

    #[test]
    fn test_sha256_abc() {
        let mut out = [0u8; 32];
        assert_eq!(HashState::digest(Algorithm::SHA_256, b"abc", &mut out), Ok(32));
        assert_eq!(
            out,
            [
                0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
                0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
                0xf2, 0x00, 0x15, 0xad
            ]
        );
    }

    #[test]
    fn test_split_updates_match() {
        let mut a = HashState::new(Algorithm::SHA3_256).unwrap();
        a.update(b"hello ");
        a.update(b"world");
        let mut one = [0u8; 32];
        let mut two = [0u8; 32];
        a.finish(&mut one).unwrap();
        HashState::digest(Algorithm::SHA3_256, b"hello world", &mut two).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn test_output_lengths() {
        for alg in [
            Algorithm::SHA_1,
            Algorithm::SHA_224,
            Algorithm::SHA_384,
            Algorithm::SHA_512,
            Algorithm::SHA3_224,
            Algorithm::SHA3_384,
            Algorithm::SHA3_512,
        ] {
            let mut out = [0u8; HASH_MAX_SIZE];
            assert_eq!(HashState::digest(alg, b"", &mut out), Ok(alg.hash_length()));
        }
    }

    #[test]
    fn test_short_output_and_unknown() {
        let mut out = [0u8; 31];
        assert_eq!(
            HashState::digest(Algorithm::SHA_256, b"abc", &mut out),
            Err(Status::BufferTooSmall)
        );
        assert!(matches!(HashState::new(Algorithm::CTR), Err(Status::NotSupported)));
    }
}
