// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Incremental HMAC and AES-CMAC
//!
//! [`MacState`] is also the pseudo-random function under every key
//! derivation algorithm, so it is cheap to clone a keyed state and run it
//! again on new input.

use aes::{Aes128, Aes192, Aes256};
use cmac::Cmac;
use hmac::{Hmac, Mac};
use psa_common::constants::AES_BLOCK_SIZE;
use psa_common::{Algorithm, PsaResult, Status};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

/// Keyed MAC state
#[derive(Clone)]
pub enum MacState {
    /// HMAC-SHA-1
    HmacSha1(Hmac<Sha1>),
    /// HMAC-SHA-224
    HmacSha224(Hmac<Sha224>),
    /// HMAC-SHA-256
    HmacSha256(Hmac<Sha256>),
    /// HMAC-SHA-384
    HmacSha384(Hmac<Sha384>),
    /// HMAC-SHA-512
    HmacSha512(Hmac<Sha512>),
    /// HMAC-SHA3-224
    HmacSha3_224(Hmac<Sha3_224>),
    /// HMAC-SHA3-256
    HmacSha3_256(Hmac<Sha3_256>),
    /// HMAC-SHA3-384
    HmacSha3_384(Hmac<Sha3_384>),
    /// HMAC-SHA3-512
    HmacSha3_512(Hmac<Sha3_512>),
    /// AES-128-CMAC
    Cmac128(Cmac<Aes128>),
    /// AES-192-CMAC
    Cmac192(Cmac<Aes192>),
    /// AES-256-CMAC
    Cmac256(Cmac<Aes256>),
}

macro_rules! each_mac {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            MacState::HmacSha1($m) => $body,
            MacState::HmacSha224($m) => $body,
            MacState::HmacSha256($m) => $body,
            MacState::HmacSha384($m) => $body,
            MacState::HmacSha512($m) => $body,
            MacState::HmacSha3_224($m) => $body,
            MacState::HmacSha3_256($m) => $body,
            MacState::HmacSha3_384($m) => $body,
            MacState::HmacSha3_512($m) => $body,
            MacState::Cmac128($m) => $body,
            MacState::Cmac192($m) => $body,
            MacState::Cmac256($m) => $body,
        }
    };
}

fn keyed<M: Mac + hmac::digest::KeyInit>(key: &[u8]) -> PsaResult<M> {
    <M as Mac>::new_from_slice(key).map_err(|_| Status::InvalidArgument)
}

impl MacState {
    /// HMAC over `hash`
    pub fn hmac(hash: Algorithm, key: &[u8]) -> PsaResult<Self> {
        Ok(match hash {
            Algorithm::SHA_1 => Self::HmacSha1(keyed(key)?),
            Algorithm::SHA_224 => Self::HmacSha224(keyed(key)?),
            Algorithm::SHA_256 => Self::HmacSha256(keyed(key)?),
            Algorithm::SHA_384 => Self::HmacSha384(keyed(key)?),
            Algorithm::SHA_512 => Self::HmacSha512(keyed(key)?),
            Algorithm::SHA3_224 => Self::HmacSha3_224(keyed(key)?),
            Algorithm::SHA3_256 => Self::HmacSha3_256(keyed(key)?),
            Algorithm::SHA3_384 => Self::HmacSha3_384(keyed(key)?),
            Algorithm::SHA3_512 => Self::HmacSha3_512(keyed(key)?),
            _ => return Err(Status::NotSupported),
        })
    }

    /// AES-CMAC
    ///
    /// Returns [`Status::InvalidArgument`] unless the key is 16, 24 or 32 bytes.
    pub fn cmac(key: &[u8]) -> PsaResult<Self> {
        Ok(match key.len() {
            16 => Self::Cmac128(keyed(key)?),
            24 => Self::Cmac192(keyed(key)?),
            32 => Self::Cmac256(keyed(key)?),
            _ => return Err(Status::InvalidArgument),
        })
    }

    /// Keyed state for a full-length or truncated MAC identifier
    pub fn for_algorithm(alg: Algorithm, key: &[u8]) -> PsaResult<Self> {
        let full = alg.full_length_mac();
        if full.is_hmac() {
            Self::hmac(full.get_hash(), key)
        } else if full == Algorithm::CMAC {
            Self::cmac(key)
        } else {
            Err(Status::NotSupported)
        }
    }

    /// Untruncated MAC length in bytes
    #[must_use]
    pub const fn output_length(&self) -> usize {
        match self {
            Self::HmacSha1(_) => 20,
            Self::HmacSha224(_) | Self::HmacSha3_224(_) => 28,
            Self::HmacSha256(_) | Self::HmacSha3_256(_) => 32,
            Self::HmacSha384(_) | Self::HmacSha3_384(_) => 48,
            Self::HmacSha512(_) | Self::HmacSha3_512(_) => 64,
            Self::Cmac128(_) | Self::Cmac192(_) | Self::Cmac256(_) => AES_BLOCK_SIZE,
        }
    }

    /// Absorb input
    pub fn update(&mut self, input: &[u8]) {
        each_mac!(self, m => Mac::update(m, input));
    }

    /// Write the full MAC into `output[..output_length()]` and rekey for reuse
    pub fn finish(&mut self, output: &mut [u8]) -> PsaResult<usize> {
        let length = self.output_length();
        if output.len() < length {
            return Err(Status::BufferTooSmall);
        }
        each_mac!(self, m => output[..length].copy_from_slice(&m.finalize_reset().into_bytes()));
        Ok(length)
    }
}
