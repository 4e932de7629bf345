// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::{check_key_slot, hash, CracenDriver};
use crate::backend::{ecc, keys};
use crate::driver::{KeyAgreementDriver, KeyManagementDriver, SignatureDriver};
use psa_common::{Algorithm, KeyAttributes, KeyLocation, PsaResult, Status};
use rand_core::RngCore;

/// Message signing hashes on the CRACEN hash engine; ECDSA over other
/// hashes is left to the wrapper.
fn message_hash_supported(alg: Algorithm) -> bool {
    alg.is_pure_eddsa() || (alg.is_hash_and_sign() && hash::SUPPORTED.contains(&alg.get_hash()))
}

impl SignatureDriver for CracenDriver {
    fn sign_hash(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        hash: &[u8],
        signature: &mut [u8],
    ) -> PsaResult<usize> {
        ecc::sign_hash(attributes, key, alg, hash, signature)
    }

    fn verify_hash(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        hash: &[u8],
        signature: &[u8],
    ) -> PsaResult<()> {
        ecc::verify_hash(attributes, key, alg, hash, signature)
    }

    fn sign_message(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        input: &[u8],
        signature: &mut [u8],
    ) -> PsaResult<usize> {
        if !message_hash_supported(alg) {
            return Err(Status::NotSupported);
        }
        ecc::sign_message(attributes, key, alg, input, signature)
    }

    fn verify_message(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        input: &[u8],
        signature: &[u8],
    ) -> PsaResult<()> {
        if !message_hash_supported(alg) {
            return Err(Status::NotSupported);
        }
        ecc::verify_message(attributes, key, alg, input, signature)
    }
}

impl KeyAgreementDriver for CracenDriver {
    fn key_agreement(
        &self,
        attributes: &KeyAttributes,
        private_key: &[u8],
        alg: Algorithm,
        peer_key: &[u8],
        output: &mut [u8],
    ) -> PsaResult<usize> {
        ecc::key_agreement(attributes, private_key, alg, peer_key, output)
    }
}

impl KeyManagementDriver for CracenDriver {
    /// KMU slots take at most 32 bytes, which rules out P-256 public keys
    fn import_key(
        &self,
        attributes: &KeyAttributes,
        data: &[u8],
        key_buffer: &mut [u8],
    ) -> PsaResult<(usize, usize)> {
        if attributes.location() == KeyLocation::CRACEN_KMU {
            check_key_slot(data)?;
        }
        keys::import(attributes, data, key_buffer)
    }

    fn generate_key(
        &self,
        attributes: &KeyAttributes,
        rng: &mut dyn RngCore,
        key_buffer: &mut [u8],
    ) -> PsaResult<usize> {
        keys::generate(attributes, rng, key_buffer)
    }

    fn export_public_key(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        data: &mut [u8],
    ) -> PsaResult<usize> {
        keys::export_public(attributes, key, data)
    }

    fn export_key(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        data: &mut [u8],
    ) -> PsaResult<usize> {
        if attributes.location() == KeyLocation::CRACEN_KMU {
            return Err(Status::NotPermitted);
        }
        let out = data.get_mut(..key.len()).ok_or(Status::BufferTooSmall)?;
        out.copy_from_slice(key);
        Ok(key.len())
    }
}
