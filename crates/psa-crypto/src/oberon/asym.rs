// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::OberonDriver;
use crate::backend::{ecc, keys};
use crate::driver::{KeyAgreementDriver, KeyManagementDriver, SignatureDriver};
use psa_common::{Algorithm, KeyAttributes, PsaResult, Status};
use rand_core::RngCore;

// ECDSA messages are left to the wrapper's hash-then-sign path.
impl SignatureDriver for OberonDriver {
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
        if !alg.is_pure_eddsa() {
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
        if !alg.is_pure_eddsa() {
            return Err(Status::NotSupported);
        }
        ecc::verify_message(attributes, key, alg, input, signature)
    }
}

impl KeyAgreementDriver for OberonDriver {
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

impl KeyManagementDriver for OberonDriver {
    fn import_key(
        &self,
        attributes: &KeyAttributes,
        data: &[u8],
        key_buffer: &mut [u8],
    ) -> PsaResult<(usize, usize)> {
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
}
