// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Driver contracts
//!
//! Each driver implements one trait per operation family it offers. A setup
//! call either returns a live context owned by that driver or
//! [`Status::NotSupported`], which is the only status the dispatch wrapper
//! treats as "try the next driver". Later multi-part calls go straight to
//! the context returned by setup.
//!
//! Signature, key agreement and key management calls are single-shot and
//! keep no context.

use crate::backend::modes::{pkcs7_padded_length, CipherMode};
use crate::operation::{AeadContext, CipherContext, HashContext, KeyDerivationContext, MacContext};
use crate::zeroize_utils::{reset_in_place, secure_zero};
use psa_common::constants::AES_BLOCK_SIZE;
use psa_common::{Algorithm, Direction, DriverId, KeyAttributes, KeyLocation, PsaResult, Status};
use rand_core::RngCore;

/// Identity shared by all driver families
pub trait Driver {
    /// Driver id recorded in operations set up by this driver
    fn id(&self) -> DriverId;

    /// Check if keys stored at `location` are handled by this driver
    fn supports_location(&self, location: KeyLocation) -> bool;
}

/// Authenticated encryption
pub trait AeadDriver: Driver {
    /// Validate the key and algorithm and start a multi-part operation
    fn aead_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<AeadContext>;

    /// One-shot encrypt; `ciphertext` receives the payload followed by the tag
    #[allow(clippy::too_many_arguments)]
    fn aead_encrypt(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        nonce: &[u8],
        additional_data: &[u8],
        plaintext: &[u8],
        ciphertext: &mut [u8],
    ) -> PsaResult<usize> {
        let mut ctx = self.aead_setup(Direction::Encrypt, attributes, key, alg)?;
        let result = aead_seal(&mut ctx, nonce, additional_data, plaintext, ciphertext);
        reset_in_place(&mut ctx, AeadContext::None);
        result
    }

    /// One-shot decrypt of payload-then-tag `ciphertext`
    #[allow(clippy::too_many_arguments)]
    fn aead_decrypt(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        nonce: &[u8],
        additional_data: &[u8],
        ciphertext: &[u8],
        plaintext: &mut [u8],
    ) -> PsaResult<usize> {
        let mut ctx = self.aead_setup(Direction::Decrypt, attributes, key, alg)?;
        let result = aead_open(&mut ctx, nonce, additional_data, ciphertext, plaintext);
        reset_in_place(&mut ctx, AeadContext::None);
        result
    }
}

fn aead_seal(
    ctx: &mut AeadContext,
    nonce: &[u8],
    additional_data: &[u8],
    plaintext: &[u8],
    ciphertext: &mut [u8],
) -> PsaResult<usize> {
    let tag_length = ctx.tag_length();
    let total = plaintext
        .len()
        .checked_add(tag_length)
        .ok_or(Status::InvalidArgument)?;
    if ciphertext.len() < total {
        return Err(Status::BufferTooSmall);
    }

    ctx.set_lengths(additional_data.len(), plaintext.len())?;
    ctx.set_nonce(nonce)?;
    ctx.update_ad(additional_data)?;
    let (body, tag) = ciphertext.split_at_mut(plaintext.len());
    let written = ctx.update(plaintext, body)?;
    let (_, tag_written) = ctx.finish(&mut [], tag)?;
    Ok(written + tag_written)
}

fn aead_open(
    ctx: &mut AeadContext,
    nonce: &[u8],
    additional_data: &[u8],
    ciphertext: &[u8],
    plaintext: &mut [u8],
) -> PsaResult<usize> {
    let tag_length = ctx.tag_length();
    let payload_length = ciphertext
        .len()
        .checked_sub(tag_length)
        .ok_or(Status::InvalidArgument)?;
    if plaintext.len() < payload_length {
        return Err(Status::BufferTooSmall);
    }

    let (body, tag) = ciphertext.split_at(payload_length);
    ctx.set_lengths(additional_data.len(), payload_length)?;
    ctx.set_nonce(nonce)?;
    ctx.update_ad(additional_data)?;
    let written = ctx.update(body, plaintext)?;
    if let Err(e) = ctx.verify(&mut [], tag) {
        secure_zero(&mut plaintext[..written]);
        return Err(e);
    }
    Ok(written)
}

/// Unauthenticated symmetric ciphers
pub trait CipherDriver: Driver {
    /// Validate the key and algorithm and start a multi-part operation
    fn cipher_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<CipherContext>;

    /// One-shot encrypt with a caller-supplied IV; writes ciphertext only
    fn cipher_encrypt(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        iv: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> PsaResult<usize> {
        let mut ctx = self.cipher_setup(Direction::Encrypt, attributes, key, alg)?;
        let result = cipher_run(&mut ctx, Direction::Encrypt, iv, input, output);
        reset_in_place(&mut ctx, CipherContext::None);
        result
    }

    /// One-shot decrypt of IV-prefixed `input`
    fn cipher_decrypt(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        input: &[u8],
        output: &mut [u8],
    ) -> PsaResult<usize> {
        let mut ctx = self.cipher_setup(Direction::Decrypt, attributes, key, alg)?;
        let iv_length = ctx.mode().map_or(0, |m| m.iv_length());
        let result = if input.len() < iv_length {
            Err(Status::InvalidArgument)
        } else {
            let (iv, payload) = input.split_at(iv_length);
            cipher_run(&mut ctx, Direction::Decrypt, iv, payload, output)
        };
        reset_in_place(&mut ctx, CipherContext::None);
        result
    }
}

fn cipher_run(
    ctx: &mut CipherContext,
    direction: Direction,
    iv: &[u8],
    input: &[u8],
    output: &mut [u8],
) -> PsaResult<usize> {
    let mode = ctx.mode().ok_or(Status::BadState)?;
    let required = match (mode, direction) {
        (CipherMode::CbcPkcs7, Direction::Encrypt) => pkcs7_padded_length(input.len()),
        (CipherMode::CbcPkcs7, Direction::Decrypt) => {
            if input.is_empty() || input.len() % AES_BLOCK_SIZE != 0 {
                return Err(Status::InvalidArgument);
            }
            input.len()
        }
        (CipherMode::Ecb | CipherMode::Cbc, _) => {
            if input.len() % AES_BLOCK_SIZE != 0 {
                return Err(Status::InvalidArgument);
            }
            input.len()
        }
        _ => input.len(),
    };
    if output.len() < required {
        return Err(Status::BufferTooSmall);
    }

    if mode.iv_length() > 0 {
        ctx.set_iv(iv)?;
    }
    let written = ctx.update(input, output)?;
    let tail = ctx.finish(&mut output[written..])?;
    Ok(written + tail)
}

/// Message digests
pub trait HashDriver: Driver {
    /// Start a digest
    fn hash_setup(&self, alg: Algorithm) -> PsaResult<HashContext>;

    /// One-shot digest
    fn hash_compute(&self, alg: Algorithm, input: &[u8], hash: &mut [u8]) -> PsaResult<usize> {
        let mut ctx = self.hash_setup(alg)?;
        let result = ctx.update(input).and_then(|()| ctx.finish(hash));
        reset_in_place(&mut ctx, HashContext::None);
        result
    }
}

/// Message authentication codes
pub trait MacDriver: Driver {
    /// Validate the key and algorithm and start a sign (`Encrypt`) or verify
    /// (`Decrypt`) operation
    fn mac_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<MacContext>;

    /// One-shot MAC
    fn mac_compute(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        input: &[u8],
        mac: &mut [u8],
    ) -> PsaResult<usize> {
        let mut ctx = self.mac_setup(Direction::Encrypt, attributes, key, alg)?;
        let result = ctx.update(input).and_then(|()| ctx.sign_finish(mac));
        reset_in_place(&mut ctx, MacContext::None);
        result
    }
}

/// Key derivation
pub trait KeyDerivationDriver: Driver {
    /// Start a derivation
    fn key_derivation_setup(&self, alg: Algorithm) -> PsaResult<KeyDerivationContext>;
}

/// Asymmetric signatures
pub trait SignatureDriver: Driver {
    /// Sign a precomputed hash; returns the signature length
    fn sign_hash(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        hash: &[u8],
        signature: &mut [u8],
    ) -> PsaResult<usize>;

    /// Check a signature over a precomputed hash
    fn verify_hash(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        hash: &[u8],
        signature: &[u8],
    ) -> PsaResult<()>;

    /// Sign a whole message
    ///
    /// Drivers without a message path leave this as `NotSupported`; the
    /// wrapper then hashes the message and calls [`Self::sign_hash`] for
    /// hash-and-sign algorithms.
    fn sign_message(
        &self,
        _attributes: &KeyAttributes,
        _key: &[u8],
        _alg: Algorithm,
        _input: &[u8],
        _signature: &mut [u8],
    ) -> PsaResult<usize> {
        Err(Status::NotSupported)
    }

    /// Check a signature over a whole message
    fn verify_message(
        &self,
        _attributes: &KeyAttributes,
        _key: &[u8],
        _alg: Algorithm,
        _input: &[u8],
        _signature: &[u8],
    ) -> PsaResult<()> {
        Err(Status::NotSupported)
    }
}

/// Raw key agreement
pub trait KeyAgreementDriver: Driver {
    /// Write the shared secret of `private_key` and `peer_key` to `output`
    fn key_agreement(
        &self,
        attributes: &KeyAttributes,
        private_key: &[u8],
        alg: Algorithm,
        peer_key: &[u8],
        output: &mut [u8],
    ) -> PsaResult<usize>;
}

/// Key import, generation, export and destruction
pub trait KeyManagementDriver: Driver {
    /// Validate `data` and store it in `key_buffer`
    ///
    /// Returns the stored length and the key size in bits.
    fn import_key(
        &self,
        attributes: &KeyAttributes,
        data: &[u8],
        key_buffer: &mut [u8],
    ) -> PsaResult<(usize, usize)>;

    /// Generate a key from `rng` into `key_buffer`; returns the stored length
    fn generate_key(
        &self,
        attributes: &KeyAttributes,
        rng: &mut dyn RngCore,
        key_buffer: &mut [u8],
    ) -> PsaResult<usize>;

    /// Write the public half of an asymmetric key
    fn export_public_key(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        data: &mut [u8],
    ) -> PsaResult<usize>;

    /// Write the key in export representation
    fn export_key(
        &self,
        _attributes: &KeyAttributes,
        key: &[u8],
        data: &mut [u8],
    ) -> PsaResult<usize> {
        let out = data.get_mut(..key.len()).ok_or(Status::BufferTooSmall)?;
        out.copy_from_slice(key);
        Ok(key.len())
    }

    /// Release the key; the stored bytes are wiped
    fn destroy_key(&self, _attributes: &KeyAttributes, key_buffer: &mut [u8]) -> PsaResult<()> {
        secure_zero(key_buffer);
        Ok(())
    }
}
