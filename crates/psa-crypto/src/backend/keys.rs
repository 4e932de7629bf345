// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Key import, generation and export checks
//!
//! Both software drivers keep keys in export representation, so import is a
//! validating copy and export of a key pair's public half is a derivation.

use crate::backend::ecc::{self, Curve};
use crate::zeroize_utils::secure_zero;
use psa_common::{KeyAttributes, KeyType, PsaResult, Status};
use rand_core::RngCore;

/// Bit size of symmetric key material of `length` bytes
fn symmetric_bits(key_type: KeyType, length: usize) -> PsaResult<usize> {
    let valid = match key_type {
        KeyType::AES => matches!(length, 16 | 24 | 32),
        KeyType::CHACHA20 => length == 32,
        KeyType::HMAC | KeyType::DERIVE | KeyType::PASSWORD | KeyType::RAW_DATA => length > 0,
        _ => return Err(Status::NotSupported),
    };
    if valid {
        Ok(length * 8)
    } else {
        Err(Status::InvalidArgument)
    }
}

/// Validate `data` and copy it into `key_buffer`
///
/// Returns the stored length and the key size in bits. Declared bits that
/// disagree with the data are [`Status::InvalidArgument`].
pub fn import(
    attributes: &KeyAttributes,
    data: &[u8],
    key_buffer: &mut [u8],
) -> PsaResult<(usize, usize)> {
    let key_type = attributes.key_type();
    let bits = if key_type.is_ecc_key_pair() || key_type.is_ecc_public_key() {
        let curve = Curve::from_key(key_type, attributes.bits())?;
        if key_type.is_ecc_key_pair() {
            ecc::check_private_key(curve, data)?;
        } else {
            ecc::check_public_key(curve, data)?;
        }
        curve.bits()
    } else {
        let bits = symmetric_bits(key_type, data.len())?;
        if attributes.bits() != 0 && attributes.bits() != bits {
            return Err(Status::InvalidArgument);
        }
        bits
    };

    let slot = key_buffer
        .get_mut(..data.len())
        .ok_or(Status::BufferTooSmall)?;
    slot.copy_from_slice(data);
    Ok((data.len(), bits))
}

/// Generate a key of the declared type and size into `key_buffer`
///
/// Public keys cannot be generated.
pub fn generate(
    attributes: &KeyAttributes,
    rng: &mut dyn RngCore,
    key_buffer: &mut [u8],
) -> PsaResult<usize> {
    let key_type = attributes.key_type();
    if key_type.is_ecc_public_key() || key_type == KeyType::PASSWORD {
        return Err(Status::InvalidArgument);
    }
    if key_type.is_ecc_key_pair() {
        let curve = Curve::from_key(key_type, attributes.bits())?;
        return ecc::generate(curve, rng, key_buffer);
    }

    let bits = attributes.bits();
    if bits % 8 != 0 {
        return Err(Status::InvalidArgument);
    }
    let length = bits / 8;
    symmetric_bits(key_type, length)?;
    let out = key_buffer.get_mut(..length).ok_or(Status::BufferTooSmall)?;
    if rng.try_fill_bytes(out).is_err() {
        secure_zero(out);
        return Err(Status::InsufficientEntropy);
    }
    Ok(length)
}

/// Write the public half of an ECC key to `data`
pub fn export_public(attributes: &KeyAttributes, key: &[u8], data: &mut [u8]) -> PsaResult<usize> {
    let key_type = attributes.key_type();
    if key_type.is_ecc_key_pair() {
        let curve = Curve::from_key(key_type, attributes.bits())?;
        ecc::public_key(curve, key, data)
    } else if key_type.is_ecc_public_key() {
        Curve::from_key(key_type, attributes.bits())?;
        let out = data.get_mut(..key.len()).ok_or(Status::BufferTooSmall)?;
        out.copy_from_slice(key);
        Ok(key.len())
    } else {
        Err(Status::InvalidArgument)
    }
}
