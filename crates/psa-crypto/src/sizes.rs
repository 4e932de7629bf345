// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Output buffer sizing
//!
//! Helpers return the buffer length a caller must provide for a given
//! key type, algorithm and input length. Unsupported combinations size to
//! zero, so a zero result is never a valid buffer length.
//!
//! One-shot cipher sizes follow the driver contract: encryption writes the
//! ciphertext only, decryption reads the IV from the front of its input.

use crate::backend::modes::{pkcs7_padded_length, CipherMode};
use psa_common::constants::{AES_BLOCK_SIZE, AEAD_DEFAULT_NONCE_SIZE, CCM_NONCE_MAX_SIZE};
use psa_common::{Algorithm, EccFamily, KeyType};

pub use psa_common::constants::{
    AEAD_NONCE_MAX_SIZE, AEAD_TAG_MAX_SIZE, CIPHER_IV_MAX_SIZE, ECC_PUBLIC_KEY_MAX_SIZE,
    HASH_BLOCK_MAX_SIZE, HASH_MAX_SIZE, MAC_MAX_SIZE, RAW_KEY_AGREEMENT_MAX_SIZE,
    SIGNATURE_MAX_SIZE,
};

/// Largest output of any `aead_finish` ciphertext part
pub const AEAD_FINISH_OUTPUT_MAX_SIZE: usize = 0;

/// Largest output of any `cipher_finish`
pub const CIPHER_FINISH_OUTPUT_MAX_SIZE: usize = AES_BLOCK_SIZE;

/// AES-CMAC output length
const CMAC_LENGTH: usize = AES_BLOCK_SIZE;

const fn aead_mode_matches(alg: Algorithm, mode: Algorithm) -> bool {
    alg.aead_short().raw() == mode.aead_short().raw()
}

const fn aead_key_matches(key_type: KeyType, alg: Algorithm) -> bool {
    if key_type.raw() == KeyType::AES.raw() {
        aead_mode_matches(alg, Algorithm::CCM) || aead_mode_matches(alg, Algorithm::GCM)
    } else if key_type.raw() == KeyType::CHACHA20.raw() {
        aead_mode_matches(alg, Algorithm::CHACHA20_POLY1305)
    } else {
        false
    }
}

/// Tag length of an AEAD algorithm, zero for anything else
#[must_use]
pub const fn aead_tag_length(alg: Algorithm) -> usize {
    if alg.is_aead() {
        alg.tag_length()
    } else {
        0
    }
}

/// Default nonce length of an AEAD algorithm regardless of key type
#[must_use]
pub const fn aead_default_nonce_length(alg: Algorithm) -> usize {
    if aead_mode_matches(alg, Algorithm::CCM) {
        CCM_NONCE_MAX_SIZE
    } else if aead_mode_matches(alg, Algorithm::GCM)
        || aead_mode_matches(alg, Algorithm::CHACHA20_POLY1305)
    {
        AEAD_DEFAULT_NONCE_SIZE
    } else {
        0
    }
}

/// Default nonce length for `alg` with a key of `key_type`
#[must_use]
pub const fn aead_nonce_length(key_type: KeyType, alg: Algorithm) -> usize {
    if aead_key_matches(key_type, alg) {
        aead_default_nonce_length(alg)
    } else {
        0
    }
}

/// One-shot encryption output: ciphertext followed by the tag
#[must_use]
pub const fn aead_encrypt_output_size(alg: Algorithm, plaintext_length: usize) -> usize {
    if alg.is_aead() {
        plaintext_length.saturating_add(alg.tag_length())
    } else {
        0
    }
}

/// One-shot decryption output
#[must_use]
pub const fn aead_decrypt_output_size(alg: Algorithm, ciphertext_length: usize) -> usize {
    if alg.is_aead() {
        ciphertext_length.saturating_sub(alg.tag_length())
    } else {
        0
    }
}

/// Output of one `aead_update` call
///
/// Every supported AEAD streams, so the output matches the input.
#[must_use]
pub const fn aead_update_output_size(alg: Algorithm, input_length: usize) -> usize {
    if alg.is_aead() {
        input_length
    } else {
        0
    }
}

/// Ciphertext part of `aead_finish`
#[must_use]
pub const fn aead_finish_output_size(_alg: Algorithm) -> usize {
    AEAD_FINISH_OUTPUT_MAX_SIZE
}

fn cipher_mode(key_type: KeyType, alg: Algorithm) -> Option<CipherMode> {
    let mode = CipherMode::from_algorithm(alg)?;
    let matches = match mode {
        CipherMode::Stream => key_type == KeyType::CHACHA20,
        _ => key_type == KeyType::AES,
    };
    matches.then_some(mode)
}

/// IV length for `alg` with a key of `key_type`
#[must_use]
pub fn cipher_iv_length(key_type: KeyType, alg: Algorithm) -> usize {
    cipher_mode(key_type, alg).map_or(0, |mode| mode.iv_length())
}

/// One-shot encryption output (ciphertext only)
#[must_use]
pub fn cipher_encrypt_output_size(key_type: KeyType, alg: Algorithm, input_length: usize) -> usize {
    match cipher_mode(key_type, alg) {
        Some(CipherMode::CbcPkcs7) => pkcs7_padded_length(input_length),
        Some(CipherMode::Ecb | CipherMode::Cbc) => round_up_to_block(input_length),
        Some(_) => input_length,
        None => 0,
    }
}

/// One-shot decryption output for IV-prefixed `input_length` bytes
#[must_use]
pub fn cipher_decrypt_output_size(key_type: KeyType, alg: Algorithm, input_length: usize) -> usize {
    cipher_mode(key_type, alg).map_or(0, |mode| input_length.saturating_sub(mode.iv_length()))
}

/// Worst-case output of one `cipher_update` call
#[must_use]
pub fn cipher_update_output_size(key_type: KeyType, alg: Algorithm, input_length: usize) -> usize {
    match cipher_mode(key_type, alg) {
        Some(mode) if mode.is_block_mode() => round_up_to_block(input_length),
        Some(_) => input_length,
        None => 0,
    }
}

/// Worst-case output of `cipher_finish`
#[must_use]
pub fn cipher_finish_output_size(key_type: KeyType, alg: Algorithm) -> usize {
    match cipher_mode(key_type, alg) {
        Some(CipherMode::CbcPkcs7) => AES_BLOCK_SIZE,
        _ => 0,
    }
}

const fn round_up_to_block(length: usize) -> usize {
    length.saturating_add(AES_BLOCK_SIZE - 1) / AES_BLOCK_SIZE * AES_BLOCK_SIZE
}

/// Digest length of a hash, or of the hash inside an HMAC
#[must_use]
pub const fn hash_length(alg: Algorithm) -> usize {
    if alg.is_hash() {
        alg.hash_length()
    } else {
        alg.get_hash().hash_length()
    }
}

/// Block length of a hash, or of the hash inside an HMAC
#[must_use]
pub const fn hash_block_length(alg: Algorithm) -> usize {
    if alg.is_hash() {
        alg.hash_block_length()
    } else {
        alg.get_hash().hash_block_length()
    }
}

/// MAC length for `alg` with a key of `key_type`
///
/// Truncated identifiers size to their truncation length. `key_bits` does
/// not change the output of any supported MAC.
#[must_use]
pub const fn mac_length(key_type: KeyType, _key_bits: usize, alg: Algorithm) -> usize {
    if !alg.is_mac() {
        return 0;
    }
    let full = if alg.is_hmac() {
        if key_type.raw() != KeyType::HMAC.raw() {
            return 0;
        }
        alg.get_hash().hash_length()
    } else if alg.full_length_mac().raw() == Algorithm::CMAC.raw() {
        if key_type.raw() != KeyType::AES.raw() {
            return 0;
        }
        CMAC_LENGTH
    } else {
        return 0;
    };
    match alg.mac_truncated_length() {
        0 => full,
        truncated if truncated <= full => truncated,
        _ => 0,
    }
}

/// Curve family byte and key size of an ECC key type, if any
const fn ecc_curve(key_type: KeyType, key_bits: usize) -> Option<(u8, usize)> {
    match key_type.ecc_family() {
        Some(family) => Some((family.raw(), key_bits)),
        None => None,
    }
}

const P256: (u8, usize) = (EccFamily::SECP_R1.raw(), 256);
const CURVE25519: (u8, usize) = (EccFamily::MONTGOMERY.raw(), 255);
const EDWARDS25519: (u8, usize) = (EccFamily::TWISTED_EDWARDS.raw(), 255);

/// Signature length for `alg` with an ECC key
#[must_use]
pub const fn sign_output_size(key_type: KeyType, key_bits: usize, alg: Algorithm) -> usize {
    match ecc_curve(key_type, key_bits) {
        Some(P256) if alg.is_ecdsa() => SIGNATURE_MAX_SIZE,
        Some(EDWARDS25519) if alg.is_pure_eddsa() => SIGNATURE_MAX_SIZE,
        _ => 0,
    }
}

/// Exported public key length for an ECC key pair or public key
#[must_use]
pub const fn export_public_key_output_size(key_type: KeyType, key_bits: usize) -> usize {
    match ecc_curve(key_type, key_bits) {
        Some(P256) => ECC_PUBLIC_KEY_MAX_SIZE,
        Some(CURVE25519 | EDWARDS25519) => 32,
        _ => 0,
    }
}

/// Raw shared secret length for a key agreement with an ECC key pair
#[must_use]
pub const fn raw_key_agreement_output_size(key_type: KeyType, key_bits: usize) -> usize {
    if !key_type.is_ecc_key_pair() {
        return 0;
    }
    match ecc_curve(key_type, key_bits) {
        Some(P256 | CURVE25519) => RAW_KEY_AGREEMENT_MAX_SIZE,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aead_sizes() {
        let short_gcm = Algorithm::GCM.with_shortened_tag(8);
        assert_eq!(aead_tag_length(Algorithm::GCM), 16);
        assert_eq!(aead_tag_length(short_gcm), 8);
        assert_eq!(aead_tag_length(Algorithm::SHA_256), 0);
        assert_eq!(aead_encrypt_output_size(short_gcm, 5), 13);
        assert_eq!(aead_decrypt_output_size(Algorithm::CCM, 21), 5);
        assert_eq!(aead_decrypt_output_size(Algorithm::CCM, 3), 0);
        assert_eq!(aead_update_output_size(Algorithm::CHACHA20_POLY1305, 33), 33);
        assert_eq!(aead_finish_output_size(Algorithm::GCM), 0);
    }

    #[test]
    fn test_aead_nonce_lengths() {
        assert_eq!(aead_nonce_length(KeyType::AES, Algorithm::CCM), 13);
        assert_eq!(aead_nonce_length(KeyType::AES, Algorithm::GCM.with_shortened_tag(12)), 12);
        assert_eq!(aead_nonce_length(KeyType::CHACHA20, Algorithm::CHACHA20_POLY1305), 12);
        assert_eq!(aead_nonce_length(KeyType::CHACHA20, Algorithm::GCM), 0);
        assert_eq!(aead_nonce_length(KeyType::AES, Algorithm::CHACHA20_POLY1305), 0);
    }

    #[test]
    fn test_cipher_sizes() {
        assert_eq!(cipher_iv_length(KeyType::AES, Algorithm::CTR), 16);
        assert_eq!(cipher_iv_length(KeyType::AES, Algorithm::ECB_NO_PADDING), 0);
        assert_eq!(cipher_iv_length(KeyType::AES, Algorithm::CCM_STAR_NO_TAG), 13);
        assert_eq!(cipher_iv_length(KeyType::CHACHA20, Algorithm::STREAM_CIPHER), 12);
        assert_eq!(cipher_iv_length(KeyType::CHACHA20, Algorithm::CTR), 0);

        assert_eq!(cipher_encrypt_output_size(KeyType::AES, Algorithm::CBC_PKCS7, 16), 32);
        assert_eq!(cipher_encrypt_output_size(KeyType::AES, Algorithm::CBC_PKCS7, 15), 16);
        assert_eq!(cipher_encrypt_output_size(KeyType::AES, Algorithm::CTR, 15), 15);
        assert_eq!(cipher_decrypt_output_size(KeyType::AES, Algorithm::CBC_NO_PADDING, 48), 32);
        assert_eq!(cipher_update_output_size(KeyType::AES, Algorithm::CBC_PKCS7, 1), 16);
        assert_eq!(cipher_update_output_size(KeyType::CHACHA20, Algorithm::STREAM_CIPHER, 7), 7);
        assert_eq!(cipher_finish_output_size(KeyType::AES, Algorithm::CBC_PKCS7), 16);
        assert_eq!(cipher_finish_output_size(KeyType::AES, Algorithm::CTR), 0);
    }

    #[test]
    fn test_hash_and_mac_lengths() {
        assert_eq!(hash_length(Algorithm::SHA3_384), 48);
        assert_eq!(hash_length(Algorithm::hmac(Algorithm::SHA_512)), 64);
        assert_eq!(hash_block_length(Algorithm::SHA3_256), 136);
        assert_eq!(hash_length(Algorithm::CTR), 0);

        let hmac256 = Algorithm::hmac(Algorithm::SHA_256);
        assert_eq!(mac_length(KeyType::HMAC, 256, hmac256), 32);
        assert_eq!(mac_length(KeyType::HMAC, 256, hmac256.truncated_mac(10)), 10);
        assert_eq!(mac_length(KeyType::AES, 128, hmac256), 0);
        assert_eq!(mac_length(KeyType::AES, 128, Algorithm::CMAC), 16);
        assert_eq!(mac_length(KeyType::AES, 256, Algorithm::CMAC.truncated_mac(4)), 4);
        assert_eq!(mac_length(KeyType::HMAC, 128, Algorithm::CMAC), 0);
    }

    #[test]
    fn test_asymmetric_sizes() {
        let p256_pair = KeyType::ecc_key_pair(EccFamily::SECP_R1);
        let x25519_pair = KeyType::ecc_key_pair(EccFamily::MONTGOMERY);
        let ed25519_public = KeyType::ecc_public_key(EccFamily::TWISTED_EDWARDS);
        let ecdsa = Algorithm::ecdsa(Algorithm::SHA_256);

        assert_eq!(sign_output_size(p256_pair, 256, ecdsa), 64);
        assert_eq!(sign_output_size(p256_pair, 384, ecdsa), 0);
        assert_eq!(sign_output_size(p256_pair, 256, Algorithm::PURE_EDDSA), 0);
        assert_eq!(sign_output_size(ed25519_public, 255, Algorithm::PURE_EDDSA), 64);

        assert_eq!(export_public_key_output_size(p256_pair, 256), 65);
        assert_eq!(export_public_key_output_size(x25519_pair, 255), 32);
        assert_eq!(export_public_key_output_size(KeyType::AES, 128), 0);

        assert_eq!(raw_key_agreement_output_size(x25519_pair, 255), 32);
        assert_eq!(raw_key_agreement_output_size(p256_pair.public_of_pair(), 256), 0);
    }
}
