// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::OberonDriver;
use crate::backend::modes::{CipherCore, CipherMode};
use crate::backend::{AesKey, ChaChaKey, SoftKey};
use crate::driver::CipherDriver;
use crate::operation::CipherContext;
use psa_common::{Algorithm, Direction, KeyAttributes, KeyType, PsaResult, Status};

/// Oberon cipher operation
pub struct OberonCipher {
    pub(crate) core: CipherCore<SoftKey>,
}

impl OberonCipher {
    fn setup(
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<Self> {
        let (soft, mode) = match attributes.key_type() {
            KeyType::AES => {
                let aes = AesKey::new(key)?;
                match CipherMode::from_algorithm(alg) {
                    Some(mode) if !mode.is_chacha() => (SoftKey::Aes(aes), mode),
                    _ => return Err(Status::NotSupported),
                }
            }
            KeyType::CHACHA20 => {
                if alg != Algorithm::STREAM_CIPHER {
                    return Err(Status::NotSupported);
                }
                (SoftKey::ChaCha(ChaChaKey::new(key)?), CipherMode::Stream)
            }
            _ => return Err(Status::NotSupported),
        };
        Ok(Self {
            core: CipherCore::new(soft, mode, direction),
        })
    }
}

impl CipherDriver for OberonDriver {
    fn cipher_setup(
        &self,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<CipherContext> {
        OberonCipher::setup(direction, attributes, key, alg).map(CipherContext::Oberon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_coverage() {
        let driver = OberonDriver::new();
        let aes = KeyAttributes::new(KeyType::AES, 192);
        for alg in [
            Algorithm::ECB_NO_PADDING,
            Algorithm::CBC_NO_PADDING,
            Algorithm::CBC_PKCS7,
            Algorithm::CTR,
            Algorithm::CCM_STAR_NO_TAG,
        ] {
            let ctx = driver.cipher_setup(Direction::Encrypt, &aes, &[0u8; 24], alg).unwrap();
            assert_eq!(ctx.mode(), CipherMode::from_algorithm(alg));
        }
        assert!(matches!(
            driver.cipher_setup(Direction::Encrypt, &aes, &[0u8; 24], Algorithm::STREAM_CIPHER),
            Err(Status::NotSupported)
        ));
    }

    #[test]
    fn test_chacha20_stream() {
        let driver = OberonDriver::new();
        let chacha = KeyAttributes::new(KeyType::CHACHA20, 256);
        let ctx = driver
            .cipher_setup(Direction::Decrypt, &chacha, &[3u8; 32], Algorithm::STREAM_CIPHER)
            .unwrap();
        assert_eq!(ctx.mode(), Some(CipherMode::Stream));
        assert!(matches!(
            driver.cipher_setup(Direction::Decrypt, &chacha, &[3u8; 16], Algorithm::STREAM_CIPHER),
            Err(Status::InvalidArgument)
        ));
    }

    #[test]
    fn test_one_shot_iv_prefix() {
        let driver = OberonDriver::new();
        let aes = KeyAttributes::new(KeyType::AES, 128);
        let key = [9u8; 16];
        let iv = [4u8; 16];
        let msg = b"exactly sixteen!and a tail";

        let mut ct = [0u8; 48];
        ct[..16].copy_from_slice(&iv);
        let n = driver
            .cipher_encrypt(&aes, &key, Algorithm::CBC_PKCS7, &iv, msg, &mut ct[16..])
            .unwrap();
        assert_eq!(n, 32);

        let mut pt = [0u8; 32];
        let m = driver
            .cipher_decrypt(&aes, &key, Algorithm::CBC_PKCS7, &ct[..16 + n], &mut pt)
            .unwrap();
        assert_eq!(&pt[..m], msg);
    }
}
