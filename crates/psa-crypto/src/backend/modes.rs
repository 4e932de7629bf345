// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Unauthenticated cipher modes
//!
//! Block modes (ECB, CBC, CBC with PKCS#7 padding) emit complete blocks
//! only. PKCS#7 decryption always holds back the last complete block until
//! `finish`, where the padding is checked. Stream modes (CTR, CCM* without
//! tag, ChaCha20) emit exactly as many bytes as they consume.

use super::{Block, BlockCipher, CbcChain, CounterWidth, CtrStream, SymmetricKey};
use crate::zeroize_utils::secure_zero;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use psa_common::constants::{AES_BLOCK_SIZE, CCM_STAR_IV_SIZE, CHACHA20_IV_SIZE};
use psa_common::{Algorithm, Direction, PsaResult, Status};
use subtle::{Choice, ConstantTimeEq, ConstantTimeGreater};

/// Cipher mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    /// AES-ECB, no padding
    Ecb,
    /// AES-CBC, no padding
    Cbc,
    /// AES-CBC with PKCS#7 padding
    CbcPkcs7,
    /// AES-CTR, 128-bit counter
    Ctr,
    /// CCM* without tag (CTR with a CCM counter block)
    CcmStar,
    /// ChaCha20 stream cipher
    Stream,
}

impl CipherMode {
    /// Mode of a cipher identifier
    #[must_use]
    pub fn from_algorithm(alg: Algorithm) -> Option<Self> {
        match alg {
            Algorithm::ECB_NO_PADDING => Some(Self::Ecb),
            Algorithm::CBC_NO_PADDING => Some(Self::Cbc),
            Algorithm::CBC_PKCS7 => Some(Self::CbcPkcs7),
            Algorithm::CTR => Some(Self::Ctr),
            Algorithm::CCM_STAR_NO_TAG => Some(Self::CcmStar),
            Algorithm::STREAM_CIPHER => Some(Self::Stream),
            _ => None,
        }
    }

    /// IV length in bytes, zero when the mode takes none
    #[must_use]
    pub const fn iv_length(&self) -> usize {
        match self {
            Self::Ecb => 0,
            Self::Cbc | Self::CbcPkcs7 | Self::Ctr => AES_BLOCK_SIZE,
            Self::CcmStar => CCM_STAR_IV_SIZE,
            Self::Stream => CHACHA20_IV_SIZE,
        }
    }

    /// Check if the mode works on whole blocks
    #[must_use]
    pub const fn is_block_mode(&self) -> bool {
        matches!(self, Self::Ecb | Self::Cbc | Self::CbcPkcs7)
    }

    /// Check if the mode uses the ChaCha20 key type
    #[must_use]
    pub const fn is_chacha(&self) -> bool {
        matches!(self, Self::Stream)
    }
}

enum Keystream {
    None,
    Ctr(CtrStream),
    ChaCha(ChaCha20),
}

/// Largest CCM* message: the two-byte length field of a 13-byte nonce
const CCM_STAR_MAX_INPUT: usize = 0xFFFF;

/// Multi-part cipher state
pub struct CipherCore<K> {
    key: K,
    mode: CipherMode,
    direction: Direction,
    iv_set: bool,
    chain: Option<CbcChain>,
    streamed: usize,
    buffer: Block,
    buffered: usize,
    stream: Keystream,
}

impl<K: SymmetricKey> CipherCore<K> {
    /// Configure for one message
    pub fn new(key: K, mode: CipherMode, direction: Direction) -> Self {
        Self {
            key,
            mode,
            direction,
            iv_set: false,
            chain: None,
            streamed: 0,
            buffer: [0u8; AES_BLOCK_SIZE],
            buffered: 0,
            stream: Keystream::None,
        }
    }

    /// Cipher mode
    #[must_use]
    pub const fn mode(&self) -> CipherMode {
        self.mode
    }

    fn holds_back(&self) -> bool {
        self.mode == CipherMode::CbcPkcs7 && self.direction == Direction::Decrypt
    }

    fn ready(&self) -> bool {
        self.mode.iv_length() == 0 || self.iv_set
    }

    /// Set the IV
    pub fn set_iv(&mut self, iv: &[u8]) -> PsaResult<()> {
        if self.mode == CipherMode::Ecb || self.iv_set {
            return Err(Status::BadState);
        }
        if iv.len() != self.mode.iv_length() {
            return Err(Status::InvalidArgument);
        }
        match self.mode {
            CipherMode::Cbc | CipherMode::CbcPkcs7 => {
                let mut start = [0u8; AES_BLOCK_SIZE];
                start.copy_from_slice(iv);
                self.chain = Some(self.key.cbc_chain(&start, self.direction));
            }
            CipherMode::Ctr => {
                let mut counter = [0u8; AES_BLOCK_SIZE];
                counter.copy_from_slice(iv);
                self.stream = Keystream::Ctr(self.key.ctr_stream(&counter, CounterWidth::Full));
            }
            CipherMode::CcmStar => {
                let mut counter = [0u8; AES_BLOCK_SIZE];
                counter[0] = 0x01;
                counter[1..=CCM_STAR_IV_SIZE].copy_from_slice(iv);
                counter[AES_BLOCK_SIZE - 1] = 0x01;
                self.stream = Keystream::Ctr(self.key.ctr_stream(&counter, CounterWidth::Ccm(2)));
            }
            CipherMode::Stream => {
                let key = self.key.chacha_key().ok_or(Status::CorruptionDetected)?;
                self.stream = Keystream::ChaCha(ChaCha20::new(
                    chacha20::Key::from_slice(key.as_bytes()),
                    chacha20::Nonce::from_slice(iv),
                ));
            }
            CipherMode::Ecb => return Err(Status::BadState),
        }
        self.iv_set = true;
        Ok(())
    }

    /// Bytes the next `update` with `input_length` bytes will write
    #[must_use]
    pub fn update_output_length(&self, input_length: usize) -> usize {
        if !self.mode.is_block_mode() {
            return input_length;
        }
        let total = self.buffered + input_length;
        if self.holds_back() {
            total.saturating_sub(1) / AES_BLOCK_SIZE * AES_BLOCK_SIZE
        } else {
            total / AES_BLOCK_SIZE * AES_BLOCK_SIZE
        }
    }

    fn process_block(&mut self, block: &mut Block) -> PsaResult<()> {
        match (&mut self.chain, self.direction) {
            (Some(chain), _) => chain.process(&self.key, block),
            (None, Direction::Encrypt) => self.key.encrypt_block(block),
            (None, Direction::Decrypt) => self.key.decrypt_block(block),
        }
    }

    fn flush_buffer(&mut self, output: &mut [u8]) -> PsaResult<()> {
        let mut block = self.buffer;
        let result = self.process_block(&mut block);
        if result.is_ok() {
            output[..AES_BLOCK_SIZE].copy_from_slice(&block);
        }
        secure_zero(&mut block);
        self.buffered = 0;
        result
    }

    /// Process `input`; returns bytes written
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) -> PsaResult<usize> {
        if !self.ready() {
            return Err(Status::BadState);
        }
        let needed = self.update_output_length(input.len());
        if output.len() < needed {
            return Err(Status::BufferTooSmall);
        }

        match &mut self.stream {
            Keystream::Ctr(ctr) => {
                if self.mode == CipherMode::CcmStar {
                    self.streamed = self
                        .streamed
                        .checked_add(input.len())
                        .filter(|total| *total <= CCM_STAR_MAX_INPUT)
                        .ok_or(Status::InvalidArgument)?;
                }
                ctr.apply(&self.key, input, output)?;
                return Ok(input.len());
            }
            Keystream::ChaCha(cipher) => {
                let out = &mut output[..input.len()];
                out.copy_from_slice(input);
                cipher
                    .try_apply_keystream(out)
                    .map_err(|_| Status::InvalidArgument)?;
                return Ok(input.len());
            }
            Keystream::None => {}
        }

        let holds_back = self.holds_back();
        let mut written = 0;
        let mut rest = input;
        while !rest.is_empty() {
            if self.buffered == AES_BLOCK_SIZE {
                self.flush_buffer(&mut output[written..])?;
                written += AES_BLOCK_SIZE;
            }
            let take = (AES_BLOCK_SIZE - self.buffered).min(rest.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&rest[..take]);
            self.buffered += take;
            rest = &rest[take..];
            if self.buffered == AES_BLOCK_SIZE && !holds_back {
                self.flush_buffer(&mut output[written..])?;
                written += AES_BLOCK_SIZE;
            }
        }
        Ok(written)
    }

    /// Flush the final block; returns bytes written
    pub fn finish(&mut self, output: &mut [u8]) -> PsaResult<usize> {
        if !self.ready() {
            return Err(Status::BadState);
        }
        match (self.mode, self.direction) {
            (CipherMode::CbcPkcs7, Direction::Encrypt) => {
                if output.len() < AES_BLOCK_SIZE {
                    return Err(Status::BufferTooSmall);
                }
                let pad = (AES_BLOCK_SIZE - self.buffered) as u8;
                for byte in &mut self.buffer[self.buffered..] {
                    *byte = pad;
                }
                self.buffered = AES_BLOCK_SIZE;
                self.flush_buffer(output)?;
                Ok(AES_BLOCK_SIZE)
            }
            (CipherMode::CbcPkcs7, Direction::Decrypt) => {
                if output.len() < AES_BLOCK_SIZE {
                    return Err(Status::BufferTooSmall);
                }
                if self.buffered != AES_BLOCK_SIZE {
                    return Err(Status::InvalidArgument);
                }
                let mut block = self.buffer;
                self.buffered = 0;
                let result = self
                    .process_block(&mut block)
                    .and_then(|()| unpad_length(&block));
                if let Ok(len) = result {
                    output[..len].copy_from_slice(&block[..len]);
                }
                secure_zero(&mut block);
                result
            }
            (CipherMode::Ecb | CipherMode::Cbc, _) => {
                if self.buffered != 0 {
                    return Err(Status::InvalidArgument);
                }
                Ok(0)
            }
            _ => Ok(0),
        }
    }
}

impl<K> Drop for CipherCore<K> {
    fn drop(&mut self) {
        secure_zero(&mut self.buffer);
    }
}

/// Plaintext length of a decrypted final block, checked in constant time
fn unpad_length(block: &Block) -> PsaResult<usize> {
    let pad = block[AES_BLOCK_SIZE - 1];
    let mut bad: Choice = pad.ct_eq(&0) | pad.ct_gt(&(AES_BLOCK_SIZE as u8));
    for (i, byte) in block.iter().enumerate() {
        let distance = (AES_BLOCK_SIZE - i) as u8;
        let in_pad = !distance.ct_gt(&pad);
        bad |= in_pad & !byte.ct_eq(&pad);
    }
    if bool::from(bad) {
        Err(Status::InvalidPadding)
    } else {
        Ok(AES_BLOCK_SIZE - pad as usize)
    }
}

/// PKCS#7-padded length of `length` plaintext bytes
#[must_use]
pub const fn pkcs7_padded_length(length: usize) -> usize {
    (length + AES_BLOCK_SIZE) & !(AES_BLOCK_SIZE - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AesKey, ChaChaKey, SoftKey};

    const KEY: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
    ];
    const PT: [u8; 16] = [
        0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93, 0x17, 0x2a,
    ];

    fn aes_core(mode: CipherMode, direction: Direction) -> CipherCore<SoftKey> {
        CipherCore::new(SoftKey::Aes(AesKey::new(&KEY).unwrap()), mode, direction)
    }

    #[test]
    fn test_cbc_sp800_38a() {
        let iv: [u8; 16] = core::array::from_fn(|i| i as u8);
        let mut op = aes_core(CipherMode::Cbc, Direction::Encrypt);
        op.set_iv(&iv).unwrap();
        let mut out = [0u8; 16];
        assert_eq!(op.update(&PT[..7], &mut out), Ok(0));
        assert_eq!(op.update(&PT[7..], &mut out), Ok(16));
        assert_eq!(op.finish(&mut []), Ok(0));
        assert_eq!(
            out,
            [
                0x76, 0x49, 0xab, 0xac, 0x81, 0x19, 0xb2, 0x46, 0xce, 0xe9, 0x8e, 0x9b, 0x12, 0xe9,
                0x19, 0x7d
            ]
        );
    }

    #[test]
    fn test_ctr_sp800_38a() {
        let iv: [u8; 16] = core::array::from_fn(|i| 0xf0 + i as u8);
        let mut op = aes_core(CipherMode::Ctr, Direction::Encrypt);
        op.set_iv(&iv).unwrap();
        let mut out = [0u8; 16];
        assert_eq!(op.update(&PT[..5], &mut out[..5]), Ok(5));
        assert_eq!(op.update(&PT[5..], &mut out[5..]), Ok(11));
        assert_eq!(
            out,
            [
                0x87, 0x4d, 0x61, 0x91, 0xb6, 0x20, 0xe3, 0x26, 0x1b, 0xef, 0x68, 0x64, 0x99, 0x0d,
                0xb6, 0xce
            ]
        );
    }

    #[test]
    fn test_pkcs7_round_trip_holds_back_last_block() {
        let iv = [7u8; 16];
        let msg = [0x5au8; 32];
        let mut enc = aes_core(CipherMode::CbcPkcs7, Direction::Encrypt);
        enc.set_iv(&iv).unwrap();
        let mut ct = [0u8; 48];
        let n = enc.update(&msg, &mut ct).unwrap();
        let m = enc.finish(&mut ct[n..]).unwrap();
        assert_eq!(n + m, pkcs7_padded_length(msg.len()));

        let mut dec = aes_core(CipherMode::CbcPkcs7, Direction::Decrypt);
        dec.set_iv(&iv).unwrap();
        let mut pt = [0u8; 48];
        assert_eq!(dec.update_output_length(48), 32);
        let n = dec.update(&ct, &mut pt).unwrap();
        assert_eq!(n, 32);
        let m = dec.finish(&mut pt[n..]).unwrap();
        assert_eq!(m, 0);
        assert_eq!(&pt[..32], &msg);
    }

    #[test]
    fn test_pkcs7_bad_padding() {
        let iv = [0u8; 16];
        let mut enc = aes_core(CipherMode::Cbc, Direction::Encrypt);
        enc.set_iv(&iv).unwrap();
        let mut ct = [0u8; 16];
        let mut block = [0u8; 16];
        block[15] = 0x11;
        enc.update(&block, &mut ct).unwrap();

        let mut dec = aes_core(CipherMode::CbcPkcs7, Direction::Decrypt);
        dec.set_iv(&iv).unwrap();
        let mut pt = [0u8; 16];
        assert_eq!(dec.update(&ct, &mut pt), Ok(0));
        assert_eq!(dec.finish(&mut pt), Err(Status::InvalidPadding));
    }

    #[test]
    fn test_unpad_length() {
        let mut block = [0u8; 16];
        block[12..].copy_from_slice(&[4, 4, 4, 4]);
        assert_eq!(unpad_length(&block), Ok(12));
        block[12] = 3;
        assert_eq!(unpad_length(&block), Err(Status::InvalidPadding));
        assert_eq!(unpad_length(&[16u8; 16]), Ok(0));
        assert_eq!(unpad_length(&[0u8; 16]), Err(Status::InvalidPadding));
    }

    #[test]
    fn test_partial_block_rejected_without_padding() {
        let mut op = aes_core(CipherMode::Ecb, Direction::Encrypt);
        let mut out = [0u8; 16];
        assert_eq!(op.update(&PT[..10], &mut out), Ok(0));
        assert_eq!(op.finish(&mut out), Err(Status::InvalidArgument));
    }

    #[test]
    fn test_iv_rules() {
        let mut ecb = aes_core(CipherMode::Ecb, Direction::Encrypt);
        assert_eq!(ecb.set_iv(&[0u8; 16]), Err(Status::BadState));

        let mut ctr = aes_core(CipherMode::Ctr, Direction::Encrypt);
        let mut out = [0u8; 4];
        assert_eq!(ctr.update(&[0u8; 4], &mut out), Err(Status::BadState));
        assert_eq!(ctr.set_iv(&[0u8; 12]), Err(Status::InvalidArgument));
        ctr.set_iv(&[0u8; 16]).unwrap();
        assert_eq!(ctr.set_iv(&[0u8; 16]), Err(Status::BadState));
    }

    #[test]
    fn test_update_buffer_too_small() {
        let mut op = aes_core(CipherMode::Ecb, Direction::Encrypt);
        let mut out = [0xEEu8; 15];
        assert_eq!(op.update(&PT, &mut out), Err(Status::BufferTooSmall));
        assert_eq!(out, [0xEE; 15]);
    }

    #[test]
    fn test_ccm_star_counter_block() {
        let nonce = [0x11u8; 13];
        let mut op = aes_core(CipherMode::CcmStar, Direction::Encrypt);
        op.set_iv(&nonce).unwrap();
        let mut out = [0u8; 16];
        op.update(&[0u8; 16], &mut out).unwrap();

        let mut a1 = [0u8; 16];
        a1[0] = 0x01;
        a1[1..14].copy_from_slice(&nonce);
        a1[15] = 0x01;
        AesKey::new(&KEY).unwrap().encrypt_block(&mut a1).unwrap();
        assert_eq!(out, a1);
    }

    #[test]
    fn test_ccm_star_message_length_limit() {
        let mut op = aes_core(CipherMode::CcmStar, Direction::Encrypt);
        op.set_iv(&[0x22u8; 13]).unwrap();
        let mut out = [0u8; 0x8000];
        assert_eq!(op.update(&[0u8; 0x8000], &mut out), Ok(0x8000));
        assert_eq!(op.update(&[0u8; 0x7FFF], &mut out[..0x7FFF]), Ok(0x7FFF));
        assert_eq!(op.update(&[0u8; 1], &mut out[..1]), Err(Status::InvalidArgument));
    }

    #[test]
    fn test_cbc_decrypt_sp800_38a() {
        let iv: [u8; 16] = core::array::from_fn(|i| i as u8);
        let ct = [
            0x76, 0x49, 0xab, 0xac, 0x81, 0x19, 0xb2, 0x46, 0xce, 0xe9, 0x8e, 0x9b, 0x12, 0xe9,
            0x19, 0x7d,
        ];
        let mut op = aes_core(CipherMode::Cbc, Direction::Decrypt);
        op.set_iv(&iv).unwrap();
        let mut out = [0u8; 16];
        assert_eq!(op.update(&ct, &mut out), Ok(16));
        assert_eq!(out, PT);
    }

    #[test]
    fn test_chacha20_split_updates() {
        let key = SoftKey::ChaCha(ChaChaKey::new(&[0x42u8; 32]).unwrap());
        let mut enc = CipherCore::new(key, CipherMode::Stream, Direction::Encrypt);
        enc.set_iv(&[1u8; 12]).unwrap();
        let mut ct = [0u8; 40];
        enc.update(&[0x33u8; 40], &mut ct).unwrap();
        assert_ne!(ct, [0x33u8; 40]);

        let key = SoftKey::ChaCha(ChaChaKey::new(&[0x42u8; 32]).unwrap());
        let mut dec = CipherCore::new(key, CipherMode::Stream, Direction::Decrypt);
        dec.set_iv(&[1u8; 12]).unwrap();
        let mut pt = [0u8; 40];
        dec.update(&ct[..17], &mut pt[..17]).unwrap();
        dec.update(&ct[17..], &mut pt[17..]).unwrap();
        assert_eq!(pt, [0x33u8; 40]);
    }
}
