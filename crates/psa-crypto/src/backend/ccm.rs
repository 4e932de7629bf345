// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Streaming AES-CCM (NIST SP 800-38C)
//!
//! CBC-MAC over `B0 || encoded AD || payload`, CTR encryption starting at
//! counter block 1. Lengths must be known before the first block is formed.

use super::{xor_in_place, Block, BlockCipher, CounterWidth, CtrStream, SymmetricKey};
use psa_common::constants::{AES_BLOCK_SIZE, CCM_NONCE_MAX_SIZE, CCM_NONCE_MIN_SIZE};
use psa_common::{Direction, PsaResult, Status};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Check a CCM nonce length
#[must_use]
pub const fn nonce_length_valid(len: usize) -> bool {
    len >= CCM_NONCE_MIN_SIZE && len <= CCM_NONCE_MAX_SIZE
}

/// Check a CCM tag length (4..=16, even)
#[must_use]
pub const fn tag_length_valid(len: usize) -> bool {
    len >= 4 && len <= 16 && len % 2 == 0
}

/// Running CBC-MAC with a partial-block buffer
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct CbcMac {
    x: Block,
    pending: Block,
    fill: usize,
}

impl CbcMac {
    fn absorb<B: BlockCipher + ?Sized>(&mut self, cipher: &B, mut data: &[u8]) -> PsaResult<()> {
        while !data.is_empty() {
            let take = (AES_BLOCK_SIZE - self.fill).min(data.len());
            self.pending[self.fill..self.fill + take].copy_from_slice(&data[..take]);
            self.fill += take;
            data = &data[take..];
            if self.fill == AES_BLOCK_SIZE {
                self.compress(cipher)?;
            }
        }
        Ok(())
    }

    /// Zero-pad and process any partial block
    fn pad<B: BlockCipher + ?Sized>(&mut self, cipher: &B) -> PsaResult<()> {
        if self.fill > 0 {
            self.pending[self.fill..].fill(0);
            self.compress(cipher)?;
        }
        Ok(())
    }

    fn compress<B: BlockCipher + ?Sized>(&mut self, cipher: &B) -> PsaResult<()> {
        xor_in_place(&mut self.x, &self.pending);
        cipher.encrypt_block(&mut self.x)?;
        self.fill = 0;
        Ok(())
    }
}

/// CCM state after nonce and lengths are known
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CcmState {
    mac: CbcMac,
    #[zeroize(skip)]
    ctr: CtrStream,
    a0: Block,
    tag_length: usize,
    ad_done: bool,
}

impl CcmState {
    /// Form `B0`, the AD length prefix and the counter blocks
    ///
    /// The caller validates nonce and tag lengths.
    pub fn start<K: SymmetricKey + ?Sized>(
        cipher: &K,
        nonce: &[u8],
        ad_length: usize,
        payload_length: usize,
        tag_length: usize,
    ) -> PsaResult<Self> {
        let q = 15 - nonce.len();
        if q < 8 && (payload_length as u64) >> (8 * q) != 0 {
            return Err(Status::InvalidArgument);
        }

        let adata = u8::from(ad_length > 0);
        let mut b0 = [0u8; AES_BLOCK_SIZE];
        b0[0] = (adata << 6) | ((((tag_length - 2) / 2) as u8) << 3) | (q as u8 - 1);
        b0[1..=nonce.len()].copy_from_slice(nonce);
        let len_bytes = (payload_length as u64).to_be_bytes();
        b0[16 - q..].copy_from_slice(&len_bytes[8 - q..]);

        let mut a0 = [0u8; AES_BLOCK_SIZE];
        a0[0] = q as u8 - 1;
        a0[1..=nonce.len()].copy_from_slice(nonce);
        let mut a1 = a0;
        a1[15] = 1;

        cipher.encrypt_block(&mut b0)?;
        let mut mac = CbcMac {
            x: b0,
            pending: [0u8; AES_BLOCK_SIZE],
            fill: 0,
        };

        if ad_length > 0 {
            if ad_length < 0xFF00 {
                mac.absorb(cipher, &(ad_length as u16).to_be_bytes())?;
            } else if let Ok(len32) = u32::try_from(ad_length) {
                mac.absorb(cipher, &[0xFF, 0xFE])?;
                mac.absorb(cipher, &len32.to_be_bytes())?;
            } else {
                mac.absorb(cipher, &[0xFF, 0xFF])?;
                mac.absorb(cipher, &(ad_length as u64).to_be_bytes())?;
            }
        }

        Ok(Self {
            mac,
            ctr: cipher.ctr_stream(&a1, CounterWidth::Ccm(q)),
            a0,
            tag_length,
            ad_done: false,
        })
    }

    /// Absorb additional data
    pub fn update_ad<B: BlockCipher + ?Sized>(&mut self, cipher: &B, data: &[u8]) -> PsaResult<()> {
        self.mac.absorb(cipher, data)
    }

    /// Encrypt or decrypt `input` into `output[..input.len()]`
    pub fn update<B: BlockCipher + ?Sized>(
        &mut self,
        cipher: &B,
        direction: Direction,
        input: &[u8],
        output: &mut [u8],
    ) -> PsaResult<()> {
        if !self.ad_done {
            self.mac.pad(cipher)?;
            self.ad_done = true;
        }

        match direction {
            Direction::Encrypt => {
                self.mac.absorb(cipher, input)?;
                self.ctr.apply(cipher, input, output)
            }
            Direction::Decrypt => {
                self.ctr.apply(cipher, input, output)?;
                self.mac.absorb(cipher, &output[..input.len()])
            }
        }
    }

    /// Compute the tag into `tag[..tag_length]`
    pub fn finish<B: BlockCipher + ?Sized>(&mut self, cipher: &B, tag: &mut [u8]) -> PsaResult<usize> {
        self.mac.pad(cipher)?;
        self.ad_done = true;

        let mut s0 = self.a0;
        cipher.encrypt_block(&mut s0)?;
        xor_in_place(&mut s0, &self.mac.x);
        tag[..self.tag_length].copy_from_slice(&s0[..self.tag_length]);
        s0.zeroize();
        Ok(self.tag_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AesKey;

    fn hex(s: &str) -> heapless::Vec<u8, 64> {
        (0..s.len() / 2)
            .map(|i| u8::from_str_radix(&s[2 * i..2 * i + 2], 16).unwrap())
            .collect()
    }

    /// NIST SP 800-38C example 1
    #[test]
    fn test_sp800_38c_example1() {
        let key = AesKey::new(&hex("404142434445464748494a4b4c4d4e4f")).unwrap();
        let nonce = hex("10111213141516");
        let ad = hex("0001020304050607");
        let pt = hex("20212223");

        let mut ccm = CcmState::start(&key, &nonce, ad.len(), pt.len(), 4).unwrap();
        ccm.update_ad(&key, &ad).unwrap();
        let mut ct = [0u8; 4];
        ccm.update(&key, Direction::Encrypt, &pt, &mut ct).unwrap();
        let mut tag = [0u8; 16];
        assert_eq!(ccm.finish(&key, &mut tag).unwrap(), 4);

        assert_eq!(&ct, hex("7162015b").as_slice());
        assert_eq!(&tag[..4], hex("4dac255d").as_slice());
    }

    #[test]
    fn test_split_updates_match_single_update() {
        let key = AesKey::new(&[7u8; 16]).unwrap();
        let nonce = [1u8; 13];
        let pt = [0x33u8; 40];

        let mut one = CcmState::start(&key, &nonce, 0, pt.len(), 16).unwrap();
        let mut ct1 = [0u8; 40];
        one.update(&key, Direction::Encrypt, &pt, &mut ct1).unwrap();
        let mut tag1 = [0u8; 16];
        one.finish(&key, &mut tag1).unwrap();

        let mut two = CcmState::start(&key, &nonce, 0, pt.len(), 16).unwrap();
        let mut ct2 = [0u8; 40];
        two.update(&key, Direction::Encrypt, &pt[..7], &mut ct2[..7]).unwrap();
        two.update(&key, Direction::Encrypt, &pt[7..], &mut ct2[7..]).unwrap();
        let mut tag2 = [0u8; 16];
        two.finish(&key, &mut tag2).unwrap();

        assert_eq!(ct1, ct2);
        assert_eq!(tag1, tag2);
    }

    #[test]
    fn test_payload_too_long_for_q() {
        let key = AesKey::new(&[0u8; 16]).unwrap();
        assert!(matches!(
            CcmState::start(&key, &[0u8; 13], 0, 0x1_0000, 16),
            Err(Status::InvalidArgument)
        ));
    }

    #[test]
    fn test_length_rules() {
        assert!(nonce_length_valid(7) && nonce_length_valid(13));
        assert!(!nonce_length_valid(6) && !nonce_length_valid(14));
        assert!(tag_length_valid(4) && tag_length_valid(16));
        assert!(!tag_length_valid(5) && !tag_length_valid(2));
    }
}
