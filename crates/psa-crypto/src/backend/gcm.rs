// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Streaming AES-GCM (NIST SP 800-38D)

use super::{xor_in_place, Block, BlockCipher, CounterWidth, CtrStream, SymmetricKey};
use ghash::universal_hash::{KeyInit, UniversalHash};
use ghash::GHash;
use psa_common::constants::AES_BLOCK_SIZE;
use psa_common::{Direction, PsaResult};
use zeroize::Zeroize;

/// GHASH accumulator with a partial-block buffer
#[derive(Clone)]
struct GhashStream {
    ghash: GHash,
    pending: Block,
    fill: usize,
}

impl GhashStream {
    fn absorb(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (AES_BLOCK_SIZE - self.fill).min(data.len());
            self.pending[self.fill..self.fill + take].copy_from_slice(&data[..take]);
            self.fill += take;
            data = &data[take..];
            if self.fill == AES_BLOCK_SIZE {
                self.ghash.update(&[ghash::Block::clone_from_slice(&self.pending)]);
                self.fill = 0;
            }
        }
    }

    fn pad(&mut self) {
        if self.fill > 0 {
            self.ghash.update_padded(&self.pending[..self.fill]);
            self.fill = 0;
        }
    }
}

impl Drop for GhashStream {
    fn drop(&mut self) {
        self.pending.zeroize();
    }
}

/// GCM state after the nonce has been set
#[derive(Clone)]
pub struct GcmState {
    ghash: GhashStream,
    j0: Block,
    ctr: CtrStream,
    ad_length: u64,
    payload_length: u64,
    ad_done: bool,
}

impl GcmState {
    /// Derive `H` and `J0` for `nonce` (any non-empty length)
    pub fn start<K: SymmetricKey + ?Sized>(cipher: &K, nonce: &[u8]) -> PsaResult<Self> {
        let mut h = [0u8; AES_BLOCK_SIZE];
        cipher.encrypt_block(&mut h)?;
        let ghash = GHash::new(ghash::Key::from_slice(&h));
        h.zeroize();

        let mut j0 = [0u8; AES_BLOCK_SIZE];
        if nonce.len() == 12 {
            j0[..12].copy_from_slice(nonce);
            j0[15] = 1;
        } else {
            let mut g = ghash.clone();
            g.update_padded(nonce);
            let mut len_block = [0u8; AES_BLOCK_SIZE];
            len_block[8..].copy_from_slice(&((nonce.len() as u64) * 8).to_be_bytes());
            g.update(&[ghash::Block::clone_from_slice(&len_block)]);
            j0.copy_from_slice(g.finalize().as_slice());
        }

        let mut first = j0;
        let counter = u32::from_be_bytes([first[12], first[13], first[14], first[15]]).wrapping_add(1);
        first[12..].copy_from_slice(&counter.to_be_bytes());

        Ok(Self {
            ghash: GhashStream {
                ghash,
                pending: [0u8; AES_BLOCK_SIZE],
                fill: 0,
            },
            j0,
            ctr: cipher.ctr_stream(&first, CounterWidth::Word),
            ad_length: 0,
            payload_length: 0,
            ad_done: false,
        })
    }

    /// Absorb additional data
    pub fn update_ad(&mut self, data: &[u8]) {
        self.ghash.absorb(data);
        self.ad_length += data.len() as u64;
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
            self.ghash.pad();
            self.ad_done = true;
        }

        match direction {
            Direction::Encrypt => {
                self.ctr.apply(cipher, input, output)?;
                self.ghash.absorb(&output[..input.len()]);
            }
            Direction::Decrypt => {
                self.ghash.absorb(input);
                self.ctr.apply(cipher, input, output)?;
            }
        }
        self.payload_length += input.len() as u64;
        Ok(())
    }

    /// Compute the full 16-byte tag
    pub fn finish<B: BlockCipher + ?Sized>(&mut self, cipher: &B, tag: &mut Block) -> PsaResult<()> {
        self.ghash.pad();
        self.ad_done = true;

        let mut len_block = [0u8; AES_BLOCK_SIZE];
        len_block[..8].copy_from_slice(&(self.ad_length * 8).to_be_bytes());
        len_block[8..].copy_from_slice(&(self.payload_length * 8).to_be_bytes());
        self.ghash
            .ghash
            .update(&[ghash::Block::clone_from_slice(&len_block)]);

        let s = self.ghash.ghash.clone().finalize();
        *tag = self.j0;
        cipher.encrypt_block(tag)?;
        xor_in_place(tag, s.as_slice());
        Ok(())
    }
}

impl Drop for GcmState {
    fn drop(&mut self) {
        self.j0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AesKey;

    fn hex16(s: &str) -> Block {
        let mut out = [0u8; 16];
        for (i, b) in out.iter_mut().enumerate() {
            *b = u8::from_str_radix(&s[2 * i..2 * i + 2], 16).unwrap();
        }
        out
    }

    /// SP 800-38D test case 1: empty plaintext
    #[test]
    fn test_gcm_empty() {
        let key = AesKey::new(&[0u8; 16]).unwrap();
        let mut gcm = GcmState::start(&key, &[0u8; 12]).unwrap();
        let mut tag = [0u8; 16];
        gcm.finish(&key, &mut tag).unwrap();
        assert_eq!(tag, hex16("58e2fccefa7e3061367f1d57a4e7455a"));
    }

    /// SP 800-38D test case 2: one zero block
    #[test]
    fn test_gcm_one_block() {
        let key = AesKey::new(&[0u8; 16]).unwrap();
        let mut gcm = GcmState::start(&key, &[0u8; 12]).unwrap();
        let mut ct = [0u8; 16];
        gcm.update(&key, Direction::Encrypt, &[0u8; 16], &mut ct).unwrap();
        let mut tag = [0u8; 16];
        gcm.finish(&key, &mut tag).unwrap();
        assert_eq!(ct, hex16("0388dace60b6a392f328c2b971b2fe78"));
        assert_eq!(tag, hex16("ab6e47d42cec13bdf53a67b21257bddf"));
    }

    #[test]
    fn test_decrypt_reproduces_tag() {
        let key = AesKey::new(&[9u8; 32]).unwrap();
        let nonce = [3u8; 8];
        let pt = [0x5Au8; 37];

        let mut enc = GcmState::start(&key, &nonce).unwrap();
        enc.update_ad(b"header");
        let mut ct = [0u8; 37];
        enc.update(&key, Direction::Encrypt, &pt, &mut ct).unwrap();
        let mut tag = [0u8; 16];
        enc.finish(&key, &mut tag).unwrap();

        let mut dec = GcmState::start(&key, &nonce).unwrap();
        dec.update_ad(b"head");
        dec.update_ad(b"er");
        let mut out = [0u8; 37];
        dec.update(&key, Direction::Decrypt, &ct[..20], &mut out[..20]).unwrap();
        dec.update(&key, Direction::Decrypt, &ct[20..], &mut out[20..]).unwrap();
        let mut tag2 = [0u8; 16];
        dec.finish(&key, &mut tag2).unwrap();

        assert_eq!(out, pt);
        assert_eq!(tag, tag2);
    }
}
