// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Streaming ChaCha20-Poly1305 (RFC 8439)
//!
//! An 8-byte nonce is zero-extended on the left to the 12-byte IETF form,
//! which matches the original 64-bit-nonce construction for any message
//! shorter than 2^32 blocks.

use super::ChaChaKey;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use poly1305::universal_hash::{KeyInit, UniversalHash};
use poly1305::Poly1305;
use psa_common::{Direction, PsaResult, Status};
use zeroize::Zeroize;

const POLY_BLOCK: usize = 16;

/// ChaCha20-Poly1305 state after the nonce has been set
pub struct ChaChaPolyState {
    cipher: ChaCha20,
    mac: Poly1305,
    pending: [u8; POLY_BLOCK],
    fill: usize,
    ad_length: u64,
    payload_length: u64,
    ad_done: bool,
}

impl ChaChaPolyState {
    /// Derive the one-time Poly1305 key and position the keystream at block 1
    pub fn start(key: &ChaChaKey, nonce: &[u8]) -> PsaResult<Self> {
        let mut iv = [0u8; 12];
        match nonce.len() {
            12 => iv.copy_from_slice(nonce),
            8 => iv[4..].copy_from_slice(nonce),
            _ => return Err(Status::InvalidArgument),
        }

        let mut cipher = ChaCha20::new(
            chacha20::Key::from_slice(key.as_bytes()),
            chacha20::Nonce::from_slice(&iv),
        );
        let mut block0 = [0u8; 64];
        cipher
            .try_apply_keystream(&mut block0)
            .map_err(|_| Status::CorruptionDetected)?;
        let mac = Poly1305::new(poly1305::Key::from_slice(&block0[..32]));
        block0.zeroize();

        Ok(Self {
            cipher,
            mac,
            pending: [0u8; POLY_BLOCK],
            fill: 0,
            ad_length: 0,
            payload_length: 0,
            ad_done: false,
        })
    }

    fn absorb(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (POLY_BLOCK - self.fill).min(data.len());
            self.pending[self.fill..self.fill + take].copy_from_slice(&data[..take]);
            self.fill += take;
            data = &data[take..];
            if self.fill == POLY_BLOCK {
                self.mac
                    .update(&[poly1305::Block::clone_from_slice(&self.pending)]);
                self.fill = 0;
            }
        }
    }

    fn pad(&mut self) {
        if self.fill > 0 {
            self.mac.update_padded(&self.pending[..self.fill]);
            self.fill = 0;
        }
    }

    /// Absorb additional data
    pub fn update_ad(&mut self, data: &[u8]) {
        self.absorb(data);
        self.ad_length += data.len() as u64;
    }

    /// Encrypt or decrypt `input` into `output[..input.len()]`
    pub fn update(&mut self, direction: Direction, input: &[u8], output: &mut [u8]) -> PsaResult<()> {
        if !self.ad_done {
            self.pad();
            self.ad_done = true;
        }

        let out = &mut output[..input.len()];
        if direction == Direction::Decrypt {
            self.absorb(input);
        }
        out.copy_from_slice(input);
        self.cipher
            .try_apply_keystream(out)
            .map_err(|_| Status::InvalidArgument)?;
        if direction == Direction::Encrypt {
            self.absorb(out);
        }

        self.payload_length += input.len() as u64;
        Ok(())
    }

    /// Compute the 16-byte tag
    pub fn finish(&mut self, tag: &mut [u8; 16]) {
        self.pad();
        self.ad_done = true;

        let mut len_block = [0u8; POLY_BLOCK];
        len_block[..8].copy_from_slice(&self.ad_length.to_le_bytes());
        len_block[8..].copy_from_slice(&self.payload_length.to_le_bytes());
        self.mac
            .update(&[poly1305::Block::clone_from_slice(&len_block)]);
        tag.copy_from_slice(self.mac.clone().finalize().as_slice());
    }
}

impl Drop for ChaChaPolyState {
    fn drop(&mut self) {
        self.pending.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> heapless::Vec<u8, 128> {
        (0..s.len() / 2)
            .map(|i| u8::from_str_radix(&s[2 * i..2 * i + 2], 16).unwrap())
            .collect()
    }

    /// RFC 8439 section 2.8.2
    #[test]
    fn test_rfc8439_aead() {
        let key = ChaChaKey::new(&hex(
            "808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9f",
        ))
        .unwrap();
        let nonce = hex("070000004041424344454647");
        let ad = hex("50515253c0c1c2c3c4c5c6c7");
        let pt = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";

        let mut state = ChaChaPolyState::start(&key, &nonce).unwrap();
        state.update_ad(&ad);
        let mut ct = [0u8; 114];
        state.update(Direction::Encrypt, pt, &mut ct).unwrap();
        let mut tag = [0u8; 16];
        state.finish(&mut tag);

        assert_eq!(&ct[..16], hex("d31a8d34648e60db7b86afbc53ef7ec2").as_slice());
        assert_eq!(&tag, hex("1ae10b594f09e26a7e902ecbd0600691").as_slice());
    }

    #[test]
    fn test_short_nonce_is_zero_extended() {
        let key = ChaChaKey::new(&[1u8; 32]).unwrap();
        let mut a = ChaChaPolyState::start(&key, &[5u8; 8]).unwrap();
        let mut long = [0u8; 12];
        long[4..].copy_from_slice(&[5u8; 8]);
        let mut b = ChaChaPolyState::start(&key, &long).unwrap();

        let mut ta = [0u8; 16];
        let mut tb = [0u8; 16];
        a.finish(&mut ta);
        b.finish(&mut tb);
        assert_eq!(ta, tb);
    }

    #[test]
    fn test_bad_nonce_length() {
        let key = ChaChaKey::new(&[0u8; 32]).unwrap();
        assert!(matches!(
            ChaChaPolyState::start(&key, &[0u8; 10]),
            Err(Status::InvalidArgument)
        ));
    }
}
