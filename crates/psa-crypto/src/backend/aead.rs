// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Multi-part AEAD lifecycle shared by the adapters
//!
//! [`AeadCore`] enforces call ordering, length accounting and tag handling
//! over one of the streaming mode states. Adapters validate key, nonce and
//! tag lengths against their own rules before calling in.
//!
//! Ordering rules:
//!
//! - the nonce is set exactly once, before any input
//! - lengths are declared at most once, before any input
//! - CCM needs both nonce and lengths before input, in either order
//! - additional data is rejected once payload processing has begun

use super::ccm::CcmState;
use super::chachapoly::ChaChaPolyState;
use super::gcm::GcmState;
use super::{LengthTracker, SymmetricKey};
use crate::zeroize_utils::{secure_zero, verify_tag};
use psa_common::constants::{AEAD_TAG_MAX_SIZE, CCM_NONCE_MAX_SIZE};
use psa_common::{Algorithm, Direction, PsaResult, Status};

/// AEAD mode, independent of tag length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadMode {
    /// AES-CCM
    Ccm,
    /// AES-GCM
    Gcm,
    /// ChaCha20-Poly1305
    ChaChaPoly,
}

impl AeadMode {
    /// Mode of an AEAD identifier
    #[must_use]
    pub fn from_algorithm(alg: Algorithm) -> Option<Self> {
        let short = alg.aead_short();
        if short == Algorithm::CCM.aead_short() {
            Some(Self::Ccm)
        } else if short == Algorithm::GCM.aead_short() {
            Some(Self::Gcm)
        } else if short == Algorithm::CHACHA20_POLY1305.aead_short() {
            Some(Self::ChaChaPoly)
        } else {
            None
        }
    }
}

enum Engine {
    /// No nonce yet, or a CCM nonce waiting for lengths
    Pending,
    Ccm(CcmState),
    Gcm(GcmState),
    ChaChaPoly(ChaChaPolyState),
}

/// Shared AEAD state machine
pub struct AeadCore<K> {
    key: K,
    mode: AeadMode,
    direction: Direction,
    tag_length: usize,
    lengths: Option<LengthTracker>,
    nonce: [u8; CCM_NONCE_MAX_SIZE],
    nonce_length: usize,
    nonce_set: bool,
    input_started: bool,
    data_started: bool,
    engine: Engine,
}

impl<K: SymmetricKey> AeadCore<K> {
    /// Configure for one message; no nonce yet
    pub fn new(key: K, mode: AeadMode, direction: Direction, tag_length: usize) -> Self {
        Self {
            key,
            mode,
            direction,
            tag_length,
            lengths: None,
            nonce: [0u8; CCM_NONCE_MAX_SIZE],
            nonce_length: 0,
            nonce_set: false,
            input_started: false,
            data_started: false,
            engine: Engine::Pending,
        }
    }

    /// AEAD mode
    #[must_use]
    pub const fn mode(&self) -> AeadMode {
        self.mode
    }

    /// Tag length recorded at setup
    #[must_use]
    pub const fn tag_length(&self) -> usize {
        self.tag_length
    }

    fn start_ccm(&mut self) -> PsaResult<()> {
        if let Some(lengths) = self.lengths {
            let state = CcmState::start(
                &self.key,
                &self.nonce[..self.nonce_length],
                lengths.ad_total(),
                lengths.data_total(),
                self.tag_length,
            )?;
            self.engine = Engine::Ccm(state);
        }
        Ok(())
    }

    /// Set the nonce
    ///
    /// The caller has already checked the length against its driver's rules.
    pub fn set_nonce(&mut self, nonce: &[u8]) -> PsaResult<()> {
        if self.nonce_set {
            return Err(Status::BadState);
        }
        match self.mode {
            AeadMode::Ccm => {
                if nonce.len() > CCM_NONCE_MAX_SIZE {
                    return Err(Status::InvalidArgument);
                }
                self.nonce[..nonce.len()].copy_from_slice(nonce);
                self.nonce_length = nonce.len();
                self.start_ccm()?;
            }
            AeadMode::Gcm => {
                self.engine = Engine::Gcm(GcmState::start(&self.key, nonce)?);
            }
            AeadMode::ChaChaPoly => {
                let key = self.key.chacha_key().ok_or(Status::CorruptionDetected)?;
                self.engine = Engine::ChaChaPoly(ChaChaPolyState::start(key, nonce)?);
            }
        }
        self.nonce_set = true;
        Ok(())
    }

    /// Declare total additional-data and payload lengths
    pub fn set_lengths(&mut self, ad_length: usize, payload_length: usize) -> PsaResult<()> {
        if self.lengths.is_some() || self.input_started {
            return Err(Status::BadState);
        }
        self.lengths = Some(LengthTracker::new(ad_length, payload_length));
        if self.mode == AeadMode::Ccm && self.nonce_set {
            if let Err(e) = self.start_ccm() {
                self.lengths = None;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Absorb additional data
    pub fn update_ad(&mut self, input: &[u8]) -> PsaResult<()> {
        if self.data_started || matches!(self.engine, Engine::Pending) {
            return Err(Status::BadState);
        }
        if let Some(lengths) = self.lengths.as_mut() {
            lengths.consume_ad(input.len())?;
        }
        self.input_started = true;
        match &mut self.engine {
            Engine::Ccm(state) => state.update_ad(&self.key, input),
            Engine::Gcm(state) => {
                state.update_ad(input);
                Ok(())
            }
            Engine::ChaChaPoly(state) => {
                state.update_ad(input);
                Ok(())
            }
            Engine::Pending => Err(Status::BadState),
        }
    }

    /// Process payload; returns bytes written (always `input.len()`)
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) -> PsaResult<usize> {
        if matches!(self.engine, Engine::Pending) {
            return Err(Status::BadState);
        }
        if input.is_empty() {
            return Ok(0);
        }
        if output.len() < input.len() {
            return Err(Status::BufferTooSmall);
        }
        if let Some(lengths) = self.lengths.as_mut() {
            if lengths.ad_remaining() != 0 {
                return Err(Status::InvalidArgument);
            }
            lengths.consume_data(input.len())?;
        }
        self.input_started = true;
        self.data_started = true;
        let direction = self.direction;
        match &mut self.engine {
            Engine::Ccm(state) => state.update(&self.key, direction, input, output)?,
            Engine::Gcm(state) => state.update(&self.key, direction, input, output)?,
            Engine::ChaChaPoly(state) => state.update(direction, input, output)?,
            Engine::Pending => return Err(Status::BadState),
        }
        Ok(input.len())
    }

    fn compute_tag(&mut self, tag: &mut [u8; AEAD_TAG_MAX_SIZE]) -> PsaResult<()> {
        if let Some(lengths) = self.lengths {
            lengths.check_complete()?;
        }
        match &mut self.engine {
            Engine::Ccm(state) => state.finish(&self.key, tag).map(|_| ()),
            Engine::Gcm(state) => state.finish(&self.key, tag),
            Engine::ChaChaPoly(state) => {
                state.finish(tag);
                Ok(())
            }
            Engine::Pending => Err(Status::BadState),
        }
    }

    /// Produce the tag; returns `(ciphertext_written, tag_written)`
    ///
    /// Nothing is buffered between updates, so the ciphertext part is
    /// always empty.
    pub fn finish(&mut self, _ciphertext: &mut [u8], tag: &mut [u8]) -> PsaResult<(usize, usize)> {
        if self.direction != Direction::Encrypt || matches!(self.engine, Engine::Pending) {
            return Err(Status::BadState);
        }
        if tag.len() < self.tag_length {
            return Err(Status::BufferTooSmall);
        }
        let mut computed = [0u8; AEAD_TAG_MAX_SIZE];
        let result = self.compute_tag(&mut computed);
        if result.is_ok() {
            tag[..self.tag_length].copy_from_slice(&computed[..self.tag_length]);
        }
        secure_zero(&mut computed);
        result.map(|()| (0, self.tag_length))
    }

    /// Check the tag; returns plaintext bytes written (always 0)
    pub fn verify(&mut self, _plaintext: &mut [u8], tag: &[u8]) -> PsaResult<usize> {
        if self.direction != Direction::Decrypt || matches!(self.engine, Engine::Pending) {
            return Err(Status::BadState);
        }
        if tag.len() != self.tag_length {
            return Err(Status::InvalidSignature);
        }
        let mut computed = [0u8; AEAD_TAG_MAX_SIZE];
        let result = self
            .compute_tag(&mut computed)
            .and_then(|()| verify_tag(&computed[..self.tag_length], tag));
        secure_zero(&mut computed);
        result.map(|()| 0)
    }
}

impl<K> Drop for AeadCore<K> {
    fn drop(&mut self) {
        secure_zero(&mut self.nonce);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AesKey, SoftKey};

    fn gcm(direction: Direction) -> AeadCore<SoftKey> {
        let key = SoftKey::Aes(AesKey::new(&[0u8; 16]).unwrap());
        AeadCore::new(key, AeadMode::Gcm, direction, 16)
    }

    fn ccm(direction: Direction) -> AeadCore<SoftKey> {
        let key = SoftKey::Aes(AesKey::new(&[0x40u8; 16]).unwrap());
        AeadCore::new(key, AeadMode::Ccm, direction, 8)
    }

    #[test]
    fn test_mode_from_algorithm() {
        assert_eq!(AeadMode::from_algorithm(Algorithm::CCM.with_shortened_tag(4)), Some(AeadMode::Ccm));
        assert_eq!(AeadMode::from_algorithm(Algorithm::GCM), Some(AeadMode::Gcm));
        assert_eq!(AeadMode::from_algorithm(Algorithm::CHACHA20_POLY1305), Some(AeadMode::ChaChaPoly));
        assert_eq!(AeadMode::from_algorithm(Algorithm::CTR), None);
    }

    #[test]
    fn test_update_before_nonce_is_bad_state() {
        let mut op = gcm(Direction::Encrypt);
        let mut out = [0u8; 4];
        assert_eq!(op.update(b"abcd", &mut out), Err(Status::BadState));
        assert_eq!(op.update_ad(b"ad"), Err(Status::BadState));
    }

    #[test]
    fn test_double_nonce_is_bad_state() {
        let mut op = gcm(Direction::Encrypt);
        op.set_nonce(&[0u8; 12]).unwrap();
        assert_eq!(op.set_nonce(&[0u8; 12]), Err(Status::BadState));
    }

    #[test]
    fn test_ad_after_data_is_bad_state() {
        let mut op = gcm(Direction::Encrypt);
        op.set_nonce(&[0u8; 12]).unwrap();
        let mut out = [0u8; 4];
        op.update(b"data", &mut out).unwrap();
        assert_eq!(op.update_ad(b"late"), Err(Status::BadState));
    }

    #[test]
    fn test_ccm_requires_lengths() {
        let mut op = ccm(Direction::Encrypt);
        op.set_nonce(&[0x10u8; 7]).unwrap();
        assert_eq!(op.update_ad(b"x"), Err(Status::BadState));
        op.set_lengths(1, 0).unwrap();
        op.update_ad(b"x").unwrap();
    }

    #[test]
    fn test_ccm_lengths_before_nonce() {
        let mut a = ccm(Direction::Encrypt);
        a.set_lengths(2, 4).unwrap();
        a.set_nonce(&[0x10u8; 7]).unwrap();
        let mut b = ccm(Direction::Encrypt);
        b.set_nonce(&[0x10u8; 7]).unwrap();
        b.set_lengths(2, 4).unwrap();

        let mut out_a = [0u8; 4];
        let mut out_b = [0u8; 4];
        let mut tag_a = [0u8; 8];
        let mut tag_b = [0u8; 8];
        for (op, out, tag) in [(&mut a, &mut out_a, &mut tag_a), (&mut b, &mut out_b, &mut tag_b)] {
            op.update_ad(b"ad").unwrap();
            op.update(b"data", out).unwrap();
            op.finish(&mut [], tag).unwrap();
        }
        assert_eq!(out_a, out_b);
        assert_eq!(tag_a, tag_b);
    }

    #[test]
    fn test_set_lengths_only_once_before_input() {
        let mut twice = gcm(Direction::Encrypt);
        twice.set_lengths(1, 1).unwrap();
        assert_eq!(twice.set_lengths(1, 1), Err(Status::BadState));

        let mut late = gcm(Direction::Encrypt);
        late.set_nonce(&[0u8; 12]).unwrap();
        late.update_ad(b"ad").unwrap();
        assert_eq!(late.set_lengths(2, 0), Err(Status::BadState));
    }

    #[test]
    fn test_ccm_payload_must_fit_length_field() {
        let mut op = ccm(Direction::Encrypt);
        // 13-byte nonce leaves a 2-byte length field.
        op.set_nonce(&[0x10u8; 13]).unwrap();
        assert_eq!(op.set_lengths(0, 0x1_0000), Err(Status::InvalidArgument));
        op.set_lengths(0, 0xFFFF).unwrap();
    }

    #[test]
    fn test_length_overrun_rejected() {
        let mut op = gcm(Direction::Encrypt);
        op.set_lengths(0, 3).unwrap();
        op.set_nonce(&[0u8; 12]).unwrap();
        let mut out = [0u8; 4];
        assert_eq!(op.update(b"abcd", &mut out), Err(Status::InvalidArgument));
        assert_eq!(op.set_lengths(0, 4), Err(Status::BadState));
    }

    #[test]
    fn test_finish_checks_tag_buffer_then_lengths() {
        let mut op = gcm(Direction::Encrypt);
        op.set_lengths(0, 8).unwrap();
        op.set_nonce(&[0u8; 12]).unwrap();
        let mut short = [0u8; 15];
        assert_eq!(op.finish(&mut [], &mut short), Err(Status::BufferTooSmall));
        let mut tag = [0u8; 16];
        assert_eq!(op.finish(&mut [], &mut tag), Err(Status::InvalidArgument));
    }

    #[test]
    fn test_output_too_small() {
        let mut op = gcm(Direction::Encrypt);
        op.set_nonce(&[0u8; 12]).unwrap();
        let mut out = [0xAAu8; 3];
        assert_eq!(op.update(b"abcd", &mut out), Err(Status::BufferTooSmall));
        assert_eq!(out, [0xAA; 3]);
    }

    #[test]
    fn test_verify_round_trip_and_wrong_tag_length() {
        let mut enc = gcm(Direction::Encrypt);
        enc.set_nonce(&[0u8; 12]).unwrap();
        let mut ct = [0u8; 5];
        enc.update(b"hello", &mut ct).unwrap();
        let mut tag = [0u8; 16];
        assert_eq!(enc.finish(&mut [], &mut tag), Ok((0, 16)));

        let mut dec = gcm(Direction::Decrypt);
        dec.set_nonce(&[0u8; 12]).unwrap();
        let mut pt = [0u8; 5];
        dec.update(&ct, &mut pt).unwrap();
        assert_eq!(dec.verify(&mut [], &tag[..15]), Err(Status::InvalidSignature));

        let mut dec = gcm(Direction::Decrypt);
        dec.set_nonce(&[0u8; 12]).unwrap();
        dec.update(&ct, &mut pt).unwrap();
        assert_eq!(dec.verify(&mut [], &tag), Ok(0));
        assert_eq!(&pt, b"hello");
    }

    #[test]
    fn test_finish_on_decrypt_is_bad_state() {
        let mut op = gcm(Direction::Decrypt);
        op.set_nonce(&[0u8; 12]).unwrap();
        let mut tag = [0u8; 16];
        assert_eq!(op.finish(&mut [], &mut tag), Err(Status::BadState));
    }
}
