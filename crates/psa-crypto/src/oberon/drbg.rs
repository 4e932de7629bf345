// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! NIST SP 800-90A HMAC_DRBG over SHA-256
//!
//! # Security Features
//!
//! - Reseed enforced after a configurable number of generate calls
//! - Repetition count health test on every entropy input (SP 800-90B 4.4.1)
//! - Secure state zeroization on drop

use crate::zeroize_utils::secure_zero;
use hmac::{Hmac, Mac};
use psa_common::constants::DRBG_MAX_REQUEST_SIZE;
use psa_common::{PsaResult, Status};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Output length of the underlying HMAC
const OUT_LEN: usize = 32;

/// Minimum entropy input for 256-bit security strength
pub const DRBG_MIN_ENTROPY: usize = 32;

/// Repetition count cutoff for H = 8 bits, alpha = 2^-40
const REPETITION_CUTOFF: u8 = 6;

/// SP 800-90B repetition count test over entropy bytes
#[derive(Debug, Clone, Copy)]
pub struct RepetitionCountTest {
    last_sample: Option<u8>,
    count: u8,
}

impl RepetitionCountTest {
    /// Create a fresh test
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_sample: None,
            count: 0,
        }
    }

    /// Feed samples; a run of [`REPETITION_CUTOFF`] identical bytes fails
    pub fn process(&mut self, samples: &[u8]) -> PsaResult<()> {
        for &sample in samples {
            if self.last_sample == Some(sample) {
                self.count = self.count.saturating_add(1);
                if self.count >= REPETITION_CUTOFF {
                    return Err(Status::InsufficientEntropy);
                }
            } else {
                self.last_sample = Some(sample);
                self.count = 1;
            }
        }
        Ok(())
    }
}

impl Default for RepetitionCountTest {
    fn default() -> Self {
        Self::new()
    }
}

/// HMAC_DRBG state (SP 800-90A Section 10.1.2)
pub struct HmacDrbg {
    key: [u8; OUT_LEN],
    v: [u8; OUT_LEN],
    reseed_counter: u32,
    reseed_interval: u32,
    health: RepetitionCountTest,
}

impl HmacDrbg {
    fn mac(key: &[u8], parts: &[&[u8]], out: &mut [u8; OUT_LEN]) -> PsaResult<()> {
        let mut mac = HmacSha256::new_from_slice(key).map_err(|_| Status::CorruptionDetected)?;
        for part in parts {
            mac.update(part);
        }
        out.copy_from_slice(&mac.finalize().into_bytes());
        Ok(())
    }

    /// HMAC_DRBG_Update
    fn update(&mut self, provided: &[&[u8]]) -> PsaResult<()> {
        let empty = provided.iter().all(|p| p.is_empty());
        for round in [0x00u8, 0x01] {
            if round == 0x01 && empty {
                break;
            }
            let mut key = [0u8; OUT_LEN];
            let mut parts: [&[u8]; 4] = [self.v.as_slice(), &[round], &[], &[]];
            for (slot, part) in parts[2..].iter_mut().zip(provided) {
                *slot = part;
            }
            Self::mac(&self.key, &parts, &mut key)?;
            self.key = key;
            secure_zero(&mut key);

            let mut v = [0u8; OUT_LEN];
            Self::mac(&self.key, &[self.v.as_slice()], &mut v)?;
            self.v = v;
        }
        Ok(())
    }

    /// Instantiate (SP 800-90A Section 10.1.2.3)
    ///
    /// `entropy` must carry at least [`DRBG_MIN_ENTROPY`] bytes; the entropy
    /// is health-tested before use.
    pub fn instantiate(
        entropy: &[u8],
        nonce: &[u8],
        personalization: &[u8],
        reseed_interval: u32,
    ) -> PsaResult<Self> {
        if entropy.len() < DRBG_MIN_ENTROPY || reseed_interval == 0 {
            return Err(Status::InsufficientEntropy);
        }
        let mut health = RepetitionCountTest::new();
        health.process(entropy)?;

        let mut drbg = Self {
            key: [0x00; OUT_LEN],
            v: [0x01; OUT_LEN],
            reseed_counter: 1,
            reseed_interval,
            health,
        };
        let mut seed = SeedMaterial::new();
        seed.push(entropy)?;
        seed.push(nonce)?;
        drbg.update(&[seed.as_slice(), personalization])?;
        Ok(drbg)
    }

    /// Reseed (SP 800-90A Section 10.1.2.4)
    pub fn reseed(&mut self, entropy: &[u8], additional: &[u8]) -> PsaResult<()> {
        if entropy.len() < DRBG_MIN_ENTROPY {
            return Err(Status::InsufficientEntropy);
        }
        self.health = RepetitionCountTest::new();
        self.health.process(entropy)?;
        self.update(&[entropy, additional])?;
        self.reseed_counter = 1;
        Ok(())
    }

    /// Check if the next generate call needs a reseed first
    #[must_use]
    pub const fn needs_reseed(&self) -> bool {
        self.reseed_counter > self.reseed_interval
    }

    /// Generate (SP 800-90A Section 10.1.2.5)
    ///
    /// Requests above [`DRBG_MAX_REQUEST_SIZE`] are `InvalidArgument`; a
    /// generate call past the reseed interval is `BadState`.
    pub fn generate(&mut self, output: &mut [u8], additional: &[u8]) -> PsaResult<()> {
        if output.len() > DRBG_MAX_REQUEST_SIZE {
            return Err(Status::InvalidArgument);
        }
        if self.needs_reseed() {
            return Err(Status::BadState);
        }
        if !additional.is_empty() {
            self.update(&[additional])?;
        }

        for chunk in output.chunks_mut(OUT_LEN) {
            let mut v = [0u8; OUT_LEN];
            Self::mac(&self.key, &[self.v.as_slice()], &mut v)?;
            self.v = v;
            chunk.copy_from_slice(&self.v[..chunk.len()]);
        }

        self.update(&[additional])?;
        self.reseed_counter += 1;
        Ok(())
    }
}

impl Drop for HmacDrbg {
    fn drop(&mut self) {
        secure_zero(&mut self.key);
        secure_zero(&mut self.v);
    }
}

/// Entropy input concatenated with the nonce
struct SeedMaterial {
    bytes: [u8; 128],
    len: usize,
}

impl SeedMaterial {
    const fn new() -> Self {
        Self {
            bytes: [0u8; 128],
            len: 0,
        }
    }

    fn push(&mut self, data: &[u8]) -> PsaResult<()> {
        let end = self.len + data.len();
        if end > self.bytes.len() {
            return Err(Status::InvalidArgument);
        }
        self.bytes[self.len..end].copy_from_slice(data);
        self.len = end;
        Ok(())
    }

    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl Drop for SeedMaterial {
    fn drop(&mut self) {
        secure_zero(&mut self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entropy(offset: u8) -> [u8; 32] {
        core::array::from_fn(|i| (i as u8).wrapping_mul(7).wrapping_add(offset))
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let mut a = HmacDrbg::instantiate(&entropy(1), b"nonce", b"", 100).unwrap();
        let mut b = HmacDrbg::instantiate(&entropy(1), b"nonce", b"", 100).unwrap();
        let mut out_a = [0u8; 80];
        let mut out_b = [0u8; 80];
        a.generate(&mut out_a, &[]).unwrap();
        b.generate(&mut out_b, &[]).unwrap();
        assert_eq!(out_a, out_b);
        assert_ne!(out_a, [0u8; 80]);

        a.generate(&mut out_a, &[]).unwrap();
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn test_personalization_and_additional_input_diverge() {
        let mut a = HmacDrbg::instantiate(&entropy(1), b"nonce", b"device-a", 100).unwrap();
        let mut b = HmacDrbg::instantiate(&entropy(1), b"nonce", b"device-b", 100).unwrap();
        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.generate(&mut out_a, &[]).unwrap();
        b.generate(&mut out_b, &[]).unwrap();
        assert_ne!(out_a, out_b);

        let mut c = HmacDrbg::instantiate(&entropy(1), b"nonce", b"device-a", 100).unwrap();
        c.generate(&mut out_b, b"extra").unwrap();
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn test_reseed_interval_enforced() {
        let mut drbg = HmacDrbg::instantiate(&entropy(3), &[], &[], 2).unwrap();
        let mut out = [0u8; 16];
        drbg.generate(&mut out, &[]).unwrap();
        drbg.generate(&mut out, &[]).unwrap();
        assert!(drbg.needs_reseed());
        assert_eq!(drbg.generate(&mut out, &[]), Err(Status::BadState));
        drbg.reseed(&entropy(9), &[]).unwrap();
        drbg.generate(&mut out, &[]).unwrap();
    }

    #[test]
    fn test_rejects_short_or_stuck_entropy() {
        assert!(matches!(
            HmacDrbg::instantiate(&[1u8; 16], &[], &[], 10),
            Err(Status::InsufficientEntropy)
        ));
        assert!(matches!(
            HmacDrbg::instantiate(&[0xAAu8; 32], &[], &[], 10),
            Err(Status::InsufficientEntropy)
        ));
    }

    #[test]
    fn test_request_limit() {
        let mut drbg = HmacDrbg::instantiate(&entropy(5), &[], &[], 10).unwrap();
        let mut big = [0u8; DRBG_MAX_REQUEST_SIZE + 1];
        assert_eq!(drbg.generate(&mut big, &[]), Err(Status::InvalidArgument));
        drbg.generate(&mut big[..DRBG_MAX_REQUEST_SIZE], &[]).unwrap();
    }

    #[test]
    fn test_repetition_count() {
        let mut test = RepetitionCountTest::new();
        test.process(&[1, 1, 1, 1, 1, 2]).unwrap();
        assert_eq!(test.process(&[2, 2, 2, 2, 2]), Err(Status::InsufficientEntropy));
    }
}
