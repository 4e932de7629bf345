// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Process-wide random number generation
//!
//! One HMAC_DRBG instance, seeded from a registered hardware entropy
//! source, serves every caller. The DRBG reseeds itself from the same
//! source once its reseed interval is used up. Requests larger than a
//! single DRBG generate call are split.
//!
//! # Security Features
//!
//! - Seed material is wiped after instantiation and every reseed
//! - [`free_random`] zeroizes the DRBG state
//! - Entropy passes the repetition count health test before use

use crate::oberon::drbg::{HmacDrbg, DRBG_MIN_ENTROPY};
use crate::zeroize_utils::secure_zero;
use core::num::NonZeroU32;
use psa_common::constants::{DRBG_MAX_REQUEST_SIZE, DRBG_SEED_SIZE};
use psa_common::{DriverConfig, PsaResult, Status};
use psa_hal::EntropySource;

/// Entropy source shared with the global DRBG
pub type SharedEntropySource = spin::Mutex<dyn EntropySource + Send>;

const PERSONALIZATION: &[u8] = b"psa-crypto random";

struct RandomContext {
    drbg: Option<HmacDrbg>,
    source: Option<&'static SharedEntropySource>,
}

impl RandomContext {
    const fn new() -> Self {
        Self {
            drbg: None,
            source: None,
        }
    }
}

static RANDOM: spin::Mutex<RandomContext> = spin::Mutex::new(RandomContext::new());

fn draw_entropy(source: &SharedEntropySource, output: &mut [u8]) -> PsaResult<()> {
    let mut source = source.lock();
    if !source.is_ready() {
        return Err(Status::InsufficientEntropy);
    }
    source.fill_entropy(output).map_err(Status::from)
}

/// Install the entropy source used for seeding and reseeding
///
/// Replaces any previous source. An already seeded DRBG keeps its state
/// and draws from the new source at its next reseed.
pub fn register_entropy_source(source: &'static SharedEntropySource) {
    RANDOM.lock().source = Some(source);
}

/// Seed the global DRBG with the default reseed interval
pub fn init_random() -> PsaResult<()> {
    init_random_with_config(&DriverConfig::DEFAULT)
}

/// Seed (or reseed from scratch) the global DRBG
///
/// Draws [`DRBG_SEED_SIZE`] bytes from the entropy source: the first
/// [`DRBG_MIN_ENTROPY`] bytes are the entropy input and the rest the nonce.
pub fn init_random_with_config(config: &DriverConfig) -> PsaResult<()> {
    let mut random = RANDOM.lock();
    let source = random.source.ok_or(Status::InsufficientEntropy)?;

    let mut seed = [0u8; DRBG_SEED_SIZE];
    let result = draw_entropy(source, &mut seed).and_then(|()| {
        let (entropy, nonce) = seed.split_at(DRBG_MIN_ENTROPY);
        HmacDrbg::instantiate(entropy, nonce, PERSONALIZATION, config.drbg_reseed_interval)
    });
    secure_zero(&mut seed);

    random.drbg = Some(result?);
    Ok(())
}

/// Fill `output` from the global DRBG
///
/// [`Status::BadState`] before [`init_random`].
pub fn get_random(output: &mut [u8]) -> PsaResult<()> {
    let mut random = RANDOM.lock();
    let source = random.source;
    let drbg = random.drbg.as_mut().ok_or(Status::BadState)?;

    for chunk in output.chunks_mut(DRBG_MAX_REQUEST_SIZE) {
        if drbg.needs_reseed() {
            let source = source.ok_or(Status::InsufficientEntropy)?;
            let mut entropy = [0u8; DRBG_MIN_ENTROPY];
            let result = draw_entropy(source, &mut entropy)
                .and_then(|()| drbg.reseed(&entropy, &[]));
            secure_zero(&mut entropy);
            result?;
        }
        drbg.generate(chunk, &[])?;
    }
    Ok(())
}

/// Fill `output` straight from the entropy source, bypassing the DRBG
pub fn get_entropy(output: &mut [u8]) -> PsaResult<()> {
    let source = RANDOM.lock().source.ok_or(Status::InsufficientEntropy)?;
    draw_entropy(source, output)
}

/// Check if the global DRBG is seeded
#[must_use]
pub fn is_initialized() -> bool {
    RANDOM.lock().drbg.is_some()
}

/// Wipe the global DRBG; [`get_random`] fails until the next init
pub fn free_random() {
    RANDOM.lock().drbg = None;
}

/// `rand_core` adapter over the global DRBG
#[derive(Debug, Clone, Copy, Default)]
pub struct PsaRng;

fn rand_error(status: Status) -> rand_core::Error {
    let code = rand_core::Error::CUSTOM_START.saturating_add(status.code().unsigned_abs());
    match NonZeroU32::new(code) {
        Some(code) => rand_core::Error::from(code),
        None => rand_core::Error::from(NonZeroU32::MAX),
    }
}

impl rand_core::RngCore for PsaRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    /// # Panics
    ///
    /// Panics if the DRBG is not seeded or cannot reseed.
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(status) = get_random(dest) {
            panic!("random generation failed: {}", status.description());
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        get_random(dest).map_err(rand_error)
    }
}

impl rand_core::CryptoRng for PsaRng {}
