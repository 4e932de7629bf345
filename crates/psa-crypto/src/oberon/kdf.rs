// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Key derivation over the MAC backends
//!
//! Every family is a keyed PRF (HMAC or AES-CMAC) run in a counter or
//! chaining construction. Inputs are accepted in a fixed order per family;
//! output is produced one PRF block at a time and handed out byte-wise.

use super::OberonDriver;
use crate::backend::mac::MacState;
use crate::driver::KeyDerivationDriver;
use crate::operation::KeyDerivationContext;
use crate::zeroize_utils::{secure_zero, SecretBuffer};
use psa_common::constants::{
    AES_BLOCK_SIZE, HASH_MAX_SIZE, KDF_INFO_MAX_SIZE, KDF_KEY_MAX_SIZE,
    TLS12_PSK_TO_MS_PSK_MAX_SIZE,
};
use psa_common::{Algorithm, KeyDerivationStep, PsaResult, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Hkdf,
    HkdfExtract,
    HkdfExpand,
    Tls12Prf,
    Tls12PskToMs,
    Pbkdf2Hmac,
    Pbkdf2Cmac,
    Sp800Hmac,
    Sp800Cmac,
}

/// One accepted input: step, required before output, position-checked
type Slot = (KeyDerivationStep, bool, bool);

impl Family {
    fn from_algorithm(alg: Algorithm) -> Option<Self> {
        let hashed = alg.get_hash().hash_length() != 0;
        if alg == Algorithm::PBKDF2_AES_CMAC_PRF_128 {
            Some(Self::Pbkdf2Cmac)
        } else if alg == Algorithm::SP800_108_COUNTER_CMAC {
            Some(Self::Sp800Cmac)
        } else if !hashed {
            None
        } else if alg.is_hkdf() {
            Some(Self::Hkdf)
        } else if alg.is_hkdf_extract() {
            Some(Self::HkdfExtract)
        } else if alg.is_hkdf_expand() {
            Some(Self::HkdfExpand)
        } else if alg.is_tls12_prf() {
            Some(Self::Tls12Prf)
        } else if alg.is_tls12_psk_to_ms() {
            Some(Self::Tls12PskToMs)
        } else if alg.is_pbkdf2_hmac() {
            Some(Self::Pbkdf2Hmac)
        } else if alg.is_sp800_108_counter_hmac() {
            Some(Self::Sp800Hmac)
        } else {
            None
        }
    }

    fn inputs(self) -> &'static [Slot] {
        use KeyDerivationStep as S;
        match self {
            Self::Hkdf => &[(S::Salt, false, true), (S::Secret, true, true), (S::Info, true, false)],
            Self::HkdfExtract => &[(S::Salt, false, true), (S::Secret, true, true)],
            Self::HkdfExpand => &[(S::Secret, true, true), (S::Info, true, false)],
            Self::Tls12Prf => &[(S::Seed, true, true), (S::Secret, true, true), (S::Label, true, true)],
            Self::Tls12PskToMs => &[
                (S::Seed, true, true),
                (S::OtherSecret, false, true),
                (S::Secret, true, true),
                (S::Label, true, true),
            ],
            Self::Pbkdf2Hmac | Self::Pbkdf2Cmac => {
                &[(S::Cost, true, true), (S::Salt, true, true), (S::Password, true, true)]
            }
            Self::Sp800Hmac | Self::Sp800Cmac => {
                &[(S::Secret, true, true), (S::Label, false, true), (S::Context, false, true)]
            }
        }
    }

    const fn uses_cmac(self) -> bool {
        matches!(self, Self::Pbkdf2Cmac | Self::Sp800Cmac)
    }
}

/// Oberon key derivation operation
pub struct OberonKeyDerivation {
    family: Family,
    hash: Algorithm,
    capacity: usize,
    received: u16,
    output_started: bool,
    prf: Option<MacState>,
    /// Salt (PBKDF2), seed (TLS) or label (SP 800-108)
    first: SecretBuffer<KDF_INFO_MAX_SIZE>,
    /// Info (HKDF), label (TLS) or context (SP 800-108)
    second: SecretBuffer<KDF_INFO_MAX_SIZE>,
    other_secret: SecretBuffer<TLS12_PSK_TO_MS_PSK_MAX_SIZE>,
    cost: u32,
    block: [u8; HASH_MAX_SIZE],
    chain: [u8; HASH_MAX_SIZE],
    chain_length: usize,
    block_length: usize,
    offset: usize,
    counter: u32,
    k0: [u8; AES_BLOCK_SIZE],
    length_bits: u32,
}

impl OberonKeyDerivation {
    fn setup(alg: Algorithm) -> PsaResult<Self> {
        let family = Family::from_algorithm(alg).ok_or(Status::NotSupported)?;
        let hash = alg.get_hash();
        let block_length = if family.uses_cmac() {
            AES_BLOCK_SIZE
        } else {
            hash.hash_length()
        };
        let capacity = match family {
            Family::Hkdf | Family::HkdfExpand => 255 * block_length,
            Family::HkdfExtract => block_length,
            Family::Tls12Prf | Family::Tls12PskToMs => usize::MAX,
            Family::Pbkdf2Hmac | Family::Pbkdf2Cmac => {
                (u32::MAX as usize).saturating_mul(block_length)
            }
            Family::Sp800Hmac | Family::Sp800Cmac => (u32::MAX / 8) as usize,
        };

        Ok(Self {
            family,
            hash,
            capacity,
            received: 0,
            output_started: false,
            prf: None,
            first: SecretBuffer::new(),
            second: SecretBuffer::new(),
            other_secret: SecretBuffer::new(),
            cost: 0,
            block: [0u8; HASH_MAX_SIZE],
            chain: [0u8; HASH_MAX_SIZE],
            chain_length: 0,
            block_length,
            offset: block_length,
            counter: 0,
            k0: [0u8; AES_BLOCK_SIZE],
            length_bits: 0,
        })
    }

    /// Remaining output capacity
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lower the capacity; raising it is `InvalidArgument`
    pub fn set_capacity(&mut self, capacity: usize) -> PsaResult<()> {
        if capacity > self.capacity {
            return Err(Status::InvalidArgument);
        }
        self.capacity = capacity;
        Ok(())
    }

    fn accept(&mut self, step: KeyDerivationStep) -> PsaResult<()> {
        let inputs = self.family.inputs();
        let position = inputs
            .iter()
            .position(|(s, _, _)| *s == step)
            .ok_or(Status::InvalidArgument)?;
        if self.output_started {
            return Err(Status::BadState);
        }

        let bit = 1u16 << position;
        let repeatable = step == KeyDerivationStep::Salt
            && matches!(self.family, Family::Pbkdf2Hmac | Family::Pbkdf2Cmac);
        if self.received & bit != 0 && !repeatable {
            return Err(Status::BadState);
        }

        let (_, _, ordered) = inputs[position];
        if ordered {
            for (i, (_, required, slot_ordered)) in inputs.iter().enumerate() {
                if !slot_ordered {
                    continue;
                }
                let seen = self.received & (1 << i) != 0;
                if (i < position && *required && !seen) || (i > position && seen) {
                    return Err(Status::BadState);
                }
            }
        }
        self.received |= bit;
        Ok(())
    }

    fn hmac(&self, key: &[u8]) -> PsaResult<MacState> {
        MacState::hmac(self.hash, key)
    }

    /// Supply a byte-string input
    pub fn input_bytes(&mut self, step: KeyDerivationStep, data: &[u8]) -> PsaResult<()> {
        use KeyDerivationStep as S;
        if step == S::Cost {
            return Err(Status::InvalidArgument);
        }
        let before = self.received;
        self.accept(step)?;
        let result = self.absorb(step, data);
        if result.is_err() {
            self.received = before;
        }
        result
    }

    fn absorb(&mut self, step: KeyDerivationStep, data: &[u8]) -> PsaResult<()> {
        use KeyDerivationStep as S;
        match (self.family, step) {
            (Family::Hkdf | Family::HkdfExtract, S::Salt) => {
                self.prf = Some(self.hmac(data)?);
            }
            (Family::Hkdf | Family::HkdfExtract, S::Secret) => {
                let mut prf = match self.prf.take() {
                    Some(prf) => prf,
                    None => self.hmac(&[0u8; HASH_MAX_SIZE][..self.block_length])?,
                };
                prf.update(data);
                let mut prk = [0u8; HASH_MAX_SIZE];
                prf.finish(&mut prk)?;
                if self.family == Family::HkdfExtract {
                    self.block = prk;
                    self.offset = 0;
                } else {
                    self.prf = Some(self.hmac(&prk[..self.block_length])?);
                }
                secure_zero(&mut prk);
            }
            (Family::HkdfExpand | Family::Tls12Prf | Family::Sp800Hmac, S::Secret) => {
                self.prf = Some(self.hmac(data)?);
            }
            (Family::Sp800Cmac, S::Secret) => {
                self.prf = Some(MacState::cmac(data)?);
            }
            (Family::Tls12PskToMs, S::Secret) => {
                if data.len() > TLS12_PSK_TO_MS_PSK_MAX_SIZE {
                    return Err(Status::InvalidArgument);
                }
                let mut premaster = SecretBuffer::<KDF_KEY_MAX_SIZE>::new();
                let psk_length = (data.len() as u16).to_be_bytes();
                if self.other_secret.is_empty() {
                    premaster.extend(&psk_length)?;
                    for _ in 0..data.len() {
                        premaster.extend(&[0])?;
                    }
                } else {
                    premaster.extend(&(self.other_secret.len() as u16).to_be_bytes())?;
                    premaster.extend(self.other_secret.as_slice())?;
                }
                premaster.extend(&psk_length)?;
                premaster.extend(data)?;
                self.prf = Some(self.hmac(premaster.as_slice())?);
            }
            (Family::Tls12PskToMs, S::OtherSecret) => {
                self.other_secret = SecretBuffer::from_slice(data)?;
            }
            (Family::Pbkdf2Hmac, S::Password) => {
                self.prf = Some(self.hmac(data)?);
            }
            (Family::Pbkdf2Cmac, S::Password) => {
                let prf = if data.len() == AES_BLOCK_SIZE {
                    MacState::cmac(data)?
                } else {
                    let mut reduce = MacState::cmac(&[0u8; AES_BLOCK_SIZE])?;
                    reduce.update(data);
                    let mut key = [0u8; AES_BLOCK_SIZE];
                    reduce.finish(&mut key)?;
                    let prf = MacState::cmac(&key);
                    secure_zero(&mut key);
                    prf?
                };
                self.prf = Some(prf);
            }
            (Family::Tls12Prf | Family::Tls12PskToMs, S::Seed)
            | (Family::Pbkdf2Hmac | Family::Pbkdf2Cmac, S::Salt)
            | (Family::Sp800Hmac | Family::Sp800Cmac, S::Label) => {
                self.first.extend(data)?;
            }
            (Family::Hkdf | Family::HkdfExpand, S::Info)
            | (Family::Tls12Prf | Family::Tls12PskToMs, S::Label)
            | (Family::Sp800Hmac | Family::Sp800Cmac, S::Context) => {
                self.second.extend(data)?;
            }
            _ => return Err(Status::InvalidArgument),
        }
        Ok(())
    }

    /// Supply an integer input (PBKDF2 iteration count)
    pub fn input_integer(&mut self, step: KeyDerivationStep, value: u64) -> PsaResult<()> {
        if step != KeyDerivationStep::Cost {
            return Err(Status::InvalidArgument);
        }
        let cost = u32::try_from(value).map_err(|_| Status::NotSupported)?;
        if cost == 0 {
            return Err(Status::InvalidArgument);
        }
        self.accept(step)?;
        self.cost = cost;
        Ok(())
    }

    fn start_output(&mut self) -> PsaResult<()> {
        for (i, (_, required, _)) in self.family.inputs().iter().enumerate() {
            if *required && self.received & (1 << i) == 0 {
                return Err(Status::BadState);
            }
        }
        if matches!(self.family, Family::Sp800Hmac | Family::Sp800Cmac) {
            self.length_bits = u32::try_from(self.capacity.saturating_mul(8))
                .map_err(|_| Status::InvalidArgument)?;
            if self.family == Family::Sp800Cmac {
                let mut mac = self.prf.clone().ok_or(Status::BadState)?;
                self.sp800_fixed_input(&mut mac);
                let mut k0 = [0u8; HASH_MAX_SIZE];
                mac.finish(&mut k0)?;
                self.k0.copy_from_slice(&k0[..AES_BLOCK_SIZE]);
                secure_zero(&mut k0);
            }
        }
        self.output_started = true;
        Ok(())
    }

    fn sp800_fixed_input(&self, mac: &mut MacState) {
        mac.update(self.first.as_slice());
        mac.update(&[0]);
        mac.update(self.second.as_slice());
        mac.update(&self.length_bits.to_be_bytes());
    }

    fn next_block(&mut self) -> PsaResult<()> {
        let prf = self.prf.as_ref().ok_or(Status::BadState)?;
        self.counter = self.counter.checked_add(1).ok_or(Status::InsufficientData)?;
        let len = self.block_length;
        let mut mac = prf.clone();

        match self.family {
            Family::HkdfExtract => return Err(Status::InsufficientData),
            Family::Hkdf | Family::HkdfExpand => {
                let index = u8::try_from(self.counter).map_err(|_| Status::InsufficientData)?;
                mac.update(&self.chain[..self.chain_length]);
                mac.update(self.second.as_slice());
                mac.update(&[index]);
                mac.finish(&mut self.block)?;
                self.chain = self.block;
                self.chain_length = len;
            }
            Family::Tls12Prf | Family::Tls12PskToMs => {
                let mut a = prf.clone();
                if self.counter == 1 {
                    a.update(self.second.as_slice());
                    a.update(self.first.as_slice());
                } else {
                    a.update(&self.chain[..len]);
                }
                a.finish(&mut self.chain)?;
                mac.update(&self.chain[..len]);
                mac.update(self.second.as_slice());
                mac.update(self.first.as_slice());
                mac.finish(&mut self.block)?;
            }
            Family::Pbkdf2Hmac | Family::Pbkdf2Cmac => {
                mac.update(self.first.as_slice());
                mac.update(&self.counter.to_be_bytes());
                mac.finish(&mut self.chain)?;
                self.block = self.chain;
                for _ in 1..self.cost {
                    let mut round = prf.clone();
                    round.update(&self.chain[..len]);
                    round.finish(&mut self.chain)?;
                    crate::backend::xor_in_place(&mut self.block[..len], &self.chain[..len]);
                }
            }
            Family::Sp800Hmac | Family::Sp800Cmac => {
                mac.update(&self.counter.to_be_bytes());
                self.sp800_fixed_input(&mut mac);
                if self.family == Family::Sp800Cmac {
                    mac.update(&self.k0);
                }
                mac.finish(&mut self.block)?;
            }
        }
        self.offset = 0;
        Ok(())
    }

    /// Fill `output` with derived bytes
    ///
    /// A request larger than the remaining capacity drains it and fails
    /// with [`Status::InsufficientData`]. Capacity is charged only once the
    /// whole request has been produced; a failure part way drains it and
    /// wipes `output`.
    pub fn output_bytes(&mut self, output: &mut [u8]) -> PsaResult<()> {
        if !self.output_started {
            self.start_output()?;
        }
        if output.len() > self.capacity {
            self.capacity = 0;
            return Err(Status::InsufficientData);
        }

        let result = self.fill(output);
        match result {
            Ok(()) => self.capacity -= output.len(),
            Err(_) => {
                self.capacity = 0;
                secure_zero(output);
            }
        }
        result
    }

    fn fill(&mut self, output: &mut [u8]) -> PsaResult<()> {
        let mut written = 0;
        while written < output.len() {
            if self.offset == self.block_length {
                self.next_block()?;
            }
            let take = (self.block_length - self.offset).min(output.len() - written);
            output[written..written + take]
                .copy_from_slice(&self.block[self.offset..self.offset + take]);
            self.offset += take;
            written += take;
        }
        Ok(())
    }
}

impl Drop for OberonKeyDerivation {
    fn drop(&mut self) {
        secure_zero(&mut self.block);
        secure_zero(&mut self.chain);
        secure_zero(&mut self.k0);
    }
}

impl KeyDerivationDriver for OberonDriver {
    fn key_derivation_setup(&self, alg: Algorithm) -> PsaResult<KeyDerivationContext> {
        OberonKeyDerivation::setup(alg).map(KeyDerivationContext::Oberon)
    }
}
