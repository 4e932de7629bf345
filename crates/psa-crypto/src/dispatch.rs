// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Driver dispatch wrapper
//!
//! Setup calls walk a per-family chain of registered drivers in priority
//! order (hardware first, then the software fallbacks) and stop at the
//! first driver that answers anything other than [`Status::NotSupported`].
//! Only drivers that own the key's location are asked. Every later call on
//! a multi-part operation goes straight to the context the claiming driver
//! returned, so the chain is never searched twice for one operation.
//!
//! # Policy
//!
//! The wrapper applies the configuration gates before any driver sees the
//! request: SHA-1 based hashes, MACs, key derivations and signatures are
//! refused unless allowed, and PBKDF2 costs above the configured limit are
//! refused.
//!
//! # Message signatures
//!
//! `sign_message` and `verify_message` first offer the whole message to the
//! signature chain. If every driver declines a hash-and-sign algorithm, the
//! wrapper computes the digest through the hash chain and signs or checks
//! it through `sign_hash`/`verify_hash`.
//!
//! # Logging
//!
//! Registration, driver selection, fallbacks and refused requests are
//! recorded in the wrapper's [`LogBuffer`]. Keys, nonces, tags and data
//! never reach the log.

use crate::cc3xx::Cc3xxDriver;
use crate::cracen::CracenDriver;
use crate::driver::{
    AeadDriver, CipherDriver, Driver, HashDriver, KeyAgreementDriver, KeyDerivationDriver,
    KeyManagementDriver, MacDriver, SignatureDriver,
};
use crate::oberon::OberonDriver;
use crate::operation::{
    AeadOperation, CipherOperation, HashOperation, KeyDerivationOperation, MacOperation,
};
use crate::random;
use crate::sizes;
use crate::zeroize_utils::{secure_zero, verify_tag};
use heapless::Vec;
use psa_common::constants::{AEAD_NONCE_MAX_SIZE, CIPHER_IV_MAX_SIZE, HASH_MAX_SIZE, MAX_DRIVERS};
use psa_common::{
    log_debug, log_info, log_trace, log_warn, Algorithm, Direction, DriverConfig, KeyAttributes,
    KeyDerivationStep, KeyLocation, LogBuffer, PsaResult, Status,
};

const MODULE: &str = "dispatch";

/// Locations with at least one driver family behind them
const KNOWN_LOCATIONS: [KeyLocation; 3] = [
    KeyLocation::LOCAL_STORAGE,
    KeyLocation::CRACEN,
    KeyLocation::CRACEN_KMU,
];

type Chain<'a, D> = Vec<&'a D, MAX_DRIVERS>;

/// The built-in drivers, owned in one place
#[derive(Debug)]
pub struct DriverSet {
    /// CC3XX hardware driver
    pub cc3xx: Cc3xxDriver,
    /// Oberon software driver
    pub oberon: OberonDriver,
    /// CRACEN software driver
    pub cracen: CracenDriver,
}

impl DriverSet {
    /// Driver set with a hardware driver
    #[must_use]
    pub const fn new(cc3xx: Cc3xxDriver) -> Self {
        Self {
            cc3xx,
            oberon: OberonDriver::new(),
            cracen: CracenDriver::new(),
        }
    }

    /// Software drivers only; the CC3XX slot has no engine
    #[must_use]
    pub const fn software() -> Self {
        Self::new(Cc3xxDriver::unavailable())
    }
}

/// Routes PSA operations to the registered drivers
pub struct DriverWrapper<'a> {
    config: DriverConfig,
    aead: Chain<'a, dyn AeadDriver + 'a>,
    cipher: Chain<'a, dyn CipherDriver + 'a>,
    hash: Chain<'a, dyn HashDriver + 'a>,
    mac: Chain<'a, dyn MacDriver + 'a>,
    key_derivation: Chain<'a, dyn KeyDerivationDriver + 'a>,
    signature: Chain<'a, dyn SignatureDriver + 'a>,
    key_agreement: Chain<'a, dyn KeyAgreementDriver + 'a>,
    key_management: Chain<'a, dyn KeyManagementDriver + 'a>,
    log: spin::Mutex<LogBuffer>,
}

macro_rules! register {
    ($(#[$doc:meta])* $fn:ident, $chain:ident, $trait:ident, $family:literal) => {
        $(#[$doc])*
        ///
        /// Drivers disabled in the configuration are skipped. A full chain
        /// is [`Status::InsufficientMemory`].
        pub fn $fn(&mut self, driver: &'a (dyn $trait + 'a)) -> PsaResult<()> {
            let id = driver.id();
            if !self.config.is_enabled(id) {
                log_debug!(self.log.lock(), MODULE, "{}: {} disabled", $family, id);
                return Ok(());
            }
            self.$chain
                .push(driver)
                .map_err(|_| Status::InsufficientMemory)?;
            log_info!(self.log.lock(), MODULE, "{}: registered {}", $family, id);
            Ok(())
        }
    };
}

impl<'a> DriverWrapper<'a> {
    /// Wrapper with empty chains
    #[must_use]
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            aead: Vec::new(),
            cipher: Vec::new(),
            hash: Vec::new(),
            mac: Vec::new(),
            key_derivation: Vec::new(),
            signature: Vec::new(),
            key_agreement: Vec::new(),
            key_management: Vec::new(),
            log: spin::Mutex::new(LogBuffer::with_level(config.log_level)),
        }
    }

    /// Wrapper over a [`DriverSet`] in the standard priority order
    ///
    /// AEAD and cipher chains run CC3XX, Oberon, CRACEN; hash, signature
    /// and key agreement run the same order; MAC runs CC3XX, Oberon; key
    /// derivation is Oberon only; key management runs Oberon, CRACEN.
    pub fn from_set(set: &'a DriverSet, config: DriverConfig) -> PsaResult<Self> {
        let mut wrapper = Self::new(config);
        wrapper.register_aead(&set.cc3xx)?;
        wrapper.register_aead(&set.oberon)?;
        wrapper.register_aead(&set.cracen)?;
        wrapper.register_cipher(&set.cc3xx)?;
        wrapper.register_cipher(&set.oberon)?;
        wrapper.register_cipher(&set.cracen)?;
        wrapper.register_hash(&set.cc3xx)?;
        wrapper.register_hash(&set.oberon)?;
        wrapper.register_hash(&set.cracen)?;
        wrapper.register_mac(&set.cc3xx)?;
        wrapper.register_mac(&set.oberon)?;
        wrapper.register_key_derivation(&set.oberon)?;
        wrapper.register_signature(&set.cc3xx)?;
        wrapper.register_signature(&set.oberon)?;
        wrapper.register_signature(&set.cracen)?;
        wrapper.register_key_agreement(&set.cc3xx)?;
        wrapper.register_key_agreement(&set.oberon)?;
        wrapper.register_key_agreement(&set.cracen)?;
        wrapper.register_key_management(&set.oberon)?;
        wrapper.register_key_management(&set.cracen)?;
        Ok(wrapper)
    }

    register!(
        /// Append an AEAD driver to the chain
        register_aead, aead, AeadDriver, "aead"
    );
    register!(
        /// Append a cipher driver to the chain
        register_cipher, cipher, CipherDriver, "cipher"
    );
    register!(
        /// Append a hash driver to the chain
        register_hash, hash, HashDriver, "hash"
    );
    register!(
        /// Append a MAC driver to the chain
        register_mac, mac, MacDriver, "mac"
    );
    register!(
        /// Append a key derivation driver to the chain
        register_key_derivation, key_derivation, KeyDerivationDriver, "kdf"
    );
    register!(
        /// Append a signature driver to the chain
        register_signature, signature, SignatureDriver, "sign"
    );
    register!(
        /// Append a key agreement driver to the chain
        register_key_agreement, key_agreement, KeyAgreementDriver, "agree"
    );
    register!(
        /// Append a key management driver to the chain
        register_key_management, key_management, KeyManagementDriver, "keys"
    );

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Read access to the wrapper log
    pub fn with_log<R>(&self, f: impl FnOnce(&LogBuffer) -> R) -> R {
        f(&self.log.lock())
    }

    // =========================================================================
    // Chain walking and policy
    // =========================================================================

    /// Ask each eligible driver in turn until one answers
    fn dispatch<D, T>(
        &self,
        family: &'static str,
        chain: &[&'a D],
        location: Option<KeyLocation>,
        mut attempt: impl FnMut(&D) -> PsaResult<T>,
    ) -> PsaResult<T>
    where
        D: Driver + ?Sized,
    {
        if let Some(location) = location {
            if !KNOWN_LOCATIONS.contains(&location) {
                log_warn!(
                    self.log.lock(),
                    MODULE,
                    "{}: unknown key location {:#08x}",
                    family,
                    location.raw()
                );
                return Err(Status::InvalidArgument);
            }
        }

        for driver in chain {
            if location.map_or(false, |l| !driver.supports_location(l)) {
                continue;
            }
            match attempt(driver) {
                Err(Status::NotSupported) => {
                    log_debug!(self.log.lock(), MODULE, "{}: {} declined", family, driver.id());
                }
                Ok(value) => {
                    log_trace!(self.log.lock(), MODULE, "{}: claimed by {}", family, driver.id());
                    return Ok(value);
                }
                Err(status) => {
                    log_debug!(
                        self.log.lock(),
                        MODULE,
                        "{}: {} failed {}",
                        family,
                        driver.id(),
                        status.code()
                    );
                    return Err(status);
                }
            }
        }

        log_debug!(self.log.lock(), MODULE, "{}: no driver", family);
        Err(Status::NotSupported)
    }

    /// SHA-1 gate for a hash algorithm (or the hash inside an HMAC/KDF)
    fn check_hash_policy(&self, family: &'static str, hash: Algorithm) -> PsaResult<()> {
        if self.config.hash_permitted(hash) {
            Ok(())
        } else {
            log_warn!(self.log.lock(), MODULE, "{}: {:?} refused by policy", family, hash);
            Err(Status::NotSupported)
        }
    }

    // =========================================================================
    // AEAD
    // =========================================================================

    fn aead_setup(
        &self,
        operation: &mut AeadOperation,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<()> {
        if operation.is_active() {
            return Err(Status::BadState);
        }
        let ctx = self.dispatch("aead", &self.aead[..], Some(attributes.location()), |d| {
            d.aead_setup(direction, attributes, key, alg)
        })?;
        operation.activate(alg, ctx);
        Ok(())
    }

    /// Start a multi-part AEAD encryption
    pub fn aead_encrypt_setup(
        &self,
        operation: &mut AeadOperation,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<()> {
        self.aead_setup(operation, Direction::Encrypt, attributes, key, alg)
    }

    /// Start a multi-part AEAD decryption
    pub fn aead_decrypt_setup(
        &self,
        operation: &mut AeadOperation,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<()> {
        self.aead_setup(operation, Direction::Decrypt, attributes, key, alg)
    }

    /// Set the nonce
    pub fn aead_set_nonce(&self, operation: &mut AeadOperation, nonce: &[u8]) -> PsaResult<()> {
        operation.active_context()?.set_nonce(nonce)
    }

    /// Generate a random nonce of the algorithm's default length and set it
    pub fn aead_generate_nonce(
        &self,
        operation: &mut AeadOperation,
        nonce: &mut [u8],
    ) -> PsaResult<usize> {
        let length = sizes::aead_default_nonce_length(operation.algorithm());
        if length == 0 {
            return Err(Status::BadState);
        }
        if nonce.len() < length {
            return Err(Status::BufferTooSmall);
        }
        let mut fresh = [0u8; AEAD_NONCE_MAX_SIZE];
        random::get_random(&mut fresh[..length])?;
        let result = operation.active_context()?.set_nonce(&fresh[..length]);
        if result.is_ok() {
            nonce[..length].copy_from_slice(&fresh[..length]);
        }
        secure_zero(&mut fresh);
        result.map(|()| length)
    }

    /// Declare total additional-data and payload lengths
    pub fn aead_set_lengths(
        &self,
        operation: &mut AeadOperation,
        ad_length: usize,
        payload_length: usize,
    ) -> PsaResult<()> {
        operation
            .active_context()?
            .set_lengths(ad_length, payload_length)
    }

    /// Absorb additional data
    pub fn aead_update_ad(&self, operation: &mut AeadOperation, input: &[u8]) -> PsaResult<()> {
        operation.active_context()?.update_ad(input)
    }

    /// Process payload; returns bytes written
    pub fn aead_update(
        &self,
        operation: &mut AeadOperation,
        input: &[u8],
        output: &mut [u8],
    ) -> PsaResult<usize> {
        operation.active_context()?.update(input, output)
    }

    /// Finish encryption; returns `(ciphertext_written, tag_written)`
    ///
    /// The operation is wiped whether or not this succeeds.
    pub fn aead_finish(
        &self,
        operation: &mut AeadOperation,
        ciphertext: &mut [u8],
        tag: &mut [u8],
    ) -> PsaResult<(usize, usize)> {
        let result = operation
            .active_context()
            .and_then(|ctx| ctx.finish(ciphertext, tag));
        operation.reset();
        result
    }

    /// Finish decryption and check `tag`; returns plaintext bytes written
    ///
    /// The operation is wiped whether or not this succeeds.
    pub fn aead_verify(
        &self,
        operation: &mut AeadOperation,
        plaintext: &mut [u8],
        tag: &[u8],
    ) -> PsaResult<usize> {
        let result = operation
            .active_context()
            .and_then(|ctx| ctx.verify(plaintext, tag));
        operation.reset();
        result
    }

    /// Abandon the operation; always succeeds
    pub fn aead_abort(&self, operation: &mut AeadOperation) -> PsaResult<()> {
        operation.reset();
        Ok(())
    }

    /// One-shot AEAD encryption; `ciphertext` receives payload then tag
    #[allow(clippy::too_many_arguments)]
    pub fn aead_encrypt(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        nonce: &[u8],
        additional_data: &[u8],
        plaintext: &[u8],
        ciphertext: &mut [u8],
    ) -> PsaResult<usize> {
        self.dispatch("aead", &self.aead[..], Some(attributes.location()), |d| {
            d.aead_encrypt(attributes, key, alg, nonce, additional_data, plaintext, ciphertext)
        })
    }

    /// One-shot AEAD decryption of payload-then-tag `ciphertext`
    #[allow(clippy::too_many_arguments)]
    pub fn aead_decrypt(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        nonce: &[u8],
        additional_data: &[u8],
        ciphertext: &[u8],
        plaintext: &mut [u8],
    ) -> PsaResult<usize> {
        self.dispatch("aead", &self.aead[..], Some(attributes.location()), |d| {
            d.aead_decrypt(attributes, key, alg, nonce, additional_data, ciphertext, plaintext)
        })
    }

    // =========================================================================
    // Cipher
    // =========================================================================

    fn cipher_setup(
        &self,
        operation: &mut CipherOperation,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<()> {
        if operation.is_active() {
            return Err(Status::BadState);
        }
        let ctx = self.dispatch("cipher", &self.cipher[..], Some(attributes.location()), |d| {
            d.cipher_setup(direction, attributes, key, alg)
        })?;
        operation.activate(alg, ctx);
        Ok(())
    }

    /// Start a multi-part cipher encryption
    pub fn cipher_encrypt_setup(
        &self,
        operation: &mut CipherOperation,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<()> {
        self.cipher_setup(operation, Direction::Encrypt, attributes, key, alg)
    }

    /// Start a multi-part cipher decryption
    pub fn cipher_decrypt_setup(
        &self,
        operation: &mut CipherOperation,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<()> {
        self.cipher_setup(operation, Direction::Decrypt, attributes, key, alg)
    }

    /// Set the IV
    pub fn cipher_set_iv(&self, operation: &mut CipherOperation, iv: &[u8]) -> PsaResult<()> {
        operation.active_context()?.set_iv(iv)
    }

    /// Generate a random IV of the mode's length and set it
    pub fn cipher_generate_iv(
        &self,
        operation: &mut CipherOperation,
        iv: &mut [u8],
    ) -> PsaResult<usize> {
        let ctx = operation.active_context()?;
        let length = ctx.mode().map_or(0, |m| m.iv_length());
        if length == 0 {
            return Err(Status::BadState);
        }
        if iv.len() < length {
            return Err(Status::BufferTooSmall);
        }
        let mut fresh = [0u8; CIPHER_IV_MAX_SIZE];
        random::get_random(&mut fresh[..length])?;
        let result = ctx.set_iv(&fresh[..length]);
        if result.is_ok() {
            iv[..length].copy_from_slice(&fresh[..length]);
        }
        secure_zero(&mut fresh);
        result.map(|()| length)
    }

    /// Process input; returns bytes written
    pub fn cipher_update(
        &self,
        operation: &mut CipherOperation,
        input: &[u8],
        output: &mut [u8],
    ) -> PsaResult<usize> {
        operation.active_context()?.update(input, output)
    }

    /// Flush the final block; returns bytes written
    ///
    /// The operation is wiped whether or not this succeeds.
    pub fn cipher_finish(
        &self,
        operation: &mut CipherOperation,
        output: &mut [u8],
    ) -> PsaResult<usize> {
        let result = operation.active_context().and_then(|ctx| ctx.finish(output));
        operation.reset();
        result
    }

    /// Abandon the operation; always succeeds
    pub fn cipher_abort(&self, operation: &mut CipherOperation) -> PsaResult<()> {
        operation.reset();
        Ok(())
    }

    /// One-shot encryption with a caller-supplied IV; writes ciphertext only
    pub fn cipher_encrypt(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        iv: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> PsaResult<usize> {
        self.dispatch("cipher", &self.cipher[..], Some(attributes.location()), |d| {
            d.cipher_encrypt(attributes, key, alg, iv, input, output)
        })
    }

    /// One-shot decryption of IV-prefixed `input`
    pub fn cipher_decrypt(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        input: &[u8],
        output: &mut [u8],
    ) -> PsaResult<usize> {
        self.dispatch("cipher", &self.cipher[..], Some(attributes.location()), |d| {
            d.cipher_decrypt(attributes, key, alg, input, output)
        })
    }

    // =========================================================================
    // Hash
    // =========================================================================

    /// Start a digest
    pub fn hash_setup(&self, operation: &mut HashOperation, alg: Algorithm) -> PsaResult<()> {
        if operation.is_active() {
            return Err(Status::BadState);
        }
        self.check_hash_policy("hash", alg)?;
        let ctx = self.dispatch("hash", &self.hash[..], None, |d| d.hash_setup(alg))?;
        operation.activate(alg, ctx);
        Ok(())
    }

    /// Absorb input
    pub fn hash_update(&self, operation: &mut HashOperation, input: &[u8]) -> PsaResult<()> {
        operation.active_context()?.update(input)
    }

    /// Write the digest; returns its length
    ///
    /// The operation is wiped whether or not this succeeds.
    pub fn hash_finish(&self, operation: &mut HashOperation, hash: &mut [u8]) -> PsaResult<usize> {
        let result = operation.active_context().and_then(|ctx| ctx.finish(hash));
        operation.reset();
        result
    }

    /// Finish and compare against `expected` in constant time
    ///
    /// The operation is wiped whether or not this succeeds.
    pub fn hash_verify(&self, operation: &mut HashOperation, expected: &[u8]) -> PsaResult<()> {
        let mut computed = [0u8; HASH_MAX_SIZE];
        let result = operation
            .active_context()
            .and_then(|ctx| ctx.finish(&mut computed))
            .and_then(|length| verify_tag(&computed[..length], expected));
        secure_zero(&mut computed);
        operation.reset();
        result
    }

    /// Copy the state of an active `source` into an inactive `target`
    pub fn hash_clone(&self, source: &HashOperation, target: &mut HashOperation) -> PsaResult<()> {
        if !source.is_active() || target.is_active() {
            return Err(Status::BadState);
        }
        target.clone_from_active(source);
        Ok(())
    }

    /// Abandon the operation; always succeeds
    pub fn hash_abort(&self, operation: &mut HashOperation) -> PsaResult<()> {
        operation.reset();
        Ok(())
    }

    /// One-shot digest; returns its length
    pub fn hash_compute(&self, alg: Algorithm, input: &[u8], hash: &mut [u8]) -> PsaResult<usize> {
        self.check_hash_policy("hash", alg)?;
        self.dispatch("hash", &self.hash[..], None, |d| d.hash_compute(alg, input, hash))
    }

    /// One-shot digest compared against `expected` in constant time
    pub fn hash_compare(&self, alg: Algorithm, input: &[u8], expected: &[u8]) -> PsaResult<()> {
        let mut computed = [0u8; HASH_MAX_SIZE];
        let result = self
            .hash_compute(alg, input, &mut computed)
            .and_then(|length| verify_tag(&computed[..length], expected));
        secure_zero(&mut computed);
        result
    }

    // =========================================================================
    // MAC
    // =========================================================================

    fn mac_policy(&self, alg: Algorithm) -> PsaResult<()> {
        if alg.is_hmac() {
            self.check_hash_policy("mac", alg.get_hash())
        } else {
            Ok(())
        }
    }

    fn mac_setup(
        &self,
        operation: &mut MacOperation,
        direction: Direction,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<()> {
        if operation.is_active() {
            return Err(Status::BadState);
        }
        self.mac_policy(alg)?;
        let ctx = self.dispatch("mac", &self.mac[..], Some(attributes.location()), |d| {
            d.mac_setup(direction, attributes, key, alg)
        })?;
        operation.activate(alg, ctx);
        Ok(())
    }

    /// Start a MAC computation
    pub fn mac_sign_setup(
        &self,
        operation: &mut MacOperation,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<()> {
        self.mac_setup(operation, Direction::Encrypt, attributes, key, alg)
    }

    /// Start a MAC verification
    pub fn mac_verify_setup(
        &self,
        operation: &mut MacOperation,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
    ) -> PsaResult<()> {
        self.mac_setup(operation, Direction::Decrypt, attributes, key, alg)
    }

    /// Absorb input
    pub fn mac_update(&self, operation: &mut MacOperation, input: &[u8]) -> PsaResult<()> {
        operation.active_context()?.update(input)
    }

    /// Produce the MAC; returns its length
    ///
    /// The operation is wiped whether or not this succeeds.
    pub fn mac_sign_finish(&self, operation: &mut MacOperation, mac: &mut [u8]) -> PsaResult<usize> {
        let result = operation.active_context().and_then(|ctx| ctx.sign_finish(mac));
        operation.reset();
        result
    }

    /// Check the MAC in constant time
    ///
    /// The operation is wiped whether or not this succeeds.
    pub fn mac_verify_finish(&self, operation: &mut MacOperation, mac: &[u8]) -> PsaResult<()> {
        let result = operation.active_context().and_then(|ctx| ctx.verify_finish(mac));
        operation.reset();
        result
    }

    /// Abandon the operation; always succeeds
    pub fn mac_abort(&self, operation: &mut MacOperation) -> PsaResult<()> {
        operation.reset();
        Ok(())
    }

    /// One-shot MAC; returns its length
    pub fn mac_compute(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        input: &[u8],
        mac: &mut [u8],
    ) -> PsaResult<usize> {
        self.mac_policy(alg)?;
        self.dispatch("mac", &self.mac[..], Some(attributes.location()), |d| {
            d.mac_compute(attributes, key, alg, input, mac)
        })
    }

    /// One-shot MAC verification
    pub fn mac_verify(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        input: &[u8],
        mac: &[u8],
    ) -> PsaResult<()> {
        let mut operation = MacOperation::new();
        self.mac_verify_setup(&mut operation, attributes, key, alg)?;
        if let Err(status) = self.mac_update(&mut operation, input) {
            operation.reset();
            return Err(status);
        }
        self.mac_verify_finish(&mut operation, mac)
    }

    // =========================================================================
    // Key derivation
    // =========================================================================

    /// Start a key derivation
    pub fn key_derivation_setup(
        &self,
        operation: &mut KeyDerivationOperation,
        alg: Algorithm,
    ) -> PsaResult<()> {
        if operation.is_active() {
            return Err(Status::BadState);
        }
        let hash = alg.get_hash();
        if !hash.is_none() {
            self.check_hash_policy("kdf", hash)?;
        }
        let ctx = self.dispatch("kdf", &self.key_derivation[..], None, |d| {
            d.key_derivation_setup(alg)
        })?;
        operation.activate(alg, ctx);
        Ok(())
    }

    /// Remaining output capacity
    pub fn key_derivation_get_capacity(
        &self,
        operation: &mut KeyDerivationOperation,
    ) -> PsaResult<usize> {
        operation.active_context()?.capacity()
    }

    /// Lower the output capacity
    pub fn key_derivation_set_capacity(
        &self,
        operation: &mut KeyDerivationOperation,
        capacity: usize,
    ) -> PsaResult<()> {
        operation.active_context()?.set_capacity(capacity)
    }

    /// Supply a byte-string input step
    pub fn key_derivation_input_bytes(
        &self,
        operation: &mut KeyDerivationOperation,
        step: KeyDerivationStep,
        data: &[u8],
    ) -> PsaResult<()> {
        operation.active_context()?.input_bytes(step, data)
    }

    /// Supply an integer input step
    ///
    /// A PBKDF2 cost above `max_kdf_iterations` is refused.
    pub fn key_derivation_input_integer(
        &self,
        operation: &mut KeyDerivationOperation,
        step: KeyDerivationStep,
        value: u64,
    ) -> PsaResult<()> {
        let ctx = operation.active_context()?;
        if step == KeyDerivationStep::Cost && value > u64::from(self.config.max_kdf_iterations) {
            log_warn!(self.log.lock(), MODULE, "kdf: cost {} refused by policy", value);
            return Err(Status::NotSupported);
        }
        ctx.input_integer(step, value)
    }

    /// Fill `output` with derived bytes
    pub fn key_derivation_output_bytes(
        &self,
        operation: &mut KeyDerivationOperation,
        output: &mut [u8],
    ) -> PsaResult<()> {
        operation.active_context()?.output_bytes(output)
    }

    /// Abandon the derivation; always succeeds
    pub fn key_derivation_abort(&self, operation: &mut KeyDerivationOperation) -> PsaResult<()> {
        operation.reset();
        Ok(())
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    fn sign_policy(&self, alg: Algorithm) -> PsaResult<()> {
        if alg.is_hash_and_sign() {
            self.check_hash_policy("sign", alg.get_hash())
        } else {
            Ok(())
        }
    }

    /// Sign a precomputed hash; returns the signature length
    pub fn sign_hash(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        hash: &[u8],
        signature: &mut [u8],
    ) -> PsaResult<usize> {
        self.sign_policy(alg)?;
        self.dispatch("sign", &self.signature[..], Some(attributes.location()), |d| {
            d.sign_hash(attributes, key, alg, hash, signature)
        })
    }

    /// Check a signature over a precomputed hash
    pub fn verify_hash(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        hash: &[u8],
        signature: &[u8],
    ) -> PsaResult<()> {
        self.sign_policy(alg)?;
        self.dispatch("sign", &self.signature[..], Some(attributes.location()), |d| {
            d.verify_hash(attributes, key, alg, hash, signature)
        })
    }

    /// Sign a whole message
    ///
    /// When no driver signs messages for a hash-and-sign algorithm, the
    /// message is hashed through the hash chain and the digest signed
    /// through the signature chain.
    pub fn sign_message(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        input: &[u8],
        signature: &mut [u8],
    ) -> PsaResult<usize> {
        self.sign_policy(alg)?;
        let direct = self.dispatch("sign", &self.signature[..], Some(attributes.location()), |d| {
            d.sign_message(attributes, key, alg, input, signature)
        });
        if direct != Err(Status::NotSupported) || !alg.is_hash_and_sign() {
            return direct;
        }

        log_debug!(self.log.lock(), MODULE, "sign: hashing message for {}", alg);
        let mut digest = [0u8; HASH_MAX_SIZE];
        let result = self
            .hash_compute(alg.get_hash(), input, &mut digest)
            .and_then(|length| self.sign_hash(attributes, key, alg, &digest[..length], signature));
        secure_zero(&mut digest);
        result
    }

    /// Check a signature over a whole message, hashing first when no
    /// driver checks messages directly
    pub fn verify_message(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        alg: Algorithm,
        input: &[u8],
        signature: &[u8],
    ) -> PsaResult<()> {
        self.sign_policy(alg)?;
        let direct = self.dispatch("sign", &self.signature[..], Some(attributes.location()), |d| {
            d.verify_message(attributes, key, alg, input, signature)
        });
        if direct != Err(Status::NotSupported) || !alg.is_hash_and_sign() {
            return direct;
        }

        log_debug!(self.log.lock(), MODULE, "sign: hashing message for {}", alg);
        let mut digest = [0u8; HASH_MAX_SIZE];
        let length = self.hash_compute(alg.get_hash(), input, &mut digest)?;
        self.verify_hash(attributes, key, alg, &digest[..length], signature)
    }

    // =========================================================================
    // Key agreement
    // =========================================================================

    /// Raw shared secret of a key pair and a peer public key
    ///
    /// Only raw agreement algorithms are accepted; agreements combined with
    /// a key derivation are [`Status::InvalidArgument`].
    pub fn raw_key_agreement(
        &self,
        attributes: &KeyAttributes,
        private_key: &[u8],
        alg: Algorithm,
        peer_key: &[u8],
        output: &mut [u8],
    ) -> PsaResult<usize> {
        if !alg.is_raw_key_agreement() {
            return Err(Status::InvalidArgument);
        }
        self.dispatch("agree", &self.key_agreement[..], Some(attributes.location()), |d| {
            d.key_agreement(attributes, private_key, alg, peer_key, output)
        })
    }

    // =========================================================================
    // Key management
    // =========================================================================

    /// Validate and store imported key material; returns (length, bits)
    pub fn import_key(
        &self,
        attributes: &KeyAttributes,
        data: &[u8],
        key_buffer: &mut [u8],
    ) -> PsaResult<(usize, usize)> {
        self.dispatch("keys", &self.key_management[..], Some(attributes.location()), |d| {
            d.import_key(attributes, data, key_buffer)
        })
    }

    /// Generate a key from the global DRBG; returns the stored length
    pub fn generate_key(
        &self,
        attributes: &KeyAttributes,
        key_buffer: &mut [u8],
    ) -> PsaResult<usize> {
        self.dispatch("keys", &self.key_management[..], Some(attributes.location()), |d| {
            d.generate_key(attributes, &mut random::PsaRng, key_buffer)
        })
    }

    /// Write the key in export representation
    pub fn export_key(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        data: &mut [u8],
    ) -> PsaResult<usize> {
        self.dispatch("keys", &self.key_management[..], Some(attributes.location()), |d| {
            d.export_key(attributes, key, data)
        })
    }

    /// Write the public half of an asymmetric key
    pub fn export_public_key(
        &self,
        attributes: &KeyAttributes,
        key: &[u8],
        data: &mut [u8],
    ) -> PsaResult<usize> {
        self.dispatch("keys", &self.key_management[..], Some(attributes.location()), |d| {
            d.export_public_key(attributes, key, data)
        })
    }

    /// Release a key through the driver owning its location
    ///
    /// The buffer is wiped even when no driver claims the key.
    pub fn destroy_key(&self, attributes: &KeyAttributes, key_buffer: &mut [u8]) -> PsaResult<()> {
        let location = Some(attributes.location());
        let result = self.dispatch("keys", &self.key_management[..], location, |d| {
            d.destroy_key(attributes, key_buffer)
        });
        secure_zero(key_buffer);
        result
    }

    // =========================================================================
    // Random
    // =========================================================================

    /// Seed the global DRBG with this wrapper's reseed interval
    pub fn init_random(&self) -> PsaResult<()> {
        let result = random::init_random_with_config(&self.config);
        match result {
            Ok(()) => log_info!(self.log.lock(), MODULE, "random: initialized"),
            Err(status) => log_warn!(self.log.lock(), MODULE, "random: init failed {}", status.code()),
        }
        result
    }

    /// Fill `output` from the global DRBG
    pub fn get_random(&self, output: &mut [u8]) -> PsaResult<()> {
        random::get_random(output)
    }

    /// Fill `output` straight from the entropy source
    pub fn get_entropy(&self, output: &mut [u8]) -> PsaResult<()> {
        random::get_entropy(output)
    }

    /// Wipe the global DRBG
    pub fn free_random(&self) {
        random::free_random();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{AeadContext, CipherContext};
    use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
    use psa_common::{DriverId, KeyLifetime, KeyType, LogLevel};

    /// Hardware-slot driver that declines everything and counts the asks
    struct DecliningDriver {
        calls: AtomicU32,
    }

    impl DecliningDriver {
        const fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Driver for DecliningDriver {
        fn id(&self) -> DriverId {
            DriverId::Cc3xx
        }

        fn supports_location(&self, location: KeyLocation) -> bool {
            location == KeyLocation::LOCAL_STORAGE
        }
    }

    impl AeadDriver for DecliningDriver {
        fn aead_setup(
            &self,
            _direction: Direction,
            _attributes: &KeyAttributes,
            _key: &[u8],
            _alg: Algorithm,
        ) -> PsaResult<AeadContext> {
            self.calls.fetch_add(1, AtomicOrdering::Relaxed);
            Err(Status::NotSupported)
        }
    }

    impl CipherDriver for DecliningDriver {
        fn cipher_setup(
            &self,
            _direction: Direction,
            _attributes: &KeyAttributes,
            _key: &[u8],
            _alg: Algorithm,
        ) -> PsaResult<CipherContext> {
            self.calls.fetch_add(1, AtomicOrdering::Relaxed);
            Err(Status::InvalidArgument)
        }
    }

    fn aes128() -> KeyAttributes {
        KeyAttributes::new(KeyType::AES, 128)
    }

    #[test]
    fn test_fallback_reaches_second_driver() {
        let declining = DecliningDriver::new();
        let oberon = OberonDriver::new();
        let mut wrapper = DriverWrapper::new(DriverConfig::DEFAULT);
        wrapper.register_aead(&declining).unwrap();
        wrapper.register_aead(&oberon).unwrap();

        let mut op = AeadOperation::new();
        wrapper
            .aead_encrypt_setup(&mut op, &aes128(), &[0u8; 16], Algorithm::GCM)
            .unwrap();
        assert_eq!(op.driver(), DriverId::Oberon);
        assert_eq!(declining.calls.load(AtomicOrdering::Relaxed), 1);

        wrapper.aead_set_nonce(&mut op, &[0u8; 12]).unwrap();
        assert_eq!(declining.calls.load(AtomicOrdering::Relaxed), 1);
        wrapper.aead_abort(&mut op).unwrap();
    }

    #[test]
    fn test_non_fallback_error_stops_chain() {
        let declining = DecliningDriver::new();
        let oberon = OberonDriver::new();
        let mut wrapper = DriverWrapper::new(DriverConfig::DEFAULT);
        wrapper.register_cipher(&declining).unwrap();
        wrapper.register_cipher(&oberon).unwrap();

        let mut op = CipherOperation::new();
        assert_eq!(
            wrapper.cipher_encrypt_setup(&mut op, &aes128(), &[0u8; 16], Algorithm::CTR),
            Err(Status::InvalidArgument)
        );
        assert!(!op.is_active());
    }

    #[test]
    fn test_no_driver_is_not_supported() {
        let wrapper = DriverWrapper::new(DriverConfig::DEFAULT);
        let mut op = AeadOperation::new();
        assert_eq!(
            wrapper.aead_encrypt_setup(&mut op, &aes128(), &[0u8; 16], Algorithm::GCM),
            Err(Status::NotSupported)
        );
    }

    #[test]
    fn test_unknown_location_is_invalid_argument() {
        let set = DriverSet::software();
        let wrapper = DriverWrapper::from_set(&set, DriverConfig::DEFAULT).unwrap();
        let attrs = aes128().with_lifetime(KeyLifetime::new(1, KeyLocation::from_raw(0x7f_0000)));
        let mut op = AeadOperation::new();
        assert_eq!(
            wrapper.aead_encrypt_setup(&mut op, &attrs, &[0u8; 16], Algorithm::GCM),
            Err(Status::InvalidArgument)
        );
        assert!(wrapper.with_log(|log| log
            .iter()
            .any(|e| e.level == LogLevel::Warn && e.message.contains("unknown key location"))));
    }

    #[test]
    fn test_cracen_location_routes_to_cracen() {
        let set = DriverSet::software();
        let wrapper = DriverWrapper::from_set(&set, DriverConfig::DEFAULT).unwrap();
        let attrs = aes128().with_lifetime(KeyLifetime::new(1, KeyLocation::CRACEN_KMU));
        let mut op = CipherOperation::new();
        wrapper
            .cipher_encrypt_setup(&mut op, &attrs, &[0u8; 16], Algorithm::CTR)
            .unwrap();
        assert_eq!(op.driver(), DriverId::Cracen);

        let mut op = CipherOperation::new();
        wrapper
            .cipher_encrypt_setup(&mut op, &aes128(), &[0u8; 16], Algorithm::CTR)
            .unwrap();
        assert_eq!(op.driver(), DriverId::Oberon);
    }

    #[test]
    fn test_disabled_driver_skipped() {
        let set = DriverSet::software();
        let config = DriverConfig {
            oberon: false,
            ..DriverConfig::DEFAULT
        };
        let wrapper = DriverWrapper::from_set(&set, config).unwrap();
        let mut op = CipherOperation::new();
        wrapper
            .cipher_encrypt_setup(&mut op, &aes128(), &[0u8; 16], Algorithm::CTR)
            .unwrap();
        assert_eq!(op.driver(), DriverId::Cracen);
    }

    #[test]
    fn test_chain_capacity() {
        let oberon = OberonDriver::new();
        let mut wrapper = DriverWrapper::new(DriverConfig::DEFAULT);
        for _ in 0..MAX_DRIVERS {
            wrapper.register_hash(&oberon).unwrap();
        }
        assert_eq!(wrapper.register_hash(&oberon), Err(Status::InsufficientMemory));
    }

    #[test]
    fn test_sha1_policy() {
        let set = DriverSet::software();
        let wrapper = DriverWrapper::from_set(&set, DriverConfig::DEFAULT).unwrap();
        let mut op = HashOperation::new();
        assert_eq!(wrapper.hash_setup(&mut op, Algorithm::SHA_1), Err(Status::NotSupported));

        let hmac = KeyAttributes::new(KeyType::HMAC, 128);
        let mut mac = [0u8; 20];
        assert_eq!(
            wrapper.mac_compute(&hmac, &[1u8; 16], Algorithm::hmac(Algorithm::SHA_1), b"m", &mut mac),
            Err(Status::NotSupported)
        );

        let permissive = DriverWrapper::from_set(&set, DriverConfig::DEFAULT.with_sha1()).unwrap();
        permissive.hash_setup(&mut op, Algorithm::SHA_1).unwrap();
        assert_eq!(op.driver(), DriverId::Oberon);
    }

    #[test]
    fn test_pbkdf2_cost_policy() {
        let set = DriverSet::software();
        let config = DriverConfig {
            max_kdf_iterations: 1000,
            ..DriverConfig::DEFAULT
        };
        let wrapper = DriverWrapper::from_set(&set, config).unwrap();
        let mut op = KeyDerivationOperation::new();
        wrapper
            .key_derivation_setup(&mut op, Algorithm::pbkdf2_hmac(Algorithm::SHA_256))
            .unwrap();
        assert_eq!(
            wrapper.key_derivation_input_integer(&mut op, KeyDerivationStep::Cost, 1001),
            Err(Status::NotSupported)
        );
        wrapper
            .key_derivation_input_integer(&mut op, KeyDerivationStep::Cost, 1000)
            .unwrap();
    }

    #[test]
    fn test_setup_on_active_operation_is_bad_state() {
        let set = DriverSet::software();
        let wrapper = DriverWrapper::from_set(&set, DriverConfig::DEFAULT).unwrap();
        let mut op = HashOperation::new();
        wrapper.hash_setup(&mut op, Algorithm::SHA_256).unwrap();
        assert_eq!(wrapper.hash_setup(&mut op, Algorithm::SHA_256), Err(Status::BadState));
        assert_eq!(op.algorithm(), Algorithm::SHA_256);
    }

    #[test]
    fn test_generated_nonce_and_iv() {
        let _guard = random::tests::TEST_LOCK.lock();
        random::register_entropy_source(&random::tests::SOURCE);
        let set = DriverSet::software();
        let wrapper = DriverWrapper::from_set(&set, DriverConfig::DEFAULT).unwrap();
        wrapper.init_random().unwrap();

        let mut op = AeadOperation::new();
        wrapper
            .aead_encrypt_setup(&mut op, &aes128(), &[3u8; 16], Algorithm::GCM)
            .unwrap();
        let mut nonce = [0u8; 16];
        assert_eq!(wrapper.aead_generate_nonce(&mut op, &mut nonce), Ok(12));
        assert_eq!(wrapper.aead_set_nonce(&mut op, &nonce[..12]), Err(Status::BadState));
        wrapper.aead_abort(&mut op).unwrap();

        let mut op = CipherOperation::new();
        wrapper
            .cipher_encrypt_setup(&mut op, &aes128(), &[3u8; 16], Algorithm::ECB_NO_PADDING)
            .unwrap();
        let mut iv = [0u8; 16];
        assert_eq!(wrapper.cipher_generate_iv(&mut op, &mut iv), Err(Status::BadState));
        wrapper.cipher_abort(&mut op).unwrap();

        let mut op = CipherOperation::new();
        wrapper
            .cipher_encrypt_setup(&mut op, &aes128(), &[3u8; 16], Algorithm::CBC_NO_PADDING)
            .unwrap();
        let mut short = [0u8; 8];
        assert_eq!(
            wrapper.cipher_generate_iv(&mut op, &mut short),
            Err(Status::BufferTooSmall)
        );
        assert_eq!(wrapper.cipher_generate_iv(&mut op, &mut iv), Ok(16));
        wrapper.cipher_abort(&mut op).unwrap();
        wrapper.free_random();
    }

    #[test]
    fn test_registration_logged() {
        let set = DriverSet::software();
        let wrapper = DriverWrapper::from_set(&set, DriverConfig::SOFTWARE_ONLY).unwrap();
        wrapper.with_log(|log| {
            assert!(log.iter().any(|e| e.message.contains("registered oberon")));
            assert!(!log.iter().any(|e| e.message.contains("registered cc3xx")));
        });
    }
}
