// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Operation objects and per-driver context sum types
//!
//! An operation records the driver that claimed it and the algorithm it
//! was set up for. A zero algorithm marks an inactive operation. The
//! context enum holds exactly one driver's live state; the variant is the
//! routing key for every later call.
//!
//! Terminal transitions (`finish`, `verify`, `abort`, and failures inside
//! `finish`/`verify`) wipe the whole object and leave it inactive.

use crate::backend::modes::CipherMode;
use crate::cc3xx::{Cc3xxAead, Cc3xxCipher};
use crate::cracen::{CracenAead, CracenCipher, CracenHash};
use crate::oberon::{OberonAead, OberonCipher, OberonHash, OberonKeyDerivation, OberonMac};
use crate::zeroize_utils::reset_in_place;
use psa_common::constants::{
    AEAD_OPERATION_SIZE, CIPHER_OPERATION_SIZE, HASH_OPERATION_SIZE,
    KEY_DERIVATION_OPERATION_SIZE, MAC_OPERATION_SIZE,
};
use psa_common::{Algorithm, DriverId, KeyDerivationStep, PsaResult, Status};

// =============================================================================
// Context sum types
// =============================================================================

/// Live AEAD state of whichever driver claimed the operation
pub enum AeadContext {
    /// Not set up
    None,
    /// Oberon software driver
    Oberon(OberonAead),
    /// CRACEN software driver
    Cracen(CracenAead),
    /// CC3XX hardware driver
    Cc3xx(Cc3xxAead),
}

macro_rules! on_aead {
    ($ctx:expr, $op:ident => $body:expr) => {
        match $ctx {
            AeadContext::None => Err(Status::BadState),
            AeadContext::Oberon($op) => $body,
            AeadContext::Cracen($op) => $body,
            AeadContext::Cc3xx($op) => $body,
        }
    };
}

impl AeadContext {
    /// Driver owning this context
    #[must_use]
    pub const fn driver(&self) -> DriverId {
        match self {
            Self::None => DriverId::None,
            Self::Oberon(_) => DriverId::Oberon,
            Self::Cracen(_) => DriverId::Cracen,
            Self::Cc3xx(_) => DriverId::Cc3xx,
        }
    }

    /// Tag length recorded at setup, zero when inactive
    #[must_use]
    pub fn tag_length(&self) -> usize {
        on_aead!(self, op => Ok(op.core.tag_length())).unwrap_or(0)
    }

    /// Set the nonce after driver-specific length checks
    pub fn set_nonce(&mut self, nonce: &[u8]) -> PsaResult<()> {
        on_aead!(self, op => op.set_nonce(nonce))
    }

    /// Declare total additional-data and payload lengths
    pub fn set_lengths(&mut self, ad_length: usize, payload_length: usize) -> PsaResult<()> {
        on_aead!(self, op => op.core.set_lengths(ad_length, payload_length))
    }

    /// Absorb additional data
    pub fn update_ad(&mut self, input: &[u8]) -> PsaResult<()> {
        on_aead!(self, op => op.core.update_ad(input))
    }

    /// Process payload
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) -> PsaResult<usize> {
        on_aead!(self, op => op.core.update(input, output))
    }

    /// Produce the tag
    pub fn finish(&mut self, ciphertext: &mut [u8], tag: &mut [u8]) -> PsaResult<(usize, usize)> {
        on_aead!(self, op => op.core.finish(ciphertext, tag))
    }

    /// Check the tag
    pub fn verify(&mut self, plaintext: &mut [u8], tag: &[u8]) -> PsaResult<usize> {
        on_aead!(self, op => op.core.verify(plaintext, tag))
    }
}

/// Live cipher state of whichever driver claimed the operation
pub enum CipherContext {
    /// Not set up
    None,
    /// Oberon software driver
    Oberon(OberonCipher),
    /// CRACEN software driver
    Cracen(CracenCipher),
    /// CC3XX hardware driver
    Cc3xx(Cc3xxCipher),
}

macro_rules! on_cipher {
    ($ctx:expr, $op:ident => $body:expr) => {
        match $ctx {
            CipherContext::None => Err(Status::BadState),
            CipherContext::Oberon($op) => $body,
            CipherContext::Cracen($op) => $body,
            CipherContext::Cc3xx($op) => $body,
        }
    };
}

impl CipherContext {
    /// Driver owning this context
    #[must_use]
    pub const fn driver(&self) -> DriverId {
        match self {
            Self::None => DriverId::None,
            Self::Oberon(_) => DriverId::Oberon,
            Self::Cracen(_) => DriverId::Cracen,
            Self::Cc3xx(_) => DriverId::Cc3xx,
        }
    }

    /// Cipher mode, `None` when inactive
    #[must_use]
    pub fn mode(&self) -> Option<CipherMode> {
        on_cipher!(self, op => Ok(op.core.mode())).ok()
    }

    /// Set the IV
    pub fn set_iv(&mut self, iv: &[u8]) -> PsaResult<()> {
        on_cipher!(self, op => op.core.set_iv(iv))
    }

    /// Bytes the next update of `input_length` bytes writes
    #[must_use]
    pub fn update_output_length(&self, input_length: usize) -> usize {
        on_cipher!(self, op => Ok(op.core.update_output_length(input_length))).unwrap_or(0)
    }

    /// Process input
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) -> PsaResult<usize> {
        on_cipher!(self, op => op.core.update(input, output))
    }

    /// Flush the final block
    pub fn finish(&mut self, output: &mut [u8]) -> PsaResult<usize> {
        on_cipher!(self, op => op.core.finish(output))
    }
}

/// Live hash state
#[derive(Clone)]
pub enum HashContext {
    /// Not set up
    None,
    /// Oberon software driver
    Oberon(OberonHash),
    /// CRACEN software driver
    Cracen(CracenHash),
}

impl HashContext {
    /// Driver owning this context
    #[must_use]
    pub const fn driver(&self) -> DriverId {
        match self {
            Self::None => DriverId::None,
            Self::Oberon(_) => DriverId::Oberon,
            Self::Cracen(_) => DriverId::Cracen,
        }
    }

    /// Digest length, zero when inactive
    #[must_use]
    pub fn hash_length(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Oberon(op) => op.state.output_length(),
            Self::Cracen(op) => op.state.output_length(),
        }
    }

    /// Absorb input
    pub fn update(&mut self, input: &[u8]) -> PsaResult<()> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => {
                op.state.update(input);
                Ok(())
            }
            Self::Cracen(op) => {
                op.state.update(input);
                Ok(())
            }
        }
    }

    /// Write the digest
    pub fn finish(&mut self, hash: &mut [u8]) -> PsaResult<usize> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => op.state.finish(hash),
            Self::Cracen(op) => op.state.finish(hash),
        }
    }
}

/// Live MAC state
pub enum MacContext {
    /// Not set up
    None,
    /// Oberon software driver
    Oberon(OberonMac),
}

impl MacContext {
    /// Driver owning this context
    #[must_use]
    pub const fn driver(&self) -> DriverId {
        match self {
            Self::None => DriverId::None,
            Self::Oberon(_) => DriverId::Oberon,
        }
    }

    /// MAC length produced or expected, zero when inactive
    #[must_use]
    pub const fn mac_length(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Oberon(op) => op.mac_length(),
        }
    }

    /// Absorb input
    pub fn update(&mut self, input: &[u8]) -> PsaResult<()> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => {
                op.update(input);
                Ok(())
            }
        }
    }

    /// Produce the MAC of a sign operation
    pub fn sign_finish(&mut self, mac: &mut [u8]) -> PsaResult<usize> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => op.sign_finish(mac),
        }
    }

    /// Check the MAC of a verify operation
    pub fn verify_finish(&mut self, mac: &[u8]) -> PsaResult<()> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => op.verify_finish(mac),
        }
    }
}

/// Live key derivation state
pub enum KeyDerivationContext {
    /// Not set up
    None,
    /// Oberon software driver
    Oberon(OberonKeyDerivation),
}

impl KeyDerivationContext {
    /// Driver owning this context
    #[must_use]
    pub const fn driver(&self) -> DriverId {
        match self {
            Self::None => DriverId::None,
            Self::Oberon(_) => DriverId::Oberon,
        }
    }

    /// Remaining output capacity
    pub fn capacity(&self) -> PsaResult<usize> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => Ok(op.capacity()),
        }
    }

    /// Lower the capacity
    pub fn set_capacity(&mut self, capacity: usize) -> PsaResult<()> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => op.set_capacity(capacity),
        }
    }

    /// Supply a byte-string input
    pub fn input_bytes(&mut self, step: KeyDerivationStep, data: &[u8]) -> PsaResult<()> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => op.input_bytes(step, data),
        }
    }

    /// Supply an integer input
    pub fn input_integer(&mut self, step: KeyDerivationStep, value: u64) -> PsaResult<()> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => op.input_integer(step, value),
        }
    }

    /// Produce output bytes
    pub fn output_bytes(&mut self, output: &mut [u8]) -> PsaResult<()> {
        match self {
            Self::None => Err(Status::BadState),
            Self::Oberon(op) => op.output_bytes(output),
        }
    }
}

// =============================================================================
// Operation objects
// =============================================================================

macro_rules! operation {
    ($(#[$doc:meta])* $name:ident, $ctx:ident) => {
        $(#[$doc])*
        pub struct $name {
            driver: DriverId,
            alg: Algorithm,
            pub(crate) ctx: $ctx,
        }

        impl $name {
            /// Inactive operation
            #[must_use]
            pub const fn new() -> Self {
                Self {
                    driver: DriverId::None,
                    alg: Algorithm::NONE,
                    ctx: $ctx::None,
                }
            }

            /// Driver that claimed the operation
            #[must_use]
            pub const fn driver(&self) -> DriverId {
                self.driver
            }

            /// Algorithm the operation was set up for
            #[must_use]
            pub const fn algorithm(&self) -> Algorithm {
                self.alg
            }

            /// Check if the operation is set up
            #[must_use]
            pub const fn is_active(&self) -> bool {
                !self.alg.is_none()
            }

            pub(crate) fn activate(&mut self, alg: Algorithm, ctx: $ctx) {
                self.driver = ctx.driver();
                self.alg = alg;
                self.ctx = ctx;
            }

            pub(crate) fn active_context(&mut self) -> PsaResult<&mut $ctx> {
                if self.is_active() {
                    Ok(&mut self.ctx)
                } else {
                    Err(Status::BadState)
                }
            }

            /// Wipe the operation and return it to the inactive state
            pub fn reset(&mut self) {
                reset_in_place(self, Self::new());
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

operation!(
    /// Multi-part AEAD operation
    AeadOperation,
    AeadContext
);
operation!(
    /// Multi-part cipher operation
    CipherOperation,
    CipherContext
);
operation!(
    /// Multi-part hash operation
    HashOperation,
    HashContext
);
operation!(
    /// Multi-part MAC operation
    MacOperation,
    MacContext
);
operation!(
    /// Key derivation operation
    KeyDerivationOperation,
    KeyDerivationContext
);

impl HashOperation {
    pub(crate) fn clone_from_active(&mut self, source: &Self) {
        self.driver = source.driver;
        self.alg = source.alg;
        self.ctx = source.ctx.clone();
    }
}

const _: () = assert!(core::mem::size_of::<AeadOperation>() <= AEAD_OPERATION_SIZE);
const _: () = assert!(core::mem::size_of::<CipherOperation>() <= CIPHER_OPERATION_SIZE);
const _: () = assert!(core::mem::size_of::<HashOperation>() <= HASH_OPERATION_SIZE);
const _: () = assert!(core::mem::size_of::<MacOperation>() <= MAC_OPERATION_SIZE);
const _: () =
    assert!(core::mem::size_of::<KeyDerivationOperation>() <= KEY_DERIVATION_OPERATION_SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_operations_are_inactive() {
        let mut aead = AeadOperation::new();
        assert!(!aead.is_active());
        assert_eq!(aead.driver(), DriverId::None);
        assert!(matches!(aead.active_context(), Err(Status::BadState)));

        let hash = HashOperation::default();
        assert!(hash.algorithm().is_none());
    }

    #[test]
    fn test_inactive_context_calls_are_bad_state() {
        let mut ctx = AeadContext::None;
        assert_eq!(ctx.set_nonce(&[0u8; 12]), Err(Status::BadState));
        assert_eq!(ctx.tag_length(), 0);
        let mut cipher = CipherContext::None;
        assert_eq!(cipher.mode(), None);
        assert_eq!(cipher.finish(&mut []), Err(Status::BadState));
        let mut kdf = KeyDerivationContext::None;
        assert_eq!(kdf.output_bytes(&mut [0u8; 4]), Err(Status::BadState));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut op = MacOperation::new();
        op.reset();
        op.reset();
        assert!(!op.is_active());
    }
}
