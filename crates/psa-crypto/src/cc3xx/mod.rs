// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! CC3XX hardware driver
//!
//! Runs the block modes over a CryptoCell-class AES engine. The engine is
//! shared between operations, so every block call takes the engine lock,
//! loads the operation's key and transforms one block. Hashes, MACs,
//! signatures and key agreement are left to the software drivers.

mod aead;
mod cipher;

pub use aead::Cc3xxAead;
pub use cipher::Cc3xxCipher;

use crate::backend::{Block, BlockCipher, SymmetricKey};
use crate::driver::{Driver, HashDriver, KeyAgreementDriver, MacDriver, SignatureDriver};
use crate::operation::{HashContext, MacContext};
use crate::zeroize_utils::secure_zero;
use psa_common::constants::MAX_SYMMETRIC_KEY_SIZE;
use psa_common::{Algorithm, Direction, DriverId, KeyAttributes, KeyLocation, PsaResult, Status};
use psa_hal::{AesEngine, BlockDirection};

/// AES engine shared by all CC3XX operations
pub type SharedAesEngine = spin::Mutex<dyn AesEngine + Send>;

/// CC3XX hardware driver
#[derive(Clone, Copy)]
pub struct Cc3xxDriver {
    engine: Option<&'static SharedAesEngine>,
}

impl Cc3xxDriver {
    /// Driver over an AES engine
    #[must_use]
    pub const fn new(engine: &'static SharedAesEngine) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// Driver with no engine; every setup is `NotSupported`
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { engine: None }
    }

    /// Bind `key` to the engine
    ///
    /// 192-bit keys are `NotSupported` so the request falls back to
    /// software; other lengths besides 128 and 256 bits are
    /// `InvalidArgument`.
    fn bind_key(&self, key: &[u8]) -> PsaResult<Cc3xxKey> {
        let engine = self.engine.ok_or(Status::NotSupported)?;
        if !engine.lock().is_available() {
            return Err(Status::NotSupported);
        }
        match key.len() {
            16 | 32 => Ok(Cc3xxKey::new(engine, key)),
            24 => Err(Status::NotSupported),
            _ => Err(Status::InvalidArgument),
        }
    }
}

impl core::fmt::Debug for Cc3xxDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cc3xxDriver")
            .field("engine", &self.engine.is_some())
            .finish()
    }
}

impl Driver for Cc3xxDriver {
    fn id(&self) -> DriverId {
        DriverId::Cc3xx
    }

    fn supports_location(&self, location: KeyLocation) -> bool {
        location == KeyLocation::LOCAL_STORAGE
    }
}

impl HashDriver for Cc3xxDriver {
    fn hash_setup(&self, _alg: Algorithm) -> PsaResult<HashContext> {
        Err(Status::NotSupported)
    }
}

impl MacDriver for Cc3xxDriver {
    fn mac_setup(
        &self,
        _direction: Direction,
        _attributes: &KeyAttributes,
        _key: &[u8],
        _alg: Algorithm,
    ) -> PsaResult<MacContext> {
        Err(Status::NotSupported)
    }
}

impl SignatureDriver for Cc3xxDriver {
    fn sign_hash(
        &self,
        _attributes: &KeyAttributes,
        _key: &[u8],
        _alg: Algorithm,
        _hash: &[u8],
        _signature: &mut [u8],
    ) -> PsaResult<usize> {
        Err(Status::NotSupported)
    }

    fn verify_hash(
        &self,
        _attributes: &KeyAttributes,
        _key: &[u8],
        _alg: Algorithm,
        _hash: &[u8],
        _signature: &[u8],
    ) -> PsaResult<()> {
        Err(Status::NotSupported)
    }
}

impl KeyAgreementDriver for Cc3xxDriver {
    fn key_agreement(
        &self,
        _attributes: &KeyAttributes,
        _private_key: &[u8],
        _alg: Algorithm,
        _peer_key: &[u8],
        _output: &mut [u8],
    ) -> PsaResult<usize> {
        Err(Status::NotSupported)
    }
}

/// AES key bound to the hardware engine
pub struct Cc3xxKey {
    engine: &'static SharedAesEngine,
    key: [u8; MAX_SYMMETRIC_KEY_SIZE],
    key_length: usize,
}

impl Cc3xxKey {
    fn new(engine: &'static SharedAesEngine, key: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_SYMMETRIC_KEY_SIZE];
        bytes[..key.len()].copy_from_slice(key);
        Self {
            engine,
            key: bytes,
            key_length: key.len(),
        }
    }

    fn transform(&self, direction: BlockDirection, block: &mut Block) -> PsaResult<()> {
        let mut engine = self.engine.lock();
        engine.load_key(&self.key[..self.key_length])?;
        let result = engine.process_block(direction, block);
        engine.clear_key();
        result.map_err(Status::from)
    }
}

impl BlockCipher for Cc3xxKey {
    fn encrypt_block(&self, block: &mut Block) -> PsaResult<()> {
        self.transform(BlockDirection::Encrypt, block)
    }

    fn decrypt_block(&self, block: &mut Block) -> PsaResult<()> {
        self.transform(BlockDirection::Decrypt, block)
    }
}

impl SymmetricKey for Cc3xxKey {}

impl Drop for Cc3xxKey {
    fn drop(&mut self) {
        secure_zero(&mut self.key);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backend::AesKey;
    use psa_hal::{HalError, HalResult};

    /// Software stand-in for the AES engine
    pub struct SoftEngine {
        available: bool,
        key: Option<AesKey>,
        pub loads: u32,
    }

    impl SoftEngine {
        pub const fn new(available: bool) -> Self {
            Self {
                available,
                key: None,
                loads: 0,
            }
        }
    }

    impl AesEngine for SoftEngine {
        fn is_available(&self) -> bool {
            self.available
        }

        fn load_key(&mut self, key: &[u8]) -> HalResult<()> {
            if key.len() != 16 && key.len() != 32 {
                return Err(HalError::UnsupportedKeySize);
            }
            self.key = Some(AesKey::new(key).map_err(|_| HalError::InvalidParameter)?);
            self.loads += 1;
            Ok(())
        }

        fn process_block(&mut self, direction: BlockDirection, block: &mut Block) -> HalResult<()> {
            let key = self.key.as_ref().ok_or(HalError::NotInitialized)?;
            match direction {
                BlockDirection::Encrypt => key.encrypt_block(block),
                BlockDirection::Decrypt => key.decrypt_block(block),
            }
            .map_err(|_| HalError::HardwareFault)
        }

        fn clear_key(&mut self) {
            self.key = None;
        }
    }

    static ENGINE: spin::Mutex<SoftEngine> = spin::Mutex::new(SoftEngine::new(true));
    static OFFLINE: spin::Mutex<SoftEngine> = spin::Mutex::new(SoftEngine::new(false));

    pub fn driver() -> Cc3xxDriver {
        Cc3xxDriver::new(&ENGINE)
    }

    #[test]
    fn test_key_lengths() {
        let driver = driver();
        assert!(driver.bind_key(&[0u8; 16]).is_ok());
        assert!(driver.bind_key(&[0u8; 32]).is_ok());
        assert!(matches!(driver.bind_key(&[0u8; 24]), Err(Status::NotSupported)));
        assert!(matches!(driver.bind_key(&[0u8; 20]), Err(Status::InvalidArgument)));
    }

    #[test]
    fn test_unavailable_engine_not_supported() {
        assert!(matches!(
            Cc3xxDriver::unavailable().bind_key(&[0u8; 16]),
            Err(Status::NotSupported)
        ));
        assert!(matches!(
            Cc3xxDriver::new(&OFFLINE).bind_key(&[0u8; 16]),
            Err(Status::NotSupported)
        ));
    }

    #[test]
    fn test_block_matches_software_aes() {
        let key = [0x2bu8; 16];
        let hw = driver().bind_key(&key).unwrap();
        let sw = AesKey::new(&key).unwrap();
        let mut a = [0x11u8; 16];
        let mut b = a;
        let before = ENGINE.lock().loads;
        hw.encrypt_block(&mut a).unwrap();
        sw.encrypt_block(&mut b).unwrap();
        assert_eq!(a, b);
        assert!(ENGINE.lock().loads > before);
        hw.decrypt_block(&mut a).unwrap();
        assert_eq!(a, [0x11u8; 16]);
        assert!(ENGINE.lock().key.is_none());
    }

    #[test]
    fn test_hash_and_mac_fall_back() {
        let driver = driver();
        assert!(matches!(driver.hash_setup(Algorithm::SHA_256), Err(Status::NotSupported)));
        let attrs = KeyAttributes::new(psa_common::KeyType::HMAC, 256);
        assert!(matches!(
            driver.mac_setup(Direction::Encrypt, &attrs, &[0u8; 32], Algorithm::hmac(Algorithm::SHA_256)),
            Err(Status::NotSupported)
        ));
    }
}
