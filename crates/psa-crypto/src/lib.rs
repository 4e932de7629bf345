// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! PSA Crypto driver layer
//!
//! This crate routes PSA Crypto operations to one of several crypto
//! drivers and keeps the per-operation state machines:
//!
//! - **Dispatch**: per-family driver chains, walked in priority order with
//!   fallback on `NotSupported`, filtered by key location
//! - **Operations**: fixed-size AEAD, cipher, hash, MAC and key derivation
//!   objects that remember which driver claimed them; signatures, key
//!   agreement and key management are single calls
//! - **Drivers**: CC3XX (hardware AES engine), Oberon and CRACEN (software)
//!
//! # Supported Algorithms
//!
//! ## AEAD
//! - AES-CCM, AES-GCM (shortened tags)
//! - ChaCha20-Poly1305
//!
//! ## Ciphers
//! - AES-ECB, AES-CBC (no padding, PKCS#7), AES-CTR, CCM* without tag
//! - ChaCha20
//!
//! ## Hash and MAC
//! - SHA-1, SHA-2, SHA-3
//! - HMAC, AES-CMAC
//!
//! ## Key Derivation
//! - HKDF, TLS 1.2 PRF and PSK-to-MS, PBKDF2, SP 800-108 counter mode
//!
//! ## Signatures and Key Agreement
//! - ECDSA over P-256, pure EdDSA over Edwards25519
//! - Raw ECDH over P-256 and Curve25519
//!
//! ## Key Management
//! - Import, generation, export and destruction through the owning driver
//!
//! # Security Requirements
//!
//! - Tags and MACs are compared in constant time
//! - Operation state is zeroized on every terminal transition and on drop
//! - Key material never reaches the log

#![no_std]
#![allow(unsafe_code)] // Volatile zeroization in `zeroize_utils`
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]

#[cfg(feature = "std")]
extern crate std;

// Algorithm backends shared by the drivers
mod backend;

// Driver contracts and operation state
pub mod driver;
pub mod operation;
pub mod zeroize_utils;

// Drivers
pub mod cc3xx;
pub mod cracen;
pub mod oberon;

// Dispatch, random and sizing
pub mod dispatch;
pub mod random;
pub mod sizes;

pub use backend::modes::CipherMode;
pub use cc3xx::{Cc3xxDriver, SharedAesEngine};
pub use cracen::CracenDriver;
pub use dispatch::{DriverSet, DriverWrapper};
pub use driver::{
    AeadDriver, CipherDriver, Driver, HashDriver, KeyAgreementDriver, KeyDerivationDriver,
    KeyManagementDriver, MacDriver, SignatureDriver,
};
pub use oberon::OberonDriver;
pub use operation::{
    AeadOperation, CipherOperation, HashOperation, KeyDerivationOperation, MacOperation,
};
pub use random::{PsaRng, SharedEntropySource};

pub use psa_common::{
    Algorithm, Direction, DriverConfig, DriverId, EccFamily, KeyAttributes, KeyDerivationStep,
    KeyLifetime, KeyLocation, KeyType, PsaResult, Status,
};
