// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Driver layer configuration
//!
//! Configuration is fixed when the dispatch wrapper is built. It decides
//! which drivers take part in the fallback chain and which policy gates
//! apply before any driver is consulted.

use crate::log::LogLevel;
use crate::types::Algorithm;

/// Identifier of a registered driver
///
/// The id is recorded in an operation at setup time and routes every later
/// call on that operation. Zero is reserved for "no driver".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DriverId {
    /// Unallocated operation
    None = 0,
    /// CC3XX hardware accelerator
    Cc3xx = 4,
    /// Oberon software driver
    Oberon = 5,
    /// CRACEN software driver
    Cracen = 7,
}

impl DriverId {
    /// Driver name for diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Cc3xx => "cc3xx",
            Self::Oberon => "oberon",
            Self::Cracen => "cracen",
        }
    }
}

impl core::fmt::Display for DriverId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DriverId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.as_str());
    }
}

/// Dispatch wrapper configuration
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Register the CC3XX hardware driver
    pub cc3xx: bool,
    /// Register the Oberon software driver
    pub oberon: bool,
    /// Register the CRACEN software driver
    pub cracen: bool,
    /// Accept SHA-1 for hashing and HMAC
    pub allow_sha1: bool,
    /// Maximum PBKDF2 iteration count
    pub max_kdf_iterations: u32,
    /// DRBG requests between reseeds
    pub drbg_reseed_interval: u32,
    /// Minimum level recorded in the wrapper log
    pub log_level: LogLevel,
}

impl DriverConfig {
    /// Default configuration: every driver enabled, SHA-1 refused
    pub const DEFAULT: Self = Self {
        cc3xx: true,
        oberon: true,
        cracen: true,
        allow_sha1: false,
        max_kdf_iterations: 100_000,
        drbg_reseed_interval: 10_000,
        log_level: LogLevel::Info,
    };

    /// Software-only configuration
    pub const SOFTWARE_ONLY: Self = Self {
        cc3xx: false,
        ..Self::DEFAULT
    };

    /// Check if a driver takes part in dispatch
    #[must_use]
    pub const fn is_enabled(&self, id: DriverId) -> bool {
        match id {
            DriverId::None => false,
            DriverId::Cc3xx => self.cc3xx,
            DriverId::Oberon => self.oberon,
            DriverId::Cracen => self.cracen,
        }
    }

    /// Check if a hash algorithm passes the policy gate
    #[must_use]
    pub const fn hash_permitted(&self, hash: Algorithm) -> bool {
        self.allow_sha1 || hash.raw() != Algorithm::SHA_1.raw()
    }

    /// Same configuration with SHA-1 allowed
    #[must_use]
    pub const fn with_sha1(mut self) -> Self {
        self.allow_sha1 = true;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
