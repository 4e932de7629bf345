// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL error types

use core::fmt;
use psa_common::Status;

/// HAL error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Hardware not initialized
    NotInitialized,
    /// Hardware initialization failed
    InitFailed,
    /// Invalid parameter
    InvalidParameter,
    /// Key size not handled by the engine
    UnsupportedKeySize,
    /// Operation timeout
    Timeout,
    /// Hardware busy
    Busy,
    /// Operation not supported
    NotSupported,
    /// Entropy source reported a health-test failure
    RngError,
    /// Hardware fault detected
    HardwareFault,
}

impl HalError {
    /// Get error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::NotInitialized => 0x0801,
            Self::InitFailed => 0x0802,
            Self::RngError => 0x0820,
            Self::UnsupportedKeySize => 0x08C3,
            Self::HardwareFault => 0x08D0,
            Self::InvalidParameter => 0x08F0,
            Self::Timeout => 0x08F1,
            Self::Busy => 0x08F2,
            Self::NotSupported => 0x08FF,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not initialized",
            Self::InitFailed => "initialization failed",
            Self::InvalidParameter => "invalid parameter",
            Self::UnsupportedKeySize => "key size not supported by engine",
            Self::Timeout => "timeout",
            Self::Busy => "busy",
            Self::NotSupported => "not supported",
            Self::RngError => "RNG error",
            Self::HardwareFault => "hardware fault detected",
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

impl From<HalError> for Status {
    fn from(e: HalError) -> Self {
        match e {
            HalError::InvalidParameter => Self::InvalidArgument,
            HalError::UnsupportedKeySize | HalError::NotSupported => Self::NotSupported,
            HalError::NotInitialized => Self::BadState,
            HalError::RngError => Self::InsufficientEntropy,
            HalError::InitFailed
            | HalError::Timeout
            | HalError::Busy
            | HalError::HardwareFault => Self::HardwareFailure,
        }
    }
}

/// HAL Result type
pub type HalResult<T> = Result<T, HalError>;
