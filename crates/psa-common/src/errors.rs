// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Status codes for the PSA driver layer
//!
//! Every driver entry point reports failure through one closed enumeration.
//! The numeric values are the PSA Crypto API status codes so they can be
//! handed verbatim to callers that speak the C ABI.

use core::fmt;

/// Result type alias for PSA driver operations
pub type PsaResult<T> = core::result::Result<T, Status>;

/// PSA status code (error kinds only; success is `Ok`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    // =========================================================================
    // Capability
    // =========================================================================
    /// The driver does not implement this (key type, algorithm) pair
    NotSupported,
    /// The operation is forbidden by policy
    NotPermitted,

    // =========================================================================
    // Caller errors
    // =========================================================================
    /// Malformed argument independent of driver capability
    InvalidArgument,
    /// Output buffer capacity insufficient; nothing was written
    BufferTooSmall,
    /// Operation called in the wrong lifecycle state
    BadState,
    /// Not enough data left (key derivation capacity exhausted)
    InsufficientData,

    // =========================================================================
    // Verification
    // =========================================================================
    /// MAC or tag verification failed
    InvalidSignature,
    /// Malformed block padding on decrypt
    InvalidPadding,

    // =========================================================================
    // Platform
    // =========================================================================
    /// A fixed-capacity buffer cannot hold the input
    InsufficientMemory,
    /// No usable entropy source
    InsufficientEntropy,
    /// Accelerator fault or timeout
    HardwareFailure,
    /// Internal consistency check failed
    CorruptionDetected,
    /// Unclassified failure
    GenericError,
}

impl Status {
    /// PSA numeric status code
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::GenericError => -132,
            Self::NotPermitted => -133,
            Self::NotSupported => -134,
            Self::InvalidArgument => -135,
            Self::BadState => -137,
            Self::BufferTooSmall => -138,
            Self::InsufficientMemory => -141,
            Self::InsufficientData => -143,
            Self::HardwareFailure => -147,
            Self::InsufficientEntropy => -148,
            Self::InvalidSignature => -149,
            Self::InvalidPadding => -150,
            Self::CorruptionDetected => -151,
        }
    }

    /// Map a PSA numeric status back to a `Status`
    ///
    /// Returns `None` for `0` (success) and for codes outside the taxonomy.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -132 => Some(Self::GenericError),
            -133 => Some(Self::NotPermitted),
            -134 => Some(Self::NotSupported),
            -135 => Some(Self::InvalidArgument),
            -137 => Some(Self::BadState),
            -138 => Some(Self::BufferTooSmall),
            -141 => Some(Self::InsufficientMemory),
            -143 => Some(Self::InsufficientData),
            -147 => Some(Self::HardwareFailure),
            -148 => Some(Self::InsufficientEntropy),
            -149 => Some(Self::InvalidSignature),
            -150 => Some(Self::InvalidPadding),
            -151 => Some(Self::CorruptionDetected),
            _ => None,
        }
    }

    /// Convert a `PsaResult<()>` into the C-style status integer
    #[must_use]
    pub const fn to_raw(result: &PsaResult<()>) -> i32 {
        match result {
            Ok(()) => 0,
            Err(status) => status.code(),
        }
    }

    /// Whether the dispatch wrapper should try the next driver
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::NotSupported)
    }

    /// Check if this status reports a failed security check
    #[must_use]
    pub const fn is_security_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature
                | Self::InvalidPadding
                | Self::CorruptionDetected
                | Self::NotPermitted
        )
    }

    /// Human-readable description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NotSupported => "not supported",
            Self::NotPermitted => "not permitted",
            Self::InvalidArgument => "invalid argument",
            Self::BufferTooSmall => "buffer too small",
            Self::BadState => "bad state",
            Self::InsufficientData => "insufficient data",
            Self::InvalidSignature => "invalid signature",
            Self::InvalidPadding => "invalid padding",
            Self::InsufficientMemory => "insufficient memory",
            Self::InsufficientEntropy => "insufficient entropy",
            Self::HardwareFailure => "hardware failure",
            Self::CorruptionDetected => "corruption detected",
            Self::GenericError => "generic error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[{}] {}", self.code(), self.description());
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Status {}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Status; 13] = [
        Status::NotSupported,
        Status::NotPermitted,
        Status::InvalidArgument,
        Status::BufferTooSmall,
        Status::BadState,
        Status::InsufficientData,
        Status::InvalidSignature,
        Status::InvalidPadding,
        Status::InsufficientMemory,
        Status::InsufficientEntropy,
        Status::HardwareFailure,
        Status::CorruptionDetected,
        Status::GenericError,
    ];

    #[test]
    fn test_codes_round_trip() {
        for status in ALL {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
        assert_eq!(Status::from_code(0), None);
        assert_eq!(Status::from_code(-1), None);
    }

    #[test]
    fn test_codes_are_negative_and_unique() {
        for (i, a) in ALL.iter().enumerate() {
            assert!(a.code() < 0);
            for b in &ALL[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn test_only_not_supported_falls_back() {
        for status in ALL {
            assert_eq!(status.is_fallback(), status == Status::NotSupported);
        }
    }

    #[test]
    fn test_to_raw() {
        assert_eq!(Status::to_raw(&Ok(())), 0);
        assert_eq!(Status::to_raw(&Err(Status::BufferTooSmall)), -138);
    }

    #[test]
    fn test_security_classification() {
        assert!(Status::InvalidSignature.is_security_error());
        assert!(Status::InvalidPadding.is_security_error());
        assert!(!Status::BufferTooSmall.is_security_error());
    }
}
