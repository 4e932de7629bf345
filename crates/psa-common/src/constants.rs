// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Fixed sizes for the driver layer
//!
//! Every buffer inside an operation context is sized from these values, so
//! operation structs have a static size regardless of which driver ends up
//! owning them.

// =============================================================================
// Block ciphers
// =============================================================================

/// AES block size in bytes
pub const AES_BLOCK_SIZE: usize = 16;

/// Largest block size of any supported cipher
pub const MAX_BLOCK_SIZE: usize = 16;

/// Largest symmetric key accepted by any driver
pub const MAX_SYMMETRIC_KEY_SIZE: usize = 32;

/// ChaCha20 key size in bytes
pub const CHACHA20_KEY_SIZE: usize = 32;

// =============================================================================
// AEAD
// =============================================================================

/// Largest AEAD tag in bytes
pub const AEAD_TAG_MAX_SIZE: usize = 16;

/// Largest AEAD nonce accepted for multi-part GCM
pub const AEAD_NONCE_MAX_SIZE: usize = 16;

/// Default nonce size for GCM and ChaCha20-Poly1305
pub const AEAD_DEFAULT_NONCE_SIZE: usize = 12;

/// CCM nonce bounds
pub const CCM_NONCE_MIN_SIZE: usize = 7;
/// CCM nonce bounds
pub const CCM_NONCE_MAX_SIZE: usize = 13;

// =============================================================================
// Cipher
// =============================================================================

/// Largest IV of any cipher mode
pub const CIPHER_IV_MAX_SIZE: usize = 16;

/// CCM* (no tag) IV size
pub const CCM_STAR_IV_SIZE: usize = 13;

/// ChaCha20 stream cipher IV size
pub const CHACHA20_IV_SIZE: usize = 12;

// =============================================================================
// Hash and MAC
// =============================================================================

/// Largest digest in bytes
pub const HASH_MAX_SIZE: usize = 64;

/// Largest hash block in bytes
pub const HASH_BLOCK_MAX_SIZE: usize = 144;

/// Largest MAC in bytes
pub const MAC_MAX_SIZE: usize = 64;

/// Shortest truncated MAC accepted
pub const MAC_MIN_TRUNCATED_SIZE: usize = 4;

// =============================================================================
// Key derivation
// =============================================================================

/// Maximum PSK length for TLS 1.2 PSK-to-MS
pub const TLS12_PSK_TO_MS_PSK_MAX_SIZE: usize = 128;

/// Key derivation secret buffer
pub const KDF_KEY_MAX_SIZE: usize = 2 * TLS12_PSK_TO_MS_PSK_MAX_SIZE + 4;

/// Key derivation info/salt/seed buffer
pub const KDF_INFO_MAX_SIZE: usize = 256;

// =============================================================================
// Asymmetric
// =============================================================================

/// Private key size for P-256, X25519 and Ed25519
pub const ECC_PRIVATE_KEY_SIZE: usize = 32;

/// Largest exported public key (uncompressed P-256 point)
pub const ECC_PUBLIC_KEY_MAX_SIZE: usize = 65;

/// Largest signature (`r || s` for P-256, `R || S` for Ed25519)
pub const SIGNATURE_MAX_SIZE: usize = 64;

/// Largest raw key agreement output
pub const RAW_KEY_AGREEMENT_MAX_SIZE: usize = 32;

// =============================================================================
// Random
// =============================================================================

/// Largest single DRBG request in bytes
pub const DRBG_MAX_REQUEST_SIZE: usize = 1024;

/// DRBG seed material size
pub const DRBG_SEED_SIZE: usize = 48;

/// Largest number of drivers in one chain
pub const MAX_DRIVERS: usize = 4;

// =============================================================================
// Operation budgets
// =============================================================================

/// Upper bound on the size of an AEAD operation object
pub const AEAD_OPERATION_SIZE: usize = 4096;

/// Upper bound on the size of a cipher operation object
pub const CIPHER_OPERATION_SIZE: usize = 4096;

/// Upper bound on the size of a hash operation object
pub const HASH_OPERATION_SIZE: usize = 1024;

/// Upper bound on the size of a MAC operation object
pub const MAC_OPERATION_SIZE: usize = 4096;

/// Upper bound on the size of a key derivation operation object
pub const KEY_DERIVATION_OPERATION_SIZE: usize = 4096;
