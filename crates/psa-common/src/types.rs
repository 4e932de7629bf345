// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Common types for the PSA driver layer
//!
//! This module defines the bit-packed algorithm identifier, key types, key
//! lifetimes and locations, and the attribute descriptor handed to drivers
//! at setup time.

use core::fmt;

// =============================================================================
// Algorithm identifier
// =============================================================================

const CATEGORY_MASK: u32 = 0x7f00_0000;
const CATEGORY_HASH: u32 = 0x0200_0000;
const CATEGORY_MAC: u32 = 0x0300_0000;
const CATEGORY_CIPHER: u32 = 0x0400_0000;
const CATEGORY_AEAD: u32 = 0x0500_0000;
const CATEGORY_SIGN: u32 = 0x0600_0000;
const CATEGORY_KEY_DERIVATION: u32 = 0x0800_0000;
const CATEGORY_KEY_AGREEMENT: u32 = 0x0900_0000;

const ECDSA_BASE: u32 = 0x0600_0600;
const DETERMINISTIC_ECDSA_BASE: u32 = 0x0600_0700;
const ANY_HASH: u32 = 0x0000_00ff;

const HASH_MASK: u32 = 0x0000_00ff;
const HMAC_BASE: u32 = 0x0380_0000;
const MAC_SUBCATEGORY_MASK: u32 = 0x00c0_0000;

const LENGTH_MASK: u32 = 0x003f_0000;
const LENGTH_OFFSET: u32 = 16;
const AT_LEAST_THIS_LENGTH_FLAG: u32 = 0x0000_8000;

/// PSA algorithm identifier
///
/// A single `u32` encoding the category (hash, MAC, cipher, AEAD, signature,
/// key derivation, key agreement), the mode, and for AEAD/MAC algorithms the
/// tag length.
/// `Algorithm::NONE` (zero) marks an unconfigured operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Algorithm(u32);

impl Algorithm {
    /// No algorithm
    pub const NONE: Self = Self(0);

    // -- Hash ---------------------------------------------------------------
    /// SHA-1
    pub const SHA_1: Self = Self(0x0200_0005);
    /// SHA-224
    pub const SHA_224: Self = Self(0x0200_0008);
    /// SHA-256
    pub const SHA_256: Self = Self(0x0200_0009);
    /// SHA-384
    pub const SHA_384: Self = Self(0x0200_000a);
    /// SHA-512
    pub const SHA_512: Self = Self(0x0200_000b);
    /// SHA3-224
    pub const SHA3_224: Self = Self(0x0200_0010);
    /// SHA3-256
    pub const SHA3_256: Self = Self(0x0200_0011);
    /// SHA3-384
    pub const SHA3_384: Self = Self(0x0200_0012);
    /// SHA3-512
    pub const SHA3_512: Self = Self(0x0200_0013);

    // -- MAC ----------------------------------------------------------------
    /// AES-CMAC
    pub const CMAC: Self = Self(0x03c0_0200);

    // -- Cipher -------------------------------------------------------------
    /// Stream cipher (ChaCha20 for ChaCha20 keys)
    pub const STREAM_CIPHER: Self = Self(0x0480_0100);
    /// AES-CTR
    pub const CTR: Self = Self(0x04c0_1000);
    /// CCM* without authentication tag
    pub const CCM_STAR_NO_TAG: Self = Self(0x04c0_1300);
    /// AES-ECB without padding
    pub const ECB_NO_PADDING: Self = Self(0x0440_4400);
    /// AES-CBC without padding
    pub const CBC_NO_PADDING: Self = Self(0x0440_4000);
    /// AES-CBC with PKCS#7 padding
    pub const CBC_PKCS7: Self = Self(0x0440_4100);

    // -- AEAD ---------------------------------------------------------------
    /// AES-CCM with a 16-byte tag
    pub const CCM: Self = Self(0x0550_0100);
    /// AES-GCM with a 16-byte tag
    pub const GCM: Self = Self(0x0550_0200);
    /// ChaCha20-Poly1305
    pub const CHACHA20_POLY1305: Self = Self(0x0510_0500);

    // -- Key derivation -----------------------------------------------------
    const HKDF_BASE: u32 = 0x0800_0100;
    const TLS12_PRF_BASE: u32 = 0x0800_0200;
    const TLS12_PSK_TO_MS_BASE: u32 = 0x0800_0300;
    const HKDF_EXTRACT_BASE: u32 = 0x0800_0400;
    const HKDF_EXPAND_BASE: u32 = 0x0800_0500;
    const SP800_108_COUNTER_HMAC_BASE: u32 = 0x0800_0700;
    const PBKDF2_HMAC_BASE: u32 = 0x0880_0100;

    /// PBKDF2 with the AES-CMAC-PRF-128 pseudo-random function
    pub const PBKDF2_AES_CMAC_PRF_128: Self = Self(0x0880_0200);
    /// NIST SP 800-108 counter mode with AES-CMAC
    pub const SP800_108_COUNTER_CMAC: Self = Self(0x0800_0800);

    // Asymmetric
    /// ECDSA without a bound hash, for pre-hashed input of any length
    pub const ECDSA_ANY: Self = Self(ECDSA_BASE);
    /// EdDSA over the whole message (Ed25519)
    pub const PURE_EDDSA: Self = Self(0x0600_0800);
    /// Raw elliptic-curve Diffie-Hellman
    pub const ECDH: Self = Self(0x0902_0000);

    /// Wrap a raw identifier
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw identifier value
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Check if this is the zero (unconfigured) identifier
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }

    const fn category(&self) -> u32 {
        self.0 & CATEGORY_MASK
    }

    /// Check if this is a hash algorithm
    #[must_use]
    pub const fn is_hash(&self) -> bool {
        self.category() == CATEGORY_HASH
    }

    /// Check if this is a MAC algorithm
    #[must_use]
    pub const fn is_mac(&self) -> bool {
        self.category() == CATEGORY_MAC
    }

    /// Check if this is an unauthenticated cipher
    #[must_use]
    pub const fn is_cipher(&self) -> bool {
        self.category() == CATEGORY_CIPHER
    }

    /// Check if this is an AEAD algorithm
    #[must_use]
    pub const fn is_aead(&self) -> bool {
        self.category() == CATEGORY_AEAD
    }

    /// Check if this is a key derivation algorithm
    #[must_use]
    pub const fn is_key_derivation(&self) -> bool {
        self.category() == CATEGORY_KEY_DERIVATION
    }

    /// Check if this is an asymmetric signature algorithm
    #[must_use]
    pub const fn is_sign(&self) -> bool {
        self.category() == CATEGORY_SIGN
    }

    /// Check if this is a key agreement algorithm
    #[must_use]
    pub const fn is_key_agreement(&self) -> bool {
        self.category() == CATEGORY_KEY_AGREEMENT
    }

    // -------------------------------------------------------------------------
    // Hash helpers
    // -------------------------------------------------------------------------

    /// Digest length in bytes, zero for non-hash identifiers
    #[must_use]
    pub const fn hash_length(&self) -> usize {
        match self.0 {
            0x0200_0005 => 20,
            0x0200_0008 | 0x0200_0010 => 28,
            0x0200_0009 | 0x0200_0011 => 32,
            0x0200_000a | 0x0200_0012 => 48,
            0x0200_000b | 0x0200_0013 => 64,
            _ => 0,
        }
    }

    /// Hash block (rate) length in bytes, zero for non-hash identifiers
    #[must_use]
    pub const fn hash_block_length(&self) -> usize {
        match self.0 {
            0x0200_0005 | 0x0200_0008 | 0x0200_0009 => 64,
            0x0200_000a | 0x0200_000b => 128,
            0x0200_0010 => 144,
            0x0200_0011 => 136,
            0x0200_0012 => 104,
            0x0200_0013 => 72,
            _ => 0,
        }
    }

    /// Hash embedded in an HMAC or hash-based KDF identifier
    #[must_use]
    pub const fn get_hash(&self) -> Self {
        if self.0 & HASH_MASK == 0 {
            Self::NONE
        } else {
            Self((self.0 & HASH_MASK) | CATEGORY_HASH)
        }
    }

    // -------------------------------------------------------------------------
    // MAC helpers
    // -------------------------------------------------------------------------

    /// HMAC over the given hash
    #[must_use]
    pub const fn hmac(hash: Self) -> Self {
        Self(HMAC_BASE | (hash.0 & HASH_MASK))
    }

    /// Check if this is an HMAC identifier (any truncation)
    #[must_use]
    pub const fn is_hmac(&self) -> bool {
        (self.0 & (CATEGORY_MASK | MAC_SUBCATEGORY_MASK)) == HMAC_BASE
    }

    /// Full-length MAC identifier with truncation bits cleared
    #[must_use]
    pub const fn full_length_mac(&self) -> Self {
        Self(self.0 & !(LENGTH_MASK | AT_LEAST_THIS_LENGTH_FLAG))
    }

    /// MAC truncated to `length` bytes
    #[must_use]
    pub const fn truncated_mac(&self, length: usize) -> Self {
        Self((self.0 & !(LENGTH_MASK | AT_LEAST_THIS_LENGTH_FLAG)) | (((length as u32) << LENGTH_OFFSET) & LENGTH_MASK))
    }

    /// Truncated MAC length in bytes, zero when untruncated
    #[must_use]
    pub const fn mac_truncated_length(&self) -> usize {
        ((self.0 & LENGTH_MASK) >> LENGTH_OFFSET) as usize
    }

    // -------------------------------------------------------------------------
    // AEAD helpers
    // -------------------------------------------------------------------------

    /// Same AEAD mode with the tag length replaced
    ///
    /// `with_shortened_tag(0)` yields the tag-independent mode used as the
    /// dispatch key inside adapters.
    #[must_use]
    pub const fn with_shortened_tag(&self, tag_length: usize) -> Self {
        Self(
            (self.0 & !(LENGTH_MASK | AT_LEAST_THIS_LENGTH_FLAG))
                | (((tag_length as u32) << LENGTH_OFFSET) & LENGTH_MASK),
        )
    }

    /// Tag-length independent AEAD mode
    #[must_use]
    pub const fn aead_short(&self) -> Self {
        self.with_shortened_tag(0)
    }

    /// AEAD mode with its default 16-byte tag
    #[must_use]
    pub const fn with_default_tag(&self) -> Self {
        self.with_shortened_tag(16)
    }

    /// Tag length in bytes encoded in an AEAD identifier
    #[must_use]
    pub const fn tag_length(&self) -> usize {
        ((self.0 & LENGTH_MASK) >> LENGTH_OFFSET) as usize
    }

    // -------------------------------------------------------------------------
    // Key derivation helpers
    // -------------------------------------------------------------------------

    /// HKDF (extract and expand)
    #[must_use]
    pub const fn hkdf(hash: Self) -> Self {
        Self(Self::HKDF_BASE | (hash.0 & HASH_MASK))
    }

    /// HKDF extract step only
    #[must_use]
    pub const fn hkdf_extract(hash: Self) -> Self {
        Self(Self::HKDF_EXTRACT_BASE | (hash.0 & HASH_MASK))
    }

    /// HKDF expand step only
    #[must_use]
    pub const fn hkdf_expand(hash: Self) -> Self {
        Self(Self::HKDF_EXPAND_BASE | (hash.0 & HASH_MASK))
    }

    /// TLS 1.2 PRF
    #[must_use]
    pub const fn tls12_prf(hash: Self) -> Self {
        Self(Self::TLS12_PRF_BASE | (hash.0 & HASH_MASK))
    }

    /// TLS 1.2 PSK to master secret
    #[must_use]
    pub const fn tls12_psk_to_ms(hash: Self) -> Self {
        Self(Self::TLS12_PSK_TO_MS_BASE | (hash.0 & HASH_MASK))
    }

    /// PBKDF2 with HMAC
    #[must_use]
    pub const fn pbkdf2_hmac(hash: Self) -> Self {
        Self(Self::PBKDF2_HMAC_BASE | (hash.0 & HASH_MASK))
    }

    /// NIST SP 800-108 counter mode with HMAC
    #[must_use]
    pub const fn sp800_108_counter_hmac(hash: Self) -> Self {
        Self(Self::SP800_108_COUNTER_HMAC_BASE | (hash.0 & HASH_MASK))
    }

    const fn kdf_base(&self) -> u32 {
        self.0 & !HASH_MASK
    }

    /// Check if this is HKDF
    #[must_use]
    pub const fn is_hkdf(&self) -> bool {
        self.kdf_base() == Self::HKDF_BASE
    }

    /// Check if this is HKDF-Extract
    #[must_use]
    pub const fn is_hkdf_extract(&self) -> bool {
        self.kdf_base() == Self::HKDF_EXTRACT_BASE
    }

    /// Check if this is HKDF-Expand
    #[must_use]
    pub const fn is_hkdf_expand(&self) -> bool {
        self.kdf_base() == Self::HKDF_EXPAND_BASE
    }

    /// Check if this is the TLS 1.2 PRF
    #[must_use]
    pub const fn is_tls12_prf(&self) -> bool {
        self.kdf_base() == Self::TLS12_PRF_BASE
    }

    /// Check if this is TLS 1.2 PSK-to-MS
    #[must_use]
    pub const fn is_tls12_psk_to_ms(&self) -> bool {
        self.kdf_base() == Self::TLS12_PSK_TO_MS_BASE
    }

    /// Check if this is PBKDF2-HMAC
    #[must_use]
    pub const fn is_pbkdf2_hmac(&self) -> bool {
        self.kdf_base() == Self::PBKDF2_HMAC_BASE
    }

    /// Check if this is SP 800-108 counter mode with HMAC
    #[must_use]
    pub const fn is_sp800_108_counter_hmac(&self) -> bool {
        self.kdf_base() == Self::SP800_108_COUNTER_HMAC_BASE
    }

    // -------------------------------------------------------------------------
    // Asymmetric helpers
    // -------------------------------------------------------------------------

    /// Randomized ECDSA over the given hash
    #[must_use]
    pub const fn ecdsa(hash: Self) -> Self {
        Self(ECDSA_BASE | (hash.0 & HASH_MASK))
    }

    /// Deterministic (RFC 6979) ECDSA over the given hash
    #[must_use]
    pub const fn deterministic_ecdsa(hash: Self) -> Self {
        Self(DETERMINISTIC_ECDSA_BASE | (hash.0 & HASH_MASK))
    }

    /// Check if this is ECDSA, randomized or deterministic
    #[must_use]
    pub const fn is_ecdsa(&self) -> bool {
        self.0 & !HASH_MASK & !0x100 == ECDSA_BASE
    }

    /// Check if this is a signature that signs a digest of the message
    ///
    /// For these a message signature equals a hash signature over
    /// `hash_compute(get_hash(), message)`.
    #[must_use]
    pub const fn is_hash_and_sign(&self) -> bool {
        let hash = self.0 & HASH_MASK;
        self.is_ecdsa() && hash != 0 && hash != ANY_HASH
    }

    /// Check if this is pure EdDSA
    #[must_use]
    pub const fn is_pure_eddsa(&self) -> bool {
        self.0 == Self::PURE_EDDSA.0
    }

    /// Check if this is a raw key agreement, without a key derivation step
    #[must_use]
    pub const fn is_raw_key_agreement(&self) -> bool {
        self.is_key_agreement() && self.0 & 0xffff == 0
    }

    /// Short display name for known identifiers
    #[must_use]
    pub const fn name(&self) -> Option<&'static str> {
        let name = match self.0 {
            0x0200_0005 => "SHA-1",
            0x0200_0008 => "SHA-224",
            0x0200_0009 => "SHA-256",
            0x0200_000a => "SHA-384",
            0x0200_000b => "SHA-512",
            0x0200_0010 => "SHA3-224",
            0x0200_0011 => "SHA3-256",
            0x0200_0012 => "SHA3-384",
            0x0200_0013 => "SHA3-512",
            0x03c0_0200 => "CMAC",
            0x0480_0100 => "STREAM",
            0x04c0_1000 => "CTR",
            0x04c0_1300 => "CCM*",
            0x0440_4400 => "ECB",
            0x0440_4000 => "CBC",
            0x0440_4100 => "CBC-PKCS7",
            0x0600_0800 => "EdDSA",
            0x0902_0000 => "ECDH",
            _ if self.is_ecdsa() => "ECDSA",
            _ => return self.aead_name(),
        };
        Some(name)
    }

    const fn aead_name(&self) -> Option<&'static str> {
        match self.aead_short().0 {
            0x0540_0100 => Some("CCM"),
            0x0540_0200 => Some("GCM"),
            0x0500_0500 => Some("ChaCha20-Poly1305"),
            _ => None,
        }
    }
}

impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Algorithm(0x{:08x})", self.0)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) if self.is_aead() => write!(f, "{name}/{}", self.tag_length()),
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:08x}", self.0),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Algorithm {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "0x{:08x}", self.0);
    }
}

// =============================================================================
// Key types
// =============================================================================

/// PSA key type
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyType(u16);

impl KeyType {
    /// No key
    pub const NONE: Self = Self(0x0000);
    /// Raw data
    pub const RAW_DATA: Self = Self(0x1001);
    /// HMAC key
    pub const HMAC: Self = Self(0x1100);
    /// Key derivation secret
    pub const DERIVE: Self = Self(0x1200);
    /// Low-entropy password
    pub const PASSWORD: Self = Self(0x1203);
    /// AES key
    pub const AES: Self = Self(0x2400);
    /// ChaCha20 key
    pub const CHACHA20: Self = Self(0x2004);

    /// ECC key pair in `family`
    #[must_use]
    pub const fn ecc_key_pair(family: EccFamily) -> Self {
        Self(ECC_KEY_PAIR_BASE | family.0 as u16)
    }

    /// ECC public key in `family`
    #[must_use]
    pub const fn ecc_public_key(family: EccFamily) -> Self {
        Self(ECC_PUBLIC_KEY_BASE | family.0 as u16)
    }

    /// Check if this is an ECC key pair
    #[must_use]
    pub const fn is_ecc_key_pair(&self) -> bool {
        self.0 & 0xff00 == ECC_KEY_PAIR_BASE
    }

    /// Check if this is an ECC public key
    #[must_use]
    pub const fn is_ecc_public_key(&self) -> bool {
        self.0 & 0xff00 == ECC_PUBLIC_KEY_BASE
    }

    /// Curve family of an ECC key type
    #[must_use]
    pub const fn ecc_family(&self) -> Option<EccFamily> {
        if self.is_ecc_key_pair() || self.is_ecc_public_key() {
            Some(EccFamily((self.0 & 0xff) as u8))
        } else {
            None
        }
    }

    /// Public key type matching a key pair type; other types are returned as is
    #[must_use]
    pub const fn public_of_pair(&self) -> Self {
        if self.is_ecc_key_pair() {
            Self(ECC_PUBLIC_KEY_BASE | (self.0 & 0xff))
        } else {
            *self
        }
    }

    /// Wrap a raw key type
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw key type value
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Block length of the associated block cipher (1 for stream ciphers)
    #[must_use]
    pub const fn block_length(&self) -> usize {
        match self.0 {
            0x2400 => 16,
            0x2004 => 1,
            _ => 0,
        }
    }
}

impl fmt::Debug for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyType(0x{:04x})", self.0)
    }
}

const ECC_KEY_PAIR_BASE: u16 = 0x7100;
const ECC_PUBLIC_KEY_BASE: u16 = 0x4100;

/// Elliptic curve family of an ECC key type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EccFamily(u8);

impl EccFamily {
    /// NIST prime curves (P-256)
    pub const SECP_R1: Self = Self(0x12);
    /// Montgomery curves (Curve25519)
    pub const MONTGOMERY: Self = Self(0x41);
    /// Twisted Edwards curves (Edwards25519)
    pub const TWISTED_EDWARDS: Self = Self(0x42);

    /// Raw family value
    #[must_use]
    pub const fn raw(&self) -> u8 {
        self.0
    }
}

// =============================================================================
// Lifetime and location
// =============================================================================

/// Key storage location (24-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyLocation(u32);

impl KeyLocation {
    /// Plain memory, key material in export representation
    pub const LOCAL_STORAGE: Self = Self(0x00_0000);
    /// CRACEN opaque location
    pub const CRACEN: Self = Self(0x80_4e00);
    /// CRACEN key-management-unit slot
    pub const CRACEN_KMU: Self = Self(0x80_4e4b);

    /// Wrap a raw location
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw & 0x00ff_ffff)
    }

    /// Raw location value
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

/// Key lifetime: persistence level in bits 0..7, location in bits 8..31
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyLifetime(u32);

impl KeyLifetime {
    /// Volatile key in local storage
    pub const VOLATILE: Self = Self(0x0000_0000);
    /// Persistent key in local storage
    pub const PERSISTENT: Self = Self(0x0000_0001);

    /// Compose a lifetime from persistence and location
    #[must_use]
    pub const fn new(persistence: u8, location: KeyLocation) -> Self {
        Self((location.0 << 8) | persistence as u32)
    }

    /// Wrap a raw lifetime
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw lifetime value
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Persistence level
    #[must_use]
    pub const fn persistence(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Storage location
    #[must_use]
    pub const fn location(&self) -> KeyLocation {
        KeyLocation(self.0 >> 8)
    }
}

impl Default for KeyLifetime {
    fn default() -> Self {
        Self::VOLATILE
    }
}

/// Key attributes passed to driver setup functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyAttributes {
    key_type: KeyType,
    bits: usize,
    lifetime: KeyLifetime,
}

impl KeyAttributes {
    /// Attributes for a volatile key in local storage
    #[must_use]
    pub const fn new(key_type: KeyType, bits: usize) -> Self {
        Self {
            key_type,
            bits,
            lifetime: KeyLifetime::VOLATILE,
        }
    }

    /// Attributes for a key of `key_type` sized to `key`
    #[must_use]
    pub const fn for_key(key_type: KeyType, key: &[u8]) -> Self {
        Self::new(key_type, key.len() * 8)
    }

    /// Same attributes with a different lifetime
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: KeyLifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Key type
    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Declared key size in bits
    #[must_use]
    pub const fn bits(&self) -> usize {
        self.bits
    }

    /// Key lifetime
    #[must_use]
    pub const fn lifetime(&self) -> KeyLifetime {
        self.lifetime
    }

    /// Key location derived from the lifetime
    #[must_use]
    pub const fn location(&self) -> KeyLocation {
        self.lifetime.location()
    }
}

// =============================================================================
// Operation vocabulary
// =============================================================================

/// Direction of a cipher or AEAD operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Encrypt (or sign for MAC)
    Encrypt,
    /// Decrypt (or verify for MAC)
    Decrypt,
}

/// Key derivation input step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum KeyDerivationStep {
    /// Secret input
    Secret = 0x0101,
    /// Low-entropy password
    Password = 0x0102,
    /// Additional secret (TLS 1.2 PSK-to-MS)
    OtherSecret = 0x0103,
    /// Label
    Label = 0x0201,
    /// Salt
    Salt = 0x0202,
    /// Application info
    Info = 0x0203,
    /// Seed
    Seed = 0x0204,
    /// Iteration count
    Cost = 0x0205,
    /// Context
    Context = 0x0206,
}

impl KeyDerivationStep {
    /// Decode a raw PSA step identifier
    #[must_use]
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0x0101 => Some(Self::Secret),
            0x0102 => Some(Self::Password),
            0x0103 => Some(Self::OtherSecret),
            0x0201 => Some(Self::Label),
            0x0202 => Some(Self::Salt),
            0x0203 => Some(Self::Info),
            0x0204 => Some(Self::Seed),
            0x0205 => Some(Self::Cost),
            0x0206 => Some(Self::Context),
            _ => None,
        }
    }
}
