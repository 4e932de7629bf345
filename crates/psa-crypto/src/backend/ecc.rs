// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Elliptic-curve signatures and key agreement
//!
//! Keys are held in their export representation: a 32-byte private value
//! for every key pair, an uncompressed SEC1 point for P-256 public keys,
//! and the raw 32-byte encoding for Curve25519 and Edwards25519 public keys.

use crate::backend::hash::HashState;
use crate::zeroize_utils::secure_zero;
use ed25519_dalek::Signer as _;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use psa_common::constants::{
    ECC_PRIVATE_KEY_SIZE, ECC_PUBLIC_KEY_MAX_SIZE, HASH_MAX_SIZE, RAW_KEY_AGREEMENT_MAX_SIZE,
    SIGNATURE_MAX_SIZE,
};
use psa_common::{Algorithm, EccFamily, KeyAttributes, KeyType, PsaResult, Status};
use rand_core::RngCore;
use zeroize::Zeroizing;

const P256_PUBLIC_KEY_SIZE: usize = 65;
const SEC1_UNCOMPRESSED: u8 = 0x04;
const MONTGOMERY_PUBLIC_KEY_SIZE: usize = 32;

/// Draws before key generation gives up on out-of-range scalars
const GENERATE_ATTEMPTS: usize = 8;

/// Supported curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    /// NIST P-256
    P256,
    /// Curve25519 (X25519)
    Curve25519,
    /// Edwards25519 (Ed25519)
    Edwards25519,
}

impl Curve {
    /// Curve behind an ECC key type
    ///
    /// A `bits` of zero accepts the curve size. Other families and sizes
    /// are [`Status::NotSupported`].
    pub fn from_key(key_type: KeyType, bits: usize) -> PsaResult<Self> {
        let curve = match key_type.ecc_family() {
            Some(EccFamily::SECP_R1) => Self::P256,
            Some(EccFamily::MONTGOMERY) => Self::Curve25519,
            Some(EccFamily::TWISTED_EDWARDS) => Self::Edwards25519,
            _ => return Err(Status::NotSupported),
        };
        if bits != 0 && bits != curve.bits() {
            return Err(Status::NotSupported);
        }
        Ok(curve)
    }

    /// Key size in bits
    #[must_use]
    pub const fn bits(self) -> usize {
        match self {
            Self::P256 => 256,
            Self::Curve25519 | Self::Edwards25519 => 255,
        }
    }

    /// Length of an exported public key
    #[must_use]
    pub const fn public_key_length(self) -> usize {
        match self {
            Self::P256 => P256_PUBLIC_KEY_SIZE,
            Self::Curve25519 | Self::Edwards25519 => MONTGOMERY_PUBLIC_KEY_SIZE,
        }
    }
}

fn private_bytes(key: &[u8]) -> PsaResult<Zeroizing<[u8; ECC_PRIVATE_KEY_SIZE]>> {
    let bytes: [u8; ECC_PRIVATE_KEY_SIZE] = key.try_into().map_err(|_| Status::InvalidArgument)?;
    Ok(Zeroizing::new(bytes))
}

fn p256_secret(key: &[u8]) -> PsaResult<p256::SecretKey> {
    if key.len() != ECC_PRIVATE_KEY_SIZE {
        return Err(Status::InvalidArgument);
    }
    // Rejects zero and scalars not below the group order.
    p256::SecretKey::from_slice(key).map_err(|_| Status::InvalidArgument)
}

fn p256_public(key: &[u8]) -> PsaResult<p256::PublicKey> {
    if key.len() != P256_PUBLIC_KEY_SIZE || key.first() != Some(&SEC1_UNCOMPRESSED) {
        return Err(Status::InvalidArgument);
    }
    p256::PublicKey::from_sec1_bytes(key).map_err(|_| Status::InvalidArgument)
}

fn ed25519_public(key: &[u8]) -> PsaResult<ed25519_dalek::VerifyingKey> {
    let bytes: [u8; 32] = key.try_into().map_err(|_| Status::InvalidArgument)?;
    ed25519_dalek::VerifyingKey::from_bytes(&bytes).map_err(|_| Status::InvalidArgument)
}

/// Check a private key
pub fn check_private_key(curve: Curve, key: &[u8]) -> PsaResult<()> {
    match curve {
        Curve::P256 => p256_secret(key).map(|_| ()),
        Curve::Curve25519 | Curve::Edwards25519 => private_bytes(key).map(|_| ()),
    }
}

/// Check a public key; P-256 points must be uncompressed and on the curve
pub fn check_public_key(curve: Curve, key: &[u8]) -> PsaResult<()> {
    match curve {
        Curve::P256 => p256_public(key).map(|_| ()),
        Curve::Curve25519 if key.len() == MONTGOMERY_PUBLIC_KEY_SIZE => Ok(()),
        Curve::Curve25519 => Err(Status::InvalidArgument),
        Curve::Edwards25519 => ed25519_public(key).map(|_| ()),
    }
}

/// Write the public key of `private` to `output`
pub fn public_key(curve: Curve, private: &[u8], output: &mut [u8]) -> PsaResult<usize> {
    let length = curve.public_key_length();
    let out = output.get_mut(..length).ok_or(Status::BufferTooSmall)?;
    match curve {
        Curve::P256 => {
            let point = p256_secret(private)?.public_key().to_encoded_point(false);
            out.copy_from_slice(point.as_bytes());
        }
        Curve::Curve25519 => {
            let secret = x25519_dalek::StaticSecret::from(*private_bytes(private)?);
            out.copy_from_slice(x25519_dalek::PublicKey::from(&secret).as_bytes());
        }
        Curve::Edwards25519 => {
            let key = ed25519_dalek::SigningKey::from_bytes(&*private_bytes(private)?);
            out.copy_from_slice(key.verifying_key().as_bytes());
        }
    }
    Ok(length)
}

/// Draw a private key from `rng`
///
/// P-256 draws outside `[1, n)` are retried a few times before giving up
/// with [`Status::InsufficientEntropy`].
pub fn generate(curve: Curve, rng: &mut dyn RngCore, output: &mut [u8]) -> PsaResult<usize> {
    let out = output
        .get_mut(..ECC_PRIVATE_KEY_SIZE)
        .ok_or(Status::BufferTooSmall)?;
    for _ in 0..GENERATE_ATTEMPTS {
        if rng.try_fill_bytes(out).is_err() {
            break;
        }
        if check_private_key(curve, out).is_ok() {
            return Ok(ECC_PRIVATE_KEY_SIZE);
        }
    }
    secure_zero(out);
    Err(Status::InsufficientEntropy)
}

fn check_hash_length(alg: Algorithm, hash: &[u8]) -> PsaResult<()> {
    if alg.is_hash_and_sign() && hash.len() != alg.get_hash().hash_length() {
        return Err(Status::InvalidArgument);
    }
    Ok(())
}

/// ECDSA over a precomputed hash; writes `r || s`
///
/// Signatures are deterministic (RFC 6979) for both the randomized and
/// the deterministic algorithm identifiers.
pub fn ecdsa_sign_hash(
    alg: Algorithm,
    private: &[u8],
    hash: &[u8],
    signature: &mut [u8],
) -> PsaResult<usize> {
    check_hash_length(alg, hash)?;
    let out = signature
        .get_mut(..SIGNATURE_MAX_SIZE)
        .ok_or(Status::BufferTooSmall)?;
    let key = p256::ecdsa::SigningKey::from(p256_secret(private)?);
    let sig: p256::ecdsa::Signature = key
        .sign_prehash(hash)
        .map_err(|_| Status::InvalidArgument)?;
    out.copy_from_slice(&sig.to_bytes());
    Ok(SIGNATURE_MAX_SIZE)
}

/// Check an ECDSA `r || s` signature over a precomputed hash
pub fn ecdsa_verify_hash(
    alg: Algorithm,
    public: &[u8],
    hash: &[u8],
    signature: &[u8],
) -> PsaResult<()> {
    check_hash_length(alg, hash)?;
    let key = p256::ecdsa::VerifyingKey::from(p256_public(public)?);
    let sig =
        p256::ecdsa::Signature::from_slice(signature).map_err(|_| Status::InvalidSignature)?;
    key.verify_prehash(hash, &sig)
        .map_err(|_| Status::InvalidSignature)
}

/// Hash `message` with the algorithm's hash, then sign the digest
pub fn ecdsa_sign_message(
    alg: Algorithm,
    private: &[u8],
    message: &[u8],
    signature: &mut [u8],
) -> PsaResult<usize> {
    let mut digest = [0u8; HASH_MAX_SIZE];
    let result = HashState::digest(alg.get_hash(), message, &mut digest)
        .and_then(|length| ecdsa_sign_hash(alg, private, &digest[..length], signature));
    secure_zero(&mut digest);
    result
}

/// Hash `message` with the algorithm's hash, then check the signature
pub fn ecdsa_verify_message(
    alg: Algorithm,
    public: &[u8],
    message: &[u8],
    signature: &[u8],
) -> PsaResult<()> {
    let mut digest = [0u8; HASH_MAX_SIZE];
    let length = HashState::digest(alg.get_hash(), message, &mut digest)?;
    ecdsa_verify_hash(alg, public, &digest[..length], signature)
}

/// Ed25519 signature over the whole message
pub fn ed25519_sign(private: &[u8], message: &[u8], signature: &mut [u8]) -> PsaResult<usize> {
    let out = signature
        .get_mut(..SIGNATURE_MAX_SIZE)
        .ok_or(Status::BufferTooSmall)?;
    let key = ed25519_dalek::SigningKey::from_bytes(&*private_bytes(private)?);
    out.copy_from_slice(&key.sign(message).to_bytes());
    Ok(SIGNATURE_MAX_SIZE)
}

/// Strict Ed25519 verification
pub fn ed25519_verify(public: &[u8], message: &[u8], signature: &[u8]) -> PsaResult<()> {
    let key = ed25519_public(public)?;
    let bytes: [u8; SIGNATURE_MAX_SIZE] =
        signature.try_into().map_err(|_| Status::InvalidSignature)?;
    let sig = ed25519_dalek::Signature::from_bytes(&bytes);
    key.verify_strict(message, &sig)
        .map_err(|_| Status::InvalidSignature)
}

/// Raw Diffie-Hellman shared secret (the x-coordinate for P-256)
///
/// An X25519 peer of small order gives an all-zero secret and is refused.
pub fn agree(curve: Curve, private: &[u8], peer: &[u8], output: &mut [u8]) -> PsaResult<usize> {
    if curve == Curve::Edwards25519 {
        return Err(Status::NotSupported);
    }
    let out = output
        .get_mut(..RAW_KEY_AGREEMENT_MAX_SIZE)
        .ok_or(Status::BufferTooSmall)?;
    if curve == Curve::P256 {
        let secret = p256_secret(private)?;
        let public = p256_public(peer)?;
        let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
        out.copy_from_slice(shared.raw_secret_bytes().as_slice());
    } else {
        let peer: [u8; MONTGOMERY_PUBLIC_KEY_SIZE] =
            peer.try_into().map_err(|_| Status::InvalidArgument)?;
        let secret = x25519_dalek::StaticSecret::from(*private_bytes(private)?);
        let shared = secret.diffie_hellman(&x25519_dalek::PublicKey::from(peer));
        if !shared.was_contributory() {
            return Err(Status::InvalidArgument);
        }
        out.copy_from_slice(shared.as_bytes());
    }
    Ok(RAW_KEY_AGREEMENT_MAX_SIZE)
}

// =============================================================================
// Key-level entry points shared by the software drivers
// =============================================================================

fn key_pair_curve(attributes: &KeyAttributes) -> PsaResult<Curve> {
    let key_type = attributes.key_type();
    if key_type.is_ecc_public_key() {
        return Err(Status::InvalidArgument);
    }
    Curve::from_key(key_type, attributes.bits())
}

/// Run `f` over the public half of `key`, deriving it for key pairs
fn with_public_key<T>(
    attributes: &KeyAttributes,
    key: &[u8],
    f: impl FnOnce(Curve, &[u8]) -> PsaResult<T>,
) -> PsaResult<T> {
    let key_type = attributes.key_type();
    let curve = Curve::from_key(key_type, attributes.bits())?;
    if key_type.is_ecc_key_pair() {
        let mut public = [0u8; ECC_PUBLIC_KEY_MAX_SIZE];
        let length = public_key(curve, key, &mut public)?;
        f(curve, &public[..length])
    } else {
        f(curve, key)
    }
}

/// Sign a precomputed hash with an ECC key pair
///
/// Pure EdDSA has no hash form and is [`Status::InvalidArgument`].
pub fn sign_hash(
    attributes: &KeyAttributes,
    key: &[u8],
    alg: Algorithm,
    hash: &[u8],
    signature: &mut [u8],
) -> PsaResult<usize> {
    match key_pair_curve(attributes)? {
        Curve::P256 if alg.is_ecdsa() => ecdsa_sign_hash(alg, key, hash, signature),
        Curve::Edwards25519 if alg.is_pure_eddsa() => Err(Status::InvalidArgument),
        _ => Err(Status::NotSupported),
    }
}

/// Check a signature over a precomputed hash with a key pair or public key
pub fn verify_hash(
    attributes: &KeyAttributes,
    key: &[u8],
    alg: Algorithm,
    hash: &[u8],
    signature: &[u8],
) -> PsaResult<()> {
    with_public_key(attributes, key, |curve, public| match curve {
        Curve::P256 if alg.is_ecdsa() => ecdsa_verify_hash(alg, public, hash, signature),
        Curve::Edwards25519 if alg.is_pure_eddsa() => Err(Status::InvalidArgument),
        _ => Err(Status::NotSupported),
    })
}

/// Sign a whole message: hash-and-sign ECDSA or pure EdDSA
pub fn sign_message(
    attributes: &KeyAttributes,
    key: &[u8],
    alg: Algorithm,
    message: &[u8],
    signature: &mut [u8],
) -> PsaResult<usize> {
    match key_pair_curve(attributes)? {
        Curve::P256 if alg.is_hash_and_sign() => ecdsa_sign_message(alg, key, message, signature),
        Curve::Edwards25519 if alg.is_pure_eddsa() => ed25519_sign(key, message, signature),
        _ => Err(Status::NotSupported),
    }
}

/// Check a signature over a whole message
pub fn verify_message(
    attributes: &KeyAttributes,
    key: &[u8],
    alg: Algorithm,
    message: &[u8],
    signature: &[u8],
) -> PsaResult<()> {
    with_public_key(attributes, key, |curve, public| match curve {
        Curve::P256 if alg.is_hash_and_sign() => {
            ecdsa_verify_message(alg, public, message, signature)
        }
        Curve::Edwards25519 if alg.is_pure_eddsa() => ed25519_verify(public, message, signature),
        _ => Err(Status::NotSupported),
    })
}

/// Raw ECDH between the key pair in `private_key` and `peer_key`
pub fn key_agreement(
    attributes: &KeyAttributes,
    private_key: &[u8],
    alg: Algorithm,
    peer_key: &[u8],
    output: &mut [u8],
) -> PsaResult<usize> {
    if alg != Algorithm::ECDH {
        return Err(Status::NotSupported);
    }
    agree(key_pair_curve(attributes)?, private_key, peer_key, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> heapless::Vec<u8, 128> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    const P256_KEY: &str = "c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721";

    fn p256_public_key() -> heapless::Vec<u8, 128> {
        hex(concat!(
            "04",
            "60fed4ba255a9d31c961eb74c6356d68c049b8923b61fa6ce669622e60f29fb6",
            "7903fe1008b8bc99a41ae9e95628bc64f2f1b20c2d7e9f5177a3c294d4462299"
        ))
    }

    #[test]
    fn test_p256_public_key() {
        let mut out = [0u8; 65];
        assert_eq!(public_key(Curve::P256, &hex(P256_KEY), &mut out), Ok(65));
        assert_eq!(&out[..], &p256_public_key()[..]);
    }

    #[test]
    fn test_ecdsa_rfc6979_sample() {
        let alg = Algorithm::deterministic_ecdsa(Algorithm::SHA_256);
        let mut sig = [0u8; 64];
        assert_eq!(ecdsa_sign_message(alg, &hex(P256_KEY), b"sample", &mut sig), Ok(64));
        let expected = hex(concat!(
            "efd48b2aacb6a8fd1140dd9cd45e81d69d2c877b56aaf991c34d0ea84eaf3716",
            "f7cb1c942d657c41d436c7a1b6e29f65f3e900dbb9aff4064dc4ab2f843acda8"
        ));
        assert_eq!(&sig[..], &expected[..]);
        assert_eq!(ecdsa_verify_message(alg, &p256_public_key(), b"sample", &sig), Ok(()));
        assert_eq!(
            ecdsa_verify_message(alg, &p256_public_key(), b"sampl3", &sig),
            Err(Status::InvalidSignature)
        );
    }

    #[test]
    fn test_ecdsa_hash_length_must_match() {
        let alg = Algorithm::ecdsa(Algorithm::SHA_256);
        let mut sig = [0u8; 64];
        assert_eq!(
            ecdsa_sign_hash(alg, &hex(P256_KEY), &[0u8; 20], &mut sig),
            Err(Status::InvalidArgument)
        );
        assert_eq!(
            ecdsa_sign_hash(alg, &hex(P256_KEY), &[0u8; 32], &mut sig[..63]),
            Err(Status::BufferTooSmall)
        );
    }

    #[test]
    fn test_p256_rejects_bad_keys() {
        assert_eq!(check_private_key(Curve::P256, &[0u8; 32]), Err(Status::InvalidArgument));
        assert_eq!(check_private_key(Curve::P256, &[0xff; 32]), Err(Status::InvalidArgument));
        let mut point = p256_public_key();
        point[64] ^= 1;
        assert_eq!(check_public_key(Curve::P256, &point), Err(Status::InvalidArgument));
        assert_eq!(
            check_public_key(Curve::P256, &p256_public_key()[1..]),
            Err(Status::InvalidArgument)
        );
    }

    #[test]
    fn test_ed25519_rfc8032_empty_message() {
        let secret = hex("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60");
        let public = hex("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a");
        let expected = hex(concat!(
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155",
            "5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        ));

        let mut derived = [0u8; 32];
        assert_eq!(public_key(Curve::Edwards25519, &secret, &mut derived), Ok(32));
        assert_eq!(&derived[..], &public[..]);

        let mut sig = [0u8; 64];
        assert_eq!(ed25519_sign(&secret, b"", &mut sig), Ok(64));
        assert_eq!(&sig[..], &expected[..]);
        assert_eq!(ed25519_verify(&public, b"", &sig), Ok(()));

        sig[0] ^= 0x80;
        assert_eq!(ed25519_verify(&public, b"", &sig), Err(Status::InvalidSignature));
        assert_eq!(ed25519_verify(&public, b"", &sig[..63]), Err(Status::InvalidSignature));
    }

    #[test]
    fn test_x25519_rfc7748() {
        let alice = hex("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
        let alice_public = hex("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a");
        let bob = hex("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb");
        let bob_public = hex("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f");
        let shared = hex("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");

        let mut out = [0u8; 32];
        assert_eq!(public_key(Curve::Curve25519, &alice, &mut out), Ok(32));
        assert_eq!(&out[..], &alice_public[..]);

        assert_eq!(agree(Curve::Curve25519, &alice, &bob_public, &mut out), Ok(32));
        assert_eq!(&out[..], &shared[..]);
        assert_eq!(agree(Curve::Curve25519, &bob, &alice_public, &mut out), Ok(32));
        assert_eq!(&out[..], &shared[..]);
    }

    #[test]
    fn test_x25519_small_order_peer() {
        let alice = hex("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
        let mut out = [0u8; 32];
        assert_eq!(
            agree(Curve::Curve25519, &alice, &[0u8; 32], &mut out),
            Err(Status::InvalidArgument)
        );
    }

    #[test]
    fn test_p256_ecdh_is_symmetric() {
        let a = hex(P256_KEY);
        let b = hex("0f56db78ca460b055c500064824bed999a25aaf48ebb519ac201537b85479813");
        let mut a_public = [0u8; 65];
        let mut b_public = [0u8; 65];
        public_key(Curve::P256, &a, &mut a_public).unwrap();
        public_key(Curve::P256, &b, &mut b_public).unwrap();

        let mut ab = [0u8; 32];
        let mut ba = [0u8; 32];
        assert_eq!(agree(Curve::P256, &a, &b_public, &mut ab), Ok(32));
        assert_eq!(agree(Curve::P256, &b, &a_public, &mut ba), Ok(32));
        assert_eq!(ab, ba);
        assert_ne!(ab, [0u8; 32]);
    }

    #[test]
    fn test_ed25519_has_no_agreement() {
        let mut out = [0u8; 32];
        assert_eq!(
            agree(Curve::Edwards25519, &[1u8; 32], &[2u8; 32], &mut out),
            Err(Status::NotSupported)
        );
    }

    #[test]
    fn test_curve_from_key() {
        let pair = KeyType::ecc_key_pair(EccFamily::SECP_R1);
        assert_eq!(Curve::from_key(pair, 256), Ok(Curve::P256));
        assert_eq!(Curve::from_key(pair, 0), Ok(Curve::P256));
        assert_eq!(Curve::from_key(pair, 384), Err(Status::NotSupported));
        assert_eq!(Curve::from_key(KeyType::AES, 128), Err(Status::NotSupported));
        let public = KeyType::ecc_public_key(EccFamily::MONTGOMERY);
        assert_eq!(Curve::from_key(public, 255), Ok(Curve::Curve25519));
    }

    struct Repeating(u8);

    impl RngCore for Repeating {
        fn next_u32(&mut self) -> u32 {
            u32::from(self.0)
        }
        fn next_u64(&mut self) -> u64 {
            u64::from(self.0)
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(self.0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            dest.fill(self.0);
            Ok(())
        }
    }

    #[test]
    fn test_generate_retries_then_gives_up() {
        let mut out = [0u8; 32];
        assert_eq!(generate(Curve::P256, &mut Repeating(0x42), &mut out), Ok(32));
        assert_eq!(out, [0x42; 32]);
        // All-ones is above the P-256 order on every draw.
        assert_eq!(
            generate(Curve::P256, &mut Repeating(0xff), &mut out),
            Err(Status::InsufficientEntropy)
        );
        assert_eq!(out, [0u8; 32]);
    }

    #[test]
    fn test_key_level_routing() {
        let pair = KeyAttributes::new(KeyType::ecc_key_pair(EccFamily::SECP_R1), 256);
        let public = KeyAttributes::new(KeyType::ecc_public_key(EccFamily::SECP_R1), 256);
        let alg = Algorithm::ecdsa(Algorithm::SHA_256);
        let key = hex(P256_KEY);
        let mut sig = [0u8; 64];

        assert_eq!(sign_message(&pair, &key, alg, b"sample", &mut sig), Ok(64));
        assert_eq!(verify_message(&pair, &key, alg, b"sample", &sig), Ok(()));
        assert_eq!(verify_message(&public, &p256_public_key(), alg, b"sample", &sig), Ok(()));
        assert_eq!(
            sign_message(&public, &p256_public_key(), alg, b"sample", &mut sig),
            Err(Status::InvalidArgument)
        );
        assert_eq!(
            sign_message(&pair, &key, Algorithm::ECDSA_ANY, b"sample", &mut sig),
            Err(Status::NotSupported)
        );
        let aes = KeyAttributes::new(KeyType::AES, 128);
        assert_eq!(
            sign_hash(&aes, &[0u8; 16], alg, &[0u8; 32], &mut sig),
            Err(Status::NotSupported)
        );

        let edwards = KeyAttributes::new(KeyType::ecc_key_pair(EccFamily::TWISTED_EDWARDS), 255);
        assert_eq!(
            sign_hash(&edwards, &[1u8; 32], Algorithm::PURE_EDDSA, &[0u8; 32], &mut sig),
            Err(Status::InvalidArgument)
        );

        let mut shared = [0u8; 32];
        assert_eq!(
            key_agreement(&pair, &key, Algorithm::SHA_256, &p256_public_key(), &mut shared),
            Err(Status::NotSupported)
        );
    }
}
