// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Secure memory utilities
//!
//! Zeroization of buffers and whole operation objects, fixed-capacity secret
//! buffers, and constant-time comparison.

use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};
use psa_common::{PsaResult, Status};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Securely zero memory, preventing compiler optimization
#[inline(never)]
pub fn secure_zero(data: &mut [u8]) {
    for byte in data.iter_mut() {
        // SAFETY: We're writing to valid memory that we have mutable access to
        unsafe {
            ptr::write_volatile(byte, 0);
        }
    }

    compiler_fence(Ordering::SeqCst);
}

/// Drop the value in `slot`, wipe every byte it occupied, then store `fresh`
///
/// Used on every terminal transition of an operation so that neither the
/// live fields nor padding or stale enum payloads keep key-derived bytes.
#[inline(never)]
pub fn reset_in_place<T>(slot: &mut T, fresh: T) {
    let p = (slot as *mut T).cast::<u8>();
    // SAFETY: `slot` is a valid, exclusively borrowed `T`. It is dropped exactly once, its
    // storage is then overwritten byte-wise through a raw pointer (no reference to the dropped
    // value is created), and a fully initialized `T` is written back before returning.
    unsafe {
        ptr::drop_in_place(slot as *mut T);
        for i in 0..core::mem::size_of::<T>() {
            p.add(i).write_volatile(0);
        }
        ptr::write(slot as *mut T, fresh);
    }
    compiler_fence(Ordering::SeqCst);
}

/// Compare two byte slices in constant time
///
/// Slices of different length compare unequal without inspecting content.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Verify a computed tag against an expected one
///
/// Returns [`Status::InvalidSignature`] on mismatch.
pub fn verify_tag(computed: &[u8], expected: &[u8]) -> PsaResult<()> {
    if constant_time_eq(computed, expected) {
        Ok(())
    } else {
        Err(Status::InvalidSignature)
    }
}

/// Fixed-capacity secret buffer that zeroizes on drop
#[derive(Clone)]
pub struct SecretBuffer<const N: usize> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> SecretBuffer<N> {
    /// Create a new empty buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: [0u8; N],
            len: 0,
        }
    }

    /// Create from a byte slice
    ///
    /// Returns [`Status::InsufficientMemory`] if the slice exceeds the capacity.
    pub fn from_slice(slice: &[u8]) -> PsaResult<Self> {
        let mut buf = Self::new();
        buf.extend(slice)?;
        Ok(buf)
    }

    /// Append bytes
    pub fn extend(&mut self, slice: &[u8]) -> PsaResult<()> {
        let end = self
            .len
            .checked_add(slice.len())
            .filter(|&end| end <= N)
            .ok_or(Status::InsufficientMemory)?;
        self.data[self.len..end].copy_from_slice(slice);
        self.len = end;
        Ok(())
    }

    /// Get the stored bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Number of stored bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing is stored
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remaining capacity
    #[must_use]
    pub const fn remaining(&self) -> usize {
        N - self.len
    }
}

impl<const N: usize> Default for SecretBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AsRef<[u8]> for SecretBuffer<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<const N: usize> Zeroize for SecretBuffer<N> {
    fn zeroize(&mut self) {
        secure_zero(&mut self.data);
        self.len = 0;
    }
}

impl<const N: usize> Drop for SecretBuffer<N> {
    fn drop(&mut self) {
        self.zeroize();
    }
}
