// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL trait definitions
//!
//! Platform-agnostic interfaces to the accelerator blocks the crypto drivers
//! use. Implementations may be register-level drivers or test doubles.

use crate::error::{HalError, HalResult};

/// AES block size handled by [`AesEngine`]
pub const AES_BLOCK_LEN: usize = 16;

/// Direction of a raw block transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDirection {
    /// Forward cipher
    Encrypt,
    /// Inverse cipher
    Decrypt,
}

/// Hardware AES block engine
///
/// The engine holds at most one key. Callers load the key before each
/// sequence of block calls since another operation may have replaced it.
pub trait AesEngine {
    /// Check if the engine is present and initialized
    fn is_available(&self) -> bool;

    /// Load an AES key
    ///
    /// Returns [`HalError::UnsupportedKeySize`] for key lengths the engine
    /// cannot handle.
    fn load_key(&mut self, key: &[u8]) -> HalResult<()>;

    /// Transform one block in place with the loaded key
    fn process_block(&mut self, direction: BlockDirection, block: &mut [u8; AES_BLOCK_LEN])
        -> HalResult<()>;

    /// Wipe the key registers
    fn clear_key(&mut self);

    /// Encrypt one block in place
    fn encrypt_block(&mut self, block: &mut [u8; AES_BLOCK_LEN]) -> HalResult<()> {
        self.process_block(BlockDirection::Encrypt, block)
    }

    /// Decrypt one block in place
    fn decrypt_block(&mut self, block: &mut [u8; AES_BLOCK_LEN]) -> HalResult<()> {
        self.process_block(BlockDirection::Decrypt, block)
    }

    /// Process whole blocks from `input` into `output`
    fn process_blocks(
        &mut self,
        direction: BlockDirection,
        input: &[u8],
        output: &mut [u8],
    ) -> HalResult<()> {
        if input.len() % AES_BLOCK_LEN != 0 || output.len() < input.len() {
            return Err(HalError::InvalidParameter);
        }

        for (src, dst) in input
            .chunks_exact(AES_BLOCK_LEN)
            .zip(output.chunks_exact_mut(AES_BLOCK_LEN))
        {
            let mut block = [0u8; AES_BLOCK_LEN];
            block.copy_from_slice(src);
            self.process_block(direction, &mut block)?;
            dst.copy_from_slice(&block);
        }

        Ok(())
    }
}

/// Hardware entropy source (TRNG)
pub trait EntropySource {
    /// Check if the source is ready to deliver entropy
    fn is_ready(&self) -> bool;

    /// Fill `buffer` with full-entropy bytes
    fn fill_entropy(&mut self, buffer: &mut [u8]) -> HalResult<()>;

    /// Get a random u32
    fn next_u32(&mut self) -> HalResult<u32> {
        let mut buf = [0u8; 4];
        self.fill_entropy(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}
