// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Arm CryptoCell-310 (CC3XX) Accelerator Driver
//!
//! This module drives two blocks of the CryptoCell:
//!
//! - **AES**: single-block AES-128/AES-256 through the PIO data path
//! - **TRNG**: ring-oscillator entropy collected in 192-bit EHR words
//!
//! # Reference
//! Arm CryptoCell-310 Technical Reference Manual, host register map
//! (nRF52840 instance at `0x5002_B000`).
//!
//! # Security
//!
//! - Key registers are cleared by [`Cc3xxAes::deinit`] and [`AesEngine::clear_key`]
//! - DMA is never used; data moves through the PIO buffers only
//! - Every busy-wait is bounded by `timeout_cycles`

use crate::error::{HalError, HalResult};
use crate::traits::{AesEngine, BlockDirection, EntropySource, AES_BLOCK_LEN};
use core::sync::atomic::{compiler_fence, Ordering};

// ============================================================================
// Peripheral enable (nRF52840 CRYPTOCELL wrapper)
// ============================================================================

/// CRYPTOCELL.ENABLE register
const CRYPTOCELL_ENABLE: u32 = 0x5002_A500;

// ============================================================================
// CC310 host register map
// ============================================================================

/// CryptoCell register base
const CC_BASE: u32 = 0x5002_B000;

// RNG registers
const RNG_ISR: u32 = CC_BASE + 0x104;           // Interrupt status
const RNG_ICR: u32 = CC_BASE + 0x108;           // Interrupt clear
const TRNG_CONFIG: u32 = CC_BASE + 0x10C;       // Ring oscillator length select
const EHR_DATA_0: u32 = CC_BASE + 0x114;        // Entropy holding register word 0
const RND_SOURCE_ENABLE: u32 = CC_BASE + 0x12C; // Entropy source enable
const SAMPLE_CNT1: u32 = CC_BASE + 0x130;       // Sampling interval
const RNG_SW_RESET: u32 = CC_BASE + 0x140;      // RNG soft reset
const RNG_CLK_ENABLE: u32 = CC_BASE + 0x1C4;    // RNG clock gate

// AES registers
const AES_KEY_0: u32 = CC_BASE + 0x400;         // Key 0 word 0 (8 words)
const AES_BUSY: u32 = CC_BASE + 0x470;          // AES busy flag
const AES_CONTROL: u32 = CC_BASE + 0x4C0;       // Direction, mode, key size
const AES_SW_RESET: u32 = CC_BASE + 0x4F4;      // AES soft reset
const AES_CLK_ENABLE: u32 = CC_BASE + 0x810;    // AES clock gate
const CRYPTO_CTL: u32 = CC_BASE + 0x900;        // Engine routing
const CRYPTO_BUSY: u32 = CC_BASE + 0x910;       // Any engine busy
const DIN_BUFFER: u32 = CC_BASE + 0xC00;        // PIO input (4 words)
const DOUT_BUFFER: u32 = CC_BASE + 0xC20;       // PIO output (4 words)

// AES_CONTROL bit definitions
const AES_CONTROL_DEC_KEY0: u32 = 1 << 0;
const AES_CONTROL_MODE_ECB: u32 = 0x0 << 2;
const AES_CONTROL_NK_128: u32 = 0x0 << 12;
const AES_CONTROL_NK_256: u32 = 0x2 << 12;

// CRYPTO_CTL modes
const CRYPTO_CTL_AES: u32 = 0x1;

// RNG_ISR bit definitions
const RNG_ISR_EHR_VALID: u32 = 1 << 0;
const RNG_ISR_AUTOCORR_ERR: u32 = 1 << 1;
const RNG_ISR_CRNGT_ERR: u32 = 1 << 2;
const RNG_ISR_VN_ERR: u32 = 1 << 3;
const RNG_ISR_ERRORS: u32 = RNG_ISR_AUTOCORR_ERR | RNG_ISR_CRNGT_ERR | RNG_ISR_VN_ERR;

/// Words in one EHR sample
const EHR_WORDS: usize = 6;

mod registers {
    use core::ptr::{read_volatile, write_volatile};

    /// Read a 32-bit register
    ///
    /// # Safety
    /// The address must be a valid memory-mapped register.
    #[inline]
    pub unsafe fn read_reg(addr: u32) -> u32 {
        read_volatile(addr as usize as *const u32)
    }

    /// Write a 32-bit register
    ///
    /// # Safety
    /// The address must be a valid memory-mapped register.
    #[inline]
    pub unsafe fn write_reg(addr: u32, value: u32) {
        write_volatile(addr as usize as *mut u32, value);
    }
}

use registers::{read_reg, write_reg};

/// Power up the CryptoCell wrapper
pub fn enable_cryptocell() {
    // SAFETY: CRYPTOCELL.ENABLE is an architecturally-defined nRF52840 register.
    // Writing 1 powers the CryptoCell subsystem; no other state is touched.
    unsafe {
        write_reg(CRYPTOCELL_ENABLE, 1);
    }
    compiler_fence(Ordering::SeqCst);
}

/// Power down the CryptoCell wrapper
pub fn disable_cryptocell() {
    // SAFETY: CRYPTOCELL.ENABLE is an architecturally-defined nRF52840 register.
    unsafe {
        write_reg(CRYPTOCELL_ENABLE, 0);
    }
    compiler_fence(Ordering::SeqCst);
}

// ============================================================================
// AES engine
// ============================================================================

/// Key sizes accepted by the CC310 AES engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeySize {
    Aes128,
    Aes256,
}

impl KeySize {
    const fn words(self) -> usize {
        match self {
            Self::Aes128 => 4,
            Self::Aes256 => 8,
        }
    }

    const fn control_bits(self) -> u32 {
        match self {
            Self::Aes128 => AES_CONTROL_NK_128,
            Self::Aes256 => AES_CONTROL_NK_256,
        }
    }
}

/// CC310 AES engine driver
pub struct Cc3xxAes {
    /// Initialization state
    initialized: bool,
    /// Size of the loaded key, if any
    key_size: Option<KeySize>,
    /// Timeout in CPU cycles
    timeout_cycles: u32,
}

impl Cc3xxAes {
    /// Default timeout (well above one block at 64MHz)
    pub const DEFAULT_TIMEOUT: u32 = 100_000;

    /// Create a new uninitialized AES driver
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initialized: false,
            key_size: None,
            timeout_cycles: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Configure timeout for busy waits
    pub fn set_timeout(&mut self, cycles: u32) {
        self.timeout_cycles = cycles;
    }

    /// Initialize the AES engine
    pub fn init(&mut self) -> HalResult<()> {
        enable_cryptocell();

        // SAFETY: AES_CLK_ENABLE, AES_SW_RESET and CRYPTO_CTL are CC310 host registers.
        // Volatile writes gate the AES clock on, reset the engine and route PIO data to AES.
        unsafe {
            write_reg(AES_CLK_ENABLE, 1);
            write_reg(AES_SW_RESET, 1);
        }

        self.wait_idle()?;

        // SAFETY: CRYPTO_CTL is a CC310 host register; AES routing is a valid mode.
        unsafe {
            write_reg(CRYPTO_CTL, CRYPTO_CTL_AES);
        }

        self.initialized = true;
        Ok(())
    }

    /// Check if the engine is initialized
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Wait for the AES core and the data path to become idle
    fn wait_idle(&self) -> HalResult<()> {
        let mut timeout = self.timeout_cycles;

        while timeout > 0 {
            // SAFETY: AES_BUSY and CRYPTO_BUSY are read-only CC310 status registers.
            let busy = unsafe { read_reg(AES_BUSY) | read_reg(CRYPTO_BUSY) };
            if busy & 1 == 0 {
                return Ok(());
            }
            timeout -= 1;
            core::hint::spin_loop();
        }

        Err(HalError::Timeout)
    }

    /// Disable the engine and wipe its key registers
    pub fn deinit(&mut self) {
        self.clear_key();

        // SAFETY: AES_CLK_ENABLE and CRYPTO_CTL are CC310 host registers. Writing zero
        // returns the data path to bypass and gates the AES clock off.
        unsafe {
            write_reg(CRYPTO_CTL, 0);
            write_reg(AES_CLK_ENABLE, 0);
        }

        self.initialized = false;
    }
}

impl Default for Cc3xxAes {
    fn default() -> Self {
        Self::new()
    }
}

impl AesEngine for Cc3xxAes {
    fn is_available(&self) -> bool {
        self.initialized
    }

    fn load_key(&mut self, key: &[u8]) -> HalResult<()> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }

        let key_size = match key.len() {
            16 => KeySize::Aes128,
            32 => KeySize::Aes256,
            24 => return Err(HalError::UnsupportedKeySize),
            _ => return Err(HalError::InvalidParameter),
        };

        self.wait_idle()?;

        for (i, word) in key.chunks_exact(4).take(key_size.words()).enumerate() {
            let value = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            // SAFETY: AES_KEY_0 is followed by eight key word registers; i < 8 because the
            // key length was validated above.
            unsafe {
                write_reg(AES_KEY_0 + (i as u32) * 4, value);
            }
        }

        self.key_size = Some(key_size);
        Ok(())
    }

    fn process_block(
        &mut self,
        direction: BlockDirection,
        block: &mut [u8; AES_BLOCK_LEN],
    ) -> HalResult<()> {
        let key_size = self.key_size.ok_or(HalError::NotInitialized)?;

        let mut control = AES_CONTROL_MODE_ECB | key_size.control_bits();
        if direction == BlockDirection::Decrypt {
            control |= AES_CONTROL_DEC_KEY0;
        }

        self.wait_idle()?;

        // SAFETY: AES_CONTROL and DIN_BUFFER are CC310 host registers. The control word
        // selects ECB with the loaded key size; four words fill the PIO input buffer.
        unsafe {
            write_reg(AES_CONTROL, control);
            for (i, word) in block.chunks_exact(4).enumerate() {
                let value = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
                write_reg(DIN_BUFFER + (i as u32) * 4, value);
            }
        }

        self.wait_idle()?;

        for (i, word) in block.chunks_exact_mut(4).enumerate() {
            // SAFETY: DOUT_BUFFER holds four output words once the engine is idle.
            let value = unsafe { read_reg(DOUT_BUFFER + (i as u32) * 4) };
            word.copy_from_slice(&value.to_le_bytes());
        }

        Ok(())
    }

    fn clear_key(&mut self) {
        if !self.initialized {
            self.key_size = None;
            return;
        }

        for i in 0..8u32 {
            // SAFETY: AES_KEY_0 is followed by eight key word registers.
            unsafe {
                write_reg(AES_KEY_0 + i * 4, 0);
            }
        }
        compiler_fence(Ordering::SeqCst);
        self.key_size = None;
    }
}

// ============================================================================
// TRNG
// ============================================================================

/// TRNG health statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct TrngHealthStats {
    /// EHR samples collected
    pub samples: u32,
    /// Autocorrelation, CRNGT or von Neumann failures
    pub health_failures: u32,
    /// Last ISR value that carried an error
    pub last_error: u32,
}

/// CC310 true random number generator
pub struct Cc3xxTrng {
    initialized: bool,
    stats: TrngHealthStats,
    timeout_cycles: u32,
    max_retries: u32,
    sample_count: u32,
}

impl Cc3xxTrng {
    /// Default timeout for one EHR sample
    pub const DEFAULT_TIMEOUT: u32 = 1_000_000;

    /// Default maximum retries after a health-test failure
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default sampling interval (ring oscillator cycles per bit)
    pub const DEFAULT_SAMPLE_COUNT: u32 = 0x00E4;

    /// Create a new TRNG driver
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initialized: false,
            stats: TrngHealthStats {
                samples: 0,
                health_failures: 0,
                last_error: 0,
            },
            timeout_cycles: Self::DEFAULT_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            sample_count: Self::DEFAULT_SAMPLE_COUNT,
        }
    }

    /// Get health statistics
    #[must_use]
    pub const fn stats(&self) -> &TrngHealthStats {
        &self.stats
    }

    /// Initialize the TRNG
    pub fn init(&mut self) -> HalResult<()> {
        enable_cryptocell();
        self.restart();
        self.initialized = true;
        Ok(())
    }

    fn restart(&mut self) {
        // SAFETY: RNG_* registers are CC310 host registers. The sequence gates the clock on,
        // resets the block, programs the sampling interval and the shortest ring oscillator,
        // clears stale interrupts and starts collection.
        unsafe {
            write_reg(RNG_CLK_ENABLE, 1);
            write_reg(RNG_SW_RESET, 1);
            write_reg(RNG_CLK_ENABLE, 1);
            write_reg(SAMPLE_CNT1, self.sample_count);
            write_reg(TRNG_CONFIG, 0);
            write_reg(RNG_ICR, 0xFFFF_FFFF);
            write_reg(RND_SOURCE_ENABLE, 1);
        }
        compiler_fence(Ordering::SeqCst);
    }

    /// Wait for a full EHR sample
    fn wait_sample(&mut self) -> HalResult<()> {
        let mut timeout = self.timeout_cycles;

        loop {
            // SAFETY: RNG_ISR is a read-only CC310 status register.
            let isr = unsafe { read_reg(RNG_ISR) };

            if isr & RNG_ISR_ERRORS != 0 {
                self.stats.health_failures = self.stats.health_failures.saturating_add(1);
                self.stats.last_error = isr;
                return Err(HalError::RngError);
            }

            if isr & RNG_ISR_EHR_VALID != 0 {
                return Ok(());
            }

            timeout = timeout.saturating_sub(1);
            if timeout == 0 {
                return Err(HalError::Timeout);
            }

            core::hint::spin_loop();
        }
    }

    /// Collect one 192-bit sample
    fn read_sample(&mut self, out: &mut [u32; EHR_WORDS]) -> HalResult<()> {
        let mut attempt = 0;
        loop {
            match self.wait_sample() {
                Ok(()) => break,
                Err(HalError::RngError) if attempt < self.max_retries => {
                    attempt += 1;
                    self.restart();
                }
                Err(e) => return Err(e),
            }
        }

        for (i, word) in out.iter_mut().enumerate() {
            // SAFETY: EHR_DATA_0 is followed by six entropy words, valid after EHR_VALID.
            *word = unsafe { read_reg(EHR_DATA_0 + (i as u32) * 4) };
        }

        // SAFETY: RNG_ICR is a CC310 host register; clearing EHR_VALID starts the next sample.
        unsafe {
            write_reg(RNG_ICR, RNG_ISR_EHR_VALID);
        }

        self.stats.samples = self.stats.samples.saturating_add(1);
        Ok(())
    }

    /// Stop collection and gate the clock
    pub fn deinit(&mut self) {
        // SAFETY: RND_SOURCE_ENABLE and RNG_CLK_ENABLE are CC310 host registers.
        unsafe {
            write_reg(RND_SOURCE_ENABLE, 0);
            write_reg(RNG_CLK_ENABLE, 0);
        }
        self.initialized = false;
    }
}

impl Default for Cc3xxTrng {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for Cc3xxTrng {
    fn is_ready(&self) -> bool {
        self.initialized
    }

    fn fill_entropy(&mut self, buffer: &mut [u8]) -> HalResult<()> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }

        let mut sample = [0u32; EHR_WORDS];
        for chunk in buffer.chunks_mut(EHR_WORDS * 4) {
            self.read_sample(&mut sample)?;
            for (dst, word) in chunk.chunks_mut(4).zip(sample.iter()) {
                dst.copy_from_slice(&word.to_le_bytes()[..dst.len()]);
            }
        }

        sample.iter_mut().for_each(|w| *w = 0);
        compiler_fence(Ordering::SeqCst);
        Ok(())
    }
}
