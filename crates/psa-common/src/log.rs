// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Dispatch diagnostics
//!
//! The wrapper keeps the most recent routing decisions in a bounded queue.
//! Entries are numbered by the queue itself, so no clock is needed.
//!
//! Only algorithm identifiers, driver names and status codes are recorded.
//! Key material, nonces, tags and payload bytes never are.

use core::fmt::{self, Write};
use heapless::{Deque, String};

/// Longest recorded message; longer text is cut
pub const MAX_LOG_MESSAGE_LEN: usize = 128;

/// Entries kept before the oldest is dropped
pub const LOG_BUFFER_SIZE: usize = 32;

/// Verbosity of a dispatch event, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    /// Refused requests and policy rejections
    Warn = 1,
    /// Driver registration
    Info = 2,
    /// Fallback decisions
    Debug = 3,
    /// Per-call routing
    Trace = 4,
}

/// One recorded event
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Verbosity
    pub level: LogLevel,
    /// Position in the stream of recorded events
    pub sequence: u32,
    /// Recording component
    pub module: &'static str,
    /// Formatted text
    pub message: String<MAX_LOG_MESSAGE_LEN>,
}

/// Bounded queue of dispatch events
pub struct LogBuffer {
    entries: Deque<LogEntry, LOG_BUFFER_SIZE>,
    next_sequence: u32,
    threshold: LogLevel,
}

impl LogBuffer {
    /// Empty queue recording `threshold` and anything more severe
    #[must_use]
    pub const fn with_level(threshold: LogLevel) -> Self {
        Self {
            entries: Deque::new(),
            next_sequence: 0,
            threshold,
        }
    }

    /// Record an event, dropping the oldest when full
    pub fn log(&mut self, level: LogLevel, module: &'static str, args: fmt::Arguments<'_>) {
        if level > self.threshold {
            return;
        }

        let mut message = String::new();
        // Overflowing text is cut at the last fragment that fit.
        let _ = message.write_fmt(args);

        if self.entries.is_full() {
            self.entries.pop_front();
        }
        let entry = LogEntry {
            level,
            sequence: self.next_sequence,
            module,
            message,
        };
        let _ = self.entries.push_back(entry);
        self.next_sequence = self.next_sequence.wrapping_add(1);
    }

    /// Number of entries held
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest entry
    #[must_use]
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_level(LogLevel::Info)
    }
}

/// Record a [`LogLevel::Warn`] event
#[macro_export]
macro_rules! log_warn {
    ($buffer:expr, $module:expr, $($arg:tt)*) => {
        $buffer.log($crate::log::LogLevel::Warn, $module, format_args!($($arg)*))
    };
}

/// Record a [`LogLevel::Info`] event
#[macro_export]
macro_rules! log_info {
    ($buffer:expr, $module:expr, $($arg:tt)*) => {
        $buffer.log($crate::log::LogLevel::Info, $module, format_args!($($arg)*))
    };
}

/// Record a [`LogLevel::Debug`] event
#[macro_export]
macro_rules! log_debug {
    ($buffer:expr, $module:expr, $($arg:tt)*) => {
        $buffer.log($crate::log::LogLevel::Debug, $module, format_args!($($arg)*))
    };
}

/// Record a [`LogLevel::Trace`] event
#[macro_export]
macro_rules! log_trace {
    ($buffer:expr, $module:expr, $($arg:tt)*) => {
        $buffer.log($crate::log::LogLevel::Trace, $module, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filtering() {
        let mut buffer = LogBuffer::default();
        log_debug!(buffer, "test", "hidden");
        assert!(buffer.is_empty());
        log_warn!(buffer, "test", "shown {}", 1);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().map(|e| e.message.as_str()), Some("shown 1"));
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut buffer = LogBuffer::with_level(LogLevel::Trace);
        log_info!(buffer, "a", "first");
        log_trace!(buffer, "b", "second");
        let sequences: heapless::Vec<u32, 4> = buffer.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences.as_slice(), &[0, 1]);
        assert_eq!(buffer.latest().map(|e| e.module), Some("b"));
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let mut buffer = LogBuffer::default();
        for i in 0..(LOG_BUFFER_SIZE + 3) {
            log_info!(buffer, "wrap", "{}", i);
        }
        assert_eq!(buffer.len(), LOG_BUFFER_SIZE);
        assert_eq!(buffer.iter().next().map(|e| e.sequence), Some(3));
        assert_eq!(buffer.latest().map(|e| e.sequence), Some((LOG_BUFFER_SIZE + 2) as u32));
    }

    #[test]
    fn test_long_message_is_cut() {
        let mut buffer = LogBuffer::with_level(LogLevel::Warn);
        let long = [b'x'; 200];
        let text = core::str::from_utf8(&long).unwrap_or("");
        log_warn!(buffer, "cut", "{}", text);
        assert!(buffer.latest().map_or(0, |e| e.message.len()) <= MAX_LOG_MESSAGE_LEN);
    }
}
