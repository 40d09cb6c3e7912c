//! Arena-specific error types.
//!
//! Every [`ArenaError`] is fatal: the arena refuses further work once one
//! has been returned. [`ConfigError`] is raised before an arena exists.

use std::error::Error;
use std::fmt;

use crate::handle::BlockAddr;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The storage provider could not satisfy an acquisition.
    OutOfMemory {
        /// Number of bytes requested from the provider (header, payload
        /// and sentinel), saturated at `u64::MAX` if the rounding overflowed.
        requested: u64,
        /// Total capacity of the arena in bytes.
        capacity: u32,
    },
    /// The sentinel after a block's payload did not hold the magic value.
    ///
    /// Either the payload was overrun or the block was already freed.
    CorruptionDetected {
        /// Payload address passed to `free`.
        addr: BlockAddr,
        /// Value read where the sentinel should be, or `None` if the header
        /// or sentinel would lie outside the arena.
        found: Option<u32>,
    },
    /// A previous fatal error poisoned the arena.
    Poisoned,
}

impl ArenaError {
    /// Whether the error must stop the process.
    ///
    /// Always `true`; the method exists so callers can route errors through
    /// a single policy check.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::OutOfMemory { .. } | Self::CorruptionDetected { .. } | Self::Poisoned => true,
        }
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes, capacity {capacity} bytes"
                )
            }
            Self::CorruptionDetected {
                addr,
                found: Some(found),
            } => {
                write!(
                    f,
                    "heap corruption at {addr}: sentinel reads {found:#010x} (overflow or double free)"
                )
            }
            Self::CorruptionDetected { addr, found: None } => {
                write!(f, "heap corruption at {addr}: block lies outside the arena")
            }
            Self::Poisoned => write!(f, "arena poisoned by an earlier fatal error"),
        }
    }
}

impl Error for ArenaError {}

/// Errors detected by [`ArenaConfig::validate()`](crate::ArenaConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity is not a multiple of the block alignment.
    CapacityNotAligned {
        /// The configured capacity.
        capacity: u32,
    },
    /// Capacity cannot hold even the smallest block.
    CapacityTooSmall {
        /// The configured capacity.
        capacity: u32,
        /// Smallest usable capacity.
        minimum: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityNotAligned { capacity } => {
                write!(f, "capacity {capacity} is not a multiple of 4")
            }
            Self::CapacityTooSmall { capacity, minimum } => {
                write!(f, "capacity {capacity} is below the minimum of {minimum} bytes")
            }
        }
    }
}

impl Error for ConfigError {}
