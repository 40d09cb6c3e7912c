//! Block addresses.
//!
//! A [`BlockAddr`] is the arena's replacement for a raw payload pointer: a
//! byte offset into the arena buffer pointing at the first payload byte.
//! The block header sits at `addr - 4`; the sentinel sits at `addr + size`.

use std::fmt;

use crate::layout::{ALIGN, HEADER_BYTES};

/// Byte offset of a block's payload within its arena.
///
/// Addresses are plain values: they carry no lifetime and no generation, so
/// holding one after `free` is possible. Freeing it again is caught by the
/// sentinel check rather than by the type system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[must_use]
pub struct BlockAddr(pub u32);

impl BlockAddr {
    /// The raw byte offset.
    pub fn offset(self) -> u32 {
        self.0
    }

    /// Whether the address sits on the block alignment boundary.
    pub fn is_aligned(self) -> bool {
        self.0 % ALIGN == 0
    }

    /// Offset of the size header, or `None` if the address is too low to
    /// have one.
    pub fn header(self) -> Option<u32> {
        self.0.checked_sub(HEADER_BYTES)
    }
}

impl fmt::Display for BlockAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
