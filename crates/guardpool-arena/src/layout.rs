//! Block geometry.
//!
//! ```text
//! base        base+4                 base+4+size        base+8+size
//! | size: u32 | payload (size bytes) | sentinel: u32    |
//!             ^ BlockAddr
//! ```
//!
//! All multi-byte fields are little-endian. `size` is always a multiple of
//! [`ALIGN`], so every header, payload and sentinel starts on a 4-byte
//! boundary when the block base does.

/// Alignment of every block, payload and sentinel.
pub const ALIGN: u32 = 4;

/// Bytes in the size header preceding the payload.
pub const HEADER_BYTES: u32 = 4;

/// Bytes in the sentinel following the payload.
pub const SENTINEL_BYTES: u32 = 4;

/// Bookkeeping bytes added to every block.
pub const BLOCK_OVERHEAD: u32 = HEADER_BYTES + SENTINEL_BYTES;

/// Marker written after each live payload.
pub const SENTINEL_MAGIC: u32 = 0xEFDC_BA98;

/// Value a freed block's sentinel is cleared to.
pub const SENTINEL_CLEARED: u32 = 0;

/// Round `bytes` up to the next multiple of [`ALIGN`].
///
/// Returns `None` if the result does not fit in a `u32`.
pub fn round_up(bytes: usize) -> Option<u32> {
    let bytes = u32::try_from(bytes).ok()?;
    Some(bytes.checked_add(ALIGN - 1)? & !(ALIGN - 1))
}

/// Total provider bytes for a block with the given aligned payload size.
pub fn block_len(aligned_size: u32) -> Option<u32> {
    aligned_size.checked_add(BLOCK_OVERHEAD)
}

/// Geometry of one block, derived from its base offset and payload size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockLayout {
    /// Offset of the size header.
    pub base: u32,
    /// Aligned payload size.
    pub size: u32,
}

impl BlockLayout {
    /// First payload byte.
    pub fn payload(&self) -> u32 {
        self.base + HEADER_BYTES
    }

    /// First sentinel byte.
    pub fn sentinel(&self) -> u32 {
        self.payload() + self.size
    }

    /// One past the last sentinel byte.
    pub fn end(&self) -> u32 {
        self.sentinel() + SENTINEL_BYTES
    }

    /// Total bytes the block occupies.
    pub fn len(&self) -> u32 {
        self.size + BLOCK_OVERHEAD
    }
}

/// Read a little-endian `u32` at `offset`, or `None` if out of range.
pub(crate) fn read_u32(memory: &[u8], offset: u32) -> Option<u32> {
    let start = offset as usize;
    let bytes = memory.get(start..start.checked_add(4)?)?;
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    Some(u32::from_le_bytes(word))
}

/// Write a little-endian `u32` at `offset`.
///
/// # Panics
///
/// Panics if `offset + 4` exceeds `memory.len()`. Callers only write inside
/// blocks the provider handed out.
pub(crate) fn write_u32(memory: &mut [u8], offset: u32, value: u32) {
    let start = offset as usize;
    memory[start..start + 4].copy_from_slice(&value.to_le_bytes());
}
