//! Raw storage providers.
//!
//! A [`StorageProvider`] decides *where* in the arena buffer a block goes.
//! It deals only in byte offsets and lengths; the arena owns the bytes and
//! writes headers and sentinels itself.
//!
//! Two providers ship with the crate:
//!
//! - [`BumpProvider`]: a cursor that only moves back when the topmost block
//!   is released.
//! - [`FreeListProvider`]: a cursor plus a first-fit list of released
//!   ranges. Ranges are split on reuse and never merged with each other;
//!   ranges that end at the cursor are folded back into it.

use indexmap::IndexMap;

/// Placement strategy for the bytes behind each block.
///
/// Implementations must hand out non-overlapping ranges inside
/// `0..capacity()` and must accept any base they returned from `acquire`.
pub trait StorageProvider {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Total bytes this provider manages.
    fn capacity(&self) -> u32;

    /// Reserve `len` contiguous bytes, returning the base offset, or `None`
    /// if no range is large enough.
    fn acquire(&mut self, len: u32) -> Option<u32>;

    /// Return a range previously handed out by [`acquire`](Self::acquire).
    ///
    /// Returns `false` (and changes nothing) if `base` is not a live range.
    fn release(&mut self, base: u32) -> bool;

    /// Bytes currently reserved.
    fn in_use(&self) -> u32;
}

/// Bump allocation over `0..capacity`.
///
/// Released space below the topmost live block is not reused until every
/// block above it is released as well.
#[derive(Clone, Debug)]
pub struct BumpProvider {
    capacity: u32,
    /// Next free offset.
    cursor: u32,
    /// Live ranges: base → len, in acquisition order.
    live: IndexMap<u32, u32>,
}

impl BumpProvider {
    /// Create a provider managing `capacity` bytes.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            cursor: 0,
            live: IndexMap::new(),
        }
    }

    /// Current bump offset.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }
}

impl StorageProvider for BumpProvider {
    fn name(&self) -> &str {
        "bump"
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn acquire(&mut self, len: u32) -> Option<u32> {
        let end = self.cursor.checked_add(len)?;
        if end > self.capacity {
            return None;
        }
        let base = self.cursor;
        self.cursor = end;
        self.live.insert(base, len);
        Some(base)
    }

    fn release(&mut self, base: u32) -> bool {
        if self.live.shift_remove(&base).is_none() {
            return false;
        }
        // Pull the cursor back to the end of the highest block still live.
        self.cursor = self
            .live
            .iter()
            .map(|(&b, &len)| b + len)
            .max()
            .unwrap_or(0);
        true
    }

    fn in_use(&self) -> u32 {
        self.live.values().sum()
    }
}

/// A range handed back to a [`FreeListProvider`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReleasedRange {
    base: u32,
    len: u32,
}

/// Bump allocation with first-fit reuse of released ranges.
///
/// `acquire` scans released ranges in release order and takes the first
/// one that is large enough; any excess stays on the list as a smaller
/// range. Adjacent released ranges are not merged, so a long-running mix of
/// sizes can fragment the arena. A released range that ends at the cursor
/// is returned to the bump region, so an emptied provider starts from 0.
#[derive(Clone, Debug)]
pub struct FreeListProvider {
    capacity: u32,
    /// Next never-used offset.
    cursor: u32,
    /// Live ranges: base → len.
    live: IndexMap<u32, u32>,
    /// Ranges available for reuse.
    released: Vec<ReleasedRange>,
    reuse_hits: u64,
}

impl FreeListProvider {
    /// Create a provider managing `capacity` bytes.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            cursor: 0,
            live: IndexMap::new(),
            released: Vec::new(),
            reuse_hits: 0,
        }
    }

    /// Number of released ranges waiting for reuse.
    pub fn released_ranges(&self) -> usize {
        self.released.len()
    }

    /// Number of acquisitions served from a released range.
    pub fn reuse_hits(&self) -> u64 {
        self.reuse_hits
    }

    /// Move the cursor down over released ranges that end at it.
    fn rewind(&mut self) {
        while let Some(pos) = self
            .released
            .iter()
            .position(|r| r.base + r.len == self.cursor)
        {
            self.cursor = self.released.swap_remove(pos).base;
        }
    }
}

impl StorageProvider for FreeListProvider {
    fn name(&self) -> &str {
        "free-list"
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn acquire(&mut self, len: u32) -> Option<u32> {
        let base = if let Some(pos) = self.released.iter().position(|r| r.len >= len) {
            let range = self.released.remove(pos);
            if range.len > len {
                self.released.insert(
                    pos,
                    ReleasedRange {
                        base: range.base + len,
                        len: range.len - len,
                    },
                );
            }
            self.reuse_hits += 1;
            range.base
        } else {
            let end = self.cursor.checked_add(len)?;
            if end > self.capacity {
                return None;
            }
            let base = self.cursor;
            self.cursor = end;
            base
        };
        self.live.insert(base, len);
        Some(base)
    }

    fn release(&mut self, base: u32) -> bool {
        match self.live.swap_remove(&base) {
            Some(len) => {
                self.released.push(ReleasedRange { base, len });
                self.rewind();
                true
            }
            None => false,
        }
    }

    fn in_use(&self) -> u32 {
        self.live.values().sum()
    }
}
