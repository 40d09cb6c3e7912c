//! Allocation counters for an arena.
//!
//! [`ArenaMetrics`] is a snapshot of counters the arena keeps as it runs.
//! It is cheap to copy and carries no references into the arena.

/// Counters collected by an [`Arena`](crate::Arena).
///
/// Byte counts include the header and sentinel of each block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaMetrics {
    /// Successful `alloc` calls.
    pub alloc_count: u64,
    /// Successful `free` calls.
    pub free_count: u64,
    /// Blocks currently allocated.
    pub live_blocks: u64,
    /// Bytes currently held by live blocks.
    pub live_bytes: u64,
    /// Highest value `live_bytes` has reached.
    pub peak_live_bytes: u64,
    /// Distance between the low and high watermarks, or 0 before the first
    /// allocation.
    pub span_bytes: u32,
    /// Fatal errors raised (out of memory or corruption).
    pub fatal_events: u64,
}

impl ArenaMetrics {
    pub(crate) fn record_alloc(&mut self, block_bytes: u32) {
        self.alloc_count += 1;
        self.live_blocks += 1;
        self.live_bytes += u64::from(block_bytes);
        self.peak_live_bytes = self.peak_live_bytes.max(self.live_bytes);
    }

    pub(crate) fn record_free(&mut self, block_bytes: u32) {
        self.free_count += 1;
        self.live_blocks = self.live_blocks.saturating_sub(1);
        self.live_bytes = self.live_bytes.saturating_sub(u64::from(block_bytes));
    }
}
