//! Span of memory ever handed out.

/// Lowest and highest offsets ever covered by a block.
///
/// Both bounds only move outward: `low` never increases and `high` never
/// decreases, even after every block is freed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Watermarks {
    /// Base offset of the lowest block ever acquired.
    pub low: u32,
    /// One past the end of the highest block ever acquired.
    pub high: u32,
}

impl Watermarks {
    /// Watermarks covering exactly one block.
    pub fn new(base: u32, end: u32) -> Self {
        debug_assert!(base <= end, "block base {base} past its end {end}");
        Self {
            low: base,
            high: end,
        }
    }

    /// Widen to include `base..end`.
    pub fn extend(&mut self, base: u32, end: u32) {
        self.low = self.low.min(base);
        self.high = self.high.max(end);
    }

    /// Bytes between the watermarks. Diagnostic only.
    pub fn span(&self) -> u32 {
        self.high - self.low
    }
}
