//! The sentinel-guarded arena.
//!
//! [`Arena`] owns a fixed byte buffer and lays blocks out in it as
//! `header | payload | sentinel` (see [`layout`](crate::layout)). Placement
//! is delegated to a [`StorageProvider`]; integrity checking and watermark
//! tracking happen here.
//!
//! Any error returned from [`alloc`](Arena::alloc) or [`free`](Arena::free)
//! poisons the arena. Later calls return [`ArenaError::Poisoned`] without
//! reading or writing the buffer.

use crate::config::ArenaConfig;
use crate::error::{ArenaError, ConfigError};
use crate::handle::BlockAddr;
use crate::layout::{
    block_len, read_u32, round_up, write_u32, BlockLayout, BLOCK_OVERHEAD, SENTINEL_CLEARED,
    SENTINEL_MAGIC,
};
use crate::metrics::ArenaMetrics;
use crate::provider::StorageProvider;
use crate::watermark::Watermarks;

/// A fixed-capacity byte arena handing out sentinel-guarded blocks.
///
/// Single-threaded: both operations take `&mut self`. Share an arena across
/// threads by wrapping it in a lock that guards `alloc` and `free` together.
pub struct Arena {
    /// Backing storage. Sized to the provider's capacity at creation.
    memory: Vec<u8>,
    provider: Box<dyn StorageProvider>,
    /// `None` until the first successful allocation.
    watermarks: Option<Watermarks>,
    metrics: ArenaMetrics,
    poisoned: bool,
}

impl Arena {
    /// Create an arena from a validated config.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_provider(config.provider.build(config.capacity)))
    }

    /// Create an arena over a custom provider.
    ///
    /// The buffer is sized to `provider.capacity()`.
    pub fn with_provider(provider: Box<dyn StorageProvider>) -> Self {
        let capacity = provider.capacity() as usize;
        tracing::debug!(capacity, provider = provider.name(), "arena created");
        Self {
            memory: vec![0; capacity],
            provider,
            watermarks: None,
            metrics: ArenaMetrics::default(),
            poisoned: false,
        }
    }

    /// Allocate a block with at least `requested` payload bytes.
    ///
    /// The payload is rounded up to a multiple of 4 and is not zeroed. The
    /// returned address is 4-byte aligned.
    pub fn alloc(&mut self, requested: usize) -> Result<BlockAddr, ArenaError> {
        self.check_poisoned()?;

        let Some((size, len)) = round_up(requested).and_then(|s| Some((s, block_len(s)?))) else {
            let requested = u64::try_from(requested)
                .unwrap_or(u64::MAX)
                .saturating_add(u64::from(BLOCK_OVERHEAD));
            return Err(self.fatal(ArenaError::OutOfMemory {
                requested,
                capacity: self.capacity(),
            }));
        };

        let Some(base) = self.provider.acquire(len) else {
            return Err(self.fatal(ArenaError::OutOfMemory {
                requested: u64::from(len),
                capacity: self.capacity(),
            }));
        };

        let layout = BlockLayout { base, size };
        debug_assert!(
            layout.end() as usize <= self.memory.len(),
            "provider {} placed block {layout:?} outside the arena",
            self.provider.name(),
        );
        write_u32(&mut self.memory, layout.base, size);
        write_u32(&mut self.memory, layout.sentinel(), SENTINEL_MAGIC);

        let watermarks = self
            .watermarks
            .get_or_insert(Watermarks::new(layout.base, layout.end()));
        watermarks.extend(layout.base, layout.end());
        self.metrics.span_bytes = watermarks.span();
        self.metrics.record_alloc(len);

        let addr = BlockAddr(layout.payload());
        tracing::trace!(%addr, requested, size, base, "alloc");
        Ok(addr)
    }

    /// Release a block returned by [`alloc`](Self::alloc).
    ///
    /// Fails with [`ArenaError::CorruptionDetected`] if the sentinel after
    /// the payload was overwritten or already cleared by an earlier `free`.
    /// Addresses that were never returned by `alloc` are not detected
    /// reliably; passing one is the caller's bug.
    pub fn free(&mut self, addr: BlockAddr) -> Result<(), ArenaError> {
        self.check_poisoned()?;

        let Some(layout) = self.locate(addr) else {
            return Err(self.fatal(ArenaError::CorruptionDetected { addr, found: None }));
        };
        // `locate` guarantees the sentinel is in bounds.
        let found = read_u32(&self.memory, layout.sentinel()).unwrap_or(SENTINEL_CLEARED);
        if found != SENTINEL_MAGIC {
            return Err(self.fatal(ArenaError::CorruptionDetected {
                addr,
                found: Some(found),
            }));
        }

        write_u32(&mut self.memory, layout.sentinel(), SENTINEL_CLEARED);
        if self.provider.release(layout.base) {
            self.metrics.record_free(layout.len());
        } else {
            tracing::warn!(%addr, base = layout.base, "provider does not own freed block");
        }
        tracing::trace!(%addr, size = layout.size, "free");
        Ok(())
    }

    /// Payload size recorded in the header at `addr`, if the block fits in
    /// the arena.
    ///
    /// Reads whatever is stored there; a freed or bogus address yields
    /// whatever bytes the header slot holds.
    pub fn block_size(&self, addr: BlockAddr) -> Option<u32> {
        self.locate(addr).map(|l| l.size)
    }

    /// The payload of the block at `addr`.
    pub fn payload(&self, addr: BlockAddr) -> Option<&[u8]> {
        let layout = self.locate(addr)?;
        Some(&self.memory[layout.payload() as usize..layout.sentinel() as usize])
    }

    /// The payload of the block at `addr`, writable.
    pub fn payload_mut(&mut self, addr: BlockAddr) -> Option<&mut [u8]> {
        let layout = self.locate(addr)?;
        Some(&mut self.memory[layout.payload() as usize..layout.sentinel() as usize])
    }

    /// The whole arena buffer.
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// The whole arena buffer, writable.
    ///
    /// Nothing stops writes into headers or sentinels through this view;
    /// damage is reported by the next `free` of the affected block.
    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Arena size in bytes.
    pub fn capacity(&self) -> u32 {
        self.provider.capacity()
    }

    /// The span of memory ever handed out, or `None` before the first
    /// allocation.
    pub fn watermarks(&self) -> Option<Watermarks> {
        self.watermarks
    }

    /// Counters collected so far.
    pub fn metrics(&self) -> &ArenaMetrics {
        &self.metrics
    }

    /// The placement strategy in use.
    pub fn provider(&self) -> &dyn StorageProvider {
        self.provider.as_ref()
    }

    /// Whether a fatal error has been returned.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Geometry of the block at `addr`, read from its header. `None` if the
    /// header or sentinel would fall outside the buffer.
    fn locate(&self, addr: BlockAddr) -> Option<BlockLayout> {
        let base = addr.header()?;
        let size = read_u32(&self.memory, base)?;
        let layout = BlockLayout { base, size };
        let end = block_len(size)?.checked_add(base)?;
        (end as usize <= self.memory.len()).then_some(layout)
    }

    fn check_poisoned(&self) -> Result<(), ArenaError> {
        if self.poisoned {
            tracing::warn!("operation on poisoned arena");
            return Err(ArenaError::Poisoned);
        }
        Ok(())
    }

    fn fatal(&mut self, err: ArenaError) -> ArenaError {
        self.poisoned = true;
        self.metrics.fatal_events += 1;
        tracing::error!(error = %err, provider = self.provider.name(), "fatal arena error");
        err
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("provider", &self.provider.name())
            .field("watermarks", &self.watermarks)
            .field("metrics", &self.metrics)
            .field("poisoned", &self.poisoned)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use crate::layout::{HEADER_BYTES, SENTINEL_BYTES};
    use crate::provider::BumpProvider;
    use tracing_test::traced_test;

    fn arena() -> Arena {
        Arena::new(ArenaConfig::default()).unwrap()
    }

    fn sentinel_of(arena: &Arena, addr: BlockAddr) -> u32 {
        let size = arena.block_size(addr).unwrap();
        read_u32(arena.memory(), addr.0 + size).unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = Arena::new(ArenaConfig::new(10)).unwrap_err();
        assert_eq!(err, ConfigError::CapacityNotAligned { capacity: 10 });
    }

    #[test]
    fn fresh_arena_has_no_watermarks() {
        let arena = arena();
        assert_eq!(arena.watermarks(), None);
        assert_eq!(arena.capacity(), 2048);
        assert_eq!(arena.memory().len(), 2048);
    }

    #[test]
    fn alloc_writes_header_and_sentinel() {
        let mut arena = arena();
        let addr = arena.alloc(10).unwrap();
        assert_eq!(addr, BlockAddr(HEADER_BYTES));
        assert_eq!(read_u32(arena.memory(), 0), Some(12));
        assert_eq!(arena.block_size(addr), Some(12));
        assert_eq!(sentinel_of(&arena, addr), SENTINEL_MAGIC);
    }

    #[test]
    fn payload_is_exactly_aligned_size() {
        let mut arena = arena();
        let addr = arena.alloc(5).unwrap();
        assert_eq!(arena.payload(addr).unwrap().len(), 8);
        arena.payload_mut(addr).unwrap().fill(0xAB);
        assert_eq!(sentinel_of(&arena, addr), SENTINEL_MAGIC);
        arena.free(addr).unwrap();
    }

    #[test]
    fn zero_byte_alloc_is_valid() {
        let mut arena = arena();
        let addr = arena.alloc(0).unwrap();
        assert!(addr.is_aligned());
        assert!(arena.payload(addr).unwrap().is_empty());
        arena.free(addr).unwrap();
    }

    #[test]
    fn free_clears_sentinel() {
        let mut arena = arena();
        let addr = arena.alloc(8).unwrap();
        arena.free(addr).unwrap();
        assert_eq!(sentinel_of(&arena, addr), SENTINEL_CLEARED);
        assert_eq!(arena.metrics().live_blocks, 0);
    }

    #[test]
    fn double_free_is_corruption() {
        let mut arena = arena();
        let addr = arena.alloc(8).unwrap();
        arena.free(addr).unwrap();
        let err = arena.free(addr).unwrap_err();
        assert_eq!(
            err,
            ArenaError::CorruptionDetected {
                addr,
                found: Some(SENTINEL_CLEARED)
            }
        );
        assert!(arena.is_poisoned());
    }

    #[test]
    fn overflow_into_sentinel_is_corruption() {
        let mut arena = arena();
        let addr = arena.alloc(8).unwrap();
        let sentinel = (addr.0 + 8) as usize;
        arena.memory_mut()[sentinel] = 0;
        let err = arena.free(addr).unwrap_err();
        assert!(matches!(
            err,
            ArenaError::CorruptionDetected { found: Some(v), .. } if v != SENTINEL_MAGIC
        ));
    }

    #[test]
    fn out_of_memory_is_fatal() {
        let mut arena = Arena::new(ArenaConfig::new(64)).unwrap();
        let err = arena.alloc(64).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OutOfMemory {
                requested: 72,
                capacity: 64
            }
        );
        assert!(arena.is_poisoned());
        assert_eq!(arena.metrics().fatal_events, 1);
    }

    #[test]
    fn unroundable_request_is_out_of_memory() {
        let mut arena = arena();
        let err = arena.alloc(usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            ArenaError::OutOfMemory {
                requested: u64::MAX,
                ..
            }
        ));
    }

    #[test]
    fn largest_block_fills_arena_exactly() {
        let mut arena = Arena::new(ArenaConfig::new(64)).unwrap();
        let addr = arena.alloc(56).unwrap();
        assert_eq!(arena.watermarks(), Some(Watermarks { low: 0, high: 64 }));
        arena.free(addr).unwrap();
    }

    #[test]
    fn poisoned_arena_refuses_work() {
        let mut arena = arena();
        let a = arena.alloc(8).unwrap();
        arena.free(a).unwrap();
        arena.free(a).unwrap_err();
        assert_eq!(arena.alloc(8), Err(ArenaError::Poisoned));
        assert_eq!(arena.free(a), Err(ArenaError::Poisoned));
        assert_eq!(arena.metrics().fatal_events, 1);
    }

    #[test]
    fn address_outside_arena_is_corruption() {
        let mut arena = arena();
        for addr in [BlockAddr(0), BlockAddr(2), BlockAddr(2048), BlockAddr(u32::MAX)] {
            let mut fresh = Arena::new(ArenaConfig::default()).unwrap();
            assert_eq!(
                fresh.free(addr),
                Err(ArenaError::CorruptionDetected { addr, found: None })
            );
        }
        // A header claiming a huge size pushes the sentinel out of range.
        let addr = arena.alloc(8).unwrap();
        write_u32(arena.memory_mut(), addr.0 - HEADER_BYTES, u32::MAX - 3);
        assert_eq!(
            arena.free(addr),
            Err(ArenaError::CorruptionDetected { addr, found: None })
        );
    }

    #[test]
    fn watermarks_track_span() {
        let mut arena = arena();
        let a = arena.alloc(8).unwrap();
        let b = arena.alloc(16).unwrap();
        let w = arena.watermarks().unwrap();
        assert_eq!(w.low, 0);
        assert_eq!(w.high, 16 + 24);
        assert_eq!(arena.metrics().span_bytes, 40);
        arena.free(a).unwrap();
        arena.free(b).unwrap();
        // Freeing never shrinks the watermarks.
        assert_eq!(arena.watermarks(), Some(w));
    }

    #[test]
    fn freed_space_is_reused_with_free_list() {
        let mut arena = arena();
        let a = arena.alloc(80).unwrap();
        let _b = arena.alloc(8).unwrap();
        arena.free(a).unwrap();
        let c = arena.alloc(16).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn bump_provider_reclaims_only_from_top() {
        let config = ArenaConfig::default().with_provider(ProviderKind::Bump);
        let mut arena = Arena::new(config).unwrap();
        let a = arena.alloc(8).unwrap();
        let b = arena.alloc(8).unwrap();
        arena.free(a).unwrap();
        let c = arena.alloc(8).unwrap();
        assert!(c > b);
        arena.free(c).unwrap();
        arena.free(b).unwrap();
        assert_eq!(arena.alloc(8).unwrap(), a);
    }

    #[test]
    fn custom_provider_sets_capacity() {
        let arena = Arena::with_provider(Box::new(BumpProvider::new(128)));
        assert_eq!(arena.capacity(), 128);
        assert_eq!(arena.provider().name(), "bump");
    }

    #[test]
    fn metrics_count_block_overhead() {
        let mut arena = arena();
        let a = arena.alloc(12).unwrap();
        let m = arena.metrics();
        assert_eq!(m.alloc_count, 1);
        assert_eq!(m.live_bytes, u64::from(12 + HEADER_BYTES + SENTINEL_BYTES));
        arena.free(a).unwrap();
        assert_eq!(arena.metrics().free_count, 1);
        assert_eq!(arena.metrics().live_bytes, 0);
        assert_eq!(arena.metrics().peak_live_bytes, 20);
    }

    #[traced_test]
    #[test]
    fn corruption_is_logged() {
        let mut arena = arena();
        let a = arena.alloc(4).unwrap();
        arena.free(a).unwrap();
        arena.free(a).unwrap_err();
        assert!(logs_contain("fatal arena error"));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn alloc_is_aligned_and_freeable(n in 0usize..1024) {
                let mut arena = Arena::new(ArenaConfig::default()).unwrap();
                let addr = arena.alloc(n).unwrap();
                prop_assert!(addr.is_aligned());
                let size = arena.block_size(addr).unwrap() as usize;
                prop_assert_eq!(size, (n + 3) & !3);
                arena.payload_mut(addr).unwrap().fill(0xFF);
                prop_assert!(arena.free(addr).is_ok());
                let w = arena.watermarks().unwrap();
                prop_assert!(w.low <= w.high);
            }

            #[test]
            fn second_free_always_fails(n in 0usize..512) {
                let mut arena = Arena::new(ArenaConfig::default()).unwrap();
                let addr = arena.alloc(n).unwrap();
                arena.free(addr).unwrap();
                let is_corruption = matches!(
                    arena.free(addr),
                    Err(ArenaError::CorruptionDetected { .. })
                );
                prop_assert!(is_corruption);
            }

            #[test]
            fn overrun_always_detected(n in 0usize..512, overrun in 1usize..=4) {
                let mut arena = Arena::new(ArenaConfig::default()).unwrap();
                let addr = arena.alloc(n).unwrap();
                let start = addr.0 as usize;
                let size = arena.block_size(addr).unwrap() as usize;
                // Inverting every byte guarantees the sentinel changes.
                for byte in &mut arena.memory_mut()[start..start + size + overrun] {
                    *byte = !*byte;
                }
                let is_corruption = matches!(
                    arena.free(addr),
                    Err(ArenaError::CorruptionDetected { .. })
                );
                prop_assert!(is_corruption);
            }
        }
    }
}
