//! Process-termination policy for fatal arena errors.
//!
//! The arena core reports out-of-memory and corruption as
//! [`ArenaError`] values. An embedded program must not keep running on a
//! corrupted heap, so this module turns every such error into
//! [`std::process::abort`] after logging it.

use guardpool_arena::{Arena, ArenaConfig, ArenaError, ArenaMetrics, BlockAddr, ConfigError};

/// Terminate the process on a fatal arena error.
pub trait OrAbort<T> {
    /// Return the value, or log the error and abort.
    fn or_abort(self) -> T;
}

impl<T> OrAbort<T> for Result<T, ArenaError> {
    fn or_abort(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => abort_with(&err),
        }
    }
}

/// Log `err` and abort the process.
#[cold]
pub fn abort_with(err: &ArenaError) -> ! {
    tracing::error!(error = %err, fatal = err.is_fatal(), "aborting");
    std::process::abort()
}

/// An [`Arena`] whose operations either succeed or end the process.
///
/// This is the allocator as an embedded caller sees it: `alloc` always
/// returns an address and `free` returns nothing.
#[derive(Debug)]
pub struct AbortingArena {
    inner: Arena,
}

impl AbortingArena {
    /// Create an arena from `config`.
    ///
    /// Configuration errors are returned, not aborted on: they happen
    /// before any block exists.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arena::new(config)?,
        })
    }

    /// Allocate `bytes`, aborting if the arena is exhausted.
    pub fn alloc(&mut self, bytes: usize) -> BlockAddr {
        self.inner.alloc(bytes).or_abort()
    }

    /// Free `addr`, aborting on overrun or double free.
    pub fn free(&mut self, addr: BlockAddr) {
        self.inner.free(addr).or_abort()
    }

    /// The payload of a live block.
    ///
    /// Aborts if `addr` does not locate a block inside the arena.
    pub fn payload(&self, addr: BlockAddr) -> &[u8] {
        self.inner
            .payload(addr)
            .ok_or_else(|| not_a_block(addr))
            .or_abort()
    }

    /// The payload of a live block, writable.
    ///
    /// Aborts if `addr` does not locate a block inside the arena.
    pub fn payload_mut(&mut self, addr: BlockAddr) -> &mut [u8] {
        self.inner
            .payload_mut(addr)
            .ok_or_else(|| not_a_block(addr))
            .or_abort()
    }

    /// Counters collected so far.
    pub fn metrics(&self) -> &ArenaMetrics {
        self.inner.metrics()
    }

    /// The wrapped arena.
    pub fn inner(&self) -> &Arena {
        &self.inner
    }

    /// The wrapped arena, mutable. Errors from it are no longer aborted on.
    pub fn inner_mut(&mut self) -> &mut Arena {
        &mut self.inner
    }

    /// Unwrap into the core arena.
    pub fn into_inner(self) -> Arena {
        self.inner
    }
}

/// An address whose header or payload falls outside the buffer.
fn not_a_block(addr: BlockAddr) -> ArenaError {
    ArenaError::CorruptionDetected { addr, found: None }
}

impl From<Arena> for AbortingArena {
    fn from(inner: Arena) -> Self {
        Self { inner }
    }
}
