//! Guardpool: an embedded-style fixed-pool allocator with fatal corruption
//! detection.
//!
//! This is the top-level facade crate. It re-exports the arena core and
//! adds the process-termination policy an embedded program runs under:
//! running out of memory, overrunning a block, or freeing it twice ends the
//! process instead of continuing on a damaged heap.
//!
//! # Quick start
//!
//! ```rust
//! use guardpool::prelude::*;
//!
//! let mut heap = AbortingArena::new(ArenaConfig::default()).unwrap();
//! let block = heap.alloc(8);
//! heap.payload_mut(block).copy_from_slice(&[0u8; 8]);
//! heap.free(block);
//! ```
//!
//! Use [`arena::Arena`] directly when errors should be observed rather than
//! aborted on (tests, host tooling).
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`arena`] | `guardpool-arena`: `Arena`, providers, layout, metrics |
//! | [`abort`] | `OrAbort`, `AbortingArena` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Arena core (`guardpool-arena`).
pub use guardpool_arena as arena;

pub mod abort;

pub use abort::{AbortingArena, OrAbort};

/// Common imports for typical guardpool usage.
pub mod prelude {
    pub use crate::abort::{AbortingArena, OrAbort};
    pub use guardpool_arena::{
        Arena, ArenaConfig, ArenaError, ArenaMetrics, BlockAddr, ProviderKind, StorageProvider,
        Watermarks,
    };
}
