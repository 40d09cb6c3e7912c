//! Fixed-capacity byte arena with sentinel-guarded blocks.
//!
//! An [`Arena`] owns one statically-sized byte buffer and hands out blocks
//! from it. Each block carries a size header and a trailing magic sentinel;
//! `free` checks the sentinel and clears it, which turns payload overruns
//! and double frees into reported errors instead of silent corruption.
//!
//! # Architecture
//!
//! ```text
//! Arena
//! ├── Vec<u8> buffer (capacity bytes, owned)
//! ├── Box<dyn StorageProvider> (where blocks go: bump or free-list)
//! ├── Option<Watermarks> (lowest/highest offset ever issued)
//! └── ArenaMetrics (counters)
//! ```
//!
//! # Errors are fatal
//!
//! Both error kinds, out-of-memory and corruption, are unrecoverable. The
//! arena returns them as [`ArenaError`] so the core stays testable, then
//! poisons itself; the embedding program decides how to stop (the
//! `guardpool` facade aborts the process).
//!
//! # Example
//!
//! ```
//! use guardpool_arena::{Arena, ArenaConfig};
//!
//! let mut arena = Arena::new(ArenaConfig::default()).unwrap();
//! let block = arena.alloc(10).unwrap();
//! assert_eq!(block.offset() % 4, 0);
//! arena.payload_mut(block).unwrap()[..3].copy_from_slice(b"abc");
//! arena.free(block).unwrap();
//! assert!(arena.free(block).is_err()); // double free
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
pub mod error;
pub mod handle;
pub mod layout;
pub mod metrics;
pub mod provider;
pub mod watermark;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use config::{ArenaConfig, ProviderKind};
pub use error::{ArenaError, ConfigError};
pub use handle::BlockAddr;
pub use metrics::ArenaMetrics;
pub use provider::{BumpProvider, FreeListProvider, StorageProvider};
pub use watermark::Watermarks;
