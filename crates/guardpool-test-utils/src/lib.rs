//! Shared test fixtures for guardpool crates.
//!
//! Provides the two record layouts the arena was sized for and scripted
//! allocation sequences that exercise them.

pub mod fixtures;

pub use fixtures::{
    embedded_demo_script, interleaved_script, slot_count, Op, StructA, StructB, STRUCT_A_BYTES,
    STRUCT_B_BYTES,
};
