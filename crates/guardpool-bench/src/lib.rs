//! Benchmark profiles for guardpool.
//!
//! - [`churn_sizes`]: deterministic mix of record-sized requests
//! - [`replay_demo`]: run the reference embedded workload once

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use guardpool_arena::{Arena, ArenaError, BlockAddr};
use guardpool_test_utils::{embedded_demo_script, slot_count, Op, STRUCT_A_BYTES, STRUCT_B_BYTES};

/// `count` request sizes cycling through single records and short arrays
/// of both layouts. Deterministic so runs are comparable.
pub fn churn_sizes(count: usize) -> Vec<usize> {
    let pattern = [
        STRUCT_A_BYTES,
        STRUCT_B_BYTES,
        3 * STRUCT_A_BYTES,
        2 * STRUCT_B_BYTES,
        5,
        0,
    ];
    pattern.iter().copied().cycle().take(count).collect()
}

/// Replay the reference embedded workload on `arena`.
pub fn replay_demo(arena: &mut Arena) -> Result<(), ArenaError> {
    let script = embedded_demo_script();
    let mut slots: Vec<Option<BlockAddr>> = vec![None; slot_count(&script)];
    for op in script {
        match op {
            Op::Alloc { slot, bytes } => slots[slot] = Some(arena.alloc(bytes)?),
            Op::Free { slot } => {
                if let Some(addr) = slots[slot].take() {
                    arena.free(addr)?;
                }
            }
        }
    }
    Ok(())
}
