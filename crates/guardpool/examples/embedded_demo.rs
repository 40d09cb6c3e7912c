//! Replays the reference embedded workload on a 2048-byte arena.
//!
//! Allocates single records and record arrays of two layouts, fills them,
//! frees them in a different order, and logs the arena's metrics. Any
//! overrun or double free aborts the process.
//!
//! ```text
//! RUST_LOG=trace cargo run --example embedded_demo
//! ```

use guardpool::prelude::*;
use guardpool_test_utils::{StructA, StructB, STRUCT_A_BYTES, STRUCT_B_BYTES};
use tracing_subscriber::{fmt, EnvFilter};

fn fill_a(heap: &mut AbortingArena, block: BlockAddr) {
    for (i, chunk) in heap
        .payload_mut(block)
        .chunks_exact_mut(STRUCT_A_BYTES)
        .enumerate()
    {
        let record = StructA {
            index: i as u32,
            value: (i as u32) * 10,
        };
        chunk.copy_from_slice(&record.to_bytes());
    }
}

fn fill_b(heap: &mut AbortingArena, block: BlockAddr) {
    for (i, chunk) in heap
        .payload_mut(block)
        .chunks_exact_mut(STRUCT_B_BYTES)
        .enumerate()
    {
        let shade = (i % 256) as u32;
        let record = StructB {
            index: i as u32,
            red: shade,
            green: 255 - shade,
            blue: 128,
        };
        chunk.copy_from_slice(&record.to_bytes());
    }
}

fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ArenaConfig::default();
    tracing::info!(capacity = config.capacity, provider = ?config.provider, "starting");
    let mut heap = match AbortingArena::new(config) {
        Ok(heap) => heap,
        Err(err) => {
            tracing::error!(error = %err, "invalid arena config");
            std::process::exit(2);
        }
    };

    let a1 = heap.alloc(STRUCT_A_BYTES);
    let a10 = heap.alloc(10 * STRUCT_A_BYTES);
    let a40 = heap.alloc(40 * STRUCT_A_BYTES);
    fill_a(&mut heap, a1);
    fill_a(&mut heap, a10);
    fill_a(&mut heap, a40);
    heap.free(a10);

    let b1 = heap.alloc(STRUCT_B_BYTES);
    let b80 = heap.alloc(80 * STRUCT_B_BYTES);
    fill_b(&mut heap, b1);
    fill_b(&mut heap, b80);

    let last = StructB::from_bytes(&heap.payload(b80)[79 * STRUCT_B_BYTES..]);
    tracing::info!(?last, "last record of B×80");

    heap.free(a1);
    heap.free(a40);
    heap.free(b1);
    heap.free(b80);

    let m = heap.metrics();
    tracing::info!(
        allocs = m.alloc_count,
        frees = m.free_count,
        peak_bytes = m.peak_live_bytes,
        span_bytes = m.span_bytes,
        "done"
    );
}
