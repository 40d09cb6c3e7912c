//! Record layouts and scripted allocation sequences.
//!
//! - [`StructA`] / [`StructB`]: the fixed-size records an embedded caller
//!   stores in the arena, with little-endian byte encodings.
//! - [`Op`]: one step of a scripted alloc/free sequence. Scripts name blocks
//!   by slot index so they can be replayed against any arena.

/// Encoded size of [`StructA`] in bytes.
pub const STRUCT_A_BYTES: usize = 8;

/// Encoded size of [`StructB`] in bytes.
pub const STRUCT_B_BYTES: usize = 16;

/// An indexed value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StructA {
    pub index: u32,
    pub value: u32,
}

impl StructA {
    pub fn to_bytes(self) -> [u8; STRUCT_A_BYTES] {
        let mut out = [0u8; STRUCT_A_BYTES];
        out[..4].copy_from_slice(&self.index.to_le_bytes());
        out[4..].copy_from_slice(&self.value.to_le_bytes());
        out
    }

    /// Decode from the first [`STRUCT_A_BYTES`] of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than [`STRUCT_A_BYTES`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            index: word(bytes, 0),
            value: word(bytes, 4),
        }
    }
}

/// An indexed RGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StructB {
    pub index: u32,
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

impl StructB {
    pub fn to_bytes(self) -> [u8; STRUCT_B_BYTES] {
        let mut out = [0u8; STRUCT_B_BYTES];
        for (i, v) in [self.index, self.red, self.green, self.blue]
            .into_iter()
            .enumerate()
        {
            out[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        out
    }

    /// Decode from the first [`STRUCT_B_BYTES`] of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than [`STRUCT_B_BYTES`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            index: word(bytes, 0),
            red: word(bytes, 4),
            green: word(bytes, 8),
            blue: word(bytes, 12),
        }
    }
}

fn word(bytes: &[u8], at: usize) -> u32 {
    let mut w = [0u8; 4];
    w.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(w)
}

/// One step of a scripted allocation sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Allocate `bytes` and remember the address in `slot`.
    Alloc { slot: usize, bytes: usize },
    /// Free the address remembered in `slot`.
    Free { slot: usize },
}

impl Op {
    /// The slot this step touches.
    pub fn slot(self) -> usize {
        match self {
            Op::Alloc { slot, .. } | Op::Free { slot } => slot,
        }
    }
}

/// Number of slots a script needs.
pub fn slot_count(script: &[Op]) -> usize {
    script.iter().map(|op| op.slot() + 1).max().unwrap_or(0)
}

/// The reference embedded workload: records of both layouts, single and
/// in arrays, with an early free in the middle. Fits a 2048-byte arena.
///
/// Slots: 0 = A×1, 1 = A×10, 2 = A×40, 3 = B×1, 4 = B×80.
pub fn embedded_demo_script() -> Vec<Op> {
    vec![
        Op::Alloc {
            slot: 0,
            bytes: STRUCT_A_BYTES,
        },
        Op::Alloc {
            slot: 1,
            bytes: 10 * STRUCT_A_BYTES,
        },
        Op::Alloc {
            slot: 2,
            bytes: 40 * STRUCT_A_BYTES,
        },
        Op::Free { slot: 1 },
        Op::Alloc {
            slot: 3,
            bytes: STRUCT_B_BYTES,
        },
        Op::Alloc {
            slot: 4,
            bytes: 80 * STRUCT_B_BYTES,
        },
        Op::Free { slot: 0 },
        Op::Free { slot: 2 },
        Op::Free { slot: 3 },
        Op::Free { slot: 4 },
    ]
}

/// Allocate A, allocate B, free A, allocate C, free B, free C.
///
/// Slots: 0 = A, 1 = B, 2 = C.
pub fn interleaved_script(a: usize, b: usize, c: usize) -> Vec<Op> {
    vec![
        Op::Alloc { slot: 0, bytes: a },
        Op::Alloc { slot: 1, bytes: b },
        Op::Free { slot: 0 },
        Op::Alloc { slot: 2, bytes: c },
        Op::Free { slot: 1 },
        Op::Free { slot: 2 },
    ]
}
