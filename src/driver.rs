//! # Layer Driver
//!
//! Orchestrates one BFS layer: expand the previous layer's stream,
//! distribute the children into bucket files keyed on successive tile
//! coordinates, then coalesce the final buckets into the next layer
//! stream. The initial distribution is fused with expansion (each child
//! is written straight into the bucket for its own tile-24 position,
//! skipping an intermediate serialization pass); the remaining rounds
//! then distribute on tiles 22 down through 0 in turn, after which every
//! record in a given round-0 bucket agrees on tiles 1..24 and therefore
//! also on tile 0 by elimination, and the round-0 buckets are coalesced
//! directly into the output stream.
//!
//! Tile 23's position is never used as an explicit key: with 24 of 25
//! tile positions (0 and 1..22) pinned by the other rounds, tile 23's
//! position is forced by elimination among the remaining two grid
//! locations, and the puzzle's even-parity invariant (see
//! `DESIGN.md`) resolves that last two-way ambiguity, so two records
//! agreeing on every other tile already agree on tile 23 as well.
//! [`radix::sort`] makes no such assumption and is used instead wherever
//! an arbitrary multiset of records must be sorted.

use std::fs::File;
use std::io::{Seek, SeekFrom};

use log::{debug, info};

use crate::coalesce::coalesce;
use crate::codec::{pack, unpack, CompactPuzzle};
use crate::error::{PuzzleError, PuzzleResult};
use crate::moves::expand;
use crate::puzzle::{Puzzle, TILE_COUNT};
use crate::radix::{distribute, BucketSet};
use crate::stream::{read_record, write_record};

/// The first tile index dealt with by the distribute loop (round labels
/// run from `TILE_COUNT - 2` down to 1); the fused expansion pass keys on
/// `TILE_COUNT - 1` (tile 24) per the resolved open question.
const FUSED_KEY_TILE: usize = TILE_COUNT - 1;
const FIRST_ROUND: usize = TILE_COUNT - 2;

/// Writes the single layer-0 record (the solved puzzle, zero mask) to
/// `output`.
pub fn write_layer_zero(output: &mut File) -> PuzzleResult<u64> {
    let record = pack(&Puzzle::solved());
    write_record(output, &record).map_err(|e| PuzzleError::io("write layer stream", "<layer0>", e))?;
    Ok(1)
}

/// Expands every record of `input` (rewound by the caller) into the next
/// BFS layer, performing the fused-expansion radix sort and coalesce,
/// and appends the result to `output`. `dir` is the bucket-file prefix
/// for this layer; returns the number of records written (the layer's
/// cardinality).
pub fn expand_layer(dir: &str, input: &mut File, output: &mut File) -> PuzzleResult<u64> {
    input
        .seek(SeekFrom::Start(0))
        .map_err(|e| PuzzleError::io("rewind input stream", "<input>", e))?;

    debug!("opening fused-pass buckets for round {FIRST_ROUND}");
    let mut current = BucketSet::create(dir, FIRST_ROUND)?;
    let mut n_expanded = 0u64;
    while let Some(record) = read_record(input).map_err(|e| PuzzleError::io("read layer stream", "<input>", e))? {
        for child in expand(&record) {
            let p = unpack(&child);
            let loc = p.tiles[FUSED_KEY_TILE] as usize;
            current.write(loc, &child)?;
            n_expanded += 1;
        }
    }
    debug!("fused pass expanded {n_expanded} children");

    for round in (0..FIRST_ROUND).rev() {
        debug!("distribution round {round}, keyed on tile {round}");
        let mut next = BucketSet::create(dir, round)?;
        current.rewind_all()?;
        for loc in 0..TILE_COUNT {
            distribute(current.file_mut(loc), &mut next, round)?;
            current.close_and_unlink_one(loc)?;
        }
        current = next;
    }

    info!("coalescing round-0 buckets into the output layer stream");
    current.rewind_all()?;
    let mut written = 0u64;
    for loc in 0..TILE_COUNT {
        written += coalesce(output, current.file_mut(loc))
            .map_err(|e| PuzzleError::io("coalesce bucket file", "<bucket>", e))?;
        current.close_and_unlink_one(loc)?;
    }

    Ok(written)
}

/// The published configuration count 25!/2.
pub const CONFIG_COUNT: f64 = 7_755_605_021_665_492_992_000_000.0;
pub const CONFIG_COUNT_STR: &str = "7755605021665492992000000";

/// Formats one layer-report line: the layer index, its cardinality, and
/// the cardinality's ratio to the total configuration count, in the
/// fixed column widths `"%3d: %18zu/%s = %24.18e"`.
pub fn format_layer_report(layer: usize, size: u64) -> String {
    format!(
        "{layer:3}: {size:18}/{CONFIG_COUNT_STR} = {:24.18e}",
        size as f64 / CONFIG_COUNT
    )
}

#[allow(dead_code)]
pub(crate) fn drain_to_vec(file: &mut File) -> std::io::Result<Vec<CompactPuzzle>> {
    file.seek(SeekFrom::Start(0))?;
    let mut out = Vec::new();
    while let Some(r) = read_record(file)? {
        out.push(r);
    }
    Ok(out)
}
