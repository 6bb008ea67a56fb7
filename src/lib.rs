//! # `puzzle24`
//!
//! Disk-backed BFS layer enumeration for the 24-puzzle: given the solved
//! configuration, repeatedly expand the current layer's frontier by one
//! move, deduplicate the result with an external radix sort, and report
//! the cardinality of each layer. The reachable state space (25!/2
//! configurations) is far too large to hold a closed set in memory, so
//! every intermediate frontier lives on disk as a packed binary stream.
//!
//! ## Architecture
//!
//! * [`puzzle`] is the unpacked 5x5 tile permutation.
//! * [`codec`] bit-packs a puzzle plus a move-exclusion mask into a
//!   16-byte [`codec::CompactPuzzle`] record.
//! * [`moves`] holds the static move tables and the one-move expansion.
//! * [`radix`] is the external least-significant-digit radix sorter that
//!   groups records by tile position across 24 passes.
//! * [`coalesce`] fuses adjacent same-configuration records after a sort.
//! * [`driver`] orchestrates one BFS layer out of the above four pieces.
//! * [`pdb`] is the auxiliary pattern-database table, shared across
//!   worker threads when a frontier is computed indirectly through tile
//!   subset projections.
//! * [`sampling`] and [`rng`] support drawing uniform samples from a
//!   layer stream for downstream statistical work.
//!
//! The CLI front end lives in `src/bin/puzzlelayers.rs` and `cli`.

pub mod coalesce;
pub mod codec;
pub mod driver;
pub mod error;
pub mod moves;
pub mod pdb;
pub mod puzzle;
pub mod radix;
pub mod rng;
pub mod sampling;
pub mod stream;

pub mod cli;

/// Shorthand used throughout the CLI layer, matching the convention of
/// returning a boxed error from `main`.
pub type DynErr = Box<dyn std::error::Error>;
pub type StdResult = Result<(), DynErr>;
