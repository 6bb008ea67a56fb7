//! # Pattern Database Table
//!
//! A dense byte array of BFS distances keyed by a composite
//! `(maprank, pidx, eqidx)` address, shared read/write across worker
//! threads via byte-granularity atomics. Used when a BFS frontier is
//! computed indirectly through a tile-subset projection rather than the
//! full 25-tile permutation.
//!
//! This crate realizes the address space with a single map (`maprank` is
//! always 0): the general multi-map partitioning scheme used by some
//! disjoint additive pattern databases would assign each tile subset its
//! own set of maps, but a single map is sufficient for any one tile set,
//! so that is what `generate` and the on-disk format build. The API
//! accepts and returns `maprank` regardless, so a multi-map table is a
//! matter of extending `Pdb::subtables`, not of changing any caller.

use std::collections::HashSet;
use std::io::{Read, Seek, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

use binrw::{BinRead, BinWrite};

use crate::error::{PuzzleError, PuzzleResult};
use crate::moves::get_moves;
use crate::puzzle::{Puzzle, TILE_COUNT};

/// Sentinel marking a not-yet-filled entry.
pub const UNREACHED: u8 = 255;

/// The tiles tracked by a pattern database, as grid-location-independent
/// tile numbers (`0..TILE_COUNT`). Order matters: it fixes the digit
/// order used by `pidx`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSet {
    tiles: Vec<u8>,
}

impl TileSet {
    pub fn new(tiles: Vec<u8>) -> PuzzleResult<TileSet> {
        if tiles.is_empty() {
            return Err(PuzzleError::InvalidTileSet("tile set must be non-empty".into()));
        }
        if tiles.iter().any(|&t| t as usize >= TILE_COUNT) {
            return Err(PuzzleError::InvalidTileSet(format!(
                "tile numbers must be in 0..{TILE_COUNT}"
            )));
        }
        let mut sorted = tiles.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(PuzzleError::InvalidTileSet("tile set contains a duplicate".into()));
        }
        Ok(TileSet { tiles })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    /// Whether the blank (tile 0) is tracked by this pattern, which adds
    /// an `eqidx` coordinate to every address in the table.
    pub fn includes_zero(&self) -> bool {
        self.tiles.contains(&0)
    }

    /// Number of distinct ordered placements of this tile set among the
    /// `TILE_COUNT` grid locations: `P(TILE_COUNT, k) = TILE_COUNT! / (TILE_COUNT - k)!`.
    pub fn n_perm(&self) -> u64 {
        let k = self.tiles.len();
        let mut n = 1u64;
        for i in 0..k {
            n *= (TILE_COUNT - i) as u64;
        }
        n
    }

    /// Number of equivalence classes for the blank's placement relative
    /// to this pattern: the grid locations not claimed by the pattern's
    /// own `k` tiles. Only meaningful (and only consulted) when
    /// `includes_zero` is true.
    pub fn n_eqclass(&self) -> usize {
        TILE_COUNT - self.tiles.len()
    }
}

/// An address into a pattern database table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PdbIndex {
    pub maprank: usize,
    pub pidx: u64,
    pub eqidx: usize,
}

impl PdbIndex {
    pub fn new(pidx: u64, eqidx: usize) -> PdbIndex {
        PdbIndex { maprank: 0, pidx, eqidx }
    }
}

/// File header: tile set as a bitmask over the 25 grid-independent tile
/// numbers, little-endian regardless of host so a saved table can be
/// reloaded on a different machine.
#[derive(BinRead, BinWrite, Debug)]
#[brw(little)]
struct PdbHeader {
    tile_mask: u32,
    tile_count: u8,
}

/// A frontier node for `Pdb::generate`: the grid locations of the
/// tracked tiles (in tile-set order) plus the blank's own grid location.
#[derive(Clone, Debug)]
struct PatternState {
    positions: Vec<u8>,
    zloc: u8,
}

/// Ranks an ordered tuple of distinct grid locations into `0..n_perm`,
/// using the same falling-factorial digit weights as [`TileSet::n_perm`]:
/// at step `i` the digit is how many still-unused locations are less than
/// `positions[i]`, weighted by the `TILE_COUNT - i` remaining free slots.
fn rank_positions(positions: &[u8]) -> u64 {
    let mut used = [false; TILE_COUNT];
    let mut rank = 0u64;
    for (i, &loc) in positions.iter().enumerate() {
        let digit = used[..loc as usize].iter().filter(|&&u| !u).count() as u64;
        rank = rank * (TILE_COUNT - i) as u64 + digit;
        used[loc as usize] = true;
    }
    rank
}

/// A key identifying a frontier node exactly (positions and blank
/// location both), distinct from the possibly-lossy `pidx` the table
/// stores distances under.
fn physical_key(state: &PatternState) -> u64 {
    rank_positions(&state.positions) * TILE_COUNT as u64 + state.zloc as u64
}

/// A pattern database: one dense subtable per `maprank` (a single
/// element here), each addressed by `(pidx, eqidx)`.
pub struct Pdb {
    tileset: TileSet,
    subtables: Vec<Box<[AtomicU8]>>,
}

impl Pdb {
    /// Number of `u8` entries needed per maprank subtable for `tileset`.
    fn subtable_len(tileset: &TileSet) -> usize {
        let n_perm = tileset.n_perm() as usize;
        if tileset.includes_zero() {
            n_perm * tileset.n_eqclass()
        } else {
            n_perm
        }
    }

    /// Allocates a table for `tileset`, filled with `UNREACHED`.
    pub fn allocate(tileset: TileSet) -> Pdb {
        let len = Self::subtable_len(&tileset);
        let subtable: Box<[AtomicU8]> = (0..len).map(|_| AtomicU8::new(UNREACHED)).collect();
        Pdb { tileset, subtables: vec![subtable] }
    }

    pub fn tileset(&self) -> &TileSet {
        &self.tileset
    }

    /// Fills every byte of every subtable with `UNREACHED`. Must
    /// happen-before any worker thread accesses the table for a fresh
    /// generation run.
    pub fn clear(&self) {
        for subtable in &self.subtables {
            for byte in subtable.iter() {
                byte.store(UNREACHED, Ordering::Relaxed);
            }
        }
    }

    fn entry(&self, idx: PdbIndex) -> &AtomicU8 {
        let subtable = &self.subtables[idx.maprank];
        let offset = if self.tileset.includes_zero() {
            idx.pidx as usize * self.tileset.n_eqclass() + idx.eqidx
        } else {
            idx.pidx as usize
        };
        &subtable[offset]
    }

    pub fn lookup(&self, idx: PdbIndex) -> u8 {
        self.entry(idx).load(Ordering::Acquire)
    }

    /// Non-atomic set: for single-threaded table construction only.
    pub fn update(&self, idx: PdbIndex, value: u8) {
        self.entry(idx).store(value, Ordering::Release);
    }

    /// Atomic `UNREACHED -> desired` transition. Returns `true` iff this
    /// call performed the transition (the byte held `expected`
    /// beforehand); a losing concurrent caller gets `false` and does not
    /// retry, since the write is idempotent across racing workers that
    /// all compute the same `desired` distance for the current layer.
    pub fn conditional_update(&self, idx: PdbIndex, expected: u8, desired: u8) -> bool {
        self.entry(idx)
            .compare_exchange(expected, desired, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Hardware prefetch hint for an upcoming `lookup`/`conditional_update`
    /// at `idx`. No-op on targets without a prefetch intrinsic; this
    /// crate does not special-case any target, so it is always a no-op
    /// hint implemented as a volatile read's side effect, leaving actual
    /// hardware prefetching to the CPU's own stride predictor.
    pub fn prefetch(&self, idx: PdbIndex) {
        let _ = self.entry(idx).load(Ordering::Relaxed);
    }

    /// The tracked tiles' grid locations plus the blank's, read out of a
    /// full puzzle. This is the only information `generate`'s move
    /// generator needs: it does not care which tile occupies a
    /// non-tracked location, only whether the blank can move there.
    fn project(&self, puzzle: &Puzzle) -> PatternState {
        let positions = self.tileset.tiles().iter().map(|&t| puzzle.tiles[t as usize]).collect();
        PatternState { positions, zloc: puzzle.zloc }
    }

    /// Ranks `state`'s tracked-tile positions into this table's `pidx`.
    /// `eqidx` is always 0: `generate` does not yet resolve a second
    /// equivalence class under blank placement when the blank is itself
    /// tracked, so those tables fill only the first `eqidx` slot of each
    /// `pidx` block (see `DESIGN.md`).
    fn index_of(&self, state: &PatternState) -> PdbIndex {
        PdbIndex::new(rank_positions(&state.positions), 0)
    }

    /// The one-move successors of `state`: sliding the blank into each
    /// neighboring grid location. A tracked tile only moves if the blank
    /// slides into its location; otherwise the move is invisible to the
    /// projection.
    fn expand_pattern(&self, state: &PatternState) -> Vec<PatternState> {
        get_moves(state.zloc as usize)
            .iter()
            .map(|&to| {
                let positions = state
                    .positions
                    .iter()
                    .map(|&p| if p == to { state.zloc } else { p })
                    .collect();
                PatternState { positions, zloc: to }
            })
            .collect()
    }

    /// Fills the table with BFS distances from `goal`'s tracked-tile
    /// positions, expanding `jobs.get()` worker threads wide one BFS
    /// layer at a time via [`std::thread::scope`].
    ///
    /// Move generation tracks each frontier state's full
    /// `(positions, zloc)` pair so that every reachable projected state is
    /// actually visited, even though the table itself is addressed by
    /// `pidx` alone when the blank is not tracked (multiple `zloc`s then
    /// share one table entry). Because worker threads discover states in
    /// strict non-decreasing BFS order, the first write to a shared entry
    /// is always its minimal distance; later writes to the same entry are
    /// redundant and `conditional_update` simply drops them.
    pub fn generate(&self, jobs: PdbJobs, goal: &Puzzle) {
        self.clear();

        let start = self.project(goal);
        let start_key = physical_key(&start);
        self.update(self.index_of(&start), 0);

        let visited = Mutex::new(HashSet::from([start_key]));
        let mut frontier = vec![start];
        let mut distance: u8 = 0;

        while !frontier.is_empty() {
            distance = distance.saturating_add(1);
            let n_workers = jobs.get().min(frontier.len());
            let chunk_size = (frontier.len() + n_workers - 1) / n_workers;

            frontier = std::thread::scope(|scope| {
                let handles: Vec<_> = frontier
                    .chunks(chunk_size.max(1))
                    .map(|chunk| {
                        let visited = &visited;
                        scope.spawn(move || {
                            let mut discovered = Vec::new();
                            for state in chunk {
                                for child in self.expand_pattern(state) {
                                    let first_seen = visited.lock().unwrap().insert(physical_key(&child));
                                    if first_seen {
                                        self.conditional_update(self.index_of(&child), UNREACHED, distance);
                                        discovered.push(child);
                                    }
                                }
                            }
                            discovered
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .flat_map(|h| h.join().expect("pdb generation worker panicked"))
                    .collect()
            });
        }
    }

    fn tile_mask(tileset: &TileSet) -> u32 {
        tileset.tiles().iter().fold(0u32, |mask, &t| mask | (1 << t))
    }

    fn tileset_from_mask(mask: u32, tile_count: u8) -> PuzzleResult<TileSet> {
        let mut tiles = Vec::with_capacity(tile_count as usize);
        for t in 0..TILE_COUNT as u32 {
            if mask & (1 << t) != 0 {
                tiles.push(t as u8);
            }
        }
        if tiles.len() != tile_count as usize {
            return Err(PuzzleError::InvalidTileSet(format!(
                "header tile count {} does not match mask popcount {}",
                tile_count,
                tiles.len()
            )));
        }
        TileSet::new(tiles)
    }

    /// Writes the header and the concatenation of all subtables (in
    /// maprank order) to `out`.
    pub fn store<W: Write + Seek>(&self, out: &mut W) -> PuzzleResult<()> {
        let header = PdbHeader {
            tile_mask: Self::tile_mask(&self.tileset),
            tile_count: self.tileset.len() as u8,
        };
        header
            .write(out)
            .map_err(|e| PuzzleError::PdbFormat(format!("failed to write pdb header: {e}")))?;
        for subtable in &self.subtables {
            for byte in subtable.iter() {
                out.write_all(&[byte.load(Ordering::Acquire)])
                    .map_err(|e| PuzzleError::io("write pdb table", "<pdb>", e))?;
            }
        }
        Ok(())
    }

    /// Reconstructs a table from a stream previously written by
    /// [`Pdb::store`]. The tile set is read back from the header; no
    /// separate tile set argument is needed, since this is the exact
    /// inverse of `store`.
    pub fn load<R: Read + Seek>(input: &mut R) -> PuzzleResult<Pdb> {
        let header = PdbHeader::read(input)
            .map_err(|e| PuzzleError::PdbFormat(format!("failed to read pdb header: {e}")))?;
        let tileset = Self::tileset_from_mask(header.tile_mask, header.tile_count)?;
        let len = Self::subtable_len(&tileset);
        let mut bytes = vec![0u8; len];
        input
            .read_exact(&mut bytes)
            .map_err(|e| PuzzleError::io("read pdb table", "<pdb>", e))?;
        let subtable: Box<[AtomicU8]> = bytes.into_iter().map(AtomicU8::new).collect();
        Ok(Pdb { tileset, subtables: vec![subtable] })
    }
}

/// Process-wide cap on pattern-database generation parallelism. Carried
/// as an explicit [`PdbJobs`] value rather than a mutable global, so it
/// is fixed at construction and never mutated once workers start.
pub const PDB_MAX_JOBS: usize = 256;

/// The number of worker threads a PDB generation run should use. Set
/// once at construction and never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PdbJobs(usize);

impl PdbJobs {
    pub fn new(jobs: usize) -> PdbJobs {
        PdbJobs(jobs.clamp(1, PDB_MAX_JOBS))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_tile_set() -> TileSet {
        TileSet::new(vec![1, 2, 3]).unwrap()
    }

    #[test]
    fn clear_fills_every_byte_with_unreached() {
        let pdb = Pdb::allocate(three_tile_set());
        pdb.clear();
        for pidx in 0..pdb.tileset.n_perm() {
            assert_eq!(pdb.lookup(PdbIndex::new(pidx, 0)), UNREACHED);
        }
    }

    #[test]
    fn conditional_update_succeeds_exactly_once() {
        let pdb = Pdb::allocate(three_tile_set());
        pdb.clear();
        let idx = PdbIndex::new(0, 0);
        assert!(pdb.conditional_update(idx, UNREACHED, 7));
        assert_eq!(pdb.lookup(idx), 7);
        assert!(!pdb.conditional_update(idx, UNREACHED, 9));
        assert_eq!(pdb.lookup(idx), 7);
    }

    #[test]
    fn subtable_length_matches_n_perm_without_zero_tile() {
        let ts = three_tile_set();
        assert!(!ts.includes_zero());
        let expected = ts.n_perm() as usize;
        assert_eq!(Pdb::subtable_len(&ts), expected);
    }

    #[test]
    fn subtable_length_scales_by_eqclass_with_zero_tile() {
        let ts = TileSet::new(vec![0, 1, 2]).unwrap();
        assert!(ts.includes_zero());
        let expected = ts.n_perm() as usize * ts.n_eqclass();
        assert_eq!(Pdb::subtable_len(&ts), expected);
    }

    #[test]
    fn rejects_duplicate_and_out_of_range_tiles() {
        assert!(TileSet::new(vec![1, 1, 2]).is_err());
        assert!(TileSet::new(vec![1, 2, 30]).is_err());
        assert!(TileSet::new(vec![]).is_err());
    }

    #[test]
    fn store_then_load_round_trips() {
        let pdb = Pdb::allocate(three_tile_set());
        pdb.clear();
        pdb.conditional_update(PdbIndex::new(5, 0), UNREACHED, 3);
        pdb.conditional_update(PdbIndex::new(10, 0), UNREACHED, 1);

        let mut cursor = std::io::Cursor::new(Vec::new());
        pdb.store(&mut cursor).unwrap();
        cursor.set_position(0);
        let loaded = Pdb::load(&mut cursor).unwrap();
        assert_eq!(loaded.tileset(), pdb.tileset());
        assert_eq!(loaded.lookup(PdbIndex::new(5, 0)), 3);
        assert_eq!(loaded.lookup(PdbIndex::new(10, 0)), 1);
        assert_eq!(loaded.lookup(PdbIndex::new(0, 0)), UNREACHED);
    }

    #[test]
    fn pdb_jobs_clamps_to_valid_range() {
        assert_eq!(PdbJobs::new(0).get(), 1);
        assert_eq!(PdbJobs::new(1000).get(), PDB_MAX_JOBS);
        assert_eq!(PdbJobs::new(8).get(), 8);
    }

    #[test]
    fn generate_assigns_zero_distance_to_the_goal() {
        let pdb = Pdb::allocate(TileSet::new(vec![1, 2]).unwrap());
        let goal = Puzzle::solved();
        pdb.generate(PdbJobs::new(2), &goal);

        let goal_idx = pdb.index_of(&pdb.project(&goal));
        assert_eq!(pdb.lookup(goal_idx), 0);
    }

    #[test]
    fn generate_reaches_most_of_a_small_pattern_space() {
        let ts = TileSet::new(vec![1, 2]).unwrap();
        let n_perm = ts.n_perm();
        let pdb = Pdb::allocate(ts);
        pdb.generate(PdbJobs::new(4), &Puzzle::solved());

        let reached = (0..n_perm).filter(|&pidx| pdb.lookup(PdbIndex::new(pidx, 0)) != UNREACHED).count() as u64;
        assert!(
            reached * 2 > n_perm,
            "expected most of a 2-tile pattern space to be reachable, got {reached}/{n_perm}"
        );
    }

    #[test]
    fn generate_is_idempotent_across_job_counts() {
        let ts = TileSet::new(vec![1, 2]).unwrap();
        let goal = Puzzle::solved();

        let single = Pdb::allocate(ts.clone());
        single.generate(PdbJobs::new(1), &goal);

        let parallel = Pdb::allocate(ts.clone());
        parallel.generate(PdbJobs::new(6), &goal);

        for pidx in 0..ts.n_perm() {
            let idx = PdbIndex::new(pidx, 0);
            assert_eq!(single.lookup(idx), parallel.lookup(idx));
        }
    }
}
