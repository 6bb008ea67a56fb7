//! # External Radix Sorter
//!
//! Sorts an on-disk stream of compact puzzles by the tuple of tile
//! positions via repeated least-significant-digit-first distribution into
//! bucket files. [`BucketSet`] is the shared primitive (used both by this
//! module's general-purpose [`sort`] and by the layer driver's
//! specialized, fused-first-pass procedure); [`sort`] is a standalone,
//! fully general 24-key sort used to validate the algorithm against an
//! arbitrary multiset of records, independent of any puzzle-specific
//! shortcuts the layer driver takes.

use std::fs::{self, File};
use std::io::{Seek, SeekFrom};
use std::path::PathBuf;

use crate::codec::unpack;
use crate::error::{PuzzleError, PuzzleResult};
use crate::puzzle::TILE_COUNT;
use crate::stream::{create_rw, read_record, write_record};

/// Number of distinct values a single tile position can take.
pub const RADIX: usize = TILE_COUNT;

/// Path of the bucket file for `(round, loc)` under prefix `dir`:
/// `"<dir>-<round:02>-<loc:02>.rdx"`.
pub fn bucket_path(dir: &str, round: usize, loc: usize) -> PathBuf {
    PathBuf::from(format!("{dir}-{round:02}-{loc:02}.rdx"))
}

/// `RADIX` open bucket files for one round of distribution: created
/// empty, appended to, then rewound before being read by the next pass.
pub struct BucketSet {
    dir: String,
    round: usize,
    files: Vec<Option<File>>,
}

impl BucketSet {
    /// Creates (or truncates) the `RADIX` bucket files for `round`.
    pub fn create(dir: &str, round: usize) -> PuzzleResult<BucketSet> {
        let mut files = Vec::with_capacity(RADIX);
        for loc in 0..RADIX {
            let path = bucket_path(dir, round, loc);
            let file = create_rw(&path).map_err(|e| PuzzleError::io("open bucket file", path, e))?;
            files.push(Some(file));
        }
        Ok(BucketSet { dir: dir.to_string(), round, files })
    }

    pub fn round(&self) -> usize {
        self.round
    }

    /// Appends `record` to the bucket for `loc`.
    pub fn write(&mut self, loc: usize, record: &crate::codec::CompactPuzzle) -> PuzzleResult<()> {
        let path = bucket_path(&self.dir, self.round, loc);
        let file = self.files[loc].as_mut().expect("write to a retired bucket");
        write_record(file, record).map_err(|e| PuzzleError::io("write bucket file", path, e))
    }

    /// Seeks every still-open bucket file back to its start, ready to be
    /// read by the next pass.
    pub fn rewind_all(&mut self) -> PuzzleResult<()> {
        for (loc, slot) in self.files.iter_mut().enumerate() {
            if let Some(file) = slot {
                file.seek(SeekFrom::Start(0))
                    .map_err(|e| PuzzleError::io("rewind bucket file", bucket_path(&self.dir, self.round, loc), e))?;
            }
        }
        Ok(())
    }

    /// Mutable access to one bucket's file, e.g. to drain it record by
    /// record in a distribution pass.
    pub fn file_mut(&mut self, loc: usize) -> &mut File {
        self.files[loc].as_mut().expect("access to a retired bucket")
    }

    /// Closes and unlinks the bucket file for `loc`. Bucket files are
    /// closed and unlinked as soon as they are drained to bound disk
    /// usage; callers that drain buckets one-by-one should call this
    /// immediately after draining each, rather than waiting for the whole
    /// set.
    pub fn close_and_unlink_one(&mut self, loc: usize) -> PuzzleResult<()> {
        let path = bucket_path(&self.dir, self.round, loc);
        self.files[loc] = None; // drop closes the fd
        fs::remove_file(&path).map_err(|e| PuzzleError::io("unlink bucket file", path, e))
    }

    /// Closes and unlinks every remaining bucket file.
    pub fn close_and_unlink_all(mut self) -> PuzzleResult<()> {
        for loc in 0..RADIX {
            if self.files[loc].is_some() {
                self.close_and_unlink_one(loc)?;
            }
        }
        Ok(())
    }
}

/// Distributes every record from `old` (rewound, read to EOF) into `new`,
/// grouping by the value of `tiles[key_tile]`.
pub fn distribute(old: &mut File, new: &mut BucketSet, key_tile: usize) -> PuzzleResult<()> {
    while let Some(record) = read_record(old).map_err(|e| PuzzleError::io("read bucket file", "<bucket>", e))? {
        let p = unpack(&record);
        let loc = p.tiles[key_tile] as usize;
        new.write(loc, &record)?;
    }
    Ok(())
}

/// General-purpose, fully self-contained external radix sort of an
/// arbitrary stream of compact puzzles by the full tuple
/// `(tiles[0], ..., tiles[TILE_COUNT - 2])`, independent of any
/// puzzle-reachability assumptions. Used to validate the sorting
/// procedure itself against an arbitrary multiset of records; the layer
/// driver uses its own fused, parity-assisted variant (see
/// `driver::expand_layer`) for performance.
///
/// Returns a freshly rewound file containing the records sorted
/// lexicographically by that tuple; temporary bucket files are cleaned
/// up before returning.
pub fn sort(dir: &str, input: &mut File) -> PuzzleResult<File> {
    let last_key = TILE_COUNT - 2; // tile 24's position is implied, not a key
    input.seek(SeekFrom::Start(0)).map_err(|e| PuzzleError::io("rewind input", "<input>", e))?;

    let mut current = BucketSet::create(dir, last_key)?;
    while let Some(record) = read_record(input).map_err(|e| PuzzleError::io("read input", "<input>", e))? {
        let p = unpack(&record);
        let loc = p.tiles[last_key] as usize;
        current.write(loc, &record)?;
    }

    for key_tile in (0..last_key).rev() {
        let mut next = BucketSet::create(dir, key_tile)?;
        current.rewind_all()?;
        for loc in 0..RADIX {
            distribute(current.file_mut(loc), &mut next, key_tile)?;
            current.close_and_unlink_one(loc)?;
        }
        current = next;
    }

    // current now holds RADIX buckets keyed on tiles[0]; concatenating
    // them in loc order yields the fully sorted stream.
    let mut out = tempfile::tempfile().map_err(|e| PuzzleError::io("create sorted output", "<tmp>", e))?;
    current.rewind_all()?;
    for loc in 0..RADIX {
        let file = current.file_mut(loc);
        loop {
            match read_record(file).map_err(|e| PuzzleError::io("read bucket file", "<bucket>", e))? {
                Some(record) => write_record(&mut out, &record)
                    .map_err(|e| PuzzleError::io("write sorted output", "<tmp>", e))?,
                None => break,
            }
        }
        current.close_and_unlink_one(loc)?;
    }
    current.close_and_unlink_all()?;

    out.seek(SeekFrom::Start(0)).map_err(|e| PuzzleError::io("rewind sorted output", "<tmp>", e))?;
    Ok(out)
}
