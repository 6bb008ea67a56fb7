//! # Error Types
//!
//! A single `thiserror`-derived enum for everything the core can fail on.
//! No I/O error is recovered locally: a failing layer is not restartable,
//! so every fallible operation here simply propagates up to `main`.

use std::path::PathBuf;

pub type PuzzleResult<T> = Result<T, PuzzleError>;

#[derive(thiserror::Error, Debug)]
pub enum PuzzleError {
    #[error("{op} failed on {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bucket file {path} is corrupt: record count {len} is not a multiple of the record size")]
    TruncatedRecord { path: PathBuf, len: u64 },

    #[error("pattern database tile set is invalid: {0}")]
    InvalidTileSet(String),

    #[error("pattern database file is corrupt: {0}")]
    PdbFormat(String),
}

impl PuzzleError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PuzzleError::Io { op, path: path.into(), source }
    }
}
