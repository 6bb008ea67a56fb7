//! # Sampling
//!
//! Uniform sampling of a BFS layer stream, driven by a seeded PRNG. A
//! layer stream's length is not known in advance (the driver produces it
//! incrementally), so sampling is done with reservoir sampling in a
//! single forward pass rather than by picking random offsets.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::Path;

use rand::Rng;

use crate::codec::CompactPuzzle;
use crate::error::{PuzzleError, PuzzleResult};
use crate::stream::{read_record, write_record};

/// One sampled record and the layer it was drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub layer_index: u32,
    pub record: CompactPuzzle,
}

/// Draws `min(n_samples, layer_size)` records uniformly without
/// replacement from `stream` (rewound by the caller) via reservoir
/// sampling (Algorithm R), and appends `(layer_index, record)` pairs to
/// the sample file at `path`, creating it if absent. Returns the number
/// of samples actually drawn.
pub fn sample_layer(
    path: &Path,
    layer_index: u32,
    stream: &mut File,
    n_samples: usize,
    rng: &mut impl Rng,
) -> PuzzleResult<usize> {
    stream
        .seek(SeekFrom::Start(0))
        .map_err(|e| PuzzleError::io("rewind layer stream for sampling", path, e))?;

    if n_samples == 0 {
        return Ok(0);
    }

    let mut reservoir: Vec<CompactPuzzle> = Vec::with_capacity(n_samples);
    let mut seen: u64 = 0;
    while let Some(record) = read_record(stream).map_err(|e| PuzzleError::io("read layer stream", path, e))? {
        if reservoir.len() < n_samples {
            reservoir.push(record);
        } else {
            let j = rng.gen_range(0..=seen);
            if (j as usize) < n_samples {
                reservoir[j as usize] = record;
            }
        }
        seen += 1;
    }

    if reservoir.is_empty() {
        return Ok(0);
    }

    let mut out = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PuzzleError::io("open sample file", path, e))?;
    for record in &reservoir {
        write_sample(&mut out, layer_index, record).map_err(|e| PuzzleError::io("write sample file", path, e))?;
    }

    Ok(reservoir.len())
}

fn write_sample(out: &mut File, layer_index: u32, record: &CompactPuzzle) -> std::io::Result<()> {
    use std::io::Write;
    out.write_all(&layer_index.to_ne_bytes())?;
    write_record(out, record)
}

/// Reads back every `(layer_index, record)` pair from a sample file, in
/// append order. Used by tests and by downstream statistical tooling.
pub fn read_samples(path: &Path) -> PuzzleResult<Vec<Sample>> {
    let mut file = File::open(path).map_err(|e| PuzzleError::io("open sample file", path, e))?;
    let mut out = Vec::new();
    loop {
        let mut idx_buf = [0u8; 4];
        use std::io::Read;
        match file.read(&mut idx_buf) {
            Ok(0) => break,
            Ok(4) => {}
            Ok(_) => return Err(PuzzleError::TruncatedRecord { path: path.to_path_buf(), len: 0 }),
            Err(e) => return Err(PuzzleError::io("read sample file", path, e)),
        }
        let layer_index = u32::from_ne_bytes(idx_buf);
        let record = read_record(&mut file)
            .map_err(|e| PuzzleError::io("read sample file", path, e))?
            .ok_or_else(|| PuzzleError::TruncatedRecord { path: path.to_path_buf(), len: 0 })?;
        out.push(Sample { layer_index, record });
    }
    Ok(out)
}
