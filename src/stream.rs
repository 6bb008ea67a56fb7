//! # Compact Puzzle Stream I/O
//!
//! Raw, untyped bulk I/O for `CompactPuzzle` records, shared by the radix
//! sorter, coalescer, layer driver and sampler. Records are written and
//! read in the host's native byte order and native struct layout: bucket
//! files and layer streams never outlive the host that wrote them, so
//! portability is not a concern.

use std::fs::File;
use std::io::{self, Read, Write};
use std::mem::size_of;
use std::path::Path;

use crate::codec::CompactPuzzle;

pub const RECORD_SIZE: usize = size_of::<CompactPuzzle>();

/// Reads one record from `file`. Returns `Ok(None)` on a clean EOF and
/// an error on a short read (a truncated record), which indicates a
/// corrupt bucket or layer-stream file.
pub fn read_record(file: &mut File) -> io::Result<Option<CompactPuzzle>> {
    let mut buf = [0u8; RECORD_SIZE];
    let mut filled = 0;
    loop {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
        if filled == RECORD_SIZE {
            break;
        }
    }
    if filled == 0 {
        return Ok(None);
    }
    if filled != RECORD_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated compact puzzle record",
        ));
    }
    let half = RECORD_SIZE / 2;
    let hi = u64::from_ne_bytes(buf[..half].try_into().unwrap());
    let lo = u64::from_ne_bytes(buf[half..].try_into().unwrap());
    Ok(Some(CompactPuzzle { hi, lo }))
}

/// Appends one record to `file`.
pub fn write_record(file: &mut File, record: &CompactPuzzle) -> io::Result<()> {
    let mut buf = [0u8; RECORD_SIZE];
    let half = RECORD_SIZE / 2;
    buf[..half].copy_from_slice(&record.hi.to_ne_bytes());
    buf[half..].copy_from_slice(&record.lo.to_ne_bytes());
    file.write_all(&buf)
}

/// Opens `path` for reading and writing, creating it if absent and
/// truncating any existing content (the lifecycle of a bucket or layer
/// stream file always starts from empty).
pub fn create_rw(path: impl AsRef<Path>) -> io::Result<File> {
    File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn write_then_read_round_trips() {
        let tmp = NamedTempFile::new().unwrap();
        let mut file = create_rw(tmp.path()).unwrap();
        let records = [
            CompactPuzzle { hi: 1, lo: 2 },
            CompactPuzzle { hi: u64::MAX, lo: 0 },
        ];
        for r in &records {
            write_record(&mut file, r).unwrap();
        }
        file.sync_all().unwrap();

        let mut reader = File::open(tmp.path()).unwrap();
        for expected in &records {
            let got = read_record(&mut reader).unwrap().unwrap();
            assert_eq!(&got, expected);
        }
        assert!(read_record(&mut reader).unwrap().is_none());
    }
}
