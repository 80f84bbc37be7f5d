//! Streamed byte-for-byte file comparison.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Compare two files by raw content, reading `chunk_size` bytes at a time.
///
/// Returns `true` only when both files exist, have the same length, and every
/// chunk matches. Differing lengths short-circuit before any content is read,
/// and the first mismatching chunk stops the scan. A missing or unreadable
/// file on either side counts as unequal.
pub fn files_equal(a: &Path, b: &Path, chunk_size: usize) -> bool {
    compare(a, b, chunk_size.max(1)).unwrap_or(false)
}

fn compare(a: &Path, b: &Path, chunk_size: usize) -> io::Result<bool> {
    let (meta_a, meta_b) = (a.metadata()?, b.metadata()?);
    if !meta_a.is_file() || !meta_b.is_file() || meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut file_a = File::open(a)?;
    let mut file_b = File::open(b)?;
    let mut buf_a = vec![0u8; chunk_size];
    let mut buf_b = vec![0u8; chunk_size];

    loop {
        let read_a = fill(&mut file_a, &mut buf_a)?;
        let read_b = fill(&mut file_b, &mut buf_b)?;

        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or EOF; returns the number of bytes read.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
