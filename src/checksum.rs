use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};

/// Read size used when hashing; bounds memory regardless of file size.
pub const CHUNK_SIZE: usize = 4096;

/// Compute the MD5 of a file and return the digest as lowercase hex.
pub fn md5_path(path: &Path) -> io::Result<String> {
    md5_reader(File::open(path)?, CHUNK_SIZE)
}

fn md5_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<String> {
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; chunk_size];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Whether `candidate` and `reference` hold the same bytes.
///
/// A missing `reference` means there is nothing to compare against yet and
/// yields `Ok(false)`. A missing `candidate` is an error.
pub fn same_content(candidate: &Path, reference: &Path) -> io::Result<bool> {
    let candidate = md5_path(candidate)?;
    match md5_path(reference) {
        Ok(reference) => Ok(candidate == reference),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
