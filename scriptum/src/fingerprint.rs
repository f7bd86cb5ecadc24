//! Content fingerprints for script files.

use crate::errors::MigrationResult;
use md5::{Digest, Md5};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Computes the fingerprint of a file: the MD5 digest of its full byte
/// content as 32 lowercase hex characters.
///
/// The file is streamed into the hasher, so its size does not matter. The
/// handle is closed on every return path.
///
/// MD5 is used to detect content drift, not as a security boundary.
pub fn fingerprint<P: AsRef<Path>>(path: P) -> MigrationResult<String> {
    let file = File::open(path.as_ref())?;
    fingerprint_reader(file)
}

/// Computes the fingerprint of everything `reader` yields.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> MigrationResult<String> {
    let mut hasher = Md5::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fingerprint of an in-memory buffer.
pub fn fingerprint_bytes(content: &[u8]) -> String {
    format!("{:x}", Md5::digest(content))
}
