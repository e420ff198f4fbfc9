//! SHA-256 checksum utilities
//!
//! Checksums are lowercase hex strings of the 256-bit digest, with no prefix,
//! which is the format stored in the manifest's `contentHash` field.

use sha2::{Digest, Sha256};
use std::io::{self, Read};
use std::path::Path;

/// Compute the SHA-256 checksum of string content.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stream a reader through SHA-256, returning the hex digest and the number
/// of bytes consumed.
pub fn compute_reader_checksum<R: Read>(reader: &mut R) -> io::Result<(String, u64)> {
    let mut hasher = Sha256::new();
    let bytes = io::copy(reader, &mut hasher)?;
    Ok((format!("{:x}", hasher.finalize()), bytes))
}

/// Compute the SHA-256 checksum of a file's contents without loading it all
/// into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_file_checksum(path: &Path) -> io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    compute_reader_checksum(&mut file).map(|(hash, _)| hash)
}
