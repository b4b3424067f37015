use crate::engine::shake256_hash;
use crate::error::{RucError, Result};
use std::path::Path;

/// Longest digest the hash command will squeeze (1 MiB)
pub const MAX_HASH_LENGTH: usize = 1 << 20;

/// Options for the hash command
#[derive(Debug, Clone)]
pub struct HashOptions {
    /// Output length in bytes
    pub length: usize,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self { length: 32 }
    }
}

/// Hex-encoded SHAKE256 digest of `data`
pub fn hash_bytes(data: &[u8], options: &HashOptions) -> Result<String> {
    check_length(options.length)?;
    Ok(hex::encode(shake256_hash(data, options.length)))
}

/// Hex-encoded SHAKE256 digest of a file
pub fn hash_file(path: &Path, options: &HashOptions) -> Result<String> {
    check_length(options.length)?;
    let data = std::fs::read(path)?;
    hash_bytes(&data, options)
}

fn check_length(length: usize) -> Result<()> {
    if length > MAX_HASH_LENGTH {
        return Err(RucError::UnsupportedOption(format!(
            "hash length {} exceeds {} bytes",
            length, MAX_HASH_LENGTH
        )));
    }
    Ok(())
}
