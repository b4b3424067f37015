use crate::envelope::{EnvelopeHeader, TAG_SIZE};
use crate::error::{RucError, Result};
use crate::params::BLOCK_SIZE;
use std::path::Path;

/// Describe an envelope file without decrypting it
pub fn show_info(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    let header = EnvelopeHeader::from_bytes(&data)?;
    let body = data
        .len()
        .checked_sub(EnvelopeHeader::SIZE + TAG_SIZE)
        .ok_or_else(|| RucError::InvalidEnvelope("missing tag".into()))?;

    let mut output = String::new();
    output.push_str("RUC Envelope Information\n");
    output.push_str("========================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Version: {}\n", header.version));
    output.push_str(&format!("IV: {}\n", hex::encode(header.iv)));
    output.push_str(&format!("Plaintext length: {} bytes\n", header.plaintext_len));
    output.push_str(&format!("Ciphertext: {} bytes ({} blocks)\n", body, body / BLOCK_SIZE));
    output.push_str(&format!("Tag: HMAC-SHA256 ({} bytes)\n", TAG_SIZE));
    Ok(output)
}
