use crate::cli::load_cipher;
use crate::envelope::open;
use crate::error::Result;
use crate::params::{Execution, KeyFormat};
use std::path::{Path, PathBuf};

/// Options for the decrypt command
#[derive(Debug, Clone, Default)]
pub struct DecryptOptions {
    pub key: String,
    pub key_format: KeyFormat,
    pub execution: Execution,
    pub schedule: Option<PathBuf>,
}

/// Verify and decrypt an envelope file
/// Returns the number of plaintext bytes written
pub fn decrypt_file(input_path: &Path, output_path: &Path, options: &DecryptOptions) -> Result<usize> {
    let cipher = load_cipher(&options.key, options.key_format, options.schedule.as_deref())?;
    let envelope = std::fs::read(input_path)?;

    let plaintext = open(&cipher, &envelope, options.execution)?;
    std::fs::write(output_path, &plaintext)?;
    tracing::info!(output = %output_path.display(), bytes = plaintext.len(), "decrypted");
    Ok(plaintext.len())
}
