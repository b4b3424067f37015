use crate::cli::load_cipher;
use crate::envelope::{generate_iv, seal};
use crate::error::Result;
use crate::params::{Execution, KeyFormat};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options for the encrypt command
#[derive(Debug, Clone, Default)]
pub struct EncryptOptions {
    pub key: String,
    pub key_format: KeyFormat,
    pub execution: Execution,
    /// Previously exported schedule; skips derivation
    pub schedule: Option<PathBuf>,
}

/// Encrypt a file into an envelope
/// Returns the number of envelope bytes written
pub fn encrypt_file(input_path: &Path, output_path: &Path, options: &EncryptOptions) -> Result<usize> {
    let cipher = load_cipher(&options.key, options.key_format, options.schedule.as_deref())?;
    let plaintext = std::fs::read(input_path)?;

    let started = Instant::now();
    let iv = generate_iv();
    let envelope = seal(&cipher, &iv, &plaintext, options.execution)?;
    tracing::info!(
        input = %input_path.display(),
        bytes = plaintext.len(),
        elapsed = ?started.elapsed(),
        "encrypted"
    );

    std::fs::write(output_path, &envelope)?;
    Ok(envelope.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{EnvelopeHeader, TAG_SIZE};
    use tempfile::tempdir;

    #[test]
    fn test_encrypt_file_writes_envelope() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plain.txt");
        let output = dir.path().join("plain.ruc");
        std::fs::write(&input, b"forty-one bytes of very secret plaintext!").unwrap();

        let opts = EncryptOptions {
            key: "passphrase".into(),
            ..Default::default()
        };
        let written = encrypt_file(&input, &output, &opts).unwrap();

        assert_eq!(written, EnvelopeHeader::SIZE + 64 + TAG_SIZE);
        assert_eq!(std::fs::read(&output).unwrap().len(), written);
    }

    #[test]
    fn test_encrypt_missing_input_fails() {
        let dir = tempdir().unwrap();
        let opts = EncryptOptions {
            key: "k".into(),
            ..Default::default()
        };
        let result = encrypt_file(&dir.path().join("nope"), &dir.path().join("out"), &opts);
        assert!(result.is_err());
    }
}
