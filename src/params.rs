use crate::error::{RucError, Result};
use serde::{Deserialize, Serialize};

/// Bytes per plaintext/ciphertext block
pub const BLOCK_SIZE: usize = 32;

/// Rounds applied to every block
pub const ROUNDS: usize = 24;

/// Number of 512-bit registers in the cipher state
pub const REGISTER_COUNT: usize = 7;

/// Bytes per register (512 bits)
pub const REGISTER_SIZE: usize = 64;

/// Bytes of the wide accumulator (1024 bits)
pub const ACCUMULATOR_SIZE: usize = 128;

/// Entries per substitution box
pub const SBOX_SIZE: usize = 256;

/// Selectors in the key-derived selector vector
pub const SELECTOR_COUNT: usize = 2 * ROUNDS;

/// Bytes of key material seeding the registers
pub const KEY_MATERIAL_SIZE: usize = REGISTER_COUNT * REGISTER_SIZE;

/// Bytes per round key
pub const ROUND_KEY_SIZE: usize = REGISTER_SIZE;

/// Total bytes of the flattened sbox table
pub const SBOXES_SIZE: usize = ROUNDS * SBOX_SIZE;

/// Total bytes of the flattened round key table
pub const ROUND_KEYS_SIZE: usize = ROUNDS * ROUND_KEY_SIZE;

/// Bytes per IV
pub const IV_SIZE: usize = 16;

/// Bytes of seed material for one ChaCha20 generator
pub const SEED_SIZE: usize = 32;

/// Domain separation labels, appended after the data they tag
pub mod domain {
    pub const KEY_MATERIAL: &[u8] = b"RUC-KEY-MATERIAL-V1";
    pub const SBOX: &[u8] = b"RUC-SBOX-V1";
    pub const SELECTORS: &[u8] = b"RUC-SELECTORS-V1";
    pub const ROUND_KEYS: &[u8] = b"RUC-ROUND-KEYS-V1";
    pub const PRIORITY: &[u8] = b"RUC-SELECTOR-PRIORITY-V1";
    pub const KEYSTREAM: &[u8] = b"RUC-KEYSTREAM-V1";
    pub const ENVELOPE_MAC: &[u8] = b"RUC-ENVELOPE-MAC-V1";
}

/// How a batch of blocks is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Execution {
    /// One block after another on the calling thread
    Sequential,
    /// Blocks split across the rayon thread pool
    #[default]
    Parallel,
}

impl std::str::FromStr for Execution {
    type Err = RucError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "parallel" | "par" => Ok(Self::Parallel),
            _ => Err(RucError::UnsupportedOption(format!("execution: {}", s))),
        }
    }
}

/// How a key given on the command line is turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    /// UTF-8 bytes of the argument
    #[default]
    Text,
    /// Hex-encoded bytes
    Hex,
}

impl KeyFormat {
    /// Decode a key argument into raw master key bytes
    pub fn decode(&self, key: &str) -> Result<Vec<u8>> {
        let bytes = match self {
            KeyFormat::Text => key.as_bytes().to_vec(),
            KeyFormat::Hex => hex::decode(key.trim())?,
        };
        if bytes.is_empty() {
            return Err(RucError::EmptyKey);
        }
        Ok(bytes)
    }
}

impl std::str::FromStr for KeyFormat {
    type Err = RucError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "utf8" => Ok(Self::Text),
            "hex" => Ok(Self::Hex),
            _ => Err(RucError::UnsupportedOption(format!("key format: {}", s))),
        }
    }
}
