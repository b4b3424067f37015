use crate::engine::{keystream_block, process_blocks, BatchRequest, KeySchedule};
use crate::error::{RucError, Result};
use crate::params::{Execution, BLOCK_SIZE};
use zeroize::Zeroize;

/// A master key together with its derived schedule
/// Derive once, then encrypt or decrypt any number of batches
#[derive(Clone)]
pub struct Cipher {
    key: Vec<u8>,
    schedule: KeySchedule,
    sboxes: Vec<u8>,
    round_keys: Vec<u8>,
}

impl Cipher {
    /// Derive the key schedule for `key`
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(RucError::EmptyKey);
        }
        let schedule = KeySchedule::derive(key)?;
        Ok(Self::with_schedule(key, schedule))
    }

    /// Use an already derived (or imported) schedule
    pub fn with_schedule(key: &[u8], schedule: KeySchedule) -> Self {
        Self {
            key: key.to_vec(),
            sboxes: schedule.flat_sboxes(),
            round_keys: schedule.flat_round_keys(),
            schedule,
        }
    }

    pub fn schedule(&self) -> &KeySchedule {
        &self.schedule
    }

    pub(crate) fn key(&self) -> &[u8] {
        &self.key
    }

    /// Batch request over this cipher's material
    pub fn request<'a>(&'a self, iv: &'a [u8], start_block_number: u64) -> BatchRequest<'a> {
        BatchRequest {
            key: &self.key,
            iv,
            start_block_number,
            key_material: self.schedule.key_material(),
            selectors: self.schedule.selectors(),
            sboxes: &self.sboxes,
            round_keys: &self.round_keys,
        }
    }

    /// XOR `data` with the keystream starting at `start_block_number`
    pub fn apply_with(
        &self,
        data: &[u8],
        iv: &[u8],
        start_block_number: u64,
        execution: Execution,
    ) -> Result<Vec<u8>> {
        process_blocks(data, &self.request(iv, start_block_number), execution)
    }

    pub fn encrypt(&self, plaintext: &[u8], iv: &[u8], start_block_number: u64) -> Result<Vec<u8>> {
        self.apply_with(plaintext, iv, start_block_number, Execution::default())
    }

    pub fn decrypt(&self, ciphertext: &[u8], iv: &[u8], start_block_number: u64) -> Result<Vec<u8>> {
        self.apply_with(ciphertext, iv, start_block_number, Execution::default())
    }

    /// Keystream of a single block
    pub fn keystream(&self, iv: &[u8], block_number: u64) -> Result<[u8; BLOCK_SIZE]> {
        keystream_block(&self.request(iv, block_number), block_number)
    }
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher")
            .field("key", &"<redacted>")
            .field("schedule", &self.schedule)
            .finish()
    }
}

impl Drop for Cipher {
    fn drop(&mut self) {
        self.key.zeroize();
        self.sboxes.zeroize();
        self.round_keys.zeroize();
    }
}
