use crate::engine::gf::Register;
use crate::error::{RucError, Result};
use crate::params::{ACCUMULATOR_SIZE, KEY_MATERIAL_SIZE, REGISTER_COUNT, REGISTER_SIZE};
use zeroize::Zeroize;

/// Working state of one in-flight block
/// Created from key material, driven through every round, then dropped
#[derive(Clone)]
pub struct CipherState {
    pub(crate) registers: [Register; REGISTER_COUNT],
    pub(crate) accumulator: [u8; ACCUMULATOR_SIZE],
    pub(crate) accumulator_sum: u64,
}

impl CipherState {
    /// Seed the registers from key material, accumulator cleared
    pub fn new(key_material: &[u8]) -> Result<Self> {
        if key_material.len() != KEY_MATERIAL_SIZE {
            return Err(RucError::InvalidKeyMaterialLength(
                key_material.len(),
                KEY_MATERIAL_SIZE,
            ));
        }

        let mut registers = [[0u8; REGISTER_SIZE]; REGISTER_COUNT];
        for (reg, chunk) in registers
            .iter_mut()
            .zip(key_material.chunks_exact(REGISTER_SIZE))
        {
            reg.copy_from_slice(chunk);
        }

        Ok(Self {
            registers,
            accumulator: [0u8; ACCUMULATOR_SIZE],
            accumulator_sum: 0,
        })
    }

    /// All registers concatenated
    pub fn registers(&self) -> Vec<u8> {
        self.registers.concat()
    }

    pub fn register(&self, index: usize) -> &Register {
        &self.registers[index]
    }

    /// The 1024-bit accumulator
    /// Rounds never write it; it enters the keystream as zeros
    pub fn accumulator(&self) -> &[u8; ACCUMULATOR_SIZE] {
        &self.accumulator
    }

    /// Running sum of sbox outputs; diagnostics only, never part of the keystream
    pub fn accumulator_sum(&self) -> u64 {
        self.accumulator_sum
    }
}

impl std::fmt::Debug for CipherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherState")
            .field("registers", &"<redacted>")
            .field("accumulator_sum", &self.accumulator_sum)
            .finish()
    }
}

impl Drop for CipherState {
    fn drop(&mut self) {
        self.registers.zeroize();
        self.accumulator.zeroize();
    }
}
