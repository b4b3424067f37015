use crate::engine::state::CipherState;
use crate::engine::xof::shake256_into;
use crate::params::{domain, BLOCK_SIZE, REGISTER_COUNT};

/// Squeeze one keystream block out of a finished state
/// SHAKE256(R0 || .. || R6 || accumulator || block_be || "RUC-KEYSTREAM-V1")
pub fn generate_keystream(state: &CipherState, block_number: u64) -> [u8; BLOCK_SIZE] {
    let block_bytes = block_number.to_be_bytes();

    let mut parts: Vec<&[u8]> = Vec::with_capacity(REGISTER_COUNT + 3);
    for reg in &state.registers {
        parts.push(reg);
    }
    parts.push(&state.accumulator);
    parts.push(&block_bytes);
    parts.push(domain::KEYSTREAM);

    let mut keystream = [0u8; BLOCK_SIZE];
    shake256_into(&parts, &mut keystream);
    keystream
}

/// XOR a keystream block into `data`
pub fn xor_keystream(data: &mut [u8], keystream: &[u8; BLOCK_SIZE]) {
    for (d, k) in data.iter_mut().zip(keystream.iter()) {
        *d ^= k;
    }
}
