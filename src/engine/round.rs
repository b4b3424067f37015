use crate::engine::gf::{gf_mul, gf_scale, low_word, rotate_left, xor_into, Register};
use crate::engine::schedule::SBox;
use crate::engine::state::CipherState;
use crate::error::{RucError, Result};
use crate::params::{REGISTER_COUNT, REGISTER_SIZE, ROUNDS, ROUND_KEY_SIZE, SBOX_SIZE};

/// Run one round over `state` with checked inputs
///
/// `selectors` must already be in the block's processing order, and
/// `key_constants[i]` belongs to `selectors[i]`. A missing constant counts as zero.
pub fn execute_round(
    state: &mut CipherState,
    round_index: usize,
    selectors: &[u16],
    sbox: &[u8],
    round_key: &[u8],
    key_constants: &[u8],
) -> Result<()> {
    if round_index >= ROUNDS {
        return Err(RucError::InvalidRoundIndex(round_index, ROUNDS));
    }
    let sbox = <&SBox>::try_from(sbox)
        .map_err(|_| RucError::InvalidSboxesLength(sbox.len(), SBOX_SIZE))?;
    let round_key = <&Register>::try_from(round_key)
        .map_err(|_| RucError::InvalidRoundKeysLength(round_key.len(), ROUND_KEY_SIZE))?;

    apply_round(state, selectors, key_constants, sbox, round_key);
    Ok(())
}

/// The round transformation itself
pub(crate) fn apply_round(
    state: &mut CipherState,
    selectors: &[u16],
    key_constants: &[u8],
    sbox: &SBox,
    round_key: &Register,
) {
    let round_key_word = low_word(round_key);

    for (idx, &sel) in selectors.iter().enumerate() {
        // Destination register from R0, the selector and the round key
        let dest = (low_word(&state.registers[0]) ^ u64::from(sel) ^ round_key_word) & 0xFFFF_FFFF;
        let place = (dest % REGISTER_COUNT as u64) as usize;

        let temp = sel.wrapping_mul(2);
        let mut mixed = gf_mul(temp as u8, state.registers[place][0]);
        if let Some(constant) = key_constants.get(idx) {
            mixed ^= constant;
        }
        let result = sbox[mixed as usize];

        let reg = &mut state.registers[place];
        gf_scale(reg, result);

        let shift = sel % 16;
        if shift < 8 {
            reg[0] ^= result << shift;
        }

        let low = reg[REGISTER_SIZE - 1];
        reg[REGISTER_SIZE - 1] ^= sbox[low as usize];

        *reg = rotate_left(reg, 1);

        let neighbour = state.registers[(place + 1) % REGISTER_COUNT];
        xor_into(&mut state.registers[place], &neighbour);

        state.accumulator_sum = state.accumulator_sum.wrapping_add(u64::from(result));
    }

    // Inter-round mixing
    for i in 0..REGISTER_COUNT {
        let next = state.registers[(i + 1) % REGISTER_COUNT];
        let after = state.registers[(i + 2) % REGISTER_COUNT];
        xor_into(&mut state.registers[i], &next);
        xor_into(&mut state.registers[i], &after);
    }
}
