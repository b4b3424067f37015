use crate::params::REGISTER_SIZE;

/// A 512-bit cipher register
pub type Register = [u8; REGISTER_SIZE];

/// Low byte of the AES reduction polynomial x^8 + x^4 + x^3 + x + 1
const AES_POLY: u8 = 0x1B;

/// Multiply two elements of GF(2^8) modulo the AES polynomial
pub fn gf_mul(a: u8, b: u8) -> u8 {
    let mut result = 0u8;
    let mut a = a;
    let mut b = b;

    for _ in 0..8 {
        if b & 1 != 0 {
            result ^= a;
        }
        let carry = a & 0x80 != 0;
        a <<= 1;
        if carry {
            a ^= AES_POLY;
        }
        b >>= 1;
    }
    result
}

/// Multiply every byte of a register by `multiplier` in GF(2^8)
pub fn gf_scale(reg: &mut Register, multiplier: u8) {
    for byte in reg.iter_mut() {
        *byte = gf_mul(*byte, multiplier);
    }
}

/// Rotate a register left by `n` bits
/// Byte 0 is the most significant byte
pub fn rotate_left(reg: &Register, n: usize) -> Register {
    let n = n % (REGISTER_SIZE * 8);
    let byte_shift = n / 8;
    let bit_shift = n % 8;
    let mut result = [0u8; REGISTER_SIZE];

    for (i, out) in result.iter_mut().enumerate() {
        let src = reg[(i + byte_shift) % REGISTER_SIZE];
        let next = reg[(i + byte_shift + 1) % REGISTER_SIZE];
        let high = if bit_shift > 0 {
            next >> (8 - bit_shift)
        } else {
            0
        };
        *out = (src << bit_shift) | high;
    }
    result
}

/// XOR `other` into `reg`
pub fn xor_into(reg: &mut Register, other: &Register) {
    for (r, o) in reg.iter_mut().zip(other.iter()) {
        *r ^= o;
    }
}

/// First eight bytes of a register as a little-endian u64
pub fn low_word(reg: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&reg[..8]);
    u64::from_le_bytes(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gf_mul_fips197_examples() {
        assert_eq!(gf_mul(0x57, 0x83), 0xC1);
        assert_eq!(gf_mul(0x57, 0x13), 0xFE);
        assert_eq!(gf_mul(0x57, 0x02), 0xAE);
    }

    #[test]
    fn test_gf_mul_identity_and_zero() {
        for x in 0..=255u8 {
            assert_eq!(gf_mul(x, 1), x);
            assert_eq!(gf_mul(1, x), x);
            assert_eq!(gf_mul(x, 0), 0);
        }
    }

    #[test]
    fn test_gf_mul_commutes() {
        for a in (0..=255u8).step_by(7) {
            for b in (0..=255u8).step_by(11) {
                assert_eq!(gf_mul(a, b), gf_mul(b, a));
            }
        }
    }

    #[test]
    fn test_rotate_left_one_bit_wraps_msb() {
        let mut reg = [0u8; REGISTER_SIZE];
        reg[0] = 0x80;
        reg[1] = 0x01;
        let rotated = rotate_left(&reg, 1);
        assert_eq!(rotated[0], 0x00);
        assert_eq!(rotated[1], 0x02);
        assert_eq!(rotated[REGISTER_SIZE - 1], 0x01);
    }

    #[test]
    fn test_rotate_full_circle_is_identity() {
        let reg: Register = core::array::from_fn(|i| (i * 37) as u8);
        assert_eq!(rotate_left(&reg, REGISTER_SIZE * 8), reg);
        assert_eq!(rotate_left(&rotate_left(&reg, 13), 499), reg);
    }

    #[test]
    fn test_low_word_little_endian() {
        let mut reg = [0u8; REGISTER_SIZE];
        reg[0] = 0x01;
        reg[7] = 0x80;
        assert_eq!(low_word(&reg), 0x8000_0000_0000_0001);
    }
}
