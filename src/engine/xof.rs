use digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

/// SHAKE256 of `data`, squeezed to exactly `output_length` bytes
pub fn shake256_hash(data: &[u8], output_length: usize) -> Vec<u8> {
    shake256_parts(&[data], output_length)
}

/// SHAKE256 over the concatenation of `parts`
/// Absorbing the parts one by one is equivalent to hashing their concatenation
pub fn shake256_parts(parts: &[&[u8]], output_length: usize) -> Vec<u8> {
    let mut output = vec![0u8; output_length];
    shake256_into(parts, &mut output);
    output
}

/// SHAKE256 over the concatenation of `parts`, filling `output`
pub fn shake256_into(parts: &[&[u8]], output: &mut [u8]) {
    let mut hasher = Shake256::default();
    for part in parts {
        hasher.update(part);
    }
    let mut reader = hasher.finalize_xof();
    reader.read(output);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shake256_empty_known_answer() {
        let out = shake256_hash(b"", 32);
        assert_eq!(
            hex::encode(out),
            "46b9dd2b0ba88d13233b3feb743eeb243fcd52ea62b81b82b50c27646ed5762f"
        );
    }

    #[test]
    fn test_output_length_is_exact() {
        for len in [0, 1, 31, 32, 135, 136, 137, 1000] {
            assert_eq!(shake256_hash(b"abc", len).len(), len);
        }
    }

    #[test]
    fn test_longer_output_extends_shorter() {
        let short = shake256_hash(b"prefix property", 17);
        let long = shake256_hash(b"prefix property", 300);
        assert_eq!(&long[..17], &short[..]);
    }

    #[test]
    fn test_parts_match_concatenation() {
        let joined = shake256_hash(b"helloworld", 64);
        let parts = shake256_parts(&[b"hello", b"", b"world"], 64);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_different_inputs_differ() {
        assert_ne!(shake256_hash(b"a", 32), shake256_hash(b"b", 32));
    }
}
