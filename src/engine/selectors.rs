use crate::engine::xof::{shake256_into, shake256_parts};
use crate::params::{domain, SEED_SIZE};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Selectors in the order one block processes them, with their key constants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedSelectors {
    pub selectors: Vec<u16>,
    pub constants: Vec<u8>,
}

/// One constant byte per selector: SHAKE256(selector_le || key)[0]
pub fn key_constants(selectors: &[u16], key: &[u8]) -> Vec<u8> {
    selectors
        .iter()
        .map(|sel| {
            let mut out = [0u8; 1];
            shake256_into(&[&sel.to_le_bytes(), key], &mut out);
            out[0]
        })
        .collect()
}

/// Reorder selectors (and their constants) for one block
/// Priorities come from ChaCha20 seeded with SHAKE256(key || iv || block_be || domain);
/// ties keep the key-schedule order
pub fn order_selectors(
    selectors: &[u16],
    constants: &[u8],
    key: &[u8],
    iv: &[u8],
    block_number: u64,
) -> OrderedSelectors {
    debug_assert_eq!(selectors.len(), constants.len());

    let order = priority_order(selectors.len(), key, iv, block_number);
    OrderedSelectors {
        selectors: order.iter().map(|&i| selectors[i]).collect(),
        constants: order.iter().map(|&i| constants[i]).collect(),
    }
}

/// Permutation of `0..count` sorted by per-block priority
fn priority_order(count: usize, key: &[u8], iv: &[u8], block_number: u64) -> Vec<usize> {
    let block_bytes = block_number.to_be_bytes();
    let seed_bytes = shake256_parts(&[key, iv, &block_bytes, domain::PRIORITY], SEED_SIZE);
    let mut seed = [0u8; SEED_SIZE];
    seed.copy_from_slice(&seed_bytes);

    let mut rng = ChaCha20Rng::from_seed(seed);
    let mut random_bytes = vec![0u8; count * 4];
    rng.fill_bytes(&mut random_bytes);

    let mut priorities: Vec<(u32, usize)> = random_bytes
        .chunks_exact(4)
        .enumerate()
        .map(|(i, b)| (u32::from_le_bytes([b[0], b[1], b[2], b[3]]), i))
        .collect();

    // sort_by_key is stable
    priorities.sort_by_key(|&(priority, _)| priority);
    priorities.into_iter().map(|(_, i)| i).collect()
}
