use crate::engine::gf::Register;
use crate::engine::keystream::{generate_keystream, xor_keystream};
use crate::engine::round::apply_round;
use crate::engine::schedule::{check_material, SBox};
use crate::engine::selectors::{key_constants, order_selectors};
use crate::engine::state::CipherState;
use crate::error::{RucError, Result};
use crate::params::{Execution, BLOCK_SIZE, IV_SIZE, ROUNDS, ROUND_KEY_SIZE, SBOX_SIZE};
use rayon::prelude::*;

/// Smallest run of blocks handed to one rayon task
const PARALLEL_MIN_BLOCKS: usize = 8;

/// Everything a batch needs besides the data itself
#[derive(Clone, Copy)]
pub struct BatchRequest<'a> {
    pub key: &'a [u8],
    pub iv: &'a [u8],
    pub start_block_number: u64,
    pub key_material: &'a [u8],
    pub selectors: &'a [u16],
    pub sboxes: &'a [u8],
    pub round_keys: &'a [u8],
}

/// Encrypt a block-aligned buffer
#[allow(clippy::too_many_arguments)]
pub fn encrypt_blocks_batch(
    plaintext_blocks: &[u8],
    key: &[u8],
    iv: &[u8],
    start_block_number: u64,
    key_material: &[u8],
    selectors: &[u16],
    sboxes: &[u8],
    round_keys: &[u8],
) -> Result<Vec<u8>> {
    let request = BatchRequest {
        key,
        iv,
        start_block_number,
        key_material,
        selectors,
        sboxes,
        round_keys,
    };
    process_blocks(plaintext_blocks, &request, Execution::default())
}

/// Decrypt a block-aligned buffer (the same XOR as encryption)
#[allow(clippy::too_many_arguments)]
pub fn decrypt_blocks_batch(
    ciphertext_blocks: &[u8],
    key: &[u8],
    iv: &[u8],
    start_block_number: u64,
    key_material: &[u8],
    selectors: &[u16],
    sboxes: &[u8],
    round_keys: &[u8],
) -> Result<Vec<u8>> {
    encrypt_blocks_batch(
        ciphertext_blocks,
        key,
        iv,
        start_block_number,
        key_material,
        selectors,
        sboxes,
        round_keys,
    )
}

/// Validate the request, then XOR every block with its keystream
/// Nothing is computed unless the whole request is well formed
pub fn process_blocks(
    input: &[u8],
    request: &BatchRequest<'_>,
    execution: Execution,
) -> Result<Vec<u8>> {
    let block_count = validate(input.len(), request)?;
    let context = BlockContext::new(request)?;

    tracing::debug!(
        blocks = block_count,
        start = request.start_block_number,
        ?execution,
        "processing batch"
    );

    let mut output = input.to_vec();
    match execution {
        Execution::Sequential => {
            for (i, block) in output.chunks_exact_mut(BLOCK_SIZE).enumerate() {
                context.apply(block, request.start_block_number + i as u64)?;
            }
        }
        Execution::Parallel => {
            output
                .par_chunks_exact_mut(BLOCK_SIZE)
                .enumerate()
                .with_min_len(PARALLEL_MIN_BLOCKS)
                .try_for_each(|(i, block)| {
                    context.apply(block, request.start_block_number + i as u64)
                })?;
        }
    }

    Ok(output)
}

/// Keystream for one absolute block number
pub fn keystream_block(request: &BatchRequest<'_>, block_number: u64) -> Result<[u8; BLOCK_SIZE]> {
    validate(0, request)?;
    BlockContext::new(request)?.keystream(block_number)
}

/// Check every caller error up front; returns the number of blocks
fn validate(input_len: usize, request: &BatchRequest<'_>) -> Result<usize> {
    if request.key.is_empty() {
        return Err(RucError::EmptyKey);
    }
    if request.iv.len() != IV_SIZE {
        return Err(RucError::InvalidIvLength(request.iv.len(), IV_SIZE));
    }
    if input_len % BLOCK_SIZE != 0 {
        return Err(RucError::UnalignedInput(input_len, BLOCK_SIZE));
    }
    check_material(
        request.key_material,
        request.selectors,
        request.sboxes,
        request.round_keys,
    )?;

    let blocks = input_len / BLOCK_SIZE;
    if blocks > 0 {
        request
            .start_block_number
            .checked_add(blocks as u64 - 1)
            .ok_or(RucError::BlockCounterOverflow {
                start: request.start_block_number,
                blocks,
            })?;
    }
    Ok(blocks)
}

/// Per-batch view of the schedule, shared read-only by every block
struct BlockContext<'a> {
    key: &'a [u8],
    iv: &'a [u8],
    key_material: &'a [u8],
    selectors: &'a [u16],
    constants: Vec<u8>,
    sboxes: Vec<&'a SBox>,
    round_keys: Vec<&'a Register>,
}

impl<'a> BlockContext<'a> {
    fn new(request: &BatchRequest<'a>) -> Result<Self> {
        let sboxes = request
            .sboxes
            .chunks_exact(SBOX_SIZE)
            .map(<&SBox>::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| RucError::Internal("sbox table split".into()))?;
        let round_keys = request
            .round_keys
            .chunks_exact(ROUND_KEY_SIZE)
            .map(<&Register>::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| RucError::Internal("round key table split".into()))?;

        debug_assert_eq!(sboxes.len(), ROUNDS);
        debug_assert_eq!(round_keys.len(), ROUNDS);
        if sboxes.len() != ROUNDS || round_keys.len() != ROUNDS {
            return Err(RucError::Internal("round table count".into()));
        }

        Ok(Self {
            key: request.key,
            iv: request.iv,
            key_material: request.key_material,
            selectors: request.selectors,
            constants: key_constants(request.selectors, request.key),
            sboxes,
            round_keys,
        })
    }

    /// Fresh state, all rounds, keystream
    fn keystream(&self, block_number: u64) -> Result<[u8; BLOCK_SIZE]> {
        let mut state = CipherState::new(self.key_material)?;
        let ordered = order_selectors(
            self.selectors,
            &self.constants,
            self.key,
            self.iv,
            block_number,
        );

        for round in 0..ROUNDS {
            apply_round(
                &mut state,
                &ordered.selectors,
                &ordered.constants,
                self.sboxes[round],
                self.round_keys[round],
            );
        }

        tracing::trace!(block_number, acc_sum = state.accumulator_sum(), "block done");
        Ok(generate_keystream(&state, block_number))
    }

    fn apply(&self, block: &mut [u8], block_number: u64) -> Result<()> {
        let keystream = self.keystream(block_number)?;
        xor_keystream(block, &keystream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::schedule::{derive_key_schedule, KeySchedule};

    struct Fixture {
        key: Vec<u8>,
        iv: [u8; IV_SIZE],
        schedule: KeySchedule,
        sboxes: Vec<u8>,
        round_keys: Vec<u8>,
    }

    impl Fixture {
        fn new(key: &[u8]) -> Self {
            let schedule = derive_key_schedule(key).unwrap();
            Self {
                key: key.to_vec(),
                iv: [0u8; IV_SIZE],
                sboxes: schedule.flat_sboxes(),
                round_keys: schedule.flat_round_keys(),
                schedule,
            }
        }

        fn request(&self, start: u64) -> BatchRequest<'_> {
            BatchRequest {
                key: &self.key,
                iv: &self.iv,
                start_block_number: start,
                key_material: self.schedule.key_material(),
                selectors: self.schedule.selectors(),
                sboxes: &self.sboxes,
                round_keys: &self.round_keys,
            }
        }
    }

    #[test]
    fn test_zero_key_zero_block_roundtrip() {
        let fx = Fixture::new(&[0u8; 32]);
        let plaintext = [0u8; BLOCK_SIZE];

        let ciphertext = process_blocks(&plaintext, &fx.request(0), Execution::Sequential).unwrap();
        assert_eq!(ciphertext.len(), BLOCK_SIZE);
        assert!(ciphertext.iter().any(|&b| b != 0));

        let recovered = process_blocks(&ciphertext, &fx.request(0), Execution::Sequential).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_zero_key_zero_block_known_answer() {
        let fx = Fixture::new(&[0u8; 32]);
        for execution in [Execution::Sequential, Execution::Parallel] {
            let ciphertext = process_blocks(&[0u8; BLOCK_SIZE], &fx.request(0), execution).unwrap();
            assert_eq!(
                hex::encode(ciphertext),
                "0cf9ab6d885ec4832797465db5bc13a68dd369830a27a3079097fcc82e711365"
            );
        }
    }

    #[test]
    fn test_ciphertext_of_zero_block_is_keystream() {
        let fx = Fixture::new(b"keystream");
        let ciphertext = process_blocks(&[0u8; BLOCK_SIZE], &fx.request(9), Execution::Sequential).unwrap();
        assert_eq!(ciphertext, keystream_block(&fx.request(0), 9).unwrap().to_vec());
    }

    #[test]
    fn test_batch_equals_single_calls() {
        let fx = Fixture::new(b"batch");
        let plaintext: Vec<u8> = (0..3 * BLOCK_SIZE).map(|i| i as u8).collect();

        let batch = process_blocks(&plaintext, &fx.request(0), Execution::Sequential).unwrap();

        let mut singles = Vec::new();
        for (i, block) in plaintext.chunks(BLOCK_SIZE).enumerate() {
            singles.extend(process_blocks(block, &fx.request(i as u64), Execution::Sequential).unwrap());
        }
        assert_eq!(batch, singles);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let fx = Fixture::new(b"parallel");
        let plaintext: Vec<u8> = (0..40 * BLOCK_SIZE).map(|i| (i * 7) as u8).collect();

        let seq = process_blocks(&plaintext, &fx.request(100), Execution::Sequential).unwrap();
        let par = process_blocks(&plaintext, &fx.request(100), Execution::Parallel).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_empty_input() {
        let fx = Fixture::new(b"empty");
        let out = process_blocks(&[], &fx.request(u64::MAX), Execution::Parallel).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_unaligned_input_rejected() {
        let fx = Fixture::new(b"unaligned");
        let err = process_blocks(&[0u8; BLOCK_SIZE + 1], &fx.request(0), Execution::Sequential);
        assert!(matches!(err, Err(RucError::UnalignedInput(33, BLOCK_SIZE))));
    }

    #[test]
    fn test_counter_overflow_rejected() {
        let fx = Fixture::new(b"overflow");

        // The very last block number is still usable
        assert!(process_blocks(&[0u8; BLOCK_SIZE], &fx.request(u64::MAX), Execution::Sequential).is_ok());

        let err = process_blocks(&[0u8; 2 * BLOCK_SIZE], &fx.request(u64::MAX), Execution::Sequential);
        assert!(matches!(
            err,
            Err(RucError::BlockCounterOverflow { start: u64::MAX, blocks: 2 })
        ));
    }

    #[test]
    fn test_bad_iv_and_key_rejected() {
        let fx = Fixture::new(b"iv");
        let mut request = fx.request(0);
        request.iv = &[0u8; 8];
        assert!(matches!(
            process_blocks(&[0u8; BLOCK_SIZE], &request, Execution::Sequential),
            Err(RucError::InvalidIvLength(8, IV_SIZE))
        ));

        let mut request = fx.request(0);
        request.key = &[];
        assert!(matches!(
            process_blocks(&[0u8; BLOCK_SIZE], &request, Execution::Sequential),
            Err(RucError::EmptyKey)
        ));
    }

    #[test]
    fn test_bad_material_rejected() {
        let fx = Fixture::new(b"material");
        let mut request = fx.request(0);
        request.sboxes = &fx.sboxes[..SBOX_SIZE];
        assert!(matches!(
            process_blocks(&[0u8; BLOCK_SIZE], &request, Execution::Sequential),
            Err(RucError::InvalidSboxesLength(256, _))
        ));
    }

    #[test]
    fn test_flat_api_decrypt_inverts_encrypt() {
        let fx = Fixture::new(b"flat");
        let plaintext = [0x42u8; 4 * BLOCK_SIZE];
        let sched = &fx.schedule;

        let ciphertext = encrypt_blocks_batch(
            &plaintext,
            &fx.key,
            &fx.iv,
            7,
            sched.key_material(),
            sched.selectors(),
            &fx.sboxes,
            &fx.round_keys,
        )
        .unwrap();
        assert_ne!(ciphertext, plaintext.to_vec());

        let recovered = decrypt_blocks_batch(
            &ciphertext,
            &fx.key,
            &fx.iv,
            7,
            sched.key_material(),
            sched.selectors(),
            &fx.sboxes,
            &fx.round_keys,
        )
        .unwrap();
        assert_eq!(recovered, plaintext.to_vec());
    }

    #[test]
    fn test_keystream_differs_between_blocks() {
        let fx = Fixture::new(b"distinct");
        let ciphertext = process_blocks(&[0u8; 4 * BLOCK_SIZE], &fx.request(0), Execution::Parallel).unwrap();
        let blocks: Vec<&[u8]> = ciphertext.chunks(BLOCK_SIZE).collect();
        for i in 0..blocks.len() {
            for j in i + 1..blocks.len() {
                assert_ne!(blocks[i], blocks[j]);
            }
        }
    }
}
