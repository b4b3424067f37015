//! RUC - Random Universe Cipher
//!
//! A key-derived, 24-round, block-addressed stream cipher. Every block's
//! keystream is a pure function of (key schedule, IV, block number), so
//! encryption and decryption are the same XOR and any range of blocks can be
//! processed independently, in any order, on any number of threads.
//!
//! This is a bespoke construction with no published analysis. Treat it as
//! obfuscation-grade.
//!
//! ## Data flow
//!
//! ```text
//! key → SHAKE256 → {key material, sboxes, selectors, round keys}
//!     → per block: order selectors (key, iv, block) → 24 rounds → SHAKE256 keystream
//!     → XOR with data
//! ```
//!
//! - **engine::xof**: SHAKE256 extendable output
//! - **engine::schedule**: key schedule derivation and JSON export
//! - **engine::selectors**: per-block selector ordering via ChaCha20
//! - **engine::round**: the round function over seven 512-bit registers
//! - **engine::batch**: validated batch driver, sequential or parallel
//! - **envelope**: file framing with HMAC-SHA256 used by the `ruc` binary
//!
//! ## Example
//!
//! ```
//! use ruc::{Cipher, BLOCK_SIZE, IV_SIZE};
//!
//! let cipher = Cipher::new(b"my secret key").unwrap();
//! let iv = [0u8; IV_SIZE];
//! let plaintext = [7u8; 2 * BLOCK_SIZE];
//!
//! let ciphertext = cipher.encrypt(&plaintext, &iv, 0).unwrap();
//! let recovered = cipher.decrypt(&ciphertext, &iv, 0).unwrap();
//! assert_eq!(recovered, plaintext);
//! ```

pub mod cipher;
pub mod cli;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod params;

pub use cipher::Cipher;
pub use engine::{
    decrypt_blocks_batch, derive_key_schedule, encrypt_blocks_batch, execute_round,
    shake256_hash, BatchRequest, CipherState, KeySchedule,
};
pub use error::{Result, RucError};
pub use params::{Execution, KeyFormat, BLOCK_SIZE, IV_SIZE, ROUNDS};
