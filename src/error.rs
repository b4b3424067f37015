use thiserror::Error;

#[derive(Error, Debug)]
pub enum RucError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Master key must not be empty")]
    EmptyKey,

    #[error("Invalid IV length: {0}. Must be exactly {1} bytes")]
    InvalidIvLength(usize, usize),

    #[error("Input length {0} is not a multiple of the {1}-byte block size")]
    UnalignedInput(usize, usize),

    #[error("Invalid key material length: {0}. Expected {1} bytes")]
    InvalidKeyMaterialLength(usize, usize),

    #[error("Invalid selector count: {0}. Expected {1} selectors")]
    InvalidSelectorCount(usize, usize),

    #[error("Invalid sbox table length: {0}. Expected {1} bytes")]
    InvalidSboxesLength(usize, usize),

    #[error("Invalid round key length: {0}. Expected {1} bytes")]
    InvalidRoundKeysLength(usize, usize),

    #[error("Round index {0} out of range (0..{1})")]
    InvalidRoundIndex(usize, usize),

    #[error("Block counter overflow: start {start} with {blocks} blocks exceeds u64")]
    BlockCounterOverflow { start: u64, blocks: usize },

    #[error("Unsupported option: {0}")]
    UnsupportedOption(String),

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Envelope authentication failed (wrong key or corrupted data)")]
    AuthenticationFailed,

    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, RucError>;
