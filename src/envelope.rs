//! Self-describing file framing used by the `ruc` binary.
//!
//! The engine only XORs block-aligned buffers; an envelope adds what a file
//! needs on top: the IV, the unpadded length, and an HMAC-SHA256 tag.
//!
//! ```text
//! "RUC1" | version: 1 | reserved: 3 | iv: 16 | plaintext_len: 8 (LE) | ciphertext | tag: 32
//! ```

use crate::cipher::Cipher;
use crate::engine::shake256_parts;
use crate::error::{RucError, Result};
use crate::params::{domain, Execution, BLOCK_SIZE, IV_SIZE};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// Envelope format magic
pub const MAGIC: &[u8; 4] = b"RUC1";

/// Current envelope version
pub const VERSION: u8 = 1;

/// Bytes of the HMAC-SHA256 tag
pub const TAG_SIZE: usize = 32;

/// Plaintext header at the front of every envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub version: u8,
    pub iv: [u8; IV_SIZE],
    pub plaintext_len: u64,
}

impl EnvelopeHeader {
    /// Header size: 4 (magic) + 1 (version) + 3 (reserved) + 16 (iv) + 8 (length) = 32 bytes
    pub const SIZE: usize = 32;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version;
        buf[8..24].copy_from_slice(&self.iv);
        buf[24..32].copy_from_slice(&self.plaintext_len.to_le_bytes());
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(RucError::InvalidEnvelope("header too short".into()));
        }
        if &data[0..4] != MAGIC {
            return Err(RucError::InvalidEnvelope("bad magic".into()));
        }
        let version = data[4];
        if version != VERSION {
            return Err(RucError::InvalidEnvelope(format!(
                "unsupported version {}",
                version
            )));
        }

        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&data[8..24]);
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&data[24..32]);

        Ok(Self {
            version,
            iv,
            plaintext_len: u64::from_le_bytes(len_bytes),
        })
    }
}

/// Fresh random IV from the operating system
pub fn generate_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt `plaintext` into a complete envelope
/// The plaintext is zero-padded to the block size before encryption
pub fn seal(
    cipher: &Cipher,
    iv: &[u8; IV_SIZE],
    plaintext: &[u8],
    execution: Execution,
) -> Result<Vec<u8>> {
    let header = EnvelopeHeader {
        version: VERSION,
        iv: *iv,
        plaintext_len: plaintext.len() as u64,
    };

    let mut padded = plaintext.to_vec();
    padded.resize(padded_len(plaintext.len()), 0u8);
    let ciphertext = cipher.apply_with(&padded, iv, 0, execution)?;
    padded.zeroize();

    let mut out = Vec::with_capacity(EnvelopeHeader::SIZE + ciphertext.len() + TAG_SIZE);
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&ciphertext);
    let tag = compute_tag(cipher, &out)?;
    out.extend_from_slice(&tag);

    tracing::debug!(
        plaintext_len = plaintext.len(),
        envelope_len = out.len(),
        "sealed envelope"
    );
    Ok(out)
}

/// Verify and decrypt an envelope
/// Nothing is decrypted unless the tag verifies
pub fn open(cipher: &Cipher, envelope: &[u8], execution: Execution) -> Result<Vec<u8>> {
    let header = EnvelopeHeader::from_bytes(envelope)?;
    if envelope.len() < EnvelopeHeader::SIZE + TAG_SIZE {
        return Err(RucError::InvalidEnvelope("missing tag".into()));
    }

    let body_end = envelope.len() - TAG_SIZE;
    let ciphertext = &envelope[EnvelopeHeader::SIZE..body_end];
    let plaintext_len = usize::try_from(header.plaintext_len)
        .map_err(|_| RucError::InvalidEnvelope("length does not fit in memory".into()))?;
    if ciphertext.len() != padded_len(plaintext_len) {
        return Err(RucError::InvalidEnvelope(format!(
            "ciphertext is {} bytes but header declares {}",
            ciphertext.len(),
            plaintext_len
        )));
    }

    verify_tag(cipher, &envelope[..body_end], &envelope[body_end..])?;

    let mut plaintext = cipher.apply_with(ciphertext, &header.iv, 0, execution)?;
    plaintext.truncate(plaintext_len);
    Ok(plaintext)
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

fn mac_key(cipher: &Cipher) -> Vec<u8> {
    shake256_parts(&[cipher.key(), domain::ENVELOPE_MAC], 32)
}

fn new_mac(cipher: &Cipher) -> Result<HmacSha256> {
    let mut key = mac_key(cipher);
    let mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| RucError::Internal(format!("HMAC key: {}", e)));
    key.zeroize();
    mac
}

fn compute_tag(cipher: &Cipher, data: &[u8]) -> Result<[u8; TAG_SIZE]> {
    let mut mac = new_mac(cipher)?;
    mac.update(data);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Constant-time tag check
fn verify_tag(cipher: &Cipher, data: &[u8], tag: &[u8]) -> Result<()> {
    let mut mac = new_mac(cipher)?;
    mac.update(data);
    mac.verify_slice(tag)
        .map_err(|_| RucError::AuthenticationFailed)
}
