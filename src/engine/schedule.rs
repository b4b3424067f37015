//! Key schedule derivation.
//!
//! Every piece of key-dependent material is squeezed from SHAKE256 over the
//! master key followed by a domain label:
//!
//! ```text
//! key material  = SHAKE256(key || "RUC-KEY-MATERIAL-V1", 448)
//! sbox seeds    = SHAKE256(key || "RUC-SBOX-V1", 24 * 32)      -> ChaCha20 shuffle of 0..=255
//! selectors     = SHAKE256(key || "RUC-SELECTORS-V1", 48 * 2)  -> little-endian u16
//! round keys    = SHAKE256(key || "RUC-ROUND-KEYS-V1", 24 * 64)
//! ```

use crate::engine::gf::Register;
use crate::engine::xof::shake256_parts;
use crate::error::{RucError, Result};
use crate::params::{
    domain, KEY_MATERIAL_SIZE, ROUNDS, ROUND_KEYS_SIZE, ROUND_KEY_SIZE, SBOXES_SIZE, SBOX_SIZE,
    SEED_SIZE, SELECTOR_COUNT,
};
use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// A substitution table for one round
pub type SBox = [u8; SBOX_SIZE];

/// Material derived once per master key, immutable afterwards
#[derive(Clone, PartialEq, Eq)]
pub struct KeySchedule {
    key_material: Vec<u8>,
    sboxes: Vec<SBox>,
    selectors: Vec<u16>,
    round_keys: Vec<Register>,
}

/// Derive the full key schedule from a master key
pub fn derive_key_schedule(master_key: &[u8]) -> Result<KeySchedule> {
    KeySchedule::derive(master_key)
}

impl KeySchedule {
    /// Derive the full key schedule from a master key
    pub fn derive(master_key: &[u8]) -> Result<Self> {
        if master_key.is_empty() {
            return Err(RucError::EmptyKey);
        }

        let key_material = shake256_parts(&[master_key, domain::KEY_MATERIAL], KEY_MATERIAL_SIZE);
        ensure_len("key material", key_material.len(), KEY_MATERIAL_SIZE)?;

        let mut seeds = shake256_parts(&[master_key, domain::SBOX], ROUNDS * SEED_SIZE);
        ensure_len("sbox seeds", seeds.len(), ROUNDS * SEED_SIZE)?;
        let sboxes = seeds.chunks_exact(SEED_SIZE).map(shuffled_sbox).collect();
        seeds.zeroize();

        let selector_bytes = shake256_parts(&[master_key, domain::SELECTORS], SELECTOR_COUNT * 2);
        ensure_len("selectors", selector_bytes.len(), SELECTOR_COUNT * 2)?;
        let selectors = selector_bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        let mut round_key_bytes = shake256_parts(&[master_key, domain::ROUND_KEYS], ROUND_KEYS_SIZE);
        ensure_len("round keys", round_key_bytes.len(), ROUND_KEYS_SIZE)?;
        let round_keys = split_round_keys(&round_key_bytes);
        round_key_bytes.zeroize();

        tracing::debug!(key_len = master_key.len(), "derived key schedule");

        Ok(Self {
            key_material,
            sboxes,
            selectors,
            round_keys,
        })
    }

    /// Rebuild a schedule from flat buffers, checking every length
    pub fn from_parts(
        key_material: &[u8],
        selectors: &[u16],
        sboxes: &[u8],
        round_keys: &[u8],
    ) -> Result<Self> {
        check_material(key_material, selectors, sboxes, round_keys)?;

        let sboxes = sboxes
            .chunks_exact(SBOX_SIZE)
            .map(|chunk| {
                let mut sbox = [0u8; SBOX_SIZE];
                sbox.copy_from_slice(chunk);
                sbox
            })
            .collect();

        Ok(Self {
            key_material: key_material.to_vec(),
            sboxes,
            selectors: selectors.to_vec(),
            round_keys: split_round_keys(round_keys),
        })
    }

    pub fn key_material(&self) -> &[u8] {
        &self.key_material
    }

    pub fn selectors(&self) -> &[u16] {
        &self.selectors
    }

    pub fn sbox(&self, round: usize) -> &SBox {
        &self.sboxes[round]
    }

    pub fn round_key(&self, round: usize) -> &Register {
        &self.round_keys[round]
    }

    /// All sboxes concatenated in round order
    pub fn flat_sboxes(&self) -> Vec<u8> {
        self.sboxes.concat()
    }

    /// All round keys concatenated in round order
    pub fn flat_round_keys(&self) -> Vec<u8> {
        self.round_keys.concat()
    }

    /// Serialize to pretty JSON with hex-encoded tables
    pub fn to_json(&self) -> Result<String> {
        let export = ScheduleExport {
            version: ScheduleExport::VERSION,
            key_material: hex::encode(&self.key_material),
            selectors: self.selectors.clone(),
            sboxes: self.sboxes.iter().map(hex::encode).collect(),
            round_keys: self.round_keys.iter().map(hex::encode).collect(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Parse a schedule previously written by [`KeySchedule::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        let export: ScheduleExport = serde_json::from_str(json)?;
        if export.version != ScheduleExport::VERSION {
            return Err(RucError::UnsupportedOption(format!(
                "schedule version: {}",
                export.version
            )));
        }

        let key_material = hex::decode(&export.key_material)?;
        let sboxes = decode_concat(&export.sboxes)?;
        let round_keys = decode_concat(&export.round_keys)?;
        Self::from_parts(&key_material, &export.selectors, &sboxes, &round_keys)
    }
}

impl std::fmt::Debug for KeySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySchedule")
            .field("key_material", &"<redacted>")
            .field("sboxes", &self.sboxes.len())
            .field("selectors", &self.selectors.len())
            .field("round_keys", &self.round_keys.len())
            .finish()
    }
}

impl Drop for KeySchedule {
    fn drop(&mut self) {
        self.key_material.zeroize();
        self.sboxes.zeroize();
        self.selectors.zeroize();
        self.round_keys.zeroize();
    }
}

/// JSON form of a key schedule
#[derive(Debug, Serialize, Deserialize)]
struct ScheduleExport {
    version: u8,
    key_material: String,
    selectors: Vec<u16>,
    sboxes: Vec<String>,
    round_keys: Vec<String>,
}

impl ScheduleExport {
    const VERSION: u8 = 1;
}

/// Validate the lengths of caller-supplied schedule buffers
pub(crate) fn check_material(
    key_material: &[u8],
    selectors: &[u16],
    sboxes: &[u8],
    round_keys: &[u8],
) -> Result<()> {
    if key_material.len() != KEY_MATERIAL_SIZE {
        return Err(RucError::InvalidKeyMaterialLength(
            key_material.len(),
            KEY_MATERIAL_SIZE,
        ));
    }
    if selectors.len() != SELECTOR_COUNT {
        return Err(RucError::InvalidSelectorCount(selectors.len(), SELECTOR_COUNT));
    }
    if sboxes.len() != SBOXES_SIZE {
        return Err(RucError::InvalidSboxesLength(sboxes.len(), SBOXES_SIZE));
    }
    if round_keys.len() != ROUND_KEYS_SIZE {
        return Err(RucError::InvalidRoundKeysLength(round_keys.len(), ROUND_KEYS_SIZE));
    }
    Ok(())
}

/// Identity permutation shuffled by a ChaCha20 stream seeded from `seed`
fn shuffled_sbox(seed: &[u8]) -> SBox {
    let mut seed_array = [0u8; SEED_SIZE];
    seed_array.copy_from_slice(seed);
    let mut rng = ChaCha20Rng::from_seed(seed_array);
    seed_array.zeroize();

    let mut sbox: SBox = core::array::from_fn(|i| i as u8);
    sbox.shuffle(&mut rng);
    sbox
}

fn split_round_keys(bytes: &[u8]) -> Vec<Register> {
    bytes
        .chunks_exact(ROUND_KEY_SIZE)
        .map(|chunk| {
            let mut key = [0u8; ROUND_KEY_SIZE];
            key.copy_from_slice(chunk);
            key
        })
        .collect()
}

fn decode_concat(parts: &[String]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(&hex::decode(part)?);
    }
    Ok(out)
}

/// Derived material of the wrong size means the schedule itself is broken
fn ensure_len(what: &str, actual: usize, expected: usize) -> Result<()> {
    debug_assert_eq!(actual, expected, "{} length", what);
    if actual != expected {
        return Err(RucError::Internal(format!(
            "{} is {} bytes, expected {}",
            what, actual, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = derive_key_schedule(b"correct horse battery staple").unwrap();
        let b = derive_key_schedule(b"correct horse battery staple").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_derived_sizes() {
        let ks = derive_key_schedule(&[0u8; 32]).unwrap();
        assert_eq!(ks.key_material().len(), KEY_MATERIAL_SIZE);
        assert_eq!(ks.selectors().len(), SELECTOR_COUNT);
        assert_eq!(ks.flat_sboxes().len(), SBOXES_SIZE);
        assert_eq!(ks.flat_round_keys().len(), ROUND_KEYS_SIZE);
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(derive_key_schedule(b""), Err(RucError::EmptyKey)));
    }

    #[test]
    fn test_sboxes_are_permutations() {
        let ks = derive_key_schedule(b"permutation check").unwrap();
        for round in 0..ROUNDS {
            let mut seen = [false; SBOX_SIZE];
            for &v in ks.sbox(round).iter() {
                assert!(!seen[v as usize], "round {} repeats {}", round, v);
                seen[v as usize] = true;
            }
        }
    }

    #[test]
    fn test_sboxes_differ_per_round() {
        let ks = derive_key_schedule(b"round variety").unwrap();
        assert_ne!(ks.sbox(0), ks.sbox(1));
        assert_ne!(ks.round_key(0), ks.round_key(1));
    }

    #[test]
    fn test_different_keys_differ() {
        let a = derive_key_schedule(b"key-a").unwrap();
        let b = derive_key_schedule(b"key-b").unwrap();
        assert_ne!(a.key_material(), b.key_material());
        assert_ne!(a.selectors(), b.selectors());
    }

    #[test]
    fn test_key_material_matches_shake() {
        let ks = derive_key_schedule(b"k").unwrap();
        let expected = crate::engine::xof::shake256_hash(b"kRUC-KEY-MATERIAL-V1", KEY_MATERIAL_SIZE);
        assert_eq!(ks.key_material(), &expected[..]);
    }

    #[test]
    fn test_from_parts_roundtrip() {
        let ks = derive_key_schedule(b"parts").unwrap();
        let rebuilt = KeySchedule::from_parts(
            ks.key_material(),
            ks.selectors(),
            &ks.flat_sboxes(),
            &ks.flat_round_keys(),
        )
        .unwrap();
        assert_eq!(ks, rebuilt);
    }

    #[test]
    fn test_from_parts_rejects_bad_lengths() {
        let ks = derive_key_schedule(b"parts").unwrap();
        let sboxes = ks.flat_sboxes();
        let round_keys = ks.flat_round_keys();

        let err = KeySchedule::from_parts(&[0u8; 10], ks.selectors(), &sboxes, &round_keys);
        assert!(matches!(err, Err(RucError::InvalidKeyMaterialLength(10, _))));

        let err = KeySchedule::from_parts(ks.key_material(), &[1, 2], &sboxes, &round_keys);
        assert!(matches!(err, Err(RucError::InvalidSelectorCount(2, _))));

        let err = KeySchedule::from_parts(ks.key_material(), ks.selectors(), &sboxes[1..], &round_keys);
        assert!(matches!(err, Err(RucError::InvalidSboxesLength(_, _))));

        let err = KeySchedule::from_parts(ks.key_material(), ks.selectors(), &sboxes, &[]);
        assert!(matches!(err, Err(RucError::InvalidRoundKeysLength(0, _))));
    }

    #[test]
    fn test_json_roundtrip() {
        let ks = derive_key_schedule(b"json").unwrap();
        let json = ks.to_json().unwrap();
        assert!(json.contains("\"version\": 1"));
        assert_eq!(KeySchedule::from_json(&json).unwrap(), ks);
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let ks = derive_key_schedule(b"secret").unwrap();
        let printed = format!("{:?}", ks);
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains(&hex::encode(&ks.key_material()[..8])));
    }
}
