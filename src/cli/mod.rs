pub mod decrypt;
pub mod encrypt;
pub mod hash;
pub mod info;
pub mod schedule;

pub use decrypt::*;
pub use encrypt::*;
pub use hash::*;
pub use info::*;
pub use schedule::*;

use crate::cipher::Cipher;
use crate::engine::KeySchedule;
use crate::error::Result;
use crate::params::KeyFormat;
use std::path::Path;

/// Build a cipher from a command-line key, reusing an exported schedule when given
pub(crate) fn load_cipher(key: &str, format: KeyFormat, schedule: Option<&Path>) -> Result<Cipher> {
    let key_bytes = format.decode(key)?;
    match schedule {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let schedule = KeySchedule::from_json(&json)?;
            tracing::debug!(path = %path.display(), "loaded key schedule");
            Ok(Cipher::with_schedule(&key_bytes, schedule))
        }
        None => Cipher::new(&key_bytes),
    }
}
