//! SHA-256 digests for install records and extension flag fingerprints.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::core::error::BuildError;

/// Hex digest of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| BuildError::io("open for hashing", path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| BuildError::io("read", path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Digest over named lists of command-line values.
///
/// Each list is written as its label, its length, then its items, all
/// NUL-terminated, so moving a flag from one list to another changes the
/// result.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&mut self, s: &str) {
        self.hasher.update(s.as_bytes());
        self.hasher.update([0u8]);
    }

    /// Add one labelled list.
    pub fn field<I, S>(&mut self, label: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<S> = values.into_iter().collect();
        self.write(label);
        self.write(&values.len().to_string());
        for value in &values {
            self.write(value.as_ref());
        }
        self
    }

    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
