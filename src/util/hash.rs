//! Hashing utilities for configuration fingerprints.

use sha2::{Digest, Sha256};

/// Incremental hasher for building fingerprints out of keyed components.
///
/// Every component is NUL-terminated so that `("ab", "c")` and
/// `("a", "bc")` produce different fingerprints.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add a key=value component.
    pub fn update_entry(&mut self, key: &str, value: &str) -> &mut Self {
        self.update_str(key);
        self.update_str(value);
        self
    }

    /// Finalize and return the full fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// Finalize and return the first 8 hex characters.
    ///
    /// Used in directory names where the full digest would be unwieldy.
    pub fn finish_short(self) -> String {
        self.finish()[..8].to_string()
    }
}
