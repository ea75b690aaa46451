//! Content hash used to detect corrupted or truncated messages.
//!
//! The hash is SHA-256 over the plaintext, taken before any encryption. Only its first
//! [`TruncatedHash::LEN`] bytes are stored in the segment headers and the full hash is never
//! kept, so the collision resistance is that of a 64 bit hash. Good enough to catch
//! flipped bits, not good enough to defend against someone forging messages.

use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TruncatedHash([u8; TruncatedHash::LEN]);

impl TruncatedHash {
    pub const LEN: usize = 8;

    /// hashes the plaintext of a message
    pub fn of(plaintext: &[u8]) -> Self {
        let digest = Sha256::digest(plaintext);
        let mut truncated = [0u8; Self::LEN];
        truncated.copy_from_slice(&digest[..Self::LEN]);

        Self(truncated)
    }

    /// true if `plaintext` hashes to this value
    pub fn verify(&self, plaintext: &[u8]) -> bool {
        Self::of(plaintext) == *self
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl From<[u8; TruncatedHash::LEN]> for TruncatedHash {
    fn from(value: [u8; TruncatedHash::LEN]) -> Self {
        Self(value)
    }
}

impl Display for TruncatedHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}
