use std::fmt::{self, Debug, Formatter};

use stegano_span_crypt::{decrypt_data, derive_key_iv, encrypt_data, KeyIv};

use crate::error::SteganoError;
use crate::result::Result;

/// Encrypts message bodies before they are hidden, and decrypts them after they were assembled.
pub trait PayloadCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// fails with [`SteganoError::Decryption`] if the ciphertext does not decrypt
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// AES-256-CBC with key and iv derived from a password, see `stegano_span_crypt`.
pub struct PasswordCipher {
    key_iv: KeyIv,
}

impl PasswordCipher {
    /// derives the key material right away, which is deliberately slow
    pub fn new(password: &str) -> Result<Self> {
        let key_iv = derive_key_iv(password).map_err(SteganoError::KeyDerivation)?;

        Ok(Self { key_iv })
    }
}

impl Debug for PasswordCipher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCipher").finish_non_exhaustive()
    }
}

impl PayloadCipher for PasswordCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        Ok(encrypt_data(&self.key_iv, plaintext))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        decrypt_data(&self.key_iv, ciphertext).map_err(SteganoError::Decryption)
    }
}
