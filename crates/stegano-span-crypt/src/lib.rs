//! # Password based payload encryption
//!
//! Key and IV are both derived from the password with argon2id over a salt that is fixed
//! for every build, the payload is then encrypted with AES-256 in CBC mode with PKCS#7 padding.
//!
//! ## Known weakness
//!
//! Because the salt is fixed and the IV is derived from the password, the same password
//! always yields the same key material, and the same plaintext always yields the same
//! ciphertext. This is a convenience layer, not a security boundary. Changing it would change
//! the on-image format, so it stays as is.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use argon2::{Argon2, ParamsBuilder};
use std::fmt::{self, Debug, Formatter};
use zeroize::Zeroize;

pub mod error;

pub use crate::error::CryptError;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

const KEY_SALT: &[u8] = b"steganography_salt";
const IV_SALT: &[u8] = b"steganography_saltiv";

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub type Result<T> = std::result::Result<T, CryptError>;

/// Key material derived from a password, wiped on drop
#[derive(Clone, PartialEq, Eq)]
pub struct KeyIv {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl Debug for KeyIv {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyIv")
            .field("key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}

impl Drop for KeyIv {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

/// derives key and iv independently from the password, same password gives the same result
pub fn derive_key_iv(password: &str) -> Result<KeyIv> {
    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];

    argon(KEY_LEN)?
        .hash_password_into(password.as_bytes(), KEY_SALT, &mut key)
        .map_err(CryptError::KeyDerivationError)?;
    argon(IV_LEN)?
        .hash_password_into(password.as_bytes(), IV_SALT, &mut iv)
        .map_err(CryptError::KeyDerivationError)?;

    Ok(KeyIv { key, iv })
}

/// encrypt data with AES-256-CBC, the output is padded to the next full block
pub fn encrypt_data(key_iv: &KeyIv, data: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(&key_iv.key.into(), &key_iv.iv.into()).encrypt_padded_vec_mut::<Pkcs7>(data)
}

/// decrypt data with AES-256-CBC, fails if the padding is malformed
pub fn decrypt_data(key_iv: &KeyIv, data: &[u8]) -> Result<Vec<u8>> {
    Aes256CbcDec::new(&key_iv.key.into(), &key_iv.iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(CryptError::DecryptionError)
}

fn argon<'key>(output_len: usize) -> Result<Argon2<'key>> {
    let params = ParamsBuilder::default()
        .output_len(output_len)
        .build()
        .map_err(CryptError::KeyDerivationParamError)?;

    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}
