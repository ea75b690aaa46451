pub use aes::cipher::block_padding::UnpadError;
pub use argon2::Error as Argon2Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptError {
    #[error("Key derivation error")]
    KeyDerivationError(Argon2Error),

    #[error("Key derivation parameter error")]
    KeyDerivationParamError(Argon2Error),

    /// Padding did not survive decryption, usually a wrong password or a broken ciphertext
    #[error("Decryption error: malformed padding")]
    DecryptionError(UnpadError),
}
