use std::path::PathBuf;
use std::string::FromUtf8Error;
use thiserror::Error;

pub use stegano_span_crypt::CryptError;

/// Reasons why a sequence of bytes is not a segment header
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Header must be {expected} bytes long, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Header magic does not match")]
    InvalidMagic,

    #[error("Unsupported header version: {0}")]
    UnsupportedVersion(u8),

    /// `current_offset` must lie inside `total_length`, unless both are zero
    #[error("Segment offset {current_offset} is outside of the message length {total_length}")]
    OffsetOutOfRange {
        total_length: u64,
        current_offset: u64,
    },
}

#[derive(Error, Debug)]
pub enum SteganoError {
    /// Represents an unsupported carrier media. For example, a JPEG that would destroy the hidden bits
    #[error("Media format is not supported")]
    UnsupportedMedia,

    /// Represents an invalid carrier image media. For example, a broken PNG file
    #[error("Image media {path:?} is invalid")]
    InvalidImageMedia {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Represents a failure when encoding an image file.
    #[error("Image encoding error for {path:?}")]
    ImageEncodingError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Only 1 to 4 bits per color channel are supported
    #[error("Unsupported number of bits per channel: {0}, expected 1 to 4")]
    InvalidBitsPerChannel(u8),

    /// The payload does not fit into the free space of the given images
    #[error("Capacity Error: {required} bytes are required, but only {available} bytes are available")]
    Capacity { required: usize, available: usize },

    /// Represents bytes that do not form a valid segment header
    #[error("Invalid segment header")]
    Format(#[from] FormatError),

    /// Represents an error when decrypting the data, most likely a wrong password
    #[error("Decryption error")]
    Decryption(#[source] CryptError),

    /// Represents an error when deriving the key material from a password
    #[error("Key derivation error")]
    KeyDerivation(#[source] CryptError),

    /// The content hash of an assembled message does not match its header
    #[error("Integrity Error: message {message_id:#010x} is corrupted or truncated")]
    Integrity { message_id: u32 },

    /// Represents the error of invalid UTF-8 text data found inside of a text message
    #[error("Invalid text data found inside a message")]
    InvalidTextData(#[from] FromUtf8Error),

    /// Represents an unveil of no secret data. For example when no image contained any secrets
    #[error("No secret data found")]
    NoSecretData,

    /// Represents a failure to read from input.
    #[error("Read error")]
    ReadError { source: std::io::Error },

    /// Represents a failure to write target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("API Error: Missing message")]
    MissingMessage,

    #[error("API Error: Missing images")]
    MissingImages,
}
