//! # Stegano Span Core API
//!
//! Hides one message spread over many PNG images, in the low bits of their color channels.
//! Every image carries one or more self describing segments, so images can be revealed in
//! any order, and more messages can be appended to images that already carry some.
//!
//! The main building blocks are
//! - [`SpanEncoder`][enc] for splitting a message over a list of images
//! - [`SpanDecoder`][dec] for collecting and reassembling all messages of a list of images
//! - [`batch_capacity`][cap] for the free space left in a list of images
//!
//! # Usage Examples
//!
//! ## Hide and reveal a message in memory
//!
//! ```rust
//! use image::{ImageBuffer, Rgb, RgbImage};
//! use stegano_span_core::SpanOptions;
//!
//! let carrier = || -> RgbImage { ImageBuffer::from_fn(32, 32, |x, y| Rgb([x as u8, y as u8, 7])) };
//! let mut images = vec![carrier(), carrier()];
//! let options = SpanOptions::default();
//!
//! stegano_span_core::hide("Hello, World!", &mut images, Some("SuperSecret42"), &options)
//!     .expect("Failed to hide message in images");
//!
//! let messages = stegano_span_core::reveal(&images, Some("SuperSecret42"), &options)
//!     .expect("Failed to reveal messages");
//! assert_eq!(messages[0].text().unwrap(), "Hello, World!");
//! ```
//!
//! ## Work with files
//!
//! See the builders in [`api`], they open, lock and save PNG files.
//!
//! [enc]: ./encoder/struct.SpanEncoder.html
//! [dec]: ./decoder/struct.SpanDecoder.html
//! [cap]: ./scanner/fn.batch_capacity.html

#![warn(
    // clippy::unwrap_used,
    // clippy::expect_used,
    clippy::redundant_else,
)]

pub mod api;
pub mod bit_plane;
pub mod cipher;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod integrity;
pub mod locks;
pub mod media;
pub mod options;
pub mod result;
pub mod scanner;

use std::path::Path;

pub use crate::cipher::{PasswordCipher, PayloadCipher};
pub use crate::decoder::{RevealReport, RevealedMessage, SpanDecoder};
pub use crate::encoder::{HiddenMessage, SpanEncoder};
pub use crate::error::{FormatError, SteganoError};
pub use crate::header::{SegmentHeader, HEADER_SIZE};
pub use crate::integrity::TruncatedHash;
pub use crate::locks::ImageLocks;
pub use crate::media::{ImageFile, RasterImage};
pub use crate::options::{BitsPerChannel, Placement, SpanOptions};
pub use crate::result::Result;
pub use crate::scanner::{batch_capacity, BatchCapacity, CapacityReport};

pub trait Persist {
    fn save_as(&mut self, _: &Path) -> Result<()>;
}

/// Hides `message` spread over `images`, encrypted if a password is given.
pub fn hide<I: RasterImage>(
    message: impl AsRef<[u8]>,
    images: &mut [I],
    password: Option<&str>,
    options: &SpanOptions,
) -> Result<HiddenMessage> {
    let cipher = password.map(PasswordCipher::new).transpose()?;

    SpanEncoder::new(options.clone())
        .use_cipher(cipher.as_ref().map(|c| c as &dyn PayloadCipher))
        .hide(message.as_ref(), images)
}

/// All messages of `images` that reassemble and verify, see [`reveal_report`] for the
/// messages that were dropped.
pub fn reveal<I: RasterImage>(
    images: &[I],
    password: Option<&str>,
    options: &SpanOptions,
) -> Result<Vec<RevealedMessage>> {
    Ok(reveal_report(images, password, options)?.into_messages())
}

pub fn reveal_report<I: RasterImage>(
    images: &[I],
    password: Option<&str>,
    options: &SpanOptions,
) -> Result<RevealReport> {
    let cipher = password.map(PasswordCipher::new).transpose()?;

    Ok(SpanDecoder::new(options.clone())
        .use_cipher(cipher.as_ref().map(|c| c as &dyn PayloadCipher))
        .reveal(images))
}

pub fn capacity<I: RasterImage>(images: &[I], options: &SpanOptions) -> BatchCapacity {
    batch_capacity(images, options)
}
