use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;

use crate::cipher::PayloadCipher;
use crate::decoder::{RevealedMessage, SpanDecoder};
use crate::error::SteganoError;
use crate::locks::ImageLocks;
use crate::media::ImageFile;
use crate::options::SpanOptions;
use crate::result::Result;

use super::shared::{cipher_for, with_read_locks, ImageSelection, Password};

pub fn prepare() -> UnveilApi {
    UnveilApi::default()
}

#[derive(Default, Debug)]
pub struct UnveilApi {
    images: ImageSelection,
    output_folder: Option<PathBuf>,
    password: Password,
    options: SpanOptions,
    locks: Option<Arc<ImageLocks>>,
}

impl UnveilApi {
    /// Use the given span options, `bits_per_channel` must match the one used for hiding
    pub fn with_options(mut self, options: SpanOptions) -> Self {
        self.options = options;
        self
    }

    /// One of the images that carry segments, the order of the images does not matter
    pub fn from_secret_file(mut self, secret_image: impl AsRef<Path>) -> Self {
        self.images.add(secret_image);
        self
    }

    pub fn from_secret_files<P: AsRef<Path>>(mut self, secret_images: &[P]) -> Self {
        for image in secret_images {
            self.images.add(image);
        }
        self
    }

    pub fn from_image_folder(mut self, folder: impl AsRef<Path>) -> Self {
        self.images.set_folder(folder);
        self
    }

    /// Every revealed message is written as a file into this folder
    pub fn into_output_folder(mut self, output_folder: impl AsRef<Path>) -> Self {
        self.output_folder = Some(output_folder.as_ref().to_path_buf());
        self
    }

    /// Set the password used for decrypting all messages
    /// If `None` is passed, no password will be used, leads to no decryption used
    pub fn using_password<P: Into<Password>>(mut self, password: P) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_locks(mut self, locks: Arc<ImageLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Execute the unveil process and blocks until it is finished.
    ///
    /// Fails with [`SteganoError::NoSecretData`] if not a single message was revealed, or
    /// with the reason the first complete message was dropped for.
    pub fn execute(self) -> Result<Vec<RevealedMessage>> {
        let paths = self.images.resolve()?;
        let cipher = cipher_for(&self.password)?;
        let options = self.options;

        let report = with_read_locks(self.locks.as_ref(), &paths, || {
            let images = paths
                .iter()
                .map(ImageFile::open)
                .collect::<Result<Vec<_>>>()?;

            Ok(SpanDecoder::new(options)
                .use_cipher(cipher.as_ref().map(|c| c as &dyn PayloadCipher))
                .reveal(&images))
        })?;

        if report.messages.is_empty() {
            return Err(report
                .failures
                .into_iter()
                .next()
                .map(|failure| failure.error)
                .unwrap_or(SteganoError::NoSecretData));
        }

        if let Some(output_folder) = &self.output_folder {
            for message in &report.messages {
                write_message(output_folder, message)?;
            }
        }

        Ok(report.messages)
    }
}

/// text messages end up as `.txt`, anything else as `.bin`
fn write_message(output_folder: &Path, message: &RevealedMessage) -> Result<PathBuf> {
    let extension = match std::str::from_utf8(&message.content) {
        Ok(_) => "txt",
        Err(_) => "bin",
    };
    let target = output_folder.join(format!(
        "secret-message-{:08x}.{extension}",
        message.message_id
    ));

    let mut file = File::create(&target).map_err(|source| SteganoError::WriteError { source })?;
    file.write_all(&message.content)
        .map_err(|source| SteganoError::WriteError { source })?;
    info!("Wrote message {:#010x} to {target:?}", message.message_id);

    Ok(target)
}
