use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

pub use image::RgbImage;
use log::error;

use crate::error::SteganoError;
use crate::result::Result;
use crate::Persist;

use super::RasterImage;

/// A PNG image loaded from a file, that remembers where it came from.
///
/// Only lossless PNG files are accepted, any lossy recompression would wipe out the hidden bits.
/// An alpha channel is dropped on load.
#[derive(Debug, Clone)]
pub struct ImageFile {
    path: PathBuf,
    image: RgbImage,
}

impl ImageFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !is_png(path) {
            return Err(SteganoError::UnsupportedMedia);
        }
        let image = image::open(path)
            .map_err(|source| SteganoError::InvalidImageMedia {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    pub fn from_image(path: impl AsRef<Path>, image: RgbImage) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            image,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// writes the image back to the file it was opened from
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.save_as(&path)
    }

    pub fn save_to_writer<W: Write + Seek>(&self, mut writer: W) -> Result<()> {
        self.image
            .write_to(&mut writer, image::ImageFormat::Png)
            .map_err(|source| {
                error!("Error saving image {:?}: {source}", self.path);
                SteganoError::ImageEncodingError {
                    path: self.path.clone(),
                    source,
                }
            })
    }
}

impl Persist for ImageFile {
    fn save_as(&mut self, file: &Path) -> Result<()> {
        if !is_png(file) {
            return Err(SteganoError::UnsupportedMedia);
        }
        let f = File::create(file).map_err(|e| {
            error!("Error creating file {file:?}: {e}");
            SteganoError::WriteError { source: e }
        })?;
        let mut writer = BufWriter::new(f);
        self.save_to_writer(&mut writer)?;
        writer
            .flush()
            .map_err(|source| SteganoError::WriteError { source })
    }
}

impl RasterImage for ImageFile {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn channels(&self) -> &[u8] {
        RasterImage::channels(&self.image)
    }

    fn channels_mut(&mut self) -> &mut [u8] {
        RasterImage::channels_mut(&mut self.image)
    }
}

pub(crate) fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}
